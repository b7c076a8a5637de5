// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crewplan_persistence::{OperatorData, Persistence};
use time::Duration;

use super::helpers::{TEST_PASSWORD, add_member, add_operator, operator, setup};
use crate::{
    ApiError, AuthenticatedActor, AuthenticationService, Capability, ChangePasswordRequest,
    ClientInfo, CreateOperatorRequest, CreateOperatorResponse, ListOperatorsResponse,
    LoginHistoryRequest, LoginHistoryResponse, LoginRequest, LoginResponse, OperatorInfo, Role,
    change_password, create_operator, delete_operator, disable_operator, enable_operator,
    end_session, list_login_history, list_operators, list_sessions, login,
};

fn operator_request(login_name: &str, role: &str) -> CreateOperatorRequest {
    CreateOperatorRequest {
        login_name: String::from(login_name),
        display_name: String::from("Production Manager"),
        password: String::from(TEST_PASSWORD),
        password_confirmation: String::from(TEST_PASSWORD),
        role: String::from(role),
    }
}

fn login_as(
    persistence: &mut Persistence,
    login_name: &str,
    password: &str,
) -> Result<LoginResponse, ApiError> {
    let request: LoginRequest = LoginRequest {
        login_name: String::from(login_name),
        password: String::from(password),
    };
    login(
        persistence,
        &request,
        &ClientInfo::default(),
        Duration::hours(1),
    )
}

fn info_for<'a>(response: &'a ListOperatorsResponse, login_name: &str) -> &'a OperatorInfo {
    response
        .operators
        .iter()
        .find(|op| op.login_name == login_name)
        .expect("operator listed")
}

#[test]
fn test_create_operator_normalizes_login_name() {
    let (mut persistence, admin) = setup();

    let response: CreateOperatorResponse =
        create_operator(&mut persistence, &admin, &operator_request(" pm ", "Manager")).unwrap();

    assert_eq!(response.login_name, "PM");
    assert_eq!(response.role, "Manager");
    assert!(login_as(&mut persistence, "pm", TEST_PASSWORD).is_ok());
}

#[test]
fn test_create_operator_rejects_unknown_role() {
    let (mut persistence, admin) = setup();

    let result = create_operator(&mut persistence, &admin, &operator_request("pm", "Supervisor"));

    assert!(matches!(result, Err(ApiError::InvalidInput { field, .. }) if field == "role"));
}

#[test]
fn test_create_operator_enforces_password_policy() {
    let (mut persistence, admin) = setup();
    let mut request: CreateOperatorRequest = operator_request("pm", "Manager");
    request.password = String::from("short");
    request.password_confirmation = String::from("short");

    let result = create_operator(&mut persistence, &admin, &request);

    assert!(matches!(result, Err(ApiError::PasswordPolicyViolation { .. })));
}

#[test]
fn test_duplicate_login_name_is_rejected() {
    let (mut persistence, admin) = setup();
    create_operator(&mut persistence, &admin, &operator_request("pm", "Manager")).unwrap();

    let result = create_operator(&mut persistence, &admin, &operator_request("PM", "Viewer"));

    assert!(result.is_err());
    assert_eq!(persistence.list_operators().unwrap().len(), 2);
}

#[test]
fn test_operator_capabilities_protect_self_and_last_admin() {
    let (mut persistence, admin) = setup();
    add_operator(&mut persistence, "viewer", Role::Viewer);

    let listed: ListOperatorsResponse = list_operators(&mut persistence, &admin).unwrap();

    let own: &OperatorInfo = info_for(&listed, "ADMIN");
    assert_eq!(own.capabilities.can_disable, Capability::Denied);
    assert_eq!(own.capabilities.can_delete, Capability::Denied);
    let other: &OperatorInfo = info_for(&listed, "VIEWER");
    assert_eq!(other.capabilities.can_disable, Capability::Allowed);
    assert_eq!(other.capabilities.can_delete, Capability::Allowed);
}

#[test]
fn test_admin_cannot_disable_itself() {
    let (mut persistence, admin) = setup();

    let result = disable_operator(&mut persistence, &admin, admin.operator_id);

    assert!(matches!(result, Err(ApiError::DomainRuleViolation { .. })));
    assert!(!operator(&mut persistence, &admin).is_disabled);
}

#[test]
fn test_disabled_operator_cannot_log_in_until_enabled() {
    let (mut persistence, admin) = setup();
    let viewer: AuthenticatedActor = add_operator(&mut persistence, "viewer", Role::Viewer);
    let session: LoginResponse = login_as(&mut persistence, "viewer", TEST_PASSWORD).unwrap();

    disable_operator(&mut persistence, &admin, viewer.operator_id).unwrap();

    assert!(matches!(
        login_as(&mut persistence, "viewer", TEST_PASSWORD),
        Err(ApiError::AuthenticationFailed { .. })
    ));
    assert!(
        AuthenticationService::validate_session(&mut persistence, &session.session_token).is_err()
    );
    assert!(matches!(
        disable_operator(&mut persistence, &admin, viewer.operator_id),
        Err(ApiError::AlreadyApplied { .. })
    ));

    enable_operator(&mut persistence, &admin, viewer.operator_id).unwrap();
    assert!(login_as(&mut persistence, "viewer", TEST_PASSWORD).is_ok());
}

#[test]
fn test_operator_with_activity_history_cannot_be_deleted() {
    let (mut persistence, admin) = setup();
    let manager: AuthenticatedActor = add_operator(&mut persistence, "manager", Role::Manager);
    add_member(&mut persistence, &manager, "E001", "Comp");

    let result = delete_operator(&mut persistence, &admin, manager.operator_id);

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
}

#[test]
fn test_operator_without_history_can_be_deleted() {
    let (mut persistence, admin) = setup();
    let viewer: AuthenticatedActor = add_operator(&mut persistence, "viewer", Role::Viewer);

    delete_operator(&mut persistence, &admin, viewer.operator_id).unwrap();

    assert!(
        persistence
            .get_operator_by_id(viewer.operator_id)
            .unwrap()
            .is_none()
    );
    assert!(matches!(
        delete_operator(&mut persistence, &admin, viewer.operator_id),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[test]
fn test_login_history_records_failures_and_successes() {
    let (mut persistence, admin) = setup();
    assert!(login_as(&mut persistence, "admin", "wrong password").is_err());
    login_as(&mut persistence, "admin", TEST_PASSWORD).unwrap();

    let history: LoginHistoryResponse =
        list_login_history(&mut persistence, &admin, &LoginHistoryRequest::default()).unwrap();

    assert_eq!(history.entries.len(), 2);
    assert!(history.entries.iter().any(|entry| entry.success));
    assert!(history.entries.iter().any(|entry| !entry.success));
}

#[test]
fn test_admin_can_end_a_session() {
    let (mut persistence, admin) = setup();
    let viewer_session: LoginResponse = {
        add_operator(&mut persistence, "viewer", Role::Viewer);
        login_as(&mut persistence, "viewer", TEST_PASSWORD).unwrap()
    };
    let session_id: i64 = list_sessions(&mut persistence, &admin).unwrap().sessions[0].session_id;

    end_session(&mut persistence, &admin, session_id).unwrap();

    assert!(
        AuthenticationService::validate_session(&mut persistence, &viewer_session.session_token)
            .is_err()
    );
    assert!(matches!(
        end_session(&mut persistence, &admin, session_id + 100),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[test]
fn test_change_password_requires_current_password() {
    let (mut persistence, admin) = setup();
    let record: OperatorData = operator(&mut persistence, &admin);
    let request: ChangePasswordRequest = ChangePasswordRequest {
        current_password: String::from("not it"),
        new_password: String::from("Comp-Night-Shift-7"),
        new_password_confirmation: String::from("Comp-Night-Shift-7"),
    };

    let result = change_password(&mut persistence, &record, &request);

    assert!(matches!(result, Err(ApiError::AuthenticationFailed { .. })));
}

#[test]
fn test_change_password_ends_existing_sessions() {
    let (mut persistence, admin) = setup();
    let session: LoginResponse = login_as(&mut persistence, "admin", TEST_PASSWORD).unwrap();
    let record: OperatorData = operator(&mut persistence, &admin);
    let request: ChangePasswordRequest = ChangePasswordRequest {
        current_password: String::from(TEST_PASSWORD),
        new_password: String::from("Comp-Night-Shift-7"),
        new_password_confirmation: String::from("Comp-Night-Shift-7"),
    };

    change_password(&mut persistence, &record, &request).unwrap();

    assert!(
        AuthenticationService::validate_session(&mut persistence, &session.session_token).is_err()
    );
    assert!(login_as(&mut persistence, "admin", TEST_PASSWORD).is_err());
    assert!(login_as(&mut persistence, "admin", "Comp-Night-Shift-7").is_ok());
}
