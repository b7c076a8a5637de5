// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    add_allocation, add_member, add_operator, csv_upload, member_request, operator, setup,
};
use crate::{
    ActivityRequest, AllocationImportRequest, ApiError, AuthenticatedActor, Capability,
    CreateOperatorRequest, ExportAllocationsRequest, GlobalCapabilities, ListMembersRequest,
    ListMembersResponse, LoginHistoryRequest, Role, WhoAmIResponse, create_member,
    create_operator, delete_allocation, export_allocations, list_activity, list_login_history,
    list_members, list_sessions, preview_allocation_import, undo_activity, whoami,
};

fn assert_unauthorized<T: std::fmt::Debug>(result: Result<T, ApiError>, role: &str) {
    match result {
        Err(ApiError::Unauthorized { required_role, .. }) => assert_eq!(required_role, role),
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[test]
fn test_viewer_cannot_change_the_roster() {
    let (mut persistence, _admin) = setup();
    let viewer: AuthenticatedActor = add_operator(&mut persistence, "viewer", Role::Viewer);

    let result = create_member(&mut persistence, &viewer, member_request("E001", "Comp"));

    assert_unauthorized(result, "Manager");
    assert!(persistence.list_members(true, None).unwrap().is_empty());
}

#[test]
fn test_viewer_cannot_delete_or_undo() {
    let (mut persistence, admin) = setup();
    let viewer: AuthenticatedActor = add_operator(&mut persistence, "viewer", Role::Viewer);
    let member_id: i64 = add_member(&mut persistence, &admin, "E001", "Comp");
    let allocation_id: i64 = add_allocation(
        &mut persistence,
        &admin,
        member_id,
        "2026-03-02",
        "Show A",
        1.0,
    )
    .allocation_id;

    assert_unauthorized(
        delete_allocation(&mut persistence, &viewer, allocation_id),
        "Manager",
    );

    let log_id: i64 = list_activity(&mut persistence, &ActivityRequest::default())
        .unwrap()
        .entries[0]
        .log_id;
    assert_unauthorized(undo_activity(&mut persistence, &viewer, log_id), "Manager");
}

#[test]
fn test_viewer_cannot_preview_imports() {
    let (mut persistence, _admin) = setup();
    let viewer: AuthenticatedActor = add_operator(&mut persistence, "viewer", Role::Viewer);
    let request: AllocationImportRequest = AllocationImportRequest {
        upload: csv_upload("action,emp_id,show_name,start_date,end_date,total_md\n"),
        strategy: None,
    };

    assert_unauthorized(
        preview_allocation_import(&mut persistence, &viewer, &request),
        "Manager",
    );
}

#[test]
fn test_viewer_can_read_and_export() {
    let (mut persistence, admin) = setup();
    add_member(&mut persistence, &admin, "E001", "Comp");

    let members: ListMembersResponse =
        list_members(&mut persistence, &ListMembersRequest::default()).unwrap();
    assert_eq!(members.members.len(), 1);

    let csv: String =
        export_allocations(&mut persistence, &ExportAllocationsRequest::default()).unwrap();
    assert!(csv.starts_with("\"Action\""));
}

#[test]
fn test_manager_edits_but_cannot_administer() {
    let (mut persistence, _admin) = setup();
    let manager: AuthenticatedActor = add_operator(&mut persistence, "manager", Role::Manager);

    assert!(create_member(&mut persistence, &manager, member_request("E001", "Roto")).is_ok());

    assert_unauthorized(list_sessions(&mut persistence, &manager), "Admin");
    assert_unauthorized(
        list_login_history(&mut persistence, &manager, &LoginHistoryRequest::default()),
        "Admin",
    );
    let request: CreateOperatorRequest = CreateOperatorRequest {
        login_name: String::from("other"),
        display_name: String::from("Other"),
        password: String::from("Render-Farm-42"),
        password_confirmation: String::from("Render-Farm-42"),
        role: String::from("Viewer"),
    };
    assert_unauthorized(create_operator(&mut persistence, &manager, &request), "Admin");
}

#[test]
fn test_whoami_reports_capabilities_by_role() {
    let (mut persistence, admin) = setup();
    let manager: AuthenticatedActor = add_operator(&mut persistence, "manager", Role::Manager);
    let viewer: AuthenticatedActor = add_operator(&mut persistence, "viewer", Role::Viewer);

    let admin_caps: GlobalCapabilities =
        whoami(&admin, &operator(&mut persistence, &admin)).capabilities;
    assert_eq!(admin_caps.can_manage_operators, Capability::Allowed);
    assert_eq!(admin_caps.can_edit_roster, Capability::Allowed);

    let manager_caps: GlobalCapabilities =
        whoami(&manager, &operator(&mut persistence, &manager)).capabilities;
    assert_eq!(manager_caps.can_edit_roster, Capability::Allowed);
    assert_eq!(manager_caps.can_undo, Capability::Allowed);
    assert_eq!(manager_caps.can_manage_operators, Capability::Denied);

    let viewer_response: WhoAmIResponse = whoami(&viewer, &operator(&mut persistence, &viewer));
    assert_eq!(viewer_response.login_name, "VIEWER");
    assert_eq!(viewer_response.role, "Viewer");
    assert_eq!(viewer_response.capabilities.can_edit_roster, Capability::Denied);
    assert_eq!(viewer_response.capabilities.can_import, Capability::Denied);
    assert_eq!(viewer_response.capabilities.can_export, Capability::Allowed);
}
