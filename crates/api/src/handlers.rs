// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Handlers parse boundary values, enforce authorization before touching
//! state, and translate every lower-layer error into an [`ApiError`]. Reads
//! are open to every authenticated operator; the server checks the session
//! before calling them.

use std::str::FromStr;

use crewplan::{
    AllocationChanges, Command, CommitStrategy, ImportPreview, MemberChanges, ParsedRow,
};
use crewplan_audit::{ActionType, ActivityLogEntry, EntityType};
use crewplan_domain::{
    Allocation, DateRange, Department, DesignationSplit, EmployeeType, ResourceMember,
    SoftBooking, format_iso_date, parse_iso_date,
};
use crewplan_persistence::{
    ActivityQuery, AllocationQuery, ImportCommitResult, LoginHistoryData, MemberImportResult,
    OperatorData, PersistedTransition, Persistence, SessionData,
};
use time::{Date, Duration};
use tracing::{info, warn};

use crate::allocation_import::parse_allocation_rows;
use crate::auth::{
    AuthenticatedActor, AuthenticationService, AuthorizationService, ClientInfo, OpenedSession,
    Role,
};
use crate::capabilities::{
    compute_global_capabilities, compute_operator_capabilities, count_active_admins,
};
use crate::error::{ApiError, translate_domain_error};
use crate::export::{export_activity_csv, export_allocations_csv};
use crate::member_import::{MemberPreview, preview_members};
use crate::password_policy::PasswordPolicy;
use crate::reports::{
    capacity_report as build_capacity_report, utilization_report as build_utilization_report,
};
use crate::request_response::{
    ActivityInfo, ActivityRequest, AllocationImportCommitResponse, AllocationImportPreviewResponse,
    AllocationImportRequest, AllocationInfo, AllocationResponse, CapacityResponse,
    ChangePasswordRequest, CreateAllocationRequest, CreateMemberRequest, CreateOperatorRequest,
    CreateOperatorResponse, CreateSoftBookingRequest, DeleteResponse, ExportAllocationsRequest,
    ListActivityResponse, ListAllocationsRequest, ListAllocationsResponse, ListMembersRequest,
    ListMembersResponse, ListOperatorsResponse, ListSessionsResponse, ListSoftBookingsRequest,
    ListSoftBookingsResponse, LoginHistoryRequest, LoginHistoryResponse, LoginRequest,
    LoginResponse, MemberImportCommitResponse, MemberImportPreviewResponse, MemberInfo,
    MemberResponse, MemberRowPreview, MessageResponse, OperatorCapabilities, OperatorInfo,
    OperatorStatusResponse, ReportRequest, SessionInfo, SoftBookingInfo, SoftBookingResponse,
    SpreadsheetUpload, UndoResponse, UpdateAllocationRequest, UpdateMemberRequest,
    UtilizationResponse, WhoAmIResponse,
};
use crate::spreadsheet::SheetTable;

/// Login history entries returned when no limit is given.
pub const DEFAULT_LOGIN_HISTORY_LIMIT: i64 = 200;

// ============================================================================
// Boundary parsing
// ============================================================================

fn invalid_input(field: &str, message: String) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message,
    }
}

fn parse_date(field: &str, value: &str) -> Result<Date, ApiError> {
    parse_iso_date(value).map_err(|_| {
        invalid_input(
            field,
            format!("'{}' is not a YYYY-MM-DD date", value.trim()),
        )
    })
}

fn parse_department(value: &str) -> Result<Department, ApiError> {
    Department::from_str(value).map_err(translate_domain_error)
}

/// Absent or blank means "every department".
fn parse_department_filter(value: Option<&str>) -> Result<Option<Department>, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_department(text).map(Some),
    }
}

fn parse_range(start: &str, end: &str) -> Result<DateRange, ApiError> {
    let start: Date = parse_date("start_date", start)?;
    let end: Date = parse_date("end_date", end)?;
    DateRange::new(start, end).map_err(translate_domain_error)
}

/// Both bounds or neither.
fn parse_range_filter(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Option<DateRange>, ApiError> {
    let start: Option<&str> = start.map(str::trim).filter(|s| !s.is_empty());
    let end: Option<&str> = end.map(str::trim).filter(|s| !s.is_empty());
    match (start, end) {
        (None, None) => Ok(None),
        (Some(start), Some(end)) => parse_range(start, end).map(Some),
        (None, Some(_)) => Err(invalid_input(
            "start_date",
            String::from("start_date is required when end_date is given"),
        )),
        (Some(_), None) => Err(invalid_input(
            "end_date",
            String::from("end_date is required when start_date is given"),
        )),
    }
}

/// `None` leaves a field alone; empty text clears it.
fn clearable(value: Option<String>) -> Option<Option<String>> {
    value.map(|text| {
        let trimmed: &str = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    clearable(value).flatten()
}

fn parse_employee_type(value: Option<&str>) -> Result<Option<EmployeeType>, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => EmployeeType::from_str(text)
            .map(Some)
            .map_err(translate_domain_error),
    }
}

fn parse_entity_type(value: &str) -> Result<EntityType, ApiError> {
    let normalized: String = value
        .trim()
        .chars()
        .filter(|c| *c != '_' && *c != ' ')
        .collect::<String>()
        .to_ascii_lowercase();
    match normalized.as_str() {
        "member" => Ok(EntityType::Member),
        "allocation" => Ok(EntityType::Allocation),
        "softbooking" => Ok(EntityType::SoftBooking),
        _ => Err(invalid_input(
            "entity_type",
            format!("'{value}' is not one of Member, Allocation, SoftBooking"),
        )),
    }
}

fn parse_action_type(value: &str) -> Result<ActionType, ApiError> {
    ActionType::from_str(&value.trim().to_ascii_uppercase()).map_err(|_| {
        invalid_input(
            "action_type",
            format!("'{value}' is not one of CREATE, UPDATE, DELETE"),
        )
    })
}

fn table_from_upload(upload: &SpreadsheetUpload) -> Result<SheetTable, ApiError> {
    SheetTable::from_upload(
        &upload.file_name,
        upload.content_base64.as_deref(),
        upload.csv_text.as_deref(),
    )
}

fn run_command(
    persistence: &mut Persistence,
    command: Command,
    actor: &AuthenticatedActor,
) -> Result<PersistedTransition, ApiError> {
    let name: &'static str = command.name();
    let transition: PersistedTransition =
        persistence.apply_command(command, &actor.to_audit_actor())?;
    info!(
        command = name,
        entity_id = transition.entity_id,
        login_name = %actor.login_name,
        "Command applied"
    );
    Ok(transition)
}

fn load_member(persistence: &mut Persistence, member_id: i64) -> Result<ResourceMember, ApiError> {
    persistence
        .get_member(member_id)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Member"),
            message: format!("Member {member_id} does not exist"),
        })
}

fn load_allocation(
    persistence: &mut Persistence,
    allocation_id: i64,
) -> Result<Allocation, ApiError> {
    persistence
        .get_allocation(allocation_id)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Allocation"),
            message: format!("Allocation {allocation_id} does not exist"),
        })
}

fn activity_info(entry: ActivityLogEntry) -> ActivityInfo {
    ActivityInfo {
        log_id: entry.log_id.unwrap_or_default(),
        entity_type: entry.entity_type.as_str().to_string(),
        entity_id: entry.entity_id,
        action_type: entry.action_type.as_str().to_string(),
        field_name: entry.field_name,
        old_value: entry.old_value,
        new_value: entry.new_value,
        operator_id: entry.actor.operator_id,
        login_name: entry.actor.login_name,
        created_at: entry.created_at.unwrap_or_default(),
        is_reversed: entry.is_reversed,
    }
}

// ============================================================================
// Authentication
// ============================================================================

/// Authenticates an operator and opens a session.
///
/// # Errors
///
/// Returns `ApiError::AuthenticationFailed` for bad credentials or a
/// disabled operator.
pub fn login(
    persistence: &mut Persistence,
    request: &LoginRequest,
    client: &ClientInfo,
    session_ttl: Duration,
) -> Result<LoginResponse, ApiError> {
    let opened: OpenedSession = AuthenticationService::login(
        persistence,
        &request.login_name,
        &request.password,
        client,
        session_ttl,
    )?;

    Ok(LoginResponse {
        session_token: opened.session_token,
        login_name: opened.operator.login_name,
        display_name: opened.operator.display_name,
        role: opened.operator.role,
        expires_at: opened.expires_at,
    })
}

/// Ends the caller's session.
///
/// # Errors
///
/// Returns an error if the session cannot be ended.
pub fn logout(
    persistence: &mut Persistence,
    session: &SessionData,
) -> Result<MessageResponse, ApiError> {
    AuthenticationService::logout(persistence, session)?;
    Ok(MessageResponse {
        message: String::from("Logged out"),
    })
}

/// Returns the current operator's information with global capabilities.
#[must_use]
pub fn whoami(actor: &AuthenticatedActor, operator: &OperatorData) -> WhoAmIResponse {
    WhoAmIResponse {
        operator_id: operator.operator_id,
        login_name: operator.login_name.clone(),
        display_name: operator.display_name.clone(),
        role: operator.role.clone(),
        is_disabled: operator.is_disabled,
        capabilities: compute_global_capabilities(actor, operator),
    }
}

/// Changes the caller's own password.
///
/// The current password must be supplied. Every session of the operator,
/// including the caller's, ends on success.
///
/// # Errors
///
/// Returns an error if the current password is wrong, the new one breaks the
/// password policy, or the update fails.
pub fn change_password(
    persistence: &mut Persistence,
    operator: &OperatorData,
    request: &ChangePasswordRequest,
) -> Result<MessageResponse, ApiError> {
    if !bcrypt::verify(&request.current_password, &operator.password_hash).unwrap_or(false) {
        warn!(login_name = %operator.login_name, "Password change with wrong current password");
        return Err(ApiError::AuthenticationFailed {
            reason: String::from("Current password is incorrect"),
        });
    }

    PasswordPolicy::default().validate(
        &request.new_password,
        &request.new_password_confirmation,
        &operator.login_name,
        &operator.display_name,
    )?;

    persistence.update_password(operator.operator_id, &request.new_password)?;
    Ok(MessageResponse {
        message: String::from("Password changed; log in again"),
    })
}

// ============================================================================
// Operators & sessions (Admin)
// ============================================================================

/// Creates a new operator.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the role is unknown, the
/// password breaks the policy, or the login name is taken.
pub fn create_operator(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &CreateOperatorRequest,
) -> Result<CreateOperatorResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "create_operator")?;

    let role: Role = Role::from_str(request.role.trim()).map_err(|_| {
        invalid_input(
            "role",
            format!(
                "Invalid role: {}. Must be 'Admin', 'Manager' or 'Viewer'",
                request.role
            ),
        )
    })?;
    let login_name: &str = request.login_name.trim();
    if login_name.is_empty() {
        return Err(invalid_input(
            "login_name",
            String::from("Login name cannot be empty"),
        ));
    }
    let display_name: &str = request.display_name.trim();
    if display_name.is_empty() {
        return Err(invalid_input(
            "display_name",
            String::from("Display name cannot be empty"),
        ));
    }

    PasswordPolicy::default().validate(
        &request.password,
        &request.password_confirmation,
        login_name,
        display_name,
    )?;

    let operator_id: i64 =
        persistence.create_operator(login_name, display_name, &request.password, role.as_str())?;
    info!(operator_id, created_by = %actor.login_name, "Operator created");

    Ok(CreateOperatorResponse {
        operator_id,
        login_name: login_name.to_uppercase(),
        display_name: display_name.to_string(),
        role: role.as_str().to_string(),
    })
}

/// Lists all operators with what the caller may do to each.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the query fails.
pub fn list_operators(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListOperatorsResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "list_operators")?;

    let operators: Vec<OperatorData> = persistence.list_operators()?;
    let active_admins: usize = count_active_admins(&operators);

    Ok(ListOperatorsResponse {
        operators: operators
            .into_iter()
            .map(|op| {
                let capabilities: OperatorCapabilities =
                    compute_operator_capabilities(actor, &op, active_admins);
                OperatorInfo {
                    operator_id: op.operator_id,
                    login_name: op.login_name,
                    display_name: op.display_name,
                    role: op.role,
                    is_disabled: op.is_disabled,
                    created_at: op.created_at,
                    last_login_at: op.last_login_at,
                    capabilities,
                }
            })
            .collect(),
    })
}

fn target_operator(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    operator_id: i64,
) -> Result<(OperatorData, OperatorCapabilities), ApiError> {
    let operators: Vec<OperatorData> = persistence.list_operators()?;
    let active_admins: usize = count_active_admins(&operators);
    let target: OperatorData = operators
        .into_iter()
        .find(|op| op.operator_id == operator_id)
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Operator"),
            message: format!("Operator {operator_id} does not exist"),
        })?;
    let capabilities: OperatorCapabilities =
        compute_operator_capabilities(actor, &target, active_admins);
    Ok((target, capabilities))
}

/// Disables an operator. Its sessions stop validating immediately.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the target is the caller
/// or the last active admin, or the operator does not exist.
pub fn disable_operator(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    operator_id: i64,
) -> Result<OperatorStatusResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "disable_operator")?;
    let (target, capabilities): (OperatorData, OperatorCapabilities) =
        target_operator(persistence, actor, operator_id)?;

    if target.is_disabled {
        return Err(ApiError::AlreadyApplied {
            message: format!("Operator {} is already disabled", target.login_name),
        });
    }
    if !capabilities.can_disable.is_allowed() {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("operator_protection"),
            message: format!(
                "Operator {} cannot be disabled: an operator cannot disable itself or the last active admin",
                target.login_name
            ),
        });
    }

    persistence.set_operator_disabled(operator_id, true)?;
    info!(operator_id, disabled_by = %actor.login_name, "Operator disabled");
    Ok(OperatorStatusResponse {
        operator_id,
        is_disabled: true,
        message: format!("Operator {} disabled", target.login_name),
    })
}

/// Re-enables a disabled operator.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the operator does not exist.
pub fn enable_operator(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    operator_id: i64,
) -> Result<OperatorStatusResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "enable_operator")?;
    let (target, _): (OperatorData, OperatorCapabilities) =
        target_operator(persistence, actor, operator_id)?;

    if !target.is_disabled {
        return Err(ApiError::AlreadyApplied {
            message: format!("Operator {} is already enabled", target.login_name),
        });
    }

    persistence.set_operator_disabled(operator_id, false)?;
    info!(operator_id, enabled_by = %actor.login_name, "Operator enabled");
    Ok(OperatorStatusResponse {
        operator_id,
        is_disabled: false,
        message: format!("Operator {} enabled", target.login_name),
    })
}

/// Deletes an operator that no activity row refers to.
///
/// # Errors
///
/// Returns `Conflict` if the operator appears in the activity log, or a rule
/// violation for the caller itself or the last active admin.
pub fn delete_operator(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    operator_id: i64,
) -> Result<OperatorStatusResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "delete_operator")?;
    let (target, capabilities): (OperatorData, OperatorCapabilities) =
        target_operator(persistence, actor, operator_id)?;

    if !capabilities.can_delete.is_allowed() {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("operator_protection"),
            message: format!(
                "Operator {} cannot be deleted: an operator cannot delete itself or the last active admin",
                target.login_name
            ),
        });
    }

    persistence.delete_operator(operator_id)?;
    info!(operator_id, deleted_by = %actor.login_name, "Operator deleted");
    Ok(OperatorStatusResponse {
        operator_id,
        is_disabled: target.is_disabled,
        message: format!("Operator {} deleted", target.login_name),
    })
}

/// Lists live sessions.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the query fails.
pub fn list_sessions(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListSessionsResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "list_sessions")?;
    let operators: Vec<OperatorData> = persistence.list_operators()?;
    let sessions: Vec<SessionData> = persistence.list_sessions()?;
    Ok(ListSessionsResponse {
        sessions: sessions
            .into_iter()
            .map(|session| SessionInfo::from_session(session, &operators))
            .collect(),
    })
}

/// Force-ends a session.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the session does not exist.
pub fn end_session(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    session_id: i64,
) -> Result<MessageResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "end_session")?;
    if !persistence.end_session(session_id)? {
        return Err(ApiError::ResourceNotFound {
            resource_type: String::from("Session"),
            message: format!("Session {session_id} does not exist"),
        });
    }
    info!(session_id, ended_by = %actor.login_name, "Session ended by admin");
    Ok(MessageResponse {
        message: format!("Session {session_id} ended"),
    })
}

/// Lists login attempts, newest first.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the query fails.
pub fn list_login_history(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &LoginHistoryRequest,
) -> Result<LoginHistoryResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "list_login_history")?;
    let limit: i64 = request
        .limit
        .filter(|limit| *limit > 0)
        .unwrap_or(DEFAULT_LOGIN_HISTORY_LIMIT);
    let entries: Vec<LoginHistoryData> = persistence.list_login_history(limit)?;
    Ok(LoginHistoryResponse { entries })
}

// ============================================================================
// Members
// ============================================================================

/// Lists members ordered by employee ID.
///
/// # Errors
///
/// Returns an error if the department filter is unknown or the query fails.
pub fn list_members(
    persistence: &mut Persistence,
    request: &ListMembersRequest,
) -> Result<ListMembersResponse, ApiError> {
    let department: Option<Department> = parse_department_filter(request.department.as_deref())?;
    let members: Vec<ResourceMember> =
        persistence.list_members(request.include_inactive, department)?;
    Ok(ListMembersResponse {
        members: members.iter().map(MemberInfo::from_member).collect(),
    })
}

/// Adds a member to the roster.
///
/// # Errors
///
/// Returns an error if the actor may not edit, a field is invalid, or the
/// employee ID is already used.
pub fn create_member(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: CreateMemberRequest,
) -> Result<MemberResponse, ApiError> {
    AuthorizationService::authorize_edit_roster(actor, "create_member")?;

    let command: Command = Command::CreateMember {
        emp_id: request.emp_id,
        name: request.name,
        designation: request.designation,
        department: parse_department(&request.department)?,
        shift: request.shift,
        employee_type: parse_employee_type(request.employee_type.as_deref())?.unwrap_or_default(),
        reporting_to: non_blank(request.reporting_to),
    };
    let transition: PersistedTransition = run_command(persistence, command, actor)?;
    let member: ResourceMember = load_member(persistence, transition.entity_id)?;

    Ok(MemberResponse {
        message: format!("Member {} created", member.emp_id),
        member: MemberInfo::from_member(&member),
        activity_ids: transition.activity_ids,
    })
}

/// Changes some fields of a member. One activity row is written per field
/// whose value actually changed.
///
/// # Errors
///
/// Returns an error if the actor may not edit, the member does not exist, or
/// a new value is invalid.
pub fn update_member(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    member_id: i64,
    request: UpdateMemberRequest,
) -> Result<MemberResponse, ApiError> {
    AuthorizationService::authorize_edit_roster(actor, "update_member")?;

    let department: Option<Department> = request
        .department
        .as_deref()
        .map(parse_department)
        .transpose()?;
    let changes: MemberChanges = MemberChanges {
        emp_id: request.emp_id,
        name: request.name,
        designation: request.designation,
        department,
        shift: request.shift,
        employee_type: parse_employee_type(request.employee_type.as_deref())?,
        reporting_to: clearable(request.reporting_to),
    };

    let transition: PersistedTransition =
        run_command(persistence, Command::UpdateMember { member_id, changes }, actor)?;
    let member: ResourceMember = load_member(persistence, member_id)?;

    let message: String = if transition.activity_ids.is_empty() {
        format!("Member {} unchanged", member.emp_id)
    } else {
        format!("Member {} updated", member.emp_id)
    };
    Ok(MemberResponse {
        member: MemberInfo::from_member(&member),
        activity_ids: transition.activity_ids,
        message,
    })
}

/// Takes a member out of capacity. History is kept.
///
/// # Errors
///
/// Returns an error if the actor may not edit or the member does not exist.
pub fn deactivate_member(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    member_id: i64,
) -> Result<MemberResponse, ApiError> {
    AuthorizationService::authorize_edit_roster(actor, "deactivate_member")?;
    let transition: PersistedTransition =
        run_command(persistence, Command::DeactivateMember { member_id }, actor)?;
    let member: ResourceMember = load_member(persistence, member_id)?;
    Ok(MemberResponse {
        message: format!("Member {} deactivated", member.emp_id),
        member: MemberInfo::from_member(&member),
        activity_ids: transition.activity_ids,
    })
}

/// Returns a deactivated member to capacity.
///
/// # Errors
///
/// Returns an error if the actor may not edit or the member does not exist.
pub fn reactivate_member(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    member_id: i64,
) -> Result<MemberResponse, ApiError> {
    AuthorizationService::authorize_edit_roster(actor, "reactivate_member")?;
    let transition: PersistedTransition =
        run_command(persistence, Command::ReactivateMember { member_id }, actor)?;
    let member: ResourceMember = load_member(persistence, member_id)?;
    Ok(MemberResponse {
        message: format!("Member {} reactivated", member.emp_id),
        member: MemberInfo::from_member(&member),
        activity_ids: transition.activity_ids,
    })
}

/// Deletes a member together with every allocation they hold.
///
/// # Errors
///
/// Returns an error if the actor may not edit or the member does not exist.
pub fn delete_member(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    member_id: i64,
) -> Result<DeleteResponse, ApiError> {
    AuthorizationService::authorize_edit_roster(actor, "delete_member")?;
    let transition: PersistedTransition =
        run_command(persistence, Command::DeleteMember { member_id }, actor)?;
    Ok(DeleteResponse {
        entity_id: member_id,
        message: format!(
            "Member {member_id} deleted ({} activity rows)",
            transition.activity_ids.len()
        ),
        activity_ids: transition.activity_ids,
    })
}

fn member_preview(
    persistence: &mut Persistence,
    upload: &SpreadsheetUpload,
) -> Result<MemberPreview, ApiError> {
    let table: SheetTable = table_from_upload(upload)?;
    let existing: Vec<ResourceMember> = persistence.list_members(true, None)?;
    preview_members(&table, &existing)
}

/// Checks a member spreadsheet row by row without writing.
///
/// # Errors
///
/// Returns an error if the actor may not import or the file cannot be read.
pub fn preview_member_import(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    upload: &SpreadsheetUpload,
) -> Result<MemberImportPreviewResponse, ApiError> {
    AuthorizationService::authorize_import(actor)?;
    let preview: MemberPreview = member_preview(persistence, upload)?;
    info!(
        file_name = %upload.file_name,
        valid = preview.valid_count(),
        invalid = preview.invalid_count(),
        "Previewed member import"
    );
    Ok(MemberImportPreviewResponse {
        valid_count: preview.valid_count(),
        invalid_count: preview.invalid_count(),
        rows: preview.rows,
    })
}

/// Creates a member for every valid row of a member spreadsheet.
///
/// The file is checked again at commit. Invalid rows are returned and not
/// attempted.
///
/// # Errors
///
/// Returns an error if the actor may not import, the file cannot be read, or
/// a write fails.
pub fn commit_member_import(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    upload: &SpreadsheetUpload,
) -> Result<MemberImportCommitResponse, ApiError> {
    AuthorizationService::authorize_import(actor)?;
    let preview: MemberPreview = member_preview(persistence, upload)?;
    let result: MemberImportResult =
        persistence.import_members(&preview.members, &actor.to_audit_actor())?;

    let invalid_rows: Vec<MemberRowPreview> = preview.invalid_rows();
    Ok(MemberImportCommitResponse {
        message: format!(
            "Created {} members; {} skipped; {} invalid rows",
            result.created.len(),
            result.skipped.len(),
            invalid_rows.len()
        ),
        created: result.created.iter().map(MemberInfo::from_member).collect(),
        skipped: result.skipped,
        invalid_rows,
    })
}

// ============================================================================
// Allocations
// ============================================================================

fn allocation_query(
    member_id: Option<i64>,
    department: Option<&str>,
    start_date: Option<&str>,
    end_date: Option<&str>,
    show_name: Option<String>,
) -> Result<AllocationQuery, ApiError> {
    Ok(AllocationQuery {
        member_id,
        department: parse_department_filter(department)?,
        range: parse_range_filter(start_date, end_date)?,
        show_name: non_blank(show_name),
    })
}

/// Lists allocations matching the request's filters.
///
/// # Errors
///
/// Returns an error if a filter is malformed or the query fails.
pub fn list_allocations(
    persistence: &mut Persistence,
    request: &ListAllocationsRequest,
) -> Result<ListAllocationsResponse, ApiError> {
    let query: AllocationQuery = allocation_query(
        request.member_id,
        request.department.as_deref(),
        request.start_date.as_deref(),
        request.end_date.as_deref(),
        request.show_name.clone(),
    )?;
    let allocations: Vec<Allocation> = persistence.list_allocations(&query)?;
    Ok(ListAllocationsResponse {
        total_man_days: allocations.iter().map(|a| a.man_days).sum(),
        allocations: allocations
            .iter()
            .map(AllocationInfo::from_allocation)
            .collect(),
    })
}

/// Books a member for one date.
///
/// # Errors
///
/// Returns an error if the actor may not edit, the member does not exist, or
/// a value is invalid.
pub fn create_allocation(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: CreateAllocationRequest,
) -> Result<AllocationResponse, ApiError> {
    AuthorizationService::authorize_edit_roster(actor, "create_allocation")?;

    let command: Command = Command::CreateAllocation {
        member_id: request.member_id,
        allocation_date: parse_date("allocation_date", &request.allocation_date)?,
        show_name: non_blank(request.show_name),
        shot_name: non_blank(request.shot_name),
        man_days: request.man_days,
        is_leave: request.is_leave,
        is_idle: request.is_idle,
        notes: non_blank(request.notes),
    };
    let transition: PersistedTransition = run_command(persistence, command, actor)?;
    let allocation: Allocation = load_allocation(persistence, transition.entity_id)?;

    Ok(AllocationResponse {
        message: format!(
            "Allocation {} created for {}",
            transition.entity_id,
            format_iso_date(allocation.allocation_date)
        ),
        allocation: AllocationInfo::from_allocation(&allocation),
        activity_ids: transition.activity_ids,
    })
}

/// Changes some fields of an allocation.
///
/// # Errors
///
/// Returns an error if the actor may not edit, the allocation does not
/// exist, or a new value is invalid.
pub fn update_allocation(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    allocation_id: i64,
    request: UpdateAllocationRequest,
) -> Result<AllocationResponse, ApiError> {
    AuthorizationService::authorize_edit_roster(actor, "update_allocation")?;

    let allocation_date: Option<Date> = request
        .allocation_date
        .as_deref()
        .map(|value| parse_date("allocation_date", value))
        .transpose()?;
    let changes: AllocationChanges = AllocationChanges {
        allocation_date,
        show_name: clearable(request.show_name),
        shot_name: clearable(request.shot_name),
        man_days: request.man_days,
        is_leave: request.is_leave,
        is_idle: request.is_idle,
        notes: clearable(request.notes),
    };

    let transition: PersistedTransition = run_command(
        persistence,
        Command::UpdateAllocation {
            allocation_id,
            changes,
        },
        actor,
    )?;
    let allocation: Allocation = load_allocation(persistence, allocation_id)?;

    Ok(AllocationResponse {
        message: format!(
            "Allocation {allocation_id} updated ({} fields changed)",
            transition.activity_ids.len()
        ),
        allocation: AllocationInfo::from_allocation(&allocation),
        activity_ids: transition.activity_ids,
    })
}

/// Removes an allocation.
///
/// # Errors
///
/// Returns an error if the actor may not edit or the allocation does not exist.
pub fn delete_allocation(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    allocation_id: i64,
) -> Result<DeleteResponse, ApiError> {
    AuthorizationService::authorize_edit_roster(actor, "delete_allocation")?;
    let transition: PersistedTransition =
        run_command(persistence, Command::DeleteAllocation { allocation_id }, actor)?;
    Ok(DeleteResponse {
        entity_id: allocation_id,
        message: format!("Allocation {allocation_id} deleted"),
        activity_ids: transition.activity_ids,
    })
}

fn allocation_rows(upload: &SpreadsheetUpload) -> Result<Vec<ParsedRow>, ApiError> {
    let table: SheetTable = table_from_upload(upload)?;
    parse_allocation_rows(&table)
}

/// Resolves an allocation spreadsheet against stored data without writing.
///
/// Conflicts are reported, never merged. Bad rows are reported with their
/// row number and do not stop the batch.
///
/// # Errors
///
/// Returns an error if the actor may not import or the file cannot be read
/// as a table with the required columns.
pub fn preview_allocation_import(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &AllocationImportRequest,
) -> Result<AllocationImportPreviewResponse, ApiError> {
    AuthorizationService::authorize_import(actor)?;
    let rows: Vec<ParsedRow> = allocation_rows(&request.upload)?;
    let preview: ImportPreview = persistence.preview_allocation_import(&rows)?;

    info!(
        file_name = %request.upload.file_name,
        valid = preview.valid.len(),
        conflicts = preview.conflicts.len(),
        errors = preview.errors.len(),
        warnings = preview.warnings.len(),
        "Previewed allocation import"
    );

    let span: Option<DateRange> = preview.date_span();
    Ok(AllocationImportPreviewResponse {
        committable_rows: preview.committable_rows(),
        start_date: span.map(|range| format_iso_date(range.start())),
        end_date: span.map(|range| format_iso_date(range.end())),
        preview,
    })
}

/// Commits an allocation spreadsheet under the requested strategy.
///
/// Conflicts are resolved again inside the commit's transaction, so the
/// strategy acts on the data as it is at commit time.
///
/// # Errors
///
/// Returns an error if the actor may not import, the strategy is missing or
/// unknown, the file cannot be read, or a write fails.
pub fn commit_allocation_import(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &AllocationImportRequest,
) -> Result<AllocationImportCommitResponse, ApiError> {
    AuthorizationService::authorize_import(actor)?;
    let strategy: CommitStrategy = request
        .strategy
        .as_deref()
        .ok_or_else(|| {
            invalid_input(
                "strategy",
                String::from("A commit strategy (replace, add or skip) is required"),
            )
        })
        .and_then(|value| {
            CommitStrategy::from_str(value).map_err(|message| invalid_input("strategy", message))
        })?;

    let rows: Vec<ParsedRow> = allocation_rows(&request.upload)?;
    let result: ImportCommitResult =
        persistence.commit_allocation_import(&rows, strategy, &actor.to_audit_actor())?;

    Ok(AllocationImportCommitResponse {
        message: format!(
            "Committed {} rows with '{strategy}': {} allocations inserted, {} deleted, {} rows skipped, {} rows with errors",
            result.committed_rows.len(),
            result.inserted,
            result.deleted,
            result.skipped_rows.len(),
            result.preview.errors.len()
        ),
        result,
    })
}

/// Exports productive allocations as collapsed ranges in CSV.
///
/// # Errors
///
/// Returns an error if a filter is malformed or the query fails.
pub fn export_allocations(
    persistence: &mut Persistence,
    request: &ExportAllocationsRequest,
) -> Result<String, ApiError> {
    let query: AllocationQuery = allocation_query(
        request.member_id,
        request.department.as_deref(),
        request.start_date.as_deref(),
        request.end_date.as_deref(),
        request.show_name.clone(),
    )?;
    let allocations: Vec<Allocation> = persistence.list_allocations(&query)?;
    let members: Vec<ResourceMember> = persistence.list_members(true, None)?;
    export_allocations_csv(&allocations, &members)
}

// ============================================================================
// Soft bookings
// ============================================================================

/// Lists soft bookings, optionally overlapping a range and in one department.
///
/// # Errors
///
/// Returns an error if a filter is malformed or the query fails.
pub fn list_soft_bookings(
    persistence: &mut Persistence,
    request: &ListSoftBookingsRequest,
) -> Result<ListSoftBookingsResponse, ApiError> {
    let range: Option<DateRange> =
        parse_range_filter(request.start_date.as_deref(), request.end_date.as_deref())?;
    let department: Option<Department> = parse_department_filter(request.department.as_deref())?;
    let bookings: Vec<SoftBooking> = persistence.list_soft_bookings(range, department)?;
    Ok(ListSoftBookingsResponse {
        soft_bookings: bookings.iter().map(SoftBookingInfo::from_booking).collect(),
    })
}

/// Reserves department capacity for a show.
///
/// # Errors
///
/// Returns an error if the actor may not edit or a value is invalid,
/// including a split that does not sum to 100.
pub fn create_soft_booking(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: CreateSoftBookingRequest,
) -> Result<SoftBookingResponse, ApiError> {
    AuthorizationService::authorize_edit_roster(actor, "create_soft_booking")?;

    let split: Option<DesignationSplit> = request
        .split
        .map(|split| DesignationSplit::new(split.senior, split.mid, split.junior))
        .transpose()
        .map_err(translate_domain_error)?;
    let command: Command = Command::CreateSoftBooking {
        show_name: request.show_name,
        manager_name: request.manager_name,
        department: parse_department(&request.department)?,
        man_days: request.man_days,
        start_date: parse_date("start_date", &request.start_date)?,
        end_date: parse_date("end_date", &request.end_date)?,
        split,
        notes: non_blank(request.notes),
    };
    let transition: PersistedTransition = run_command(persistence, command, actor)?;
    let booking: SoftBooking = persistence
        .get_soft_booking(transition.entity_id)?
        .ok_or_else(|| ApiError::Internal {
            message: format!("Soft booking {} missing after insert", transition.entity_id),
        })?;

    Ok(SoftBookingResponse {
        message: format!("Soft booking {} created", transition.entity_id),
        soft_booking: SoftBookingInfo::from_booking(&booking),
        activity_ids: transition.activity_ids,
    })
}

/// Removes a soft booking.
///
/// # Errors
///
/// Returns an error if the actor may not edit or the booking does not exist.
pub fn delete_soft_booking(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    booking_id: i64,
) -> Result<DeleteResponse, ApiError> {
    AuthorizationService::authorize_edit_roster(actor, "delete_soft_booking")?;
    let transition: PersistedTransition =
        run_command(persistence, Command::DeleteSoftBooking { booking_id }, actor)?;
    Ok(DeleteResponse {
        entity_id: booking_id,
        message: format!("Soft booking {booking_id} deleted"),
        activity_ids: transition.activity_ids,
    })
}

// ============================================================================
// Reports
// ============================================================================

/// Department capacity over a date range.
///
/// Without a department filter every department is reported.
///
/// # Errors
///
/// Returns an error if the range or department is malformed or a query fails.
pub fn capacity_report(
    persistence: &mut Persistence,
    request: &ReportRequest,
) -> Result<CapacityResponse, ApiError> {
    let range: DateRange = parse_range(&request.start_date, &request.end_date)?;
    let department: Option<Department> = parse_department_filter(request.department.as_deref())?;
    let departments: Vec<Department> =
        department.map_or_else(|| Department::ALL.to_vec(), |d| vec![d]);

    let members: Vec<ResourceMember> = persistence.list_members(false, department)?;
    let allocations: Vec<Allocation> = persistence.list_allocations(&AllocationQuery {
        department,
        ..AllocationQuery::within(range)
    })?;
    let soft_bookings: Vec<SoftBooking> =
        persistence.list_soft_bookings(Some(range), department)?;

    Ok(build_capacity_report(
        range,
        &departments,
        &members,
        &allocations,
        &soft_bookings,
    ))
}

/// Per-member utilization, overallocated days and show totals.
///
/// Inactive members are included so historic work stays visible.
///
/// # Errors
///
/// Returns an error if the range or department is malformed or a query fails.
pub fn utilization_report(
    persistence: &mut Persistence,
    request: &ReportRequest,
) -> Result<UtilizationResponse, ApiError> {
    let range: DateRange = parse_range(&request.start_date, &request.end_date)?;
    let department: Option<Department> = parse_department_filter(request.department.as_deref())?;

    let members: Vec<ResourceMember> = persistence.list_members(true, department)?;
    let allocations: Vec<Allocation> = persistence.list_allocations(&AllocationQuery {
        department,
        ..AllocationQuery::within(range)
    })?;

    Ok(build_utilization_report(range, &members, &allocations))
}

// ============================================================================
// Activity log
// ============================================================================

fn activity_query(request: &ActivityRequest) -> Result<ActivityQuery, ApiError> {
    Ok(ActivityQuery {
        entity_type: request
            .entity_type
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(parse_entity_type)
            .transpose()?,
        entity_id: request.entity_id,
        action_type: request
            .action_type
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(parse_action_type)
            .transpose()?,
        operator_id: request.operator_id,
        range: parse_range_filter(request.start_date.as_deref(), request.end_date.as_deref())?,
        is_reversed: request.is_reversed,
        limit: request.limit.filter(|limit| *limit > 0),
    })
}

/// Lists activity rows, newest first.
///
/// # Errors
///
/// Returns an error if a filter is malformed or the query fails.
pub fn list_activity(
    persistence: &mut Persistence,
    request: &ActivityRequest,
) -> Result<ListActivityResponse, ApiError> {
    let entries: Vec<ActivityLogEntry> = persistence.list_activity(&activity_query(request)?)?;
    Ok(ListActivityResponse {
        entries: entries.into_iter().map(activity_info).collect(),
    })
}

/// Exports activity rows as CSV with the listing's filters.
///
/// # Errors
///
/// Returns an error if a filter is malformed or the query fails.
pub fn export_activity(
    persistence: &mut Persistence,
    request: &ActivityRequest,
) -> Result<String, ApiError> {
    let entries: Vec<ActivityLogEntry> = persistence.list_activity(&activity_query(request)?)?;
    export_activity_csv(&entries)
}

/// Reverses one logged change and flags the row as reversed.
///
/// No new activity row is written. A reversed row cannot be undone again.
///
/// # Errors
///
/// Returns `ResourceNotFound` for an unknown row, `AlreadyApplied` for a
/// reversed one, and `Conflict` when current data blocks the inverse.
pub fn undo_activity(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    log_id: i64,
) -> Result<UndoResponse, ApiError> {
    AuthorizationService::authorize_undo(actor)?;
    let entry: ActivityLogEntry = persistence.undo_activity(log_id)?;
    info!(
        log_id,
        entity_type = entry.entity_type.as_str(),
        entity_id = entry.entity_id,
        action_type = entry.action_type.as_str(),
        login_name = %actor.login_name,
        "Activity undone"
    );

    let message: String = format!(
        "Undid {} of {} {}",
        entry.action_type, entry.entity_type, entry.entity_id
    );
    Ok(UndoResponse {
        entry: activity_info(entry),
        message,
    })
}

/// Removes expired sessions.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn purge_expired_sessions(persistence: &mut Persistence) -> Result<usize, ApiError> {
    Ok(AuthenticationService::purge_expired_sessions(persistence)?)
}
