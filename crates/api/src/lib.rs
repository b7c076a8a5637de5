// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the `CrewPlan` service.
//!
//! Everything an HTTP layer needs lives here as plain functions over
//! [`crewplan_persistence::Persistence`]: authentication and role checks,
//! request and response types, spreadsheet import, CSV export and reports.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod allocation_import;
mod auth;
mod capabilities;
mod error;
mod export;
mod handlers;
mod member_import;
mod password_policy;
mod reports;
mod request_response;
mod spreadsheet;

#[cfg(test)]
mod tests;

pub use allocation_import::parse_allocation_rows;
pub use auth::{
    AuthenticatedActor, AuthenticationService, AuthorizationService, ClientInfo, OpenedSession,
    Role,
};
pub use capabilities::{
    compute_global_capabilities, compute_operator_capabilities, count_active_admins,
};
pub use error::{
    ApiError, AuthError, translate_audit_error, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use export::{
    ACTIVITY_EXPORT_HEADER, ALLOCATION_EXPORT_HEADER, export_activity_csv, export_allocations_csv,
};
pub use handlers::{
    DEFAULT_LOGIN_HISTORY_LIMIT, capacity_report, change_password, commit_allocation_import,
    commit_member_import, create_allocation, create_member, create_operator, create_soft_booking,
    deactivate_member, delete_allocation, delete_member, delete_operator, delete_soft_booking,
    disable_operator, enable_operator, end_session, export_activity, export_allocations,
    list_activity, list_allocations, list_login_history, list_members, list_operators,
    list_sessions, list_soft_bookings, login, logout, preview_allocation_import,
    preview_member_import, purge_expired_sessions, reactivate_member, undo_activity,
    update_allocation, update_member, utilization_report, whoami,
};
pub use member_import::{MemberPreview, preview_members};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use request_response::{
    ActivityInfo, ActivityRequest, AllocationImportCommitResponse,
    AllocationImportPreviewResponse, AllocationImportRequest, AllocationInfo,
    AllocationResponse, Capability, CapacityResponse, ChangePasswordRequest,
    CreateAllocationRequest, CreateMemberRequest, CreateOperatorRequest, CreateOperatorResponse,
    CreateSoftBookingRequest, DeleteResponse, ExportAllocationsRequest, GlobalCapabilities,
    ListActivityResponse, ListAllocationsRequest, ListAllocationsResponse, ListMembersRequest,
    ListMembersResponse, ListOperatorsResponse, ListSessionsResponse, ListSoftBookingsRequest,
    ListSoftBookingsResponse, LoginHistoryRequest, LoginHistoryResponse, LoginRequest,
    LoginResponse, MemberImportCommitResponse, MemberImportPreviewResponse, MemberInfo,
    MemberResponse, MemberRowPreview, MemberRowStatus, MemberUtilization, MessageResponse,
    OperatorCapabilities, OperatorInfo, OperatorStatusResponse, OverallocationInfo,
    ReportRequest, SessionInfo, ShowTotal, SoftBookingInfo, SoftBookingResponse, SplitInfo,
    SpreadsheetUpload, UndoResponse, UpdateAllocationRequest, UpdateMemberRequest,
    UtilizationResponse, WhoAmIResponse,
};
pub use spreadsheet::{Columns, SheetRow, SheetTable, SpreadsheetFormat};
