// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Dates cross the boundary as `YYYY-MM-DD` strings and departments as their
//! names (any case). Both are parsed by the handlers so a bad value becomes a
//! field-level `InvalidInput` instead of a generic body rejection.

use crewplan::ImportPreview;
use crewplan_domain::{
    Allocation, CapacityReport, PartitionTotals, ResourceMember, SoftBooking, format_iso_date,
};
use crewplan_persistence::{
    ImportCommitResult, LoginHistoryData, OperatorData, SessionData, SkippedMember,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Authentication
// ============================================================================

/// API request to log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// The operator login name.
    pub login_name: String,
    /// The operator password.
    pub password: String,
}

/// API response for successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The session token (opaque).
    pub session_token: String,
    /// The operator's login name.
    pub login_name: String,
    /// The operator's display name.
    pub display_name: String,
    /// The operator's role.
    pub role: String,
    /// Session expiration timestamp (RFC 3339).
    pub expires_at: String,
}

/// API response for the "who am I" endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    pub operator_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub role: String,
    pub is_disabled: bool,
    /// What this operator may do.
    pub capabilities: GlobalCapabilities,
}

/// API request to change the caller's own password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirmation: String,
}

/// Generic acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Capabilities
// ============================================================================

/// Represents whether a specific action is permitted.
///
/// Serializes to JSON as true/false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The action is permitted.
    Allowed,
    /// The action is not permitted.
    Denied,
}

impl Capability {
    /// Returns true if the capability is allowed.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Creates a capability from a boolean value.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::Allowed } else { Self::Denied }
    }
}

impl Serialize for Capability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bool(self.is_allowed())
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value: bool = bool::deserialize(deserializer)?;
        Ok(Self::from_bool(value))
    }
}

/// Operator-level permissions, advisory for UI gating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalCapabilities {
    pub can_edit_roster: Capability,
    pub can_import: Capability,
    pub can_undo: Capability,
    pub can_export: Capability,
    pub can_manage_operators: Capability,
}

/// Permissions the caller holds over one operator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorCapabilities {
    pub can_disable: Capability,
    pub can_delete: Capability,
}

// ============================================================================
// Operators and sessions
// ============================================================================

/// API request to create a new operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOperatorRequest {
    pub login_name: String,
    pub display_name: String,
    pub password: String,
    pub password_confirmation: String,
    /// `Admin`, `Manager` or `Viewer`.
    pub role: String,
}

/// API response for a created operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOperatorResponse {
    pub operator_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub role: String,
}

/// One operator in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorInfo {
    pub operator_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub role: String,
    pub is_disabled: bool,
    pub created_at: String,
    pub last_login_at: Option<String>,
    pub capabilities: OperatorCapabilities,
}

/// API response listing operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOperatorsResponse {
    pub operators: Vec<OperatorInfo>,
}

/// API response after disabling, enabling or deleting an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorStatusResponse {
    pub operator_id: i64,
    pub is_disabled: bool,
    pub message: String,
}

/// One live session, without its token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: i64,
    pub operator_id: i64,
    pub login_name: Option<String>,
    pub created_at: String,
    pub last_activity_at: String,
    pub expires_at: String,
}

impl SessionInfo {
    /// Builds the listing entry, naming the operator if it is known.
    #[must_use]
    pub fn from_session(session: SessionData, operators: &[OperatorData]) -> Self {
        let login_name: Option<String> = operators
            .iter()
            .find(|op| op.operator_id == session.operator_id)
            .map(|op| op.login_name.clone());
        Self {
            session_id: session.session_id,
            operator_id: session.operator_id,
            login_name,
            created_at: session.created_at,
            last_activity_at: session.last_activity_at,
            expires_at: session.expires_at,
        }
    }
}

/// API response listing sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSessionsResponse {
    pub sessions: Vec<SessionInfo>,
}

/// API request for the login history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginHistoryRequest {
    pub limit: Option<i64>,
}

/// API response with login attempts, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginHistoryResponse {
    pub entries: Vec<LoginHistoryData>,
}

// ============================================================================
// Members
// ============================================================================

/// A roster member as exposed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub member_id: i64,
    pub emp_id: String,
    pub name: String,
    pub designation: String,
    pub department: String,
    pub shift: String,
    pub employee_type: String,
    pub reporting_to: Option<String>,
    pub is_active: bool,
}

impl MemberInfo {
    /// Converts a persisted member.
    #[must_use]
    pub fn from_member(member: &ResourceMember) -> Self {
        Self {
            member_id: member.member_id.unwrap_or_default(),
            emp_id: member.emp_id.value().to_string(),
            name: member.name.clone(),
            designation: member.designation.clone(),
            department: member.department.as_str().to_string(),
            shift: member.shift.clone(),
            employee_type: member.employee_type.as_str().to_string(),
            reporting_to: member.reporting_to.clone(),
            is_active: member.is_active,
        }
    }
}

/// API request to list members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMembersRequest {
    #[serde(default)]
    pub include_inactive: bool,
    pub department: Option<String>,
}

/// API response listing members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMembersResponse {
    pub members: Vec<MemberInfo>,
}

/// API request to add a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMemberRequest {
    pub emp_id: String,
    pub name: String,
    pub designation: String,
    pub department: String,
    pub shift: String,
    /// Defaults to `FullTime`.
    pub employee_type: Option<String>,
    pub reporting_to: Option<String>,
}

/// API request to change some member fields.
///
/// Absent fields are left alone. An empty `reporting_to` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateMemberRequest {
    pub emp_id: Option<String>,
    pub name: Option<String>,
    pub designation: Option<String>,
    pub department: Option<String>,
    pub shift: Option<String>,
    pub employee_type: Option<String>,
    pub reporting_to: Option<String>,
}

/// API response carrying a member after a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberResponse {
    pub member: MemberInfo,
    pub activity_ids: Vec<i64>,
    pub message: String,
}

/// API response for a deleted entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub entity_id: i64,
    pub activity_ids: Vec<i64>,
    pub message: String,
}

/// An uploaded spreadsheet: either a base64 file or pasted CSV text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadsheetUpload {
    /// Original file name; its extension picks the reader.
    pub file_name: String,
    /// File bytes, base64 encoded.
    pub content_base64: Option<String>,
    /// CSV text, used when no file bytes are sent.
    pub csv_text: Option<String>,
}

/// Outcome of checking one member spreadsheet row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberRowStatus {
    Valid,
    Invalid,
}

/// One previewed member spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRowPreview {
    /// 1-based position among data rows.
    pub row_number: usize,
    pub emp_id: String,
    pub name: String,
    pub department: String,
    pub status: MemberRowStatus,
    pub errors: Vec<String>,
}

/// API response for a member spreadsheet preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberImportPreviewResponse {
    pub rows: Vec<MemberRowPreview>,
    pub valid_count: usize,
    pub invalid_count: usize,
}

/// API response for a member spreadsheet commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberImportCommitResponse {
    pub created: Vec<MemberInfo>,
    /// Valid rows the store refused at commit time.
    pub skipped: Vec<SkippedMember>,
    /// Rows that failed validation and were not attempted.
    pub invalid_rows: Vec<MemberRowPreview>,
    pub message: String,
}

// ============================================================================
// Allocations
// ============================================================================

/// A daily allocation as exposed by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationInfo {
    pub allocation_id: i64,
    pub member_id: i64,
    pub allocation_date: String,
    pub show_name: Option<String>,
    pub shot_name: Option<String>,
    pub man_days: f64,
    pub is_leave: bool,
    pub is_idle: bool,
    pub is_weekend_working: bool,
    pub notes: Option<String>,
}

impl AllocationInfo {
    /// Converts a persisted allocation.
    #[must_use]
    pub fn from_allocation(allocation: &Allocation) -> Self {
        Self {
            allocation_id: allocation.allocation_id.unwrap_or_default(),
            member_id: allocation.member_id,
            allocation_date: format_iso_date(allocation.allocation_date),
            show_name: allocation.show_name.clone(),
            shot_name: allocation.shot_name.clone(),
            man_days: allocation.man_days,
            is_leave: allocation.is_leave,
            is_idle: allocation.is_idle,
            is_weekend_working: allocation.is_weekend_working,
            notes: allocation.notes.clone(),
        }
    }
}

/// API request to list allocations. Every filter is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAllocationsRequest {
    pub member_id: Option<i64>,
    pub department: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub show_name: Option<String>,
}

/// API response listing allocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListAllocationsResponse {
    pub allocations: Vec<AllocationInfo>,
    pub total_man_days: f64,
}

/// API request to book a member for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAllocationRequest {
    pub member_id: i64,
    pub allocation_date: String,
    pub show_name: Option<String>,
    pub shot_name: Option<String>,
    pub man_days: f64,
    #[serde(default)]
    pub is_leave: bool,
    #[serde(default)]
    pub is_idle: bool,
    pub notes: Option<String>,
}

/// API request to change some allocation fields.
///
/// Absent fields are left alone. Empty text clears `show_name`,
/// `shot_name` or `notes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateAllocationRequest {
    pub allocation_date: Option<String>,
    pub show_name: Option<String>,
    pub shot_name: Option<String>,
    pub man_days: Option<f64>,
    pub is_leave: Option<bool>,
    pub is_idle: Option<bool>,
    pub notes: Option<String>,
}

/// API response carrying an allocation after a change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResponse {
    pub allocation: AllocationInfo,
    pub activity_ids: Vec<i64>,
    pub message: String,
}

/// API request to preview or commit an allocation spreadsheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationImportRequest {
    #[serde(flatten)]
    pub upload: SpreadsheetUpload,
    /// `replace`, `add` or `skip`. Required to commit.
    pub strategy: Option<String>,
}

/// API response for an allocation spreadsheet preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationImportPreviewResponse {
    #[serde(flatten)]
    pub preview: ImportPreview,
    /// Rows that some strategy would write.
    pub committable_rows: usize,
    /// First and last date touched by committable rows.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// API response for an allocation spreadsheet commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationImportCommitResponse {
    #[serde(flatten)]
    pub result: ImportCommitResult,
    pub message: String,
}

/// API request to export allocations as CSV.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportAllocationsRequest {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub department: Option<String>,
    pub member_id: Option<i64>,
    pub show_name: Option<String>,
}

// ============================================================================
// Soft bookings
// ============================================================================

/// Seniority mix in whole percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitInfo {
    pub senior: u8,
    pub mid: u8,
    pub junior: u8,
}

/// A soft booking as exposed by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftBookingInfo {
    pub booking_id: i64,
    pub show_name: String,
    pub manager_name: String,
    pub department: String,
    pub man_days: f64,
    pub start_date: String,
    pub end_date: String,
    pub split: Option<SplitInfo>,
    pub notes: Option<String>,
}

impl SoftBookingInfo {
    /// Converts a persisted soft booking.
    #[must_use]
    pub fn from_booking(booking: &SoftBooking) -> Self {
        Self {
            booking_id: booking.booking_id.unwrap_or_default(),
            show_name: booking.show_name.clone(),
            manager_name: booking.manager_name.clone(),
            department: booking.department.as_str().to_string(),
            man_days: booking.man_days,
            start_date: format_iso_date(booking.range.start()),
            end_date: format_iso_date(booking.range.end()),
            split: booking.split.map(|split| SplitInfo {
                senior: split.senior(),
                mid: split.mid(),
                junior: split.junior(),
            }),
            notes: booking.notes.clone(),
        }
    }
}

/// API request to list soft bookings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSoftBookingsRequest {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub department: Option<String>,
}

/// API response listing soft bookings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSoftBookingsResponse {
    pub soft_bookings: Vec<SoftBookingInfo>,
}

/// API request to create a soft booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSoftBookingRequest {
    pub show_name: String,
    pub manager_name: String,
    pub department: String,
    pub man_days: f64,
    pub start_date: String,
    pub end_date: String,
    pub split: Option<SplitInfo>,
    pub notes: Option<String>,
}

/// API response for a created soft booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftBookingResponse {
    pub soft_booking: SoftBookingInfo,
    pub activity_ids: Vec<i64>,
    pub message: String,
}

// ============================================================================
// Reports
// ============================================================================

/// API request for a report over a date range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub start_date: String,
    pub end_date: String,
    pub department: Option<String>,
}

/// API response for the capacity report.
///
/// With a department filter, `departments` holds that department only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityResponse {
    pub departments: Vec<CapacityReport>,
    /// All departments in scope together.
    pub total: CapacityReport,
}

/// One member's figures in the utilization report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberUtilization {
    pub member_id: i64,
    pub emp_id: String,
    pub name: String,
    pub department: String,
    pub is_active: bool,
    pub allocated_man_days: f64,
    pub leave_man_days: f64,
    pub idle_man_days: f64,
    pub working_days: u32,
    /// Allocated over working days less leave, as a percentage.
    pub utilization_percent: f64,
    pub show_count: usize,
    pub shot_count: usize,
}

/// A member-day above one productive man-day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallocationInfo {
    pub member_id: i64,
    pub emp_id: String,
    pub date: String,
    pub total_man_days: f64,
    pub excess_man_days: f64,
}

/// Productive man-days on one show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowTotal {
    pub show_name: String,
    pub man_days: f64,
}

/// API response for the utilization report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilizationResponse {
    pub start_date: String,
    pub end_date: String,
    /// Totals over every member in scope.
    pub totals: PartitionTotals,
    pub members: Vec<MemberUtilization>,
    pub overallocations: Vec<OverallocationInfo>,
    pub shows: Vec<ShowTotal>,
}

// ============================================================================
// Activity log
// ============================================================================

/// API request to list or export activity. Every filter is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRequest {
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub action_type: Option<String>,
    pub operator_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_reversed: Option<bool>,
    pub limit: Option<i64>,
}

/// One activity log row as exposed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityInfo {
    pub log_id: i64,
    pub entity_type: String,
    pub entity_id: i64,
    pub action_type: String,
    pub field_name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub operator_id: Option<i64>,
    pub login_name: String,
    pub created_at: String,
    pub is_reversed: bool,
}

/// API response listing activity, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListActivityResponse {
    pub entries: Vec<ActivityInfo>,
}

/// API response after undoing an activity row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoResponse {
    pub entry: ActivityInfo,
    pub message: String,
}
