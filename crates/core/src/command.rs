// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crewplan_domain::{Department, DesignationSplit, EmployeeType};
use serde::{Deserialize, Serialize};
use time::Date;

/// Partial update of a roster member. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberChanges {
    /// New employee identifier.
    pub emp_id: Option<String>,
    /// New display name.
    pub name: Option<String>,
    /// New job title.
    pub designation: Option<String>,
    /// New department.
    pub department: Option<Department>,
    /// New shift label.
    pub shift: Option<String>,
    /// New employment classification.
    pub employee_type: Option<EmployeeType>,
    /// New lead. `Some(None)` clears it.
    pub reporting_to: Option<Option<String>>,
}

/// Partial update of an allocation. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationChanges {
    /// New date.
    pub allocation_date: Option<Date>,
    /// New show. `Some(None)` clears it.
    pub show_name: Option<Option<String>>,
    /// New shot. `Some(None)` clears it.
    pub shot_name: Option<Option<String>>,
    /// New man-day value.
    pub man_days: Option<f64>,
    /// New leave flag.
    pub is_leave: Option<bool>,
    /// New idle flag.
    pub is_idle: Option<bool>,
    /// New notes. `Some(None)` clears them.
    pub notes: Option<Option<String>>,
}

/// A command represents operator intent as data only.
///
/// Commands are the only way to request changes to tracked entities.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Add a member to the roster.
    CreateMember {
        /// Employee identifier.
        emp_id: String,
        /// Display name.
        name: String,
        /// Job title.
        designation: String,
        /// Department.
        department: Department,
        /// Shift label.
        shift: String,
        /// Employment classification.
        employee_type: EmployeeType,
        /// Lead's name.
        reporting_to: Option<String>,
    },
    /// Change some fields of a member.
    UpdateMember {
        /// The member to change.
        member_id: i64,
        /// Fields to change.
        changes: MemberChanges,
    },
    /// Take a member out of capacity without deleting history.
    DeactivateMember {
        /// The member.
        member_id: i64,
    },
    /// Return a deactivated member to capacity.
    ReactivateMember {
        /// The member.
        member_id: i64,
    },
    /// Remove a member and every allocation they hold.
    DeleteMember {
        /// The member.
        member_id: i64,
    },
    /// Book a member for one date.
    CreateAllocation {
        /// The member.
        member_id: i64,
        /// The date.
        allocation_date: Date,
        /// Show name.
        show_name: Option<String>,
        /// Shot name.
        shot_name: Option<String>,
        /// Man-days.
        man_days: f64,
        /// Leave flag.
        is_leave: bool,
        /// Idle flag.
        is_idle: bool,
        /// Notes.
        notes: Option<String>,
    },
    /// Change some fields of an allocation.
    UpdateAllocation {
        /// The allocation.
        allocation_id: i64,
        /// Fields to change.
        changes: AllocationChanges,
    },
    /// Remove an allocation.
    DeleteAllocation {
        /// The allocation.
        allocation_id: i64,
    },
    /// Reserve department capacity for a show.
    CreateSoftBooking {
        /// Show name.
        show_name: String,
        /// Requesting manager.
        manager_name: String,
        /// Department reserved.
        department: Department,
        /// Total man-days.
        man_days: f64,
        /// First day.
        start_date: Date,
        /// Last day.
        end_date: Date,
        /// Seniority mix.
        split: Option<DesignationSplit>,
        /// Notes.
        notes: Option<String>,
    },
    /// Remove a soft booking.
    DeleteSoftBooking {
        /// The booking.
        booking_id: i64,
    },
}

impl Command {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateMember { .. } => "CreateMember",
            Self::UpdateMember { .. } => "UpdateMember",
            Self::DeactivateMember { .. } => "DeactivateMember",
            Self::ReactivateMember { .. } => "ReactivateMember",
            Self::DeleteMember { .. } => "DeleteMember",
            Self::CreateAllocation { .. } => "CreateAllocation",
            Self::UpdateAllocation { .. } => "UpdateAllocation",
            Self::DeleteAllocation { .. } => "DeleteAllocation",
            Self::CreateSoftBooking { .. } => "CreateSoftBooking",
            Self::DeleteSoftBooking { .. } => "DeleteSoftBooking",
        }
    }
}
