// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::Date;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Employee identifier is empty or invalid.
    InvalidEmpId(String),
    /// Member name is empty or invalid.
    InvalidName(String),
    /// Designation is empty or invalid.
    InvalidDesignation(String),
    /// Department is not one of the known departments.
    InvalidDepartment(String),
    /// Employee type is not one of the known employee types.
    InvalidEmployeeType(String),
    /// Shift is empty or invalid.
    InvalidShift(String),
    /// Show name is empty or invalid where one is required.
    InvalidShowName(String),
    /// Manager name is empty or invalid.
    InvalidManagerName(String),
    /// Man-day value is negative, not finite, or unparseable.
    InvalidManDays(String),
    /// An employee identifier is already used by another member.
    DuplicateEmpId {
        /// The duplicate employee identifier.
        emp_id: String,
    },
    /// The referenced member does not exist.
    MemberNotFound {
        /// The member identifier.
        member_id: i64,
    },
    /// No member carries the given employee identifier.
    EmpIdNotFound {
        /// The employee identifier.
        emp_id: String,
    },
    /// The referenced allocation does not exist.
    AllocationNotFound {
        /// The allocation identifier.
        allocation_id: i64,
    },
    /// The referenced soft booking does not exist.
    SoftBookingNotFound {
        /// The soft booking identifier.
        booking_id: i64,
    },
    /// A date range ends before it starts.
    InvalidDateRange {
        /// The first day of the range.
        start: Date,
        /// The last day of the range.
        end: Date,
    },
    /// Failed to parse a date from a string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Date arithmetic overflowed.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
    /// Designation split percentages do not sum to 100.
    InvalidDesignationSplit {
        /// Senior percentage.
        senior: u8,
        /// Mid-level percentage.
        mid: u8,
        /// Junior percentage.
        junior: u8,
    },
    /// Leave and idle are both set on a row that also carries show work.
    ConflictingAllocationFlags(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmpId(msg) => write!(f, "Invalid employee ID: {msg}"),
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidDesignation(msg) => write!(f, "Invalid designation: {msg}"),
            Self::InvalidDepartment(msg) => write!(f, "Invalid department: {msg}"),
            Self::InvalidEmployeeType(msg) => write!(f, "Invalid employee type: {msg}"),
            Self::InvalidShift(msg) => write!(f, "Invalid shift: {msg}"),
            Self::InvalidShowName(msg) => write!(f, "Invalid show name: {msg}"),
            Self::InvalidManagerName(msg) => write!(f, "Invalid manager name: {msg}"),
            Self::InvalidManDays(msg) => write!(f, "Invalid man-days: {msg}"),
            Self::DuplicateEmpId { emp_id } => {
                write!(f, "A member with employee ID '{emp_id}' already exists")
            }
            Self::MemberNotFound { member_id } => {
                write!(f, "Member {member_id} not found")
            }
            Self::EmpIdNotFound { emp_id } => {
                write!(f, "No member with employee ID '{emp_id}'")
            }
            Self::AllocationNotFound { allocation_id } => {
                write!(f, "Allocation {allocation_id} not found")
            }
            Self::SoftBookingNotFound { booking_id } => {
                write!(f, "Soft booking {booking_id} not found")
            }
            Self::InvalidDateRange { start, end } => {
                write!(f, "End date {end} is before start date {start}")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
            Self::InvalidDesignationSplit {
                senior,
                mid,
                junior,
            } => {
                let total: u16 = u16::from(*senior) + u16::from(*mid) + u16::from(*junior);
                write!(
                    f,
                    "Designation split SR={senior}% MID={mid}% JR={junior}% sums to {total}%, expected 100%"
                )
            }
            Self::ConflictingAllocationFlags(msg) => {
                write!(f, "Conflicting allocation flags: {msg}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
