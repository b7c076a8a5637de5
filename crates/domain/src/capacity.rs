// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::aggregation::{PartitionTotals, overall_totals};
use crate::allocation::Allocation;
use crate::date_range::{DateRange, is_weekend};
use crate::error::DomainError;
use crate::soft_booking::SoftBooking;
use crate::types::Department;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::Date;

/// Utilization at or above this percentage is `Full`.
pub const FULL_THRESHOLD_PERCENT: f64 = 100.0;
/// Utilization at or above this percentage is `OverCapacity`.
pub const OVER_CAPACITY_THRESHOLD_PERCENT: f64 = 90.0;
/// Utilization at or above this percentage is `NearCapacity`.
pub const NEAR_CAPACITY_THRESHOLD_PERCENT: f64 = 60.0;

/// Department load classification derived from utilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapacityStatus {
    /// Below 60%.
    Available,
    /// 60% up to 90%.
    NearCapacity,
    /// 90% up to 100%.
    OverCapacity,
    /// 100% or more.
    Full,
}

impl CapacityStatus {
    /// Classifies a utilization percentage.
    #[must_use]
    pub fn from_utilization(utilization_percent: f64) -> Self {
        if utilization_percent >= FULL_THRESHOLD_PERCENT {
            Self::Full
        } else if utilization_percent >= OVER_CAPACITY_THRESHOLD_PERCENT {
            Self::OverCapacity
        } else if utilization_percent >= NEAR_CAPACITY_THRESHOLD_PERCENT {
            Self::NearCapacity
        } else {
            Self::Available
        }
    }

    /// Converts this status to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::NearCapacity => "NearCapacity",
            Self::OverCapacity => "OverCapacity",
            Self::Full => "Full",
        }
    }
}

impl std::fmt::Display for CapacityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Counts working days in `[start, end]`.
///
/// A day is a working day if it is Monday through Friday, or if it appears in
/// `working_weekends`.
///
/// # Errors
///
/// Returns `DomainError::InvalidDateRange` if `end` is before `start`.
pub fn working_days(
    start: Date,
    end: Date,
    working_weekends: &BTreeSet<Date>,
) -> Result<u32, DomainError> {
    let range: DateRange = DateRange::new(start, end)?;
    Ok(count_working_days(&range, working_weekends))
}

/// Counts working days in an already validated range.
#[must_use]
pub fn count_working_days(range: &DateRange, working_weekends: &BTreeSet<Date>) -> u32 {
    let count: usize = range
        .days()
        .filter(|date| !is_weekend(*date) || working_weekends.contains(date))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Weekend dates on which any of the given allocations is flagged as weekend work.
#[must_use]
pub fn working_weekends_from(allocations: &[Allocation]) -> BTreeSet<Date> {
    allocations
        .iter()
        .filter(|a| a.is_weekend_working && is_weekend(a.allocation_date))
        .map(|a| a.allocation_date)
        .collect()
}

/// Capacity figures for one department over one date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityReport {
    /// Department reported on, or `None` for the whole studio.
    pub department: Option<Department>,
    /// Reporting window.
    pub range: DateRange,
    /// Active members counted.
    pub active_members: u32,
    /// Working days in the window.
    pub working_days: u32,
    /// `active_members × working_days`.
    pub capacity_man_days: f64,
    /// Leave taken in the window.
    pub leave_man_days: f64,
    /// Capacity less leave.
    pub adjusted_capacity_man_days: f64,
    /// Productive man-days allocated.
    pub allocated_man_days: f64,
    /// Unused adjusted capacity, never negative.
    pub available_man_days: f64,
    /// Allocation beyond adjusted capacity, never negative.
    pub overallocated_man_days: f64,
    /// Soft-booked man-days prorated into the window.
    pub soft_booked_man_days: f64,
    /// `allocated / adjusted × 100`, or zero without capacity.
    pub utilization_percent: f64,
    /// Load classification.
    pub status: CapacityStatus,
}

/// Computes a capacity report.
///
/// # Arguments
///
/// * `department` - The department reported on (informational)
/// * `range` - The reporting window
/// * `active_members` - Number of active members in scope
/// * `allocations` - Allocations of the members in scope inside the window
/// * `soft_bookings` - Soft bookings in scope
/// * `working_weekends` - Weekend dates counted as working days
#[must_use]
pub fn calculate_capacity(
    department: Option<Department>,
    range: DateRange,
    active_members: u32,
    allocations: &[Allocation],
    soft_bookings: &[SoftBooking],
    working_weekends: &BTreeSet<Date>,
) -> CapacityReport {
    let in_range: Vec<Allocation> = allocations
        .iter()
        .filter(|a| range.contains(a.allocation_date))
        .cloned()
        .collect();
    let totals: PartitionTotals = overall_totals(&in_range);

    let days: u32 = count_working_days(&range, working_weekends);
    let capacity: f64 = f64::from(active_members) * f64::from(days);
    let adjusted: f64 = capacity - totals.leave_man_days;
    let allocated: f64 = totals.allocated_man_days;

    let utilization_percent: f64 = if adjusted <= 0.0 {
        0.0
    } else {
        allocated / adjusted * 100.0
    };

    let soft_booked: f64 = soft_bookings
        .iter()
        .filter(|b| department.is_none_or(|d| d == b.department))
        .map(|b| b.man_days_within(&range))
        .sum();

    CapacityReport {
        department,
        range,
        active_members,
        working_days: days,
        capacity_man_days: capacity,
        leave_man_days: totals.leave_man_days,
        adjusted_capacity_man_days: adjusted,
        allocated_man_days: allocated,
        available_man_days: (adjusted - allocated).max(0.0),
        overallocated_man_days: (allocated - adjusted).max(0.0),
        soft_booked_man_days: soft_booked,
        utilization_percent,
        status: CapacityStatus::from_utilization(utilization_percent),
    }
}

/// Converts a member count to the `u32` used in capacity arithmetic.
#[must_use]
pub fn member_count(count: usize) -> u32 {
    count.to_u32().unwrap_or(u32::MAX)
}
