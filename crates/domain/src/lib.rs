// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod aggregation;
mod allocation;
mod capacity;
mod date_range;
mod error;
mod soft_booking;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use aggregation::{
    DailyOverallocation, MAN_DAY_EPSILON, PartitionTotals, aggregate_by, daily_overallocations,
    overall_totals, show_totals, totals_by_department_and_date, totals_by_member,
    totals_by_member_and_shot,
};
pub use allocation::{Allocation, FULL_DAY_MAN_DAYS, parse_man_days, validate_man_days};
pub use capacity::{
    CapacityReport, CapacityStatus, FULL_THRESHOLD_PERCENT, NEAR_CAPACITY_THRESHOLD_PERCENT,
    OVER_CAPACITY_THRESHOLD_PERCENT, calculate_capacity, count_working_days, member_count,
    working_days, working_weekends_from,
};
pub use date_range::{DateRange, ISO_DATE_FORMAT, format_iso_date, is_weekend, parse_iso_date};
pub use error::DomainError;
pub use soft_booking::{DesignationSplit, SoftBooking};
pub use types::{DEFAULT_SHOW_NAME, Department, EmpId, EmployeeType, ResourceMember, is_real_show};
pub use validation::{validate_emp_id_unique, validate_member_fields};
