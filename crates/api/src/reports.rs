// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capacity and utilization reports over loaded roster data.
//!
//! Both reports work on values the handler has already read, so they can be
//! checked without a database.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crewplan_domain::{
    Allocation, CapacityReport, DateRange, Department, PartitionTotals, ResourceMember,
    SoftBooking, calculate_capacity, count_working_days, daily_overallocations, format_iso_date,
    member_count, overall_totals, show_totals, totals_by_member, working_weekends_from,
};

use crate::request_response::{
    CapacityResponse, MemberUtilization, OverallocationInfo, ShowTotal, UtilizationResponse,
};

/// Builds the capacity report for `departments` over `range`.
///
/// Only active members count toward capacity, and only their allocations
/// count toward allocated and leave man-days. A weekend date is a working
/// day for a department when any of its allocations that day is flagged
/// as weekend work.
#[must_use]
pub fn capacity_report(
    range: DateRange,
    departments: &[Department],
    members: &[ResourceMember],
    allocations: &[Allocation],
    soft_bookings: &[SoftBooking],
) -> CapacityResponse {
    let active_departments: HashMap<i64, Department> = members
        .iter()
        .filter(|m| m.is_active)
        .filter_map(|m| m.member_id.map(|id| (id, m.department)))
        .collect();

    let in_scope = |department: Option<Department>| -> CapacityReport {
        let scoped: Vec<Allocation> = allocations
            .iter()
            .filter(|a| {
                active_departments.get(&a.member_id).is_some_and(|d| {
                    department.map_or_else(|| departments.contains(d), |wanted| *d == wanted)
                })
            })
            .cloned()
            .collect();
        let bookings: Vec<SoftBooking> = soft_bookings
            .iter()
            .filter(|b| departments.contains(&b.department))
            .cloned()
            .collect();
        let active: usize = active_departments
            .values()
            .filter(|d| department.map_or_else(|| departments.contains(d), |wanted| **d == wanted))
            .count();
        calculate_capacity(
            department,
            range,
            member_count(active),
            &scoped,
            &bookings,
            &working_weekends_from(&scoped),
        )
    };

    CapacityResponse {
        departments: departments.iter().map(|d| in_scope(Some(*d))).collect(),
        total: in_scope(None),
    }
}

/// Builds the utilization report over `range`.
///
/// Every member in `members` gets a row, even with nothing booked.
/// Overallocated days and show totals cover the given allocations.
#[must_use]
pub fn utilization_report(
    range: DateRange,
    members: &[ResourceMember],
    allocations: &[Allocation],
) -> UtilizationResponse {
    let member_ids: BTreeSet<i64> = members.iter().filter_map(|m| m.member_id).collect();
    let scoped: Vec<Allocation> = allocations
        .iter()
        .filter(|a| member_ids.contains(&a.member_id) && range.contains(a.allocation_date))
        .cloned()
        .collect();

    let per_member: BTreeMap<i64, PartitionTotals> = totals_by_member(&scoped);
    let emp_ids: HashMap<i64, String> = members
        .iter()
        .filter_map(|m| m.member_id.map(|id| (id, m.emp_id.value().to_string())))
        .collect();

    let mut rows: Vec<MemberUtilization> = members
        .iter()
        .filter_map(|member| {
            let member_id: i64 = member.member_id?;
            let totals: PartitionTotals = per_member.get(&member_id).cloned().unwrap_or_default();
            let own: Vec<Allocation> = scoped
                .iter()
                .filter(|a| a.member_id == member_id)
                .cloned()
                .collect();
            let working_days: u32 = count_working_days(&range, &working_weekends_from(&own));
            let available: f64 = f64::from(working_days) - totals.leave_man_days;
            let utilization_percent: f64 = if available <= 0.0 {
                0.0
            } else {
                totals.allocated_man_days / available * 100.0
            };
            Some(MemberUtilization {
                member_id,
                emp_id: member.emp_id.value().to_string(),
                name: member.name.clone(),
                department: member.department.as_str().to_string(),
                is_active: member.is_active,
                allocated_man_days: totals.allocated_man_days,
                leave_man_days: totals.leave_man_days,
                idle_man_days: totals.idle_man_days,
                working_days,
                utilization_percent,
                show_count: totals.show_count(),
                shot_count: totals.shot_count(),
            })
        })
        .collect();
    rows.sort_by(|a, b| a.emp_id.to_ascii_lowercase().cmp(&b.emp_id.to_ascii_lowercase()));

    let overallocations: Vec<OverallocationInfo> = daily_overallocations(&scoped)
        .into_iter()
        .map(|day| OverallocationInfo {
            member_id: day.member_id,
            emp_id: emp_ids.get(&day.member_id).cloned().unwrap_or_default(),
            date: format_iso_date(day.date),
            total_man_days: day.total_man_days,
            excess_man_days: day.excess_man_days,
        })
        .collect();

    let shows: Vec<ShowTotal> = show_totals(&scoped)
        .into_iter()
        .map(|(show_name, man_days)| ShowTotal {
            show_name,
            man_days,
        })
        .collect();

    UtilizationResponse {
        start_date: format_iso_date(range.start()),
        end_date: format_iso_date(range.end()),
        totals: overall_totals(&scoped),
        members: rows,
        overallocations,
        shows,
    }
}
