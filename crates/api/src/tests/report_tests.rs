// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crewplan_domain::{
    Allocation, CapacityReport, CapacityStatus, DateRange, Department, EmpId, EmployeeType,
    ResourceMember,
};
use time::Date;
use time::macros::date;

use super::helpers::{add_allocation, add_member, approx_eq, setup};
use crate::reports;
use crate::{
    ApiError, CapacityResponse, MemberUtilization, ReportRequest, UtilizationResponse,
    capacity_report, deactivate_member, utilization_report,
};

// 2026-03-02 is a Monday.
fn first_week() -> DateRange {
    DateRange::new(date!(2026 - 03 - 02), date!(2026 - 03 - 08)).unwrap()
}

fn member(member_id: i64, emp_id: &str, department: Department) -> ResourceMember {
    ResourceMember::new(
        EmpId::new(emp_id),
        format!("Artist {emp_id}"),
        String::from("Artist"),
        department,
        String::from("Day"),
        EmployeeType::FullTime,
        None,
    )
    .with_id(member_id)
}

fn work(member_id: i64, day: Date, show: &str, man_days: f64) -> Allocation {
    Allocation::new(member_id, day, Some(String::from(show)), None, man_days).unwrap()
}

fn week_of_work(member_id: i64, show: &str) -> Vec<Allocation> {
    (2..=6)
        .map(|d| {
            let day: Date = Date::from_calendar_date(2026, time::Month::March, d).unwrap();
            work(member_id, day, show, 1.0)
        })
        .collect()
}

fn week_request(department: Option<&str>) -> ReportRequest {
    ReportRequest {
        start_date: String::from("2026-03-02"),
        end_date: String::from("2026-03-08"),
        department: department.map(String::from),
    }
}

fn report_for(response: &CapacityResponse, department: Department) -> &CapacityReport {
    response
        .departments
        .iter()
        .find(|r| r.department == Some(department))
        .expect("department reported")
}

// ============================================================================
// Capacity
// ============================================================================

#[test]
fn test_capacity_subtracts_leave_from_active_members() {
    let members: Vec<ResourceMember> = vec![
        member(1, "E001", Department::Comp),
        member(2, "E002", Department::Comp),
    ];
    let mut allocations: Vec<Allocation> = week_of_work(1, "Show A");
    allocations.push(work(2, date!(2026 - 03 - 02), "Leave", 1.0).as_leave());

    let response: CapacityResponse = reports::capacity_report(
        first_week(),
        &[Department::Comp],
        &members,
        &allocations,
        &[],
    );

    let comp: &CapacityReport = report_for(&response, Department::Comp);
    assert_eq!(comp.active_members, 2);
    assert_eq!(comp.working_days, 5);
    assert!(approx_eq(comp.capacity_man_days, 10.0));
    assert!(approx_eq(comp.leave_man_days, 1.0));
    assert!(approx_eq(comp.adjusted_capacity_man_days, 9.0));
    assert!(approx_eq(comp.allocated_man_days, 5.0));
    assert!(approx_eq(comp.available_man_days, 4.0));
    assert_eq!(comp.status, CapacityStatus::Available);
}

#[test]
fn test_capacity_ignores_inactive_members_and_their_work() {
    let mut retired: ResourceMember = member(2, "E002", Department::Comp);
    retired.is_active = false;
    let members: Vec<ResourceMember> = vec![member(1, "E001", Department::Comp), retired];
    let mut allocations: Vec<Allocation> = week_of_work(1, "Show A");
    allocations.extend(week_of_work(2, "Show A"));

    let response: CapacityResponse = reports::capacity_report(
        first_week(),
        &[Department::Comp],
        &members,
        &allocations,
        &[],
    );

    let comp: &CapacityReport = report_for(&response, Department::Comp);
    assert_eq!(comp.active_members, 1);
    assert!(approx_eq(comp.allocated_man_days, 5.0));
    assert!(approx_eq(comp.utilization_percent, 100.0));
    assert_eq!(comp.status, CapacityStatus::Full);
}

#[test]
fn test_weekend_work_adds_a_working_day() {
    let members: Vec<ResourceMember> = vec![member(1, "E001", Department::Roto)];
    let mut allocations: Vec<Allocation> = week_of_work(1, "Show A");
    allocations.push(work(1, date!(2026 - 03 - 07), "Show A", 1.0).as_weekend_working(true));

    let response: CapacityResponse = reports::capacity_report(
        first_week(),
        &[Department::Roto],
        &members,
        &allocations,
        &[],
    );

    let roto: &CapacityReport = report_for(&response, Department::Roto);
    assert_eq!(roto.working_days, 6);
    assert!(approx_eq(roto.capacity_man_days, 6.0));
    assert!(approx_eq(roto.allocated_man_days, 6.0));
}

#[test]
fn test_capacity_reports_each_department_and_a_total() {
    let members: Vec<ResourceMember> = vec![
        member(1, "E001", Department::Comp),
        member(2, "E002", Department::Roto),
    ];
    let mut allocations: Vec<Allocation> = week_of_work(1, "Show A");
    allocations.push(work(2, date!(2026 - 03 - 03), "Show B", 0.5));

    let response: CapacityResponse = reports::capacity_report(
        first_week(),
        &Department::ALL,
        &members,
        &allocations,
        &[],
    );

    assert_eq!(response.departments.len(), Department::ALL.len());
    assert!(approx_eq(report_for(&response, Department::Roto).allocated_man_days, 0.5));
    assert_eq!(response.total.department, None);
    assert_eq!(response.total.active_members, 2);
    assert!(approx_eq(response.total.capacity_man_days, 10.0));
    assert!(approx_eq(response.total.allocated_man_days, 5.5));
}

#[test]
fn test_capacity_handler_filters_by_department() {
    let (mut persistence, admin) = setup();
    let comp: i64 = add_member(&mut persistence, &admin, "E001", "Comp");
    let roto: i64 = add_member(&mut persistence, &admin, "E002", "Roto");
    add_allocation(&mut persistence, &admin, comp, "2026-03-02", "Show A", 1.0);
    add_allocation(&mut persistence, &admin, roto, "2026-03-02", "Show A", 1.0);

    let response: CapacityResponse =
        capacity_report(&mut persistence, &week_request(Some("comp"))).unwrap();

    assert_eq!(response.departments.len(), 1);
    assert_eq!(response.departments[0].department, Some(Department::Comp));
    assert_eq!(response.total.active_members, 1);
    assert!(approx_eq(response.total.allocated_man_days, 1.0));
}

#[test]
fn test_capacity_handler_counts_only_active_members() {
    let (mut persistence, admin) = setup();
    add_member(&mut persistence, &admin, "E001", "Comp");
    let leaving: i64 = add_member(&mut persistence, &admin, "E002", "Comp");
    deactivate_member(&mut persistence, &admin, leaving).unwrap();

    let response: CapacityResponse =
        capacity_report(&mut persistence, &week_request(None)).unwrap();

    assert_eq!(response.total.active_members, 1);
    assert!(approx_eq(response.total.capacity_man_days, 5.0));
}

#[test]
fn test_report_rejects_reversed_range() {
    let (mut persistence, _admin) = setup();
    let request: ReportRequest = ReportRequest {
        start_date: String::from("2026-03-08"),
        end_date: String::from("2026-03-02"),
        department: None,
    };

    assert!(capacity_report(&mut persistence, &request).is_err());
    assert!(utilization_report(&mut persistence, &request).is_err());
}

#[test]
fn test_report_rejects_unknown_department() {
    let (mut persistence, _admin) = setup();

    let result = capacity_report(&mut persistence, &week_request(Some("Catering")));

    assert!(matches!(result, Err(ApiError::InvalidInput { field, .. }) if field == "department"));
}

// ============================================================================
// Utilization
// ============================================================================

#[test]
fn test_utilization_discounts_leave_from_available_days() {
    let members: Vec<ResourceMember> = vec![member(1, "E001", Department::Comp)];
    let allocations: Vec<Allocation> = vec![
        work(1, date!(2026 - 03 - 02), "Show A", 1.0),
        work(1, date!(2026 - 03 - 03), "Show A", 1.0),
        work(1, date!(2026 - 03 - 04), "Show B", 1.0),
        work(1, date!(2026 - 03 - 05), "Leave", 1.0).as_leave(),
    ];

    let response: UtilizationResponse =
        reports::utilization_report(first_week(), &members, &allocations);

    let row: &MemberUtilization = &response.members[0];
    assert_eq!(row.working_days, 5);
    assert!(approx_eq(row.allocated_man_days, 3.0));
    assert!(approx_eq(row.leave_man_days, 1.0));
    assert!(approx_eq(row.utilization_percent, 75.0));
    assert_eq!(row.show_count, 2);
    assert_eq!(response.start_date, "2026-03-02");
    assert_eq!(response.end_date, "2026-03-08");
}

#[test]
fn test_utilization_lists_idle_members_and_sorts_by_emp_id() {
    let members: Vec<ResourceMember> = vec![
        member(1, "E010", Department::Comp),
        member(2, "e002", Department::Comp),
    ];
    let allocations: Vec<Allocation> = week_of_work(1, "Show A");

    let response: UtilizationResponse =
        reports::utilization_report(first_week(), &members, &allocations);

    assert_eq!(response.members.len(), 2);
    assert_eq!(response.members[0].emp_id, "e002");
    assert!(approx_eq(response.members[0].utilization_percent, 0.0));
    assert!(approx_eq(response.members[1].utilization_percent, 100.0));
}

#[test]
fn test_utilization_flags_overallocated_days() {
    let members: Vec<ResourceMember> = vec![member(1, "E001", Department::Comp)];
    let allocations: Vec<Allocation> = vec![
        work(1, date!(2026 - 03 - 02), "Show A", 1.0),
        work(1, date!(2026 - 03 - 02), "Show B", 0.5),
        work(1, date!(2026 - 03 - 03), "Show A", 1.0),
    ];

    let response: UtilizationResponse =
        reports::utilization_report(first_week(), &members, &allocations);

    assert_eq!(response.overallocations.len(), 1);
    assert_eq!(response.overallocations[0].emp_id, "E001");
    assert_eq!(response.overallocations[0].date, "2026-03-02");
    assert!(approx_eq(response.overallocations[0].excess_man_days, 0.5));
}

#[test]
fn test_utilization_totals_productive_work_per_show() {
    let members: Vec<ResourceMember> = vec![
        member(1, "E001", Department::Comp),
        member(2, "E002", Department::Roto),
    ];
    let allocations: Vec<Allocation> = vec![
        work(1, date!(2026 - 03 - 02), "Show A", 1.0),
        work(2, date!(2026 - 03 - 02), "Show A", 0.5),
        work(2, date!(2026 - 03 - 03), "Show B", 1.0),
        work(2, date!(2026 - 03 - 04), "Show B", 1.0).as_idle(),
    ];

    let response: UtilizationResponse =
        reports::utilization_report(first_week(), &members, &allocations);

    assert_eq!(response.shows.len(), 2);
    assert_eq!(response.shows[0].show_name, "Show A");
    assert!(approx_eq(response.shows[0].man_days, 1.5));
    assert!(approx_eq(response.shows[1].man_days, 1.0));
    assert!(approx_eq(response.totals.idle_man_days, 1.0));
}

#[test]
fn test_utilization_handler_includes_inactive_members() {
    let (mut persistence, admin) = setup();
    let leaving: i64 = add_member(&mut persistence, &admin, "E001", "Comp");
    add_allocation(&mut persistence, &admin, leaving, "2026-03-02", "Show A", 1.0);
    deactivate_member(&mut persistence, &admin, leaving).unwrap();

    let response: UtilizationResponse =
        utilization_report(&mut persistence, &week_request(None)).unwrap();

    assert_eq!(response.members.len(), 1);
    assert!(!response.members[0].is_active);
    assert!(approx_eq(response.members[0].allocated_man_days, 1.0));
}
