// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{ParsedRow, Roster};
use crewplan_audit::Actor;
use crewplan_domain::{Allocation, Department, EmpId, EmployeeType, ResourceMember};
use time::Date;

pub fn create_test_actor() -> Actor {
    Actor::operator(1, String::from("admin"))
}

pub fn create_test_member(member_id: i64, emp_id: &str) -> ResourceMember {
    ResourceMember::new(
        EmpId::new(emp_id),
        format!("Artist {emp_id}"),
        String::from("Compositor"),
        Department::Comp,
        String::from("Day"),
        EmployeeType::FullTime,
        None,
    )
    .with_id(member_id)
}

pub fn create_test_allocation(
    allocation_id: i64,
    member_id: i64,
    date: Date,
    show: &str,
    man_days: f64,
) -> Allocation {
    Allocation::new(member_id, date, Some(String::from(show)), None, man_days)
        .unwrap()
        .with_id(allocation_id)
}

pub fn create_test_roster() -> Roster {
    Roster::new(
        vec![create_test_member(1, "E001"), create_test_member(2, "E002")],
        Vec::new(),
        Vec::new(),
    )
}

pub fn parsed_row(
    row_number: usize,
    action: &str,
    emp_id: &str,
    show: &str,
    start: &str,
    end: &str,
    total_md: &str,
) -> ParsedRow {
    ParsedRow {
        row_number,
        action: String::from(action),
        emp_id: String::from(emp_id),
        show_name: String::from(show),
        shot_name: String::new(),
        start_date: String::from(start),
        end_date: String::from(end),
        total_md: String::from(total_md),
        notes: String::new(),
    }
}

pub fn approx_eq(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-9
}
