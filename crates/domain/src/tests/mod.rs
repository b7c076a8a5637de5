// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used, clippy::expect_used)]


use crate::{Allocation, Department, EmpId, EmployeeType, ResourceMember};
use time::Date;

pub fn create_test_member(member_id: i64, emp_id: &str) -> ResourceMember {
    ResourceMember::new(
        EmpId::new(emp_id),
        String::from("Test Artist"),
        String::from("Compositor"),
        Department::Comp,
        String::from("Day"),
        EmployeeType::FullTime,
        Some(String::from("Lead Artist")),
    )
    .with_id(member_id)
}

pub fn create_test_allocation(
    member_id: i64,
    date: Date,
    show: Option<&str>,
    shot: Option<&str>,
    man_days: f64,
) -> Allocation {
    Allocation::new(
        member_id,
        date,
        show.map(String::from),
        shot.map(String::from),
        man_days,
    )
    .unwrap()
}

pub fn approx_eq(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-9
}
