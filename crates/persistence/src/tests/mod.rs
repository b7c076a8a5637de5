// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod undo_tests;

use crate::{ActivityQuery, Persistence};
use crewplan::{Command, ParsedRow};
use crewplan_audit::{ActivityLogEntry, Actor};
use crewplan_domain::{Department, EmployeeType};
use time::Date;

/// Opens an in-memory database with one Admin operator and returns its actor.
pub fn setup() -> (Persistence, Actor) {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("in-memory database");
    let operator_id: i64 = persistence
        .create_operator("admin", "Admin", "password", "Admin")
        .expect("operator");
    (persistence, Actor::operator(operator_id, String::from("ADMIN")))
}

pub fn create_member_command(emp_id: &str) -> Command {
    Command::CreateMember {
        emp_id: String::from(emp_id),
        name: format!("Artist {emp_id}"),
        designation: String::from("Compositor"),
        department: Department::Comp,
        shift: String::from("Day"),
        employee_type: EmployeeType::FullTime,
        reporting_to: None,
    }
}

pub fn create_member(persistence: &mut Persistence, actor: &Actor, emp_id: &str) -> i64 {
    persistence
        .apply_command(create_member_command(emp_id), actor)
        .expect("member created")
        .entity_id
}

pub fn create_allocation(
    persistence: &mut Persistence,
    actor: &Actor,
    member_id: i64,
    date: Date,
    show: &str,
    man_days: f64,
) -> i64 {
    persistence
        .apply_command(
            Command::CreateAllocation {
                member_id,
                allocation_date: date,
                show_name: Some(String::from(show)),
                shot_name: None,
                man_days,
                is_leave: false,
                is_idle: false,
                notes: None,
            },
            actor,
        )
        .expect("allocation created")
        .entity_id
}

pub fn parsed_row(
    row_number: usize,
    emp_id: &str,
    show: &str,
    start: &str,
    end: &str,
    total_md: &str,
) -> ParsedRow {
    ParsedRow {
        row_number,
        action: String::from("NEW"),
        emp_id: String::from(emp_id),
        show_name: String::from(show),
        shot_name: String::new(),
        start_date: String::from(start),
        end_date: String::from(end),
        total_md: String::from(total_md),
        notes: String::new(),
    }
}

pub fn all_activity(persistence: &mut Persistence) -> Vec<ActivityLogEntry> {
    persistence
        .list_activity(&ActivityQuery::default())
        .expect("activity")
}

pub fn approx_eq(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-9
}
