// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use crewplan_persistence::{OperatorData, Persistence};

use crate::{
    AllocationInfo, AuthenticatedActor, CreateAllocationRequest, CreateMemberRequest,
    MemberResponse, Role, SpreadsheetUpload, create_allocation, create_member,
};

/// Satisfies the default password policy for every test operator.
pub const TEST_PASSWORD: &str = "Render-Farm-42";

/// Opens an in-memory database holding one Admin operator.
pub fn setup() -> (Persistence, AuthenticatedActor) {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("in-memory database");
    let admin: AuthenticatedActor = add_operator(&mut persistence, "admin", Role::Admin);
    (persistence, admin)
}

/// Stores an operator with [`TEST_PASSWORD`] and returns its actor.
pub fn add_operator(
    persistence: &mut Persistence,
    login_name: &str,
    role: Role,
) -> AuthenticatedActor {
    let display_name: String = format!("{login_name} user");
    let operator_id: i64 = persistence
        .create_operator(login_name, &display_name, TEST_PASSWORD, role.as_str())
        .expect("operator created");
    AuthenticatedActor::new(operator_id, login_name.to_uppercase(), role)
}

pub fn operator(persistence: &mut Persistence, actor: &AuthenticatedActor) -> OperatorData {
    persistence
        .get_operator_by_id(actor.operator_id)
        .expect("query")
        .expect("operator exists")
}

pub fn member_request(emp_id: &str, department: &str) -> CreateMemberRequest {
    CreateMemberRequest {
        emp_id: String::from(emp_id),
        name: format!("Artist {emp_id}"),
        designation: String::from("Compositor"),
        department: String::from(department),
        shift: String::from("Day"),
        employee_type: None,
        reporting_to: None,
    }
}

pub fn add_member(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    emp_id: &str,
    department: &str,
) -> i64 {
    let response: MemberResponse =
        create_member(persistence, actor, member_request(emp_id, department)).expect("member");
    response.member.member_id
}

pub fn allocation_request(
    member_id: i64,
    date: &str,
    show: &str,
    man_days: f64,
) -> CreateAllocationRequest {
    CreateAllocationRequest {
        member_id,
        allocation_date: String::from(date),
        show_name: Some(String::from(show)),
        shot_name: None,
        man_days,
        is_leave: false,
        is_idle: false,
        notes: None,
    }
}

pub fn add_allocation(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    member_id: i64,
    date: &str,
    show: &str,
    man_days: f64,
) -> AllocationInfo {
    let request: CreateAllocationRequest = allocation_request(member_id, date, show, man_days);
    create_allocation(persistence, actor, request)
        .expect("allocation")
        .allocation
}

pub fn csv_upload(text: &str) -> SpreadsheetUpload {
    SpreadsheetUpload {
        file_name: String::from("upload.csv"),
        content_base64: None,
        csv_text: Some(String::from(text)),
    }
}

pub fn approx_eq(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-9
}
