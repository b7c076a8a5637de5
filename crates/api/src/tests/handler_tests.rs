// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crewplan_persistence::Persistence;

use super::helpers::{
    add_allocation, add_member, allocation_request, approx_eq, member_request, setup,
};
use crate::{
    ActivityInfo, ActivityRequest, AllocationInfo, AllocationResponse, ApiError,
    CreateAllocationRequest, CreateMemberRequest, CreateSoftBookingRequest, DeleteResponse,
    ListActivityResponse, ListAllocationsRequest, ListAllocationsResponse, ListMembersRequest,
    ListMembersResponse, ListSoftBookingsRequest, ListSoftBookingsResponse, MemberResponse,
    SoftBookingResponse, SplitInfo, UndoResponse, UpdateAllocationRequest, UpdateMemberRequest,
    create_allocation, create_member, create_soft_booking, deactivate_member, delete_member,
    delete_soft_booking, list_activity, list_allocations, list_members, list_soft_bookings,
    reactivate_member, undo_activity, update_allocation, update_member,
};

fn soft_booking_request(split: Option<SplitInfo>) -> CreateSoftBookingRequest {
    CreateSoftBookingRequest {
        show_name: String::from("Show A"),
        manager_name: String::from("Priya"),
        department: String::from("roto"),
        man_days: 40.0,
        start_date: String::from("2026-03-02"),
        end_date: String::from("2026-03-31"),
        split,
        notes: None,
    }
}

fn activity_for(
    persistence: &mut Persistence,
    entity_type: &str,
    entity_id: i64,
) -> Vec<ActivityInfo> {
    let request: ActivityRequest = ActivityRequest {
        entity_type: Some(String::from(entity_type)),
        entity_id: Some(entity_id),
        ..ActivityRequest::default()
    };
    list_activity(persistence, &request).unwrap().entries
}

// ============================================================================
// Members
// ============================================================================

#[test]
fn test_create_member_parses_department_and_defaults_employee_type() {
    let (mut persistence, admin) = setup();

    let response: MemberResponse =
        create_member(&mut persistence, &admin, member_request(" E001 ", "comp")).unwrap();

    assert_eq!(response.member.emp_id, "E001");
    assert_eq!(response.member.department, "Comp");
    assert_eq!(response.member.employee_type, "FullTime");
    assert!(response.member.is_active);
    assert_eq!(response.activity_ids.len(), 1);
}

#[test]
fn test_create_member_rejects_unknown_department() {
    let (mut persistence, admin) = setup();

    let result = create_member(&mut persistence, &admin, member_request("E001", "Lighting"));

    assert!(matches!(result, Err(ApiError::InvalidInput { field, .. }) if field == "department"));
}

#[test]
fn test_duplicate_emp_id_is_a_rule_violation() {
    let (mut persistence, admin) = setup();
    add_member(&mut persistence, &admin, "E001", "Comp");

    let result = create_member(&mut persistence, &admin, member_request("e001", "Paint"));

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { rule, .. }) if rule == "unique_emp_id"
    ));
}

#[test]
fn test_update_member_logs_only_changed_fields_and_clears_reporting_to() {
    let (mut persistence, admin) = setup();
    let mut request: CreateMemberRequest = member_request("E001", "Comp");
    request.reporting_to = Some(String::from("Lead A"));
    let member_id: i64 = create_member(&mut persistence, &admin, request)
        .unwrap()
        .member
        .member_id;

    let response: MemberResponse = update_member(
        &mut persistence,
        &admin,
        member_id,
        UpdateMemberRequest {
            shift: Some(String::from("Day")),
            designation: Some(String::from("Senior Compositor")),
            reporting_to: Some(String::new()),
            ..UpdateMemberRequest::default()
        },
    )
    .unwrap();

    assert_eq!(response.activity_ids.len(), 2);
    assert_eq!(response.member.designation, "Senior Compositor");
    assert_eq!(response.member.reporting_to, None);
}

#[test]
fn test_update_with_no_changes_writes_no_activity() {
    let (mut persistence, admin) = setup();
    let member_id: i64 = add_member(&mut persistence, &admin, "E001", "Comp");

    let response: MemberResponse = update_member(
        &mut persistence,
        &admin,
        member_id,
        UpdateMemberRequest {
            department: Some(String::from("COMP")),
            ..UpdateMemberRequest::default()
        },
    )
    .unwrap();

    assert!(response.activity_ids.is_empty());
    assert!(response.message.contains("unchanged"));
}

#[test]
fn test_deactivated_members_leave_the_default_listing() {
    let (mut persistence, admin) = setup();
    let member_id: i64 = add_member(&mut persistence, &admin, "E001", "Comp");
    add_member(&mut persistence, &admin, "E002", "Paint");

    deactivate_member(&mut persistence, &admin, member_id).unwrap();

    let active: ListMembersResponse =
        list_members(&mut persistence, &ListMembersRequest::default()).unwrap();
    assert_eq!(active.members.len(), 1);
    assert_eq!(active.members[0].emp_id, "E002");

    let everyone: ListMembersResponse = list_members(
        &mut persistence,
        &ListMembersRequest {
            include_inactive: true,
            department: None,
        },
    )
    .unwrap();
    assert_eq!(everyone.members.len(), 2);

    let response: MemberResponse = reactivate_member(&mut persistence, &admin, member_id).unwrap();
    assert!(response.member.is_active);
}

#[test]
fn test_list_members_filters_by_department() {
    let (mut persistence, admin) = setup();
    add_member(&mut persistence, &admin, "E001", "Comp");
    add_member(&mut persistence, &admin, "E002", "Paint");

    let paint: ListMembersResponse = list_members(
        &mut persistence,
        &ListMembersRequest {
            include_inactive: false,
            department: Some(String::from("paint")),
        },
    )
    .unwrap();

    assert_eq!(paint.members.len(), 1);
    assert_eq!(paint.members[0].emp_id, "E002");
}

#[test]
fn test_delete_member_removes_their_allocations() {
    let (mut persistence, admin) = setup();
    let member_id: i64 = add_member(&mut persistence, &admin, "E001", "Comp");
    add_allocation(&mut persistence, &admin, member_id, "2026-03-02", "Show A", 1.0);
    add_allocation(&mut persistence, &admin, member_id, "2026-03-03", "Show A", 1.0);

    let response: DeleteResponse = delete_member(&mut persistence, &admin, member_id).unwrap();

    assert_eq!(response.entity_id, member_id);
    assert!(response.activity_ids.len() >= 3);
    let remaining: ListAllocationsResponse =
        list_allocations(&mut persistence, &ListAllocationsRequest::default()).unwrap();
    assert!(remaining.allocations.is_empty());
}

#[test]
fn test_unknown_member_is_not_found() {
    let (mut persistence, admin) = setup();

    let result = deactivate_member(&mut persistence, &admin, 999);

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

// ============================================================================
// Allocations
// ============================================================================

#[test]
fn test_list_allocations_sums_man_days() {
    let (mut persistence, admin) = setup();
    let member_id: i64 = add_member(&mut persistence, &admin, "E001", "Comp");
    add_allocation(&mut persistence, &admin, member_id, "2026-03-02", "Show A", 0.5);
    add_allocation(&mut persistence, &admin, member_id, "2026-03-02", "Show B", 0.25);
    add_allocation(&mut persistence, &admin, member_id, "2026-03-09", "Show A", 1.0);

    let response: ListAllocationsResponse = list_allocations(
        &mut persistence,
        &ListAllocationsRequest {
            start_date: Some(String::from("2026-03-01")),
            end_date: Some(String::from("2026-03-07")),
            ..ListAllocationsRequest::default()
        },
    )
    .unwrap();

    assert_eq!(response.allocations.len(), 2);
    assert!(approx_eq(response.total_man_days, 0.75));
}

#[test]
fn test_list_allocations_needs_both_range_bounds() {
    let (mut persistence, _admin) = setup();

    let result = list_allocations(
        &mut persistence,
        &ListAllocationsRequest {
            end_date: Some(String::from("2026-03-07")),
            ..ListAllocationsRequest::default()
        },
    );

    assert!(matches!(result, Err(ApiError::InvalidInput { field, .. }) if field == "start_date"));
}

#[test]
fn test_create_allocation_rejects_malformed_date() {
    let (mut persistence, admin) = setup();
    let member_id: i64 = add_member(&mut persistence, &admin, "E001", "Comp");

    let result = create_allocation(
        &mut persistence,
        &admin,
        allocation_request(member_id, "02/03/2026", "Show A", 1.0),
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { field, .. }) if field == "allocation_date"
    ));
}

#[test]
fn test_create_allocation_for_unknown_member_is_not_found() {
    let (mut persistence, admin) = setup();

    let result = create_allocation(
        &mut persistence,
        &admin,
        allocation_request(42, "2026-03-02", "Show A", 1.0),
    );

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_leave_allocation_without_show() {
    let (mut persistence, admin) = setup();
    let member_id: i64 = add_member(&mut persistence, &admin, "E001", "Comp");
    let mut request: CreateAllocationRequest =
        allocation_request(member_id, "2026-03-02", "", 1.0);
    request.show_name = Some(String::from("  "));
    request.is_leave = true;

    let response: AllocationResponse =
        create_allocation(&mut persistence, &admin, request).unwrap();

    assert!(response.allocation.is_leave);
    assert_eq!(response.allocation.allocation_date, "2026-03-02");
}

#[test]
fn test_update_allocation_changes_fields_and_clears_notes() {
    let (mut persistence, admin) = setup();
    let member_id: i64 = add_member(&mut persistence, &admin, "E001", "Comp");
    let mut request: CreateAllocationRequest =
        allocation_request(member_id, "2026-03-02", "Show A", 1.0);
    request.notes = Some(String::from("first pass"));
    let created: AllocationInfo = create_allocation(&mut persistence, &admin, request)
        .unwrap()
        .allocation;

    let response: AllocationResponse = update_allocation(
        &mut persistence,
        &admin,
        created.allocation_id,
        UpdateAllocationRequest {
            man_days: Some(0.5),
            shot_name: Some(String::from("sh010")),
            notes: Some(String::new()),
            ..UpdateAllocationRequest::default()
        },
    )
    .unwrap();

    assert_eq!(response.activity_ids.len(), 3);
    assert!(approx_eq(response.allocation.man_days, 0.5));
    assert_eq!(response.allocation.shot_name.as_deref(), Some("sh010"));
    assert_eq!(response.allocation.notes, None);
}

// ============================================================================
// Soft bookings
// ============================================================================

#[test]
fn test_soft_booking_split_must_total_one_hundred() {
    let (mut persistence, admin) = setup();

    let result = create_soft_booking(
        &mut persistence,
        &admin,
        soft_booking_request(Some(SplitInfo {
            senior: 50,
            mid: 30,
            junior: 10,
        })),
    );

    assert!(matches!(result, Err(ApiError::InvalidInput { field, .. }) if field == "split"));
}

#[test]
fn test_soft_booking_lifecycle() {
    let (mut persistence, admin) = setup();
    let created: SoftBookingResponse = create_soft_booking(
        &mut persistence,
        &admin,
        soft_booking_request(Some(SplitInfo {
            senior: 20,
            mid: 50,
            junior: 30,
        })),
    )
    .unwrap();
    assert_eq!(created.soft_booking.department, "Roto");
    assert_eq!(created.soft_booking.start_date, "2026-03-02");

    let listed: ListSoftBookingsResponse = list_soft_bookings(
        &mut persistence,
        &ListSoftBookingsRequest {
            start_date: Some(String::from("2026-03-30")),
            end_date: Some(String::from("2026-04-05")),
            department: Some(String::from("Roto")),
        },
    )
    .unwrap();
    assert_eq!(listed.soft_bookings.len(), 1);

    delete_soft_booking(&mut persistence, &admin, created.soft_booking.booking_id).unwrap();
    let after: ListSoftBookingsResponse =
        list_soft_bookings(&mut persistence, &ListSoftBookingsRequest::default()).unwrap();
    assert!(after.soft_bookings.is_empty());
}

#[test]
fn test_soft_booking_end_before_start_is_rejected() {
    let (mut persistence, admin) = setup();
    let mut request: CreateSoftBookingRequest = soft_booking_request(None);
    request.end_date = String::from("2026-02-01");

    let result = create_soft_booking(&mut persistence, &admin, request);

    assert!(matches!(result, Err(ApiError::InvalidInput { field, .. }) if field == "end_date"));
}

// ============================================================================
// Activity and undo
// ============================================================================

#[test]
fn test_activity_filters_accept_loose_type_names() {
    let (mut persistence, admin) = setup();
    let member_id: i64 = add_member(&mut persistence, &admin, "E001", "Comp");
    add_allocation(&mut persistence, &admin, member_id, "2026-03-02", "Show A", 1.0);

    let creates: ListActivityResponse = list_activity(
        &mut persistence,
        &ActivityRequest {
            entity_type: Some(String::from("allocation")),
            action_type: Some(String::from("create")),
            ..ActivityRequest::default()
        },
    )
    .unwrap();

    assert_eq!(creates.entries.len(), 1);
    assert_eq!(creates.entries[0].entity_type, "Allocation");
    assert_eq!(creates.entries[0].login_name, "ADMIN");

    let bad = list_activity(
        &mut persistence,
        &ActivityRequest {
            entity_type: Some(String::from("Shot")),
            ..ActivityRequest::default()
        },
    );
    assert!(matches!(bad, Err(ApiError::InvalidInput { field, .. }) if field == "entity_type"));
}

#[test]
fn test_undo_field_update_restores_old_value() {
    let (mut persistence, admin) = setup();
    let member_id: i64 = add_member(&mut persistence, &admin, "E001", "Comp");
    let updated: MemberResponse = update_member(
        &mut persistence,
        &admin,
        member_id,
        UpdateMemberRequest {
            name: Some(String::from("Renamed")),
            ..UpdateMemberRequest::default()
        },
    )
    .unwrap();

    let undone: UndoResponse =
        undo_activity(&mut persistence, &admin, updated.activity_ids[0]).unwrap();

    assert!(undone.entry.is_reversed);
    let members: ListMembersResponse =
        list_members(&mut persistence, &ListMembersRequest::default()).unwrap();
    assert_eq!(members.members[0].name, "Artist E001");
    assert!(matches!(
        undo_activity(&mut persistence, &admin, updated.activity_ids[0]),
        Err(ApiError::AlreadyApplied { .. })
    ));
}

#[test]
fn test_undo_allocation_create_removes_it() {
    let (mut persistence, admin) = setup();
    let member_id: i64 = add_member(&mut persistence, &admin, "E001", "Comp");
    let allocation: AllocationInfo =
        add_allocation(&mut persistence, &admin, member_id, "2026-03-02", "Show A", 1.0);
    let log_id: i64 =
        activity_for(&mut persistence, "Allocation", allocation.allocation_id)[0].log_id;

    undo_activity(&mut persistence, &admin, log_id).unwrap();

    let remaining: ListAllocationsResponse =
        list_allocations(&mut persistence, &ListAllocationsRequest::default()).unwrap();
    assert!(remaining.allocations.is_empty());
}

#[test]
fn test_undo_member_create_is_blocked_by_allocations() {
    let (mut persistence, admin) = setup();
    let member_id: i64 = add_member(&mut persistence, &admin, "E001", "Comp");
    add_allocation(&mut persistence, &admin, member_id, "2026-03-02", "Show A", 1.0);
    let log_id: i64 = activity_for(&mut persistence, "Member", member_id)[0].log_id;

    let result = undo_activity(&mut persistence, &admin, log_id);

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
}

#[test]
fn test_undo_unknown_activity_is_not_found() {
    let (mut persistence, admin) = setup();

    let result = undo_activity(&mut persistence, &admin, 12345);

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}
