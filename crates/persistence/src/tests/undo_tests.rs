// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{all_activity, approx_eq, create_allocation, create_member, setup};
use crate::{ActivityQuery, Persistence, PersistenceError};
use crewplan::{AllocationChanges, Command, MemberChanges};
use crewplan_audit::{ActionType, ActivityLogEntry, EntityType};
use crewplan_domain::{Allocation, ResourceMember};
use time::macros::date;

fn last_log_id(persistence: &mut Persistence, entity_type: EntityType, action: ActionType) -> i64 {
    persistence
        .list_activity(&ActivityQuery {
            entity_type: Some(entity_type),
            action_type: Some(action),
            limit: Some(1),
            ..ActivityQuery::default()
        })
        .unwrap()[0]
        .log_id
        .unwrap()
}

#[test]
fn test_undo_update_restores_previous_value() {
    let (mut persistence, actor) = setup();
    let member_id: i64 = create_member(&mut persistence, &actor, "E001");
    persistence
        .apply_command(
            Command::UpdateMember {
                member_id,
                changes: MemberChanges {
                    designation: Some(String::from("Senior Compositor")),
                    ..MemberChanges::default()
                },
            },
            &actor,
        )
        .unwrap();
    let log_id: i64 = last_log_id(&mut persistence, EntityType::Member, ActionType::Update);

    let undone: ActivityLogEntry = persistence.undo_activity(log_id).unwrap();

    assert!(undone.is_reversed);
    let member: ResourceMember = persistence.get_member(member_id).unwrap().unwrap();
    assert_eq!(member.designation, "Compositor");
}

#[test]
fn test_undo_writes_no_new_activity() {
    let (mut persistence, actor) = setup();
    let member_id: i64 = create_member(&mut persistence, &actor, "E001");
    persistence
        .apply_command(Command::DeactivateMember { member_id }, &actor)
        .unwrap();
    let before: usize = all_activity(&mut persistence).len();
    let log_id: i64 = last_log_id(&mut persistence, EntityType::Member, ActionType::Update);

    persistence.undo_activity(log_id).unwrap();

    assert_eq!(all_activity(&mut persistence).len(), before);
    assert!(persistence.get_member(member_id).unwrap().unwrap().is_active);
}

#[test]
fn test_undo_twice_is_rejected() {
    let (mut persistence, actor) = setup();
    create_member(&mut persistence, &actor, "E001");
    let log_id: i64 = last_log_id(&mut persistence, EntityType::Member, ActionType::Create);
    persistence.undo_activity(log_id).unwrap();

    let result = persistence.undo_activity(log_id);

    assert_eq!(result, Err(PersistenceError::AlreadyReversed(log_id)));
}

#[test]
fn test_undo_missing_activity_is_not_found() {
    let (mut persistence, _actor) = setup();

    assert_eq!(
        persistence.undo_activity(404),
        Err(PersistenceError::ActivityNotFound(404))
    );
}

#[test]
fn test_undo_create_deletes_entity() {
    let (mut persistence, actor) = setup();
    let member_id: i64 = create_member(&mut persistence, &actor, "E001");
    let allocation_id: i64 = create_allocation(
        &mut persistence,
        &actor,
        member_id,
        date!(2025 - 06 - 10),
        "Show A",
        1.0,
    );
    let log_id: i64 = last_log_id(&mut persistence, EntityType::Allocation, ActionType::Create);

    persistence.undo_activity(log_id).unwrap();

    assert!(persistence.get_allocation(allocation_id).unwrap().is_none());
    assert!(persistence.get_member(member_id).unwrap().is_some());
}

#[test]
fn test_undo_member_create_is_blocked_by_allocations() {
    let (mut persistence, actor) = setup();
    let member_id: i64 = create_member(&mut persistence, &actor, "E001");
    create_allocation(&mut persistence, &actor, member_id, date!(2025 - 06 - 10), "A", 1.0);
    let log_id: i64 = last_log_id(&mut persistence, EntityType::Member, ActionType::Create);

    let result = persistence.undo_activity(log_id);

    assert!(matches!(result, Err(PersistenceError::UndoBlocked { .. })));
    assert!(persistence.get_member(member_id).unwrap().is_some());
    assert!(!persistence.get_activity(log_id).unwrap().is_reversed);
}

#[test]
fn test_undo_delete_recreates_with_original_id() {
    let (mut persistence, actor) = setup();
    let member_id: i64 = create_member(&mut persistence, &actor, "E001");
    let allocation_id: i64 = create_allocation(
        &mut persistence,
        &actor,
        member_id,
        date!(2025 - 06 - 14),
        "Show A",
        0.75,
    );
    persistence
        .apply_command(Command::DeleteAllocation { allocation_id }, &actor)
        .unwrap();
    let log_id: i64 = last_log_id(&mut persistence, EntityType::Allocation, ActionType::Delete);

    persistence.undo_activity(log_id).unwrap();

    let restored: Allocation = persistence.get_allocation(allocation_id).unwrap().unwrap();
    assert_eq!(restored.member_id, member_id);
    assert!(approx_eq(restored.man_days, 0.75));
    assert!(restored.is_weekend_working);
}

#[test]
fn test_undo_allocation_delete_needs_member_first() {
    let (mut persistence, actor) = setup();
    let member_id: i64 = create_member(&mut persistence, &actor, "E001");
    create_allocation(&mut persistence, &actor, member_id, date!(2025 - 06 - 10), "A", 1.0);
    persistence
        .apply_command(Command::DeleteMember { member_id }, &actor)
        .unwrap();
    let allocation_log: i64 =
        last_log_id(&mut persistence, EntityType::Allocation, ActionType::Delete);
    let member_log: i64 = last_log_id(&mut persistence, EntityType::Member, ActionType::Delete);

    assert!(matches!(
        persistence.undo_activity(allocation_log),
        Err(PersistenceError::UndoBlocked { .. })
    ));

    persistence.undo_activity(member_log).unwrap();
    persistence.undo_activity(allocation_log).unwrap();

    assert!(persistence.get_member(member_id).unwrap().is_some());
    assert_eq!(
        persistence
            .list_allocations(&crate::AllocationQuery::default())
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_undo_update_of_deleted_entity_is_blocked() {
    let (mut persistence, actor) = setup();
    let member_id: i64 = create_member(&mut persistence, &actor, "E001");
    let allocation_id: i64 = create_allocation(
        &mut persistence,
        &actor,
        member_id,
        date!(2025 - 06 - 10),
        "A",
        1.0,
    );
    persistence
        .apply_command(
            Command::UpdateAllocation {
                allocation_id,
                changes: AllocationChanges {
                    man_days: Some(0.5),
                    ..AllocationChanges::default()
                },
            },
            &actor,
        )
        .unwrap();
    let log_id: i64 = last_log_id(&mut persistence, EntityType::Allocation, ActionType::Update);
    persistence
        .apply_command(Command::DeleteAllocation { allocation_id }, &actor)
        .unwrap();

    let result = persistence.undo_activity(log_id);

    assert!(matches!(result, Err(PersistenceError::UndoBlocked { .. })));
}
