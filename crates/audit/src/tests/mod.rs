// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::{
    ActionType, ActivityLogEntry, Actor, AuditError, EntityType, FieldChange, Reversal,
};
use std::str::FromStr;

fn create_test_actor() -> Actor {
    Actor::operator(1, String::from("supervisor"))
}

#[test]
fn test_operator_actor_carries_identity() {
    let actor: Actor = create_test_actor();

    assert_eq!(actor.operator_id, Some(1));
    assert_eq!(actor.login_name, "supervisor");
    assert_eq!(actor.actor_type, "operator");
}

#[test]
fn test_system_actor_has_no_operator() {
    let actor: Actor = Actor::system();

    assert_eq!(actor.operator_id, None);
    assert_eq!(actor.actor_type, "system");
}

#[test]
fn test_entity_and_action_types_round_trip_through_strings() {
    for entity_type in [
        EntityType::Member,
        EntityType::Allocation,
        EntityType::SoftBooking,
    ] {
        assert_eq!(EntityType::from_str(entity_type.as_str()).unwrap(), entity_type);
    }
    for action_type in [ActionType::Create, ActionType::Update, ActionType::Delete] {
        assert_eq!(ActionType::from_str(action_type.as_str()).unwrap(), action_type);
    }
    assert!(matches!(
        EntityType::from_str("Shot"),
        Err(AuditError::UnknownEntityType(_))
    ));
    assert!(matches!(
        ActionType::from_str("update"),
        Err(AuditError::UnknownActionType(_))
    ));
}

#[test]
fn test_created_entry_stores_snapshot_as_new_value() {
    let entry: ActivityLogEntry = ActivityLogEntry::created(
        EntityType::Allocation,
        12,
        String::from(r#"{"allocation_id":12}"#),
        create_test_actor(),
    );

    assert_eq!(entry.action_type, ActionType::Create);
    assert_eq!(entry.old_value, None);
    assert!(entry.new_value.is_some());
    assert!(!entry.is_reversed);
}

#[test]
fn test_field_updates_skip_unchanged_fields() {
    let entries: Vec<ActivityLogEntry> = ActivityLogEntry::field_updates(
        EntityType::Member,
        4,
        vec![
            FieldChange::new("name", Some(String::from("A")), Some(String::from("B"))),
            FieldChange::new("shift", Some(String::from("Day")), Some(String::from("Day"))),
            FieldChange::new("reporting_to", None, Some(String::from("Lead"))),
        ],
        &create_test_actor(),
    );

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].field_name.as_deref(), Some("name"));
    assert_eq!(entries[1].field_name.as_deref(), Some("reporting_to"));
    assert!(entries.iter().all(|e| e.action_type == ActionType::Update));
}

#[test]
fn test_update_reversal_restores_old_value() {
    let entry: ActivityLogEntry = ActivityLogEntry::updated(
        EntityType::Allocation,
        7,
        FieldChange::new("man_days", Some(String::from("1")), Some(String::from("0.5"))),
        create_test_actor(),
    );

    let reversal: Reversal = entry.reversal().unwrap();

    assert_eq!(
        reversal,
        Reversal::RestoreField {
            entity_type: EntityType::Allocation,
            entity_id: 7,
            field_name: String::from("man_days"),
            value: Some(String::from("1")),
        }
    );
}

#[test]
fn test_create_reversal_deletes_entity() {
    let entry: ActivityLogEntry = ActivityLogEntry::created(
        EntityType::SoftBooking,
        3,
        String::from("{}"),
        create_test_actor(),
    );

    assert_eq!(
        entry.reversal().unwrap(),
        Reversal::DeleteEntity {
            entity_type: EntityType::SoftBooking,
            entity_id: 3,
        }
    );
}

#[test]
fn test_delete_reversal_recreates_from_snapshot() {
    let entry: ActivityLogEntry = ActivityLogEntry::deleted(
        EntityType::Member,
        9,
        String::from(r#"{"member_id":9,"emp_id":"E009"}"#),
        create_test_actor(),
    );

    match entry.reversal().unwrap() {
        Reversal::RecreateEntity {
            entity_type,
            entity_id,
            snapshot,
        } => {
            assert_eq!(entity_type, EntityType::Member);
            assert_eq!(entity_id, 9);
            assert_eq!(snapshot["emp_id"], "E009");
        }
        other => panic!("unexpected reversal {other:?}"),
    }
}

#[test]
fn test_delete_reversal_rejects_unparseable_snapshot() {
    let entry: ActivityLogEntry = ActivityLogEntry::deleted(
        EntityType::Member,
        9,
        String::from("not json"),
        create_test_actor(),
    );

    assert!(matches!(
        entry.reversal(),
        Err(AuditError::MissingSnapshot { .. })
    ));
}

#[test]
fn test_reversed_entry_cannot_be_reversed_again() {
    let mut entry: ActivityLogEntry = ActivityLogEntry::created(
        EntityType::Allocation,
        1,
        String::from("{}"),
        create_test_actor(),
    );
    entry.log_id = Some(42);
    entry.is_reversed = true;

    let err: AuditError = entry.reversal().unwrap_err();
    assert_eq!(err, AuditError::AlreadyReversed { log_id: Some(42) });
    assert_eq!(err.to_string(), "Activity 42 has already been reversed");
}
