// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{create_test_allocation, create_test_member};
use crate::{
    CoreError, allocation_field_changes, member_field_changes, set_allocation_field,
    set_member_field,
};
use crewplan_audit::FieldChange;
use crewplan_domain::{Allocation, Department, ResourceMember};
use time::macros::date;

#[test]
fn test_member_field_changes_round_trip_through_set() {
    let before: ResourceMember = create_test_member(1, "E001");
    let mut after: ResourceMember = before.clone();
    after.department = Department::Prep;
    after.reporting_to = Some(String::from("Lead"));
    after.is_active = false;

    let changes: Vec<FieldChange> = member_field_changes(&before, &after)
        .into_iter()
        .filter(FieldChange::is_change)
        .collect();
    assert_eq!(changes.len(), 3);

    let mut restored: ResourceMember = after.clone();
    for change in &changes {
        set_member_field(&mut restored, &change.field_name, change.old_value.as_deref()).unwrap();
    }
    assert_eq!(restored, before);
}

#[test]
fn test_allocation_field_changes_round_trip_through_set() {
    let before: Allocation = create_test_allocation(3, 1, date!(2025 - 06 - 10), "Show A", 1.0);
    let mut after: Allocation = before.clone();
    after.allocation_date = date!(2025 - 06 - 11);
    after.man_days = 0.25;
    after.show_name = None;
    after.is_idle = true;

    let changes: Vec<FieldChange> = allocation_field_changes(&before, &after)
        .into_iter()
        .filter(FieldChange::is_change)
        .collect();
    assert_eq!(changes.len(), 4);

    let mut restored: Allocation = after.clone();
    for change in &changes {
        set_allocation_field(&mut restored, &change.field_name, change.old_value.as_deref())
            .unwrap();
    }
    assert_eq!(restored, before);
}

#[test]
fn test_set_unknown_field_is_rejected() {
    let mut member: ResourceMember = create_test_member(1, "E001");
    assert!(matches!(
        set_member_field(&mut member, "salary", Some("1")),
        Err(CoreError::UnknownField { .. })
    ));
}

#[test]
fn test_set_required_field_to_none_is_rejected() {
    let mut allocation: Allocation =
        create_test_allocation(3, 1, date!(2025 - 06 - 10), "Show A", 1.0);
    assert_eq!(
        set_allocation_field(&mut allocation, "man_days", None),
        Err(CoreError::InvalidFieldValue {
            field_name: String::from("man_days"),
            value: None,
        })
    );
    assert!(set_allocation_field(&mut allocation, "is_leave", Some("yes")).is_err());
}
