// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::{AllocationChanges, Command, MemberChanges};
use crate::error::CoreError;
use crate::fields::{allocation_field_changes, member_field_changes};
use crate::state::{Mutation, Roster, TransitionResult};
use crewplan_audit::{ActivityLogEntry, Actor, EntityType};
use crewplan_domain::{
    Allocation, DateRange, DomainError, EmpId, ResourceMember, SoftBooking, is_weekend,
    validate_emp_id_unique, validate_man_days, validate_member_fields,
};
use serde::Serialize;

/// Serializes an entity to the JSON snapshot stored in CREATE and DELETE rows.
///
/// # Errors
///
/// Returns `CoreError::Snapshot` if the entity cannot be serialized.
pub fn snapshot<T: Serialize>(entity: &T) -> Result<String, CoreError> {
    Ok(serde_json::to_string(entity)?)
}

/// Builds the CREATE row for an entity once the store has assigned its identifier.
///
/// # Arguments
///
/// * `entity_type` - The kind of entity created
/// * `entity_id` - The identifier assigned on insert
/// * `entity` - The stored entity, identifier included
/// * `actor` - Who created it
///
/// # Errors
///
/// Returns `CoreError::Snapshot` if the entity cannot be serialized.
pub fn creation_activity<T: Serialize>(
    entity_type: EntityType,
    entity_id: i64,
    entity: &T,
    actor: Actor,
) -> Result<ActivityLogEntry, CoreError> {
    Ok(ActivityLogEntry::created(
        entity_type,
        entity_id,
        snapshot(entity)?,
        actor,
    ))
}

/// Builds the DELETE row for an entity about to be removed.
///
/// # Errors
///
/// Returns `CoreError::Snapshot` if the entity cannot be serialized.
pub fn deletion_activity<T: Serialize>(
    entity_type: EntityType,
    entity_id: i64,
    entity: &T,
    actor: Actor,
) -> Result<ActivityLogEntry, CoreError> {
    Ok(ActivityLogEntry::deleted(
        entity_type,
        entity_id,
        snapshot(entity)?,
        actor,
    ))
}

fn find_member(roster: &Roster, member_id: i64) -> Result<&ResourceMember, CoreError> {
    roster
        .member(member_id)
        .ok_or(CoreError::DomainViolation(DomainError::MemberNotFound {
            member_id,
        }))
}

fn find_allocation(roster: &Roster, allocation_id: i64) -> Result<&Allocation, CoreError> {
    roster
        .allocation(allocation_id)
        .ok_or(CoreError::DomainViolation(DomainError::AllocationNotFound {
            allocation_id,
        }))
}

fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn apply_member_changes(member: &ResourceMember, changes: MemberChanges) -> ResourceMember {
    let mut updated: ResourceMember = member.clone();
    if let Some(emp_id) = changes.emp_id {
        updated.emp_id = EmpId::new(&emp_id);
    }
    if let Some(name) = changes.name {
        updated.name = name.trim().to_string();
    }
    if let Some(designation) = changes.designation {
        updated.designation = designation.trim().to_string();
    }
    if let Some(department) = changes.department {
        updated.department = department;
    }
    if let Some(shift) = changes.shift {
        updated.shift = shift.trim().to_string();
    }
    if let Some(employee_type) = changes.employee_type {
        updated.employee_type = employee_type;
    }
    if let Some(reporting_to) = changes.reporting_to {
        updated.reporting_to = normalize_text(reporting_to);
    }
    updated
}

fn apply_allocation_changes(
    allocation: &Allocation,
    changes: AllocationChanges,
) -> Result<Allocation, CoreError> {
    let mut updated: Allocation = allocation.clone();
    if let Some(date) = changes.allocation_date {
        updated.allocation_date = date;
        updated.is_weekend_working = is_weekend(date);
    }
    if let Some(man_days) = changes.man_days {
        validate_man_days(man_days)?;
        updated.man_days = man_days;
    }
    if let Some(is_leave) = changes.is_leave {
        updated.is_leave = is_leave;
    }
    if let Some(is_idle) = changes.is_idle {
        updated.is_idle = is_idle;
    }

    if let Some(show_name) = changes.show_name {
        updated.show_name = normalize_text(show_name);
    }
    if let Some(shot_name) = changes.shot_name {
        updated.shot_name = normalize_text(shot_name);
    }
    if let Some(notes) = changes.notes {
        updated.notes = normalize_text(notes);
    }
    Ok(updated)
}

fn set_active(
    roster: &Roster,
    member_id: i64,
    is_active: bool,
    actor: &Actor,
) -> Result<TransitionResult, CoreError> {
    let member: &ResourceMember = find_member(roster, member_id)?;
    let mut updated: ResourceMember = member.clone();
    updated.is_active = is_active;

    let activity: Vec<ActivityLogEntry> = ActivityLogEntry::field_updates(
        EntityType::Member,
        member_id,
        member_field_changes(member, &updated),
        actor,
    );

    Ok(TransitionResult {
        mutation: Mutation::UpdateMember(updated),
        activity,
    })
}

/// Applies a command to the roster, producing the write to perform and its activity rows.
///
/// # Arguments
///
/// * `roster` - The stored data the command is validated against
/// * `command` - The command to apply
/// * `actor` - The operator performing this action
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the mutation and activity rows
/// * `Err(CoreError)` if the command is invalid
///
/// # Errors
///
/// Returns an error if:
/// - A referenced member, allocation or booking does not exist
/// - A field fails domain validation
/// - An employee ID is already taken
/// - An entity cannot be serialized for its snapshot
#[allow(clippy::too_many_lines)]
pub fn apply(
    roster: &Roster,
    command: Command,
    actor: &Actor,
) -> Result<TransitionResult, CoreError> {
    match command {
        Command::CreateMember {
            emp_id,
            name,
            designation,
            department,
            shift,
            employee_type,
            reporting_to,
        } => {
            let member: ResourceMember = ResourceMember::new(
                EmpId::new(&emp_id),
                name.trim().to_string(),
                designation.trim().to_string(),
                department,
                shift.trim().to_string(),
                employee_type,
                normalize_text(reporting_to),
            );
            validate_member_fields(&member)?;
            validate_emp_id_unique(&member.emp_id, None, &roster.members)?;

            Ok(TransitionResult {
                mutation: Mutation::InsertMember(member),
                activity: Vec::new(),
            })
        }
        Command::UpdateMember { member_id, changes } => {
            let member: &ResourceMember = find_member(roster, member_id)?;
            let updated: ResourceMember = apply_member_changes(member, changes);
            validate_member_fields(&updated)?;
            validate_emp_id_unique(&updated.emp_id, Some(member_id), &roster.members)?;

            let activity: Vec<ActivityLogEntry> = ActivityLogEntry::field_updates(
                EntityType::Member,
                member_id,
                member_field_changes(member, &updated),
                actor,
            );

            Ok(TransitionResult {
                mutation: Mutation::UpdateMember(updated),
                activity,
            })
        }
        Command::DeactivateMember { member_id } => set_active(roster, member_id, false, actor),
        Command::ReactivateMember { member_id } => set_active(roster, member_id, true, actor),
        Command::DeleteMember { member_id } => {
            let member: &ResourceMember = find_member(roster, member_id)?;
            let allocations: Vec<Allocation> = roster.allocations_for_member(member_id);

            let mut activity: Vec<ActivityLogEntry> = Vec::with_capacity(allocations.len() + 1);
            for allocation in &allocations {
                if let Some(allocation_id) = allocation.allocation_id {
                    activity.push(deletion_activity(
                        EntityType::Allocation,
                        allocation_id,
                        allocation,
                        actor.clone(),
                    )?);
                }
            }
            activity.push(deletion_activity(
                EntityType::Member,
                member_id,
                member,
                actor.clone(),
            )?);

            Ok(TransitionResult {
                mutation: Mutation::DeleteMember {
                    member: member.clone(),
                    allocations,
                },
                activity,
            })
        }
        Command::CreateAllocation {
            member_id,
            allocation_date,
            show_name,
            shot_name,
            man_days,
            is_leave,
            is_idle,
            notes,
        } => {
            find_member(roster, member_id)?;
            let mut allocation: Allocation =
                Allocation::new(member_id, allocation_date, show_name, shot_name, man_days)?
                    .with_notes(notes)
                    .as_weekend_working(is_weekend(allocation_date));
            allocation.is_leave = is_leave;
            allocation.is_idle = is_idle;

            Ok(TransitionResult {
                mutation: Mutation::InsertAllocation(allocation),
                activity: Vec::new(),
            })
        }
        Command::UpdateAllocation {
            allocation_id,
            changes,
        } => {
            let allocation: &Allocation = find_allocation(roster, allocation_id)?;
            let updated: Allocation = apply_allocation_changes(allocation, changes)?;

            let activity: Vec<ActivityLogEntry> = ActivityLogEntry::field_updates(
                EntityType::Allocation,
                allocation_id,
                allocation_field_changes(allocation, &updated),
                actor,
            );

            Ok(TransitionResult {
                mutation: Mutation::UpdateAllocation(updated),
                activity,
            })
        }
        Command::DeleteAllocation { allocation_id } => {
            let allocation: &Allocation = find_allocation(roster, allocation_id)?;
            let activity: ActivityLogEntry = deletion_activity(
                EntityType::Allocation,
                allocation_id,
                allocation,
                actor.clone(),
            )?;

            Ok(TransitionResult {
                mutation: Mutation::DeleteAllocation(allocation.clone()),
                activity: vec![activity],
            })
        }
        Command::CreateSoftBooking {
            show_name,
            manager_name,
            department,
            man_days,
            start_date,
            end_date,
            split,
            notes,
        } => {
            let range: DateRange = DateRange::new(start_date, end_date)?;
            let mut booking: SoftBooking =
                SoftBooking::new(&show_name, &manager_name, department, man_days, range, split)?;
            booking.notes = normalize_text(notes);

            Ok(TransitionResult {
                mutation: Mutation::InsertSoftBooking(booking),
                activity: Vec::new(),
            })
        }
        Command::DeleteSoftBooking { booking_id } => {
            let booking: &SoftBooking = roster.soft_booking(booking_id).ok_or(
                CoreError::DomainViolation(DomainError::SoftBookingNotFound { booking_id }),
            )?;
            let activity: ActivityLogEntry = deletion_activity(
                EntityType::SoftBooking,
                booking_id,
                booking,
                actor.clone(),
            )?;

            Ok(TransitionResult {
                mutation: Mutation::DeleteSoftBooking(booking.clone()),
                activity: vec![activity],
            })
        }
    }
}
