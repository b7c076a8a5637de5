// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use tracing::info;

use crewplan::{Command, Mutation, Roster, TransitionResult, apply, creation_activity};
use crewplan_audit::{ActivityLogEntry, Actor, EntityType};
use crewplan_domain::{Allocation, ResourceMember, SoftBooking};

use crate::error::PersistenceError;
use crate::mutations::activity::{append_activity, append_all};
use crate::mutations::roster::{
    delete_allocation, delete_member, delete_soft_booking, insert_allocation, insert_member,
    insert_soft_booking, update_allocation, update_member,
};
use crate::queries::{
    AllocationQuery, get_allocation, get_soft_booking, list_allocations, list_members,
};

/// What a persisted transition wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTransition {
    /// Id of the entity the mutation touched. New ids for inserts.
    pub entity_id: i64,
    /// Ids of the activity rows appended, in order.
    pub activity_ids: Vec<i64>,
}

fn missing_id(what: &str) -> PersistenceError {
    PersistenceError::Other(format!("{what} has no id"))
}

/// Writes a transition's mutation and its activity rows.
///
/// Inserts get their CREATE activity here, once the new id is known.
///
/// # Errors
///
/// Returns an error if any write fails. The caller's transaction rolls back.
pub fn persist_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
    actor: &Actor,
) -> Result<PersistedTransition, PersistenceError> {
    let (entity_id, created): (i64, Option<ActivityLogEntry>) = match &result.mutation {
        Mutation::InsertMember(member) => {
            let member_id: i64 = insert_member(conn, member)?;
            let stored: ResourceMember = member.clone().with_id(member_id);
            let entry: ActivityLogEntry =
                creation_activity(EntityType::Member, member_id, &stored, actor.clone())?;
            (member_id, Some(entry))
        }
        Mutation::UpdateMember(member) => {
            update_member(conn, member)?;
            (member.member_id.ok_or_else(|| missing_id("Member"))?, None)
        }
        Mutation::DeleteMember {
            member,
            allocations,
        } => {
            for allocation in allocations {
                let allocation_id: i64 = allocation
                    .allocation_id
                    .ok_or_else(|| missing_id("Allocation"))?;
                delete_allocation(conn, allocation_id)?;
            }
            let member_id: i64 = member.member_id.ok_or_else(|| missing_id("Member"))?;
            delete_member(conn, member_id)?;
            (member_id, None)
        }
        Mutation::InsertAllocation(allocation) => {
            let allocation_id: i64 = insert_allocation(conn, allocation)?;
            let stored: Allocation = allocation.clone().with_id(allocation_id);
            let entry: ActivityLogEntry = creation_activity(
                EntityType::Allocation,
                allocation_id,
                &stored,
                actor.clone(),
            )?;
            (allocation_id, Some(entry))
        }
        Mutation::UpdateAllocation(allocation) => {
            update_allocation(conn, allocation)?;
            (
                allocation
                    .allocation_id
                    .ok_or_else(|| missing_id("Allocation"))?,
                None,
            )
        }
        Mutation::DeleteAllocation(allocation) => {
            let allocation_id: i64 = allocation
                .allocation_id
                .ok_or_else(|| missing_id("Allocation"))?;
            delete_allocation(conn, allocation_id)?;
            (allocation_id, None)
        }
        Mutation::InsertSoftBooking(booking) => {
            let booking_id: i64 = insert_soft_booking(conn, booking)?;
            let stored: SoftBooking = booking.clone().with_id(booking_id);
            let entry: ActivityLogEntry =
                creation_activity(EntityType::SoftBooking, booking_id, &stored, actor.clone())?;
            (booking_id, Some(entry))
        }
        Mutation::DeleteSoftBooking(booking) => {
            let booking_id: i64 = booking.booking_id.ok_or_else(|| missing_id("Soft booking"))?;
            delete_soft_booking(conn, booking_id)?;
            (booking_id, None)
        }
    };

    let mut activity_ids: Vec<i64> = append_all(conn, &result.activity)?;
    if let Some(entry) = created {
        activity_ids.push(append_activity(conn, &entry)?);
    }

    Ok(PersistedTransition {
        entity_id,
        activity_ids,
    })
}

/// Loads the slice of stored state a command needs to be validated.
///
/// Members are always loaded for employee ID uniqueness. Allocations and soft
/// bookings are loaded only when the command addresses them.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn load_roster_for(
    conn: &mut SqliteConnection,
    command: &Command,
) -> Result<Roster, PersistenceError> {
    let members: Vec<ResourceMember> = list_members(conn, true, None)?;
    let allocations: Vec<Allocation> = match command {
        Command::UpdateAllocation { allocation_id, .. }
        | Command::DeleteAllocation { allocation_id } => {
            get_allocation(conn, *allocation_id)?.into_iter().collect()
        }
        Command::DeleteMember { member_id } => list_allocations(
            conn,
            &AllocationQuery {
                member_id: Some(*member_id),
                ..AllocationQuery::default()
            },
        )?,
        _ => Vec::new(),
    };
    let soft_bookings: Vec<SoftBooking> = match command {
        Command::DeleteSoftBooking { booking_id } => {
            get_soft_booking(conn, *booking_id)?.into_iter().collect()
        }
        _ => Vec::new(),
    };
    Ok(Roster::new(members, allocations, soft_bookings))
}

/// Validates a command against stored state and persists the result.
///
/// # Errors
///
/// Returns `PersistenceError::Core` if the command is rejected, or a database
/// error if a write fails.
pub fn apply_command(
    conn: &mut SqliteConnection,
    command: Command,
    actor: &Actor,
) -> Result<PersistedTransition, PersistenceError> {
    let command_name: &'static str = command.name();
    let roster: Roster = load_roster_for(conn, &command)?;
    let result: TransitionResult = apply(&roster, command, actor)?;
    let persisted: PersistedTransition = persist_transition(conn, &result, actor)?;

    info!(
        command = command_name,
        entity_id = persisted.entity_id,
        activity_rows = persisted.activity_ids.len(),
        actor = %actor.login_name,
        "Applied command"
    );
    Ok(persisted)
}
