// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Undo of a single activity row.
//!
//! The inverse is planned by `ActivityLogEntry::reversal` and applied here.
//! Undo writes no activity row of its own; the original row is flagged
//! `is_reversed` and stays in the log.

use diesel::SqliteConnection;
use tracing::info;

use crewplan::{set_allocation_field, set_member_field};
use crewplan_audit::{ActivityLogEntry, EntityType, Reversal};
use crewplan_domain::{Allocation, ResourceMember, SoftBooking};

use crate::error::PersistenceError;
use crate::mutations::activity::mark_reversed;
use crate::mutations::roster::{
    count_member_allocations, delete_allocation, delete_member, delete_soft_booking,
    insert_allocation, insert_member, insert_soft_booking, update_allocation, update_member,
};
use crate::queries::{get_activity, get_allocation, get_member, get_soft_booking};

fn blocked(log_id: i64, reason: String) -> PersistenceError {
    PersistenceError::UndoBlocked { log_id, reason }
}

fn gone(log_id: i64, entity_type: EntityType, entity_id: i64) -> PersistenceError {
    blocked(log_id, format!("{entity_type} {entity_id} no longer exists"))
}

fn restore_field(
    conn: &mut SqliteConnection,
    log_id: i64,
    entity_type: EntityType,
    entity_id: i64,
    field_name: &str,
    value: Option<&str>,
) -> Result<(), PersistenceError> {
    match entity_type {
        EntityType::Member => {
            let mut member: ResourceMember =
                get_member(conn, entity_id)?.ok_or_else(|| gone(log_id, entity_type, entity_id))?;
            set_member_field(&mut member, field_name, value)?;
            update_member(conn, &member)
        }
        EntityType::Allocation => {
            let mut allocation: Allocation = get_allocation(conn, entity_id)?
                .ok_or_else(|| gone(log_id, entity_type, entity_id))?;
            set_allocation_field(&mut allocation, field_name, value)?;
            update_allocation(conn, &allocation)
        }
        EntityType::SoftBooking => Err(blocked(
            log_id,
            String::from("soft bookings have no field updates"),
        )),
    }
}

fn delete_entity(
    conn: &mut SqliteConnection,
    log_id: i64,
    entity_type: EntityType,
    entity_id: i64,
) -> Result<(), PersistenceError> {
    let exists: bool = match entity_type {
        EntityType::Member => get_member(conn, entity_id)?.is_some(),
        EntityType::Allocation => get_allocation(conn, entity_id)?.is_some(),
        EntityType::SoftBooking => get_soft_booking(conn, entity_id)?.is_some(),
    };
    if !exists {
        return Err(gone(log_id, entity_type, entity_id));
    }

    match entity_type {
        EntityType::Member => {
            let remaining: i64 = count_member_allocations(conn, entity_id)?;
            if remaining > 0 {
                return Err(blocked(
                    log_id,
                    format!("member {entity_id} still has {remaining} allocation(s)"),
                ));
            }
            delete_member(conn, entity_id)
        }
        EntityType::Allocation => delete_allocation(conn, entity_id),
        EntityType::SoftBooking => delete_soft_booking(conn, entity_id),
    }
}

fn recreate_entity(
    conn: &mut SqliteConnection,
    log_id: i64,
    entity_type: EntityType,
    entity_id: i64,
    snapshot: serde_json::Value,
) -> Result<(), PersistenceError> {
    match entity_type {
        EntityType::Member => {
            if get_member(conn, entity_id)?.is_some() {
                return Err(blocked(log_id, format!("member {entity_id} already exists")));
            }
            let member: ResourceMember =
                serde_json::from_value::<ResourceMember>(snapshot)?.with_id(entity_id);
            insert_member(conn, &member)?;
        }
        EntityType::Allocation => {
            if get_allocation(conn, entity_id)?.is_some() {
                return Err(blocked(
                    log_id,
                    format!("allocation {entity_id} already exists"),
                ));
            }
            let allocation: Allocation =
                serde_json::from_value::<Allocation>(snapshot)?.with_id(entity_id);
            if get_member(conn, allocation.member_id)?.is_none() {
                return Err(blocked(
                    log_id,
                    format!(
                        "member {} must be restored before its allocations",
                        allocation.member_id
                    ),
                ));
            }
            insert_allocation(conn, &allocation)?;
        }
        EntityType::SoftBooking => {
            if get_soft_booking(conn, entity_id)?.is_some() {
                return Err(blocked(
                    log_id,
                    format!("soft booking {entity_id} already exists"),
                ));
            }
            let booking: SoftBooking =
                serde_json::from_value::<SoftBooking>(snapshot)?.with_id(entity_id);
            insert_soft_booking(conn, &booking)?;
        }
    }
    Ok(())
}

/// Applies the inverse of one activity row and flags it reversed.
///
/// # Errors
///
/// Returns `PersistenceError::ActivityNotFound` if the row does not exist,
/// `PersistenceError::AlreadyReversed` if it was undone before, and
/// `PersistenceError::UndoBlocked` if the current data no longer admits the
/// inverse.
pub fn undo_activity(
    conn: &mut SqliteConnection,
    log_id: i64,
) -> Result<ActivityLogEntry, PersistenceError> {
    let entry: ActivityLogEntry = get_activity(conn, log_id)?;
    match entry.reversal()? {
        Reversal::RestoreField {
            entity_type,
            entity_id,
            field_name,
            value,
        } => restore_field(
            conn,
            log_id,
            entity_type,
            entity_id,
            &field_name,
            value.as_deref(),
        )?,
        Reversal::DeleteEntity {
            entity_type,
            entity_id,
        } => delete_entity(conn, log_id, entity_type, entity_id)?,
        Reversal::RecreateEntity {
            entity_type,
            entity_id,
            snapshot,
        } => recreate_entity(conn, log_id, entity_type, entity_id, snapshot)?,
    }
    mark_reversed(conn, log_id)?;

    info!(
        log_id,
        entity_type = entry.entity_type.as_str(),
        entity_id = entry.entity_id,
        action_type = entry.action_type.as_str(),
        "Undid activity"
    );
    get_activity(conn, log_id)
}
