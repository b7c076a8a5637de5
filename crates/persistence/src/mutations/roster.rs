// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row-level writes for roster entities.
//!
//! Inserts honour an id already present on the value, which is how undo
//! recreates a deleted row under its original id.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::{debug, info};

use crewplan_domain::{Allocation, ResourceMember, SoftBooking, format_iso_date};

use crate::backend::get_last_insert_rowid;
use crate::data_models::{NewAllocation, NewMember, NewSoftBooking};
use crate::diesel_schema::{allocations, members, soft_bookings};
use crate::error::PersistenceError;

fn expect_one(affected: usize, what: &str, id: i64) -> Result<(), PersistenceError> {
    if affected == 0 {
        return Err(PersistenceError::NotFound(format!("{what} {id}")));
    }
    Ok(())
}

/// Inserts a member and returns its id.
///
/// # Errors
///
/// Returns `PersistenceError::ConstraintViolation` if the employee ID is taken.
pub fn insert_member(
    conn: &mut SqliteConnection,
    member: &ResourceMember,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(members::table)
        .values(NewMember::from_member(member))
        .execute(conn)?;
    let member_id: i64 = get_last_insert_rowid(conn)?;
    info!(member_id, emp_id = member.emp_id.value(), "Inserted member");
    Ok(member_id)
}

/// Overwrites every column of an existing member.
///
/// # Errors
///
/// Returns an error if the member has no id, does not exist, or the write
/// violates a constraint.
pub fn update_member(
    conn: &mut SqliteConnection,
    member: &ResourceMember,
) -> Result<(), PersistenceError> {
    let member_id: i64 = member
        .member_id
        .ok_or_else(|| PersistenceError::Other(String::from("Member has no id")))?;
    let affected: usize = diesel::update(members::table)
        .filter(members::member_id.eq(member_id))
        .set((
            members::emp_id.eq(member.emp_id.value()),
            members::name.eq(&member.name),
            members::designation.eq(&member.designation),
            members::department.eq(member.department.as_str()),
            members::shift.eq(&member.shift),
            members::employee_type.eq(member.employee_type.as_str()),
            members::reporting_to.eq(member.reporting_to.as_deref()),
            members::is_active.eq(i32::from(member.is_active)),
        ))
        .execute(conn)?;
    expect_one(affected, "Member", member_id)?;
    debug!(member_id, "Updated member");
    Ok(())
}

/// Deletes a member. Remaining allocations go with it through the cascade.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the member does not exist.
pub fn delete_member(conn: &mut SqliteConnection, member_id: i64) -> Result<(), PersistenceError> {
    let affected: usize = diesel::delete(members::table)
        .filter(members::member_id.eq(member_id))
        .execute(conn)?;
    expect_one(affected, "Member", member_id)?;
    info!(member_id, "Deleted member");
    Ok(())
}

/// Inserts an allocation and returns its id.
///
/// # Errors
///
/// Returns `PersistenceError::ConstraintViolation` if the member does not exist.
pub fn insert_allocation(
    conn: &mut SqliteConnection,
    allocation: &Allocation,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(allocations::table)
        .values(NewAllocation::from_allocation(allocation))
        .execute(conn)?;
    let allocation_id: i64 = get_last_insert_rowid(conn)?;
    debug!(
        allocation_id,
        member_id = allocation.member_id,
        "Inserted allocation"
    );
    Ok(allocation_id)
}

/// Overwrites every column of an existing allocation.
///
/// # Errors
///
/// Returns an error if the allocation has no id or does not exist.
pub fn update_allocation(
    conn: &mut SqliteConnection,
    allocation: &Allocation,
) -> Result<(), PersistenceError> {
    let allocation_id: i64 = allocation
        .allocation_id
        .ok_or_else(|| PersistenceError::Other(String::from("Allocation has no id")))?;
    let affected: usize = diesel::update(allocations::table)
        .filter(allocations::allocation_id.eq(allocation_id))
        .set((
            allocations::member_id.eq(allocation.member_id),
            allocations::allocation_date.eq(format_iso_date(allocation.allocation_date)),
            allocations::show_name.eq(allocation.show_name.as_deref()),
            allocations::shot_name.eq(allocation.shot_name.as_deref()),
            allocations::man_days.eq(allocation.man_days),
            allocations::is_leave.eq(i32::from(allocation.is_leave)),
            allocations::is_idle.eq(i32::from(allocation.is_idle)),
            allocations::is_weekend_working.eq(i32::from(allocation.is_weekend_working)),
            allocations::notes.eq(allocation.notes.as_deref()),
        ))
        .execute(conn)?;
    expect_one(affected, "Allocation", allocation_id)
}

/// Deletes one allocation.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the allocation does not exist.
pub fn delete_allocation(
    conn: &mut SqliteConnection,
    allocation_id: i64,
) -> Result<(), PersistenceError> {
    let affected: usize = diesel::delete(allocations::table)
        .filter(allocations::allocation_id.eq(allocation_id))
        .execute(conn)?;
    expect_one(affected, "Allocation", allocation_id)
}

/// Counts the allocations a member still has.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_member_allocations(
    conn: &mut SqliteConnection,
    member_id: i64,
) -> Result<i64, PersistenceError> {
    Ok(allocations::table
        .filter(allocations::member_id.eq(member_id))
        .count()
        .get_result(conn)?)
}

/// Inserts a soft booking and returns its id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_soft_booking(
    conn: &mut SqliteConnection,
    booking: &SoftBooking,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(soft_bookings::table)
        .values(NewSoftBooking::from_soft_booking(booking))
        .execute(conn)?;
    let booking_id: i64 = get_last_insert_rowid(conn)?;
    info!(booking_id, show_name = %booking.show_name, "Inserted soft booking");
    Ok(booking_id)
}

/// Deletes one soft booking.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the booking does not exist.
pub fn delete_soft_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<(), PersistenceError> {
    let affected: usize = diesel::delete(soft_bookings::table)
        .filter(soft_bookings::booking_id.eq(booking_id))
        .execute(conn)?;
    expect_one(affected, "Soft booking", booking_id)
}
