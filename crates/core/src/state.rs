// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crewplan_audit::ActivityLogEntry;
use crewplan_domain::{Allocation, ResourceMember, SoftBooking};

/// The slice of stored data a command is validated against.
///
/// The caller loads the rows a command can touch (the full member list for
/// uniqueness checks plus any allocations or bookings it names) and passes
/// them in. Nothing here is shared or global.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    /// Roster members.
    pub members: Vec<ResourceMember>,
    /// Allocations relevant to the command.
    pub allocations: Vec<Allocation>,
    /// Soft bookings relevant to the command.
    pub soft_bookings: Vec<SoftBooking>,
}

impl Roster {
    /// Creates a roster from its parts.
    #[must_use]
    pub const fn new(
        members: Vec<ResourceMember>,
        allocations: Vec<Allocation>,
        soft_bookings: Vec<SoftBooking>,
    ) -> Self {
        Self {
            members,
            allocations,
            soft_bookings,
        }
    }

    /// Looks up a member by identifier.
    #[must_use]
    pub fn member(&self, member_id: i64) -> Option<&ResourceMember> {
        self.members
            .iter()
            .find(|m| m.member_id == Some(member_id))
    }

    /// Looks up a member by employee identifier, ignoring case.
    #[must_use]
    pub fn member_by_emp_id(&self, emp_id: &str) -> Option<&ResourceMember> {
        self.members.iter().find(|m| m.emp_id.matches(emp_id))
    }

    /// Looks up an allocation by identifier.
    #[must_use]
    pub fn allocation(&self, allocation_id: i64) -> Option<&Allocation> {
        self.allocations
            .iter()
            .find(|a| a.allocation_id == Some(allocation_id))
    }

    /// All allocations held by a member.
    #[must_use]
    pub fn allocations_for_member(&self, member_id: i64) -> Vec<Allocation> {
        self.allocations
            .iter()
            .filter(|a| a.member_id == member_id)
            .cloned()
            .collect()
    }

    /// Looks up a soft booking by identifier.
    #[must_use]
    pub fn soft_booking(&self, booking_id: i64) -> Option<&SoftBooking> {
        self.soft_bookings
            .iter()
            .find(|b| b.booking_id == Some(booking_id))
    }
}

/// The write a successful command asks the store to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Insert a new member.
    InsertMember(ResourceMember),
    /// Overwrite a member with its new field values.
    UpdateMember(ResourceMember),
    /// Remove a member together with its allocations.
    DeleteMember {
        /// The member removed.
        member: ResourceMember,
        /// Allocations removed with it.
        allocations: Vec<Allocation>,
    },
    /// Insert a new allocation.
    InsertAllocation(Allocation),
    /// Overwrite an allocation with its new field values.
    UpdateAllocation(Allocation),
    /// Remove an allocation.
    DeleteAllocation(Allocation),
    /// Insert a new soft booking.
    InsertSoftBooking(SoftBooking),
    /// Remove a soft booking.
    DeleteSoftBooking(SoftBooking),
}

/// The result of a successful command.
///
/// `activity` holds the log rows for updates and deletions. Insertions have no
/// identifier until stored, so their CREATE rows are built afterwards with
/// [`crate::creation_activity`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    /// The write to perform.
    pub mutation: Mutation,
    /// Activity rows to append in the same transaction.
    pub activity: Vec<ActivityLogEntry>,
}
