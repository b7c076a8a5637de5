// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `members`: roster lookups
//! - `allocations`: daily allocations with optional filters
//! - `soft_bookings`: provisional bookings
//! - `activity`: activity log listing and lookup
//! - `operators`: operators, sessions and login history

pub mod activity;
pub mod allocations;
pub mod members;
pub mod operators;
pub mod soft_bookings;

pub use activity::{ActivityQuery, get_activity, list_activity};
pub use allocations::{AllocationQuery, get_allocation, list_allocations};
pub use members::{count_active_members, get_member, list_members};
pub use operators::{
    count_operators, get_operator_by_id, get_operator_by_login, get_session_by_token,
    is_operator_referenced, list_login_history, list_operators, list_sessions,
};
pub use soft_bookings::{get_soft_booking, list_soft_bookings};
