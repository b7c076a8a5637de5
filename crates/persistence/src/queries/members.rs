// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use crewplan_domain::{Department, ResourceMember};

use crate::data_models::MemberRow;
use crate::diesel_schema::members;
use crate::error::PersistenceError;

/// Lists roster members ordered by employee ID.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `include_inactive` - Whether deactivated members are returned
/// * `department` - Restrict to one department
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is invalid.
pub fn list_members(
    conn: &mut SqliteConnection,
    include_inactive: bool,
    department: Option<Department>,
) -> Result<Vec<ResourceMember>, PersistenceError> {
    debug!(include_inactive, ?department, "Listing members");

    let mut query = members::table
        .select(MemberRow::as_select())
        .order(members::emp_id.asc())
        .into_boxed();
    if !include_inactive {
        query = query.filter(members::is_active.eq(1));
    }
    if let Some(department) = department {
        query = query.filter(members::department.eq(department.as_str()));
    }

    let rows: Vec<MemberRow> = query.load(conn)?;
    rows.into_iter().map(MemberRow::into_member).collect()
}

/// Retrieves a member by id.
///
/// # Errors
///
/// Returns an error if the query fails. Returns `Ok(None)` if no such member exists.
pub fn get_member(
    conn: &mut SqliteConnection,
    member_id: i64,
) -> Result<Option<ResourceMember>, PersistenceError> {
    let row: Option<MemberRow> = members::table
        .filter(members::member_id.eq(member_id))
        .select(MemberRow::as_select())
        .first(conn)
        .optional()?;
    row.map(MemberRow::into_member).transpose()
}

/// Counts active members, optionally within one department.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_active_members(
    conn: &mut SqliteConnection,
    department: Option<Department>,
) -> Result<usize, PersistenceError> {
    let mut query = members::table
        .filter(members::is_active.eq(1))
        .count()
        .into_boxed();
    if let Some(department) = department {
        query = query.filter(members::department.eq(department.as_str()));
    }
    let count: i64 = query.get_result(conn)?;
    usize::try_from(count).map_err(|e| PersistenceError::QueryFailed(e.to_string()))
}
