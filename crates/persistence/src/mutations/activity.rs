// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use crewplan_audit::ActivityLogEntry;

use crate::backend::get_last_insert_rowid;
use crate::data_models::NewActivity;
use crate::diesel_schema::activity_log;
use crate::error::PersistenceError;

/// Appends one activity row and returns its id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn append_activity(
    conn: &mut SqliteConnection,
    entry: &ActivityLogEntry,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(activity_log::table)
        .values(NewActivity::from_entry(entry))
        .execute(conn)?;
    let log_id: i64 = get_last_insert_rowid(conn)?;

    debug!(
        log_id,
        entity_type = entry.entity_type.as_str(),
        entity_id = entry.entity_id,
        action_type = entry.action_type.as_str(),
        "Appended activity"
    );
    Ok(log_id)
}

/// Appends every entry in order and returns their ids.
///
/// # Errors
///
/// Returns an error if any insert fails.
pub fn append_all(
    conn: &mut SqliteConnection,
    entries: &[ActivityLogEntry],
) -> Result<Vec<i64>, PersistenceError> {
    entries
        .iter()
        .map(|entry| append_activity(conn, entry))
        .collect()
}

/// Sets `is_reversed` on one activity row.
///
/// # Errors
///
/// Returns `PersistenceError::ActivityNotFound` if no row was updated.
pub fn mark_reversed(conn: &mut SqliteConnection, log_id: i64) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(activity_log::table)
        .filter(activity_log::log_id.eq(log_id))
        .set(activity_log::is_reversed.eq(1))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::ActivityNotFound(log_id));
    }
    Ok(())
}
