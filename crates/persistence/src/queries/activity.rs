// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use crewplan_audit::{ActionType, ActivityLogEntry, EntityType};
use crewplan_domain::{DateRange, format_iso_date};

use crate::data_models::ActivityRow;
use crate::diesel_schema::activity_log;
use crate::error::PersistenceError;

/// Filters for listing the activity log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityQuery {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<i64>,
    pub action_type: Option<ActionType>,
    pub operator_id: Option<i64>,
    /// Calendar days of `created_at`, both ends included.
    pub range: Option<DateRange>,
    pub is_reversed: Option<bool>,
    pub limit: Option<i64>,
}

/// Lists activity newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is invalid.
pub fn list_activity(
    conn: &mut SqliteConnection,
    filter: &ActivityQuery,
) -> Result<Vec<ActivityLogEntry>, PersistenceError> {
    debug!(?filter, "Listing activity");

    let mut query = activity_log::table
        .select(ActivityRow::as_select())
        .order(activity_log::log_id.desc())
        .into_boxed();
    if let Some(entity_type) = filter.entity_type {
        query = query.filter(activity_log::entity_type.eq(entity_type.as_str()));
    }
    if let Some(entity_id) = filter.entity_id {
        query = query.filter(activity_log::entity_id.eq(entity_id));
    }
    if let Some(action_type) = filter.action_type {
        query = query.filter(activity_log::action_type.eq(action_type.as_str()));
    }
    if let Some(operator_id) = filter.operator_id {
        query = query.filter(activity_log::actor_operator_id.eq(operator_id));
    }
    if let Some(range) = filter.range {
        // created_at is "YYYY-MM-DD HH:MM:SS", so a date prefix compares correctly.
        query = query.filter(activity_log::created_at.ge(format_iso_date(range.start())));
        if let Some(after_end) = range.end().next_day() {
            query = query.filter(activity_log::created_at.lt(format_iso_date(after_end)));
        }
    }
    if let Some(is_reversed) = filter.is_reversed {
        query = query.filter(activity_log::is_reversed.eq(i32::from(is_reversed)));
    }
    if let Some(limit) = filter.limit {
        query = query.limit(limit);
    }

    let rows: Vec<ActivityRow> = query.load(conn)?;
    rows.into_iter().map(ActivityRow::into_entry).collect()
}

/// Retrieves one activity row.
///
/// # Errors
///
/// Returns `PersistenceError::ActivityNotFound` if no such row exists.
pub fn get_activity(
    conn: &mut SqliteConnection,
    log_id: i64,
) -> Result<ActivityLogEntry, PersistenceError> {
    let row: Option<ActivityRow> = activity_log::table
        .filter(activity_log::log_id.eq(log_id))
        .select(ActivityRow::as_select())
        .first(conn)
        .optional()?;
    row.ok_or(PersistenceError::ActivityNotFound(log_id))?
        .into_entry()
}
