// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operator, session and login history queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use crate::data_models::{
    LoginHistoryData, LoginHistoryRow, OperatorData, OperatorRow, SessionData,
};
use crate::diesel_schema::{activity_log, login_history, operators, sessions};
use crate::error::PersistenceError;

/// Retrieves an operator by login name.
///
/// The `login_name` is normalized to uppercase for case-insensitive lookup.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the operator is not found.
pub fn get_operator_by_login(
    conn: &mut SqliteConnection,
    login_name: &str,
) -> Result<Option<OperatorData>, PersistenceError> {
    let normalized_login: String = login_name.trim().to_uppercase();

    debug!("Looking up operator by login_name: {}", normalized_login);

    let row: Option<OperatorRow> = operators::table
        .filter(operators::login_name.eq(&normalized_login))
        .select(OperatorRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(OperatorData::from))
}

/// Retrieves an operator by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the operator is not found.
pub fn get_operator_by_id(
    conn: &mut SqliteConnection,
    operator_id: i64,
) -> Result<Option<OperatorData>, PersistenceError> {
    debug!("Looking up operator by ID: {}", operator_id);

    let row: Option<OperatorRow> = operators::table
        .filter(operators::operator_id.eq(operator_id))
        .select(OperatorRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(OperatorData::from))
}

/// Lists all operators ordered by login name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_operators(conn: &mut SqliteConnection) -> Result<Vec<OperatorData>, PersistenceError> {
    let rows: Vec<OperatorRow> = operators::table
        .select(OperatorRow::as_select())
        .order(operators::login_name.asc())
        .load(conn)?;
    Ok(rows.into_iter().map(OperatorData::from).collect())
}

/// Counts operators. Used to decide whether bootstrap is required.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_operators(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(operators::table.count().get_result(conn)?)
}

/// Checks whether any activity row references the operator.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn is_operator_referenced(
    conn: &mut SqliteConnection,
    operator_id: i64,
) -> Result<bool, PersistenceError> {
    let count: i64 = activity_log::table
        .filter(activity_log::actor_operator_id.eq(operator_id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// Retrieves a session by token.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the session is not found.
pub fn get_session_by_token(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<Option<SessionData>, PersistenceError> {
    debug!("Looking up session by token");

    Ok(sessions::table
        .filter(sessions::session_token.eq(session_token))
        .select(SessionData::as_select())
        .first(conn)
        .optional()?)
}

/// Lists every live session, most recently active first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_sessions(conn: &mut SqliteConnection) -> Result<Vec<SessionData>, PersistenceError> {
    Ok(sessions::table
        .select(SessionData::as_select())
        .order(sessions::last_activity_at.desc())
        .load(conn)?)
}

/// Lists login attempts newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_login_history(
    conn: &mut SqliteConnection,
    limit: i64,
) -> Result<Vec<LoginHistoryData>, PersistenceError> {
    let rows: Vec<LoginHistoryRow> = login_history::table
        .select(LoginHistoryRow::as_select())
        .order(login_history::login_history_id.desc())
        .limit(limit)
        .load(conn)?;
    Ok(rows.into_iter().map(LoginHistoryData::from).collect())
}
