// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operator, session and login history mutations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use diesel::dsl::sql;
use diesel::sql_types::{Nullable, Text};
use tracing::{debug, info};

use crate::backend::get_last_insert_rowid;
use crate::data_models::{LoginAttempt, NewLoginHistory};
use crate::diesel_schema::{login_history, operators, sessions};
use crate::error::PersistenceError;
use crate::queries::is_operator_referenced;

fn hash_password(password: &str) -> Result<String, PersistenceError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))
}

/// Creates a new operator.
///
/// The `login_name` is normalized to uppercase for case-insensitive uniqueness.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `login_name` - The login name (will be normalized)
/// * `display_name` - The display name
/// * `password` - The plain-text password (will be hashed)
/// * `role` - `Admin`, `Manager` or `Viewer`
///
/// # Errors
///
/// Returns an error if the operator cannot be created or if the login name
/// already exists.
pub fn create_operator(
    conn: &mut SqliteConnection,
    login_name: &str,
    display_name: &str,
    password: &str,
    role: &str,
) -> Result<i64, PersistenceError> {
    let normalized_login: String = login_name.trim().to_uppercase();
    info!(login_name = %normalized_login, display_name, role, "Creating operator");

    let password_hash: String = hash_password(password)?;
    diesel::insert_into(operators::table)
        .values((
            operators::login_name.eq(&normalized_login),
            operators::display_name.eq(display_name),
            operators::password_hash.eq(&password_hash),
            operators::role.eq(role),
        ))
        .execute(conn)?;

    let operator_id: i64 = get_last_insert_rowid(conn)?;
    info!(operator_id, "Operator created");
    Ok(operator_id)
}

/// Records the time of an operator's last successful login.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_last_login(
    conn: &mut SqliteConnection,
    operator_id: i64,
) -> Result<(), PersistenceError> {
    diesel::update(operators::table)
        .filter(operators::operator_id.eq(operator_id))
        .set(operators::last_login_at.eq(sql::<Nullable<Text>>("CURRENT_TIMESTAMP")))
        .execute(conn)?;
    Ok(())
}

/// Disables or re-enables an operator.
///
/// # Errors
///
/// Returns `PersistenceError::OperatorNotFound` if the operator does not exist.
pub fn set_operator_disabled(
    conn: &mut SqliteConnection,
    operator_id: i64,
    disabled: bool,
) -> Result<(), PersistenceError> {
    info!(operator_id, disabled, "Changing operator status");

    let affected: usize = if disabled {
        diesel::update(operators::table)
            .filter(operators::operator_id.eq(operator_id))
            .set((
                operators::is_disabled.eq(1),
                operators::disabled_at.eq(sql::<Nullable<Text>>("CURRENT_TIMESTAMP")),
            ))
            .execute(conn)?
    } else {
        diesel::update(operators::table)
            .filter(operators::operator_id.eq(operator_id))
            .set((
                operators::is_disabled.eq(0),
                operators::disabled_at.eq(None::<String>),
            ))
            .execute(conn)?
    };

    if affected == 0 {
        return Err(PersistenceError::OperatorNotFound(format!(
            "Operator with ID {operator_id} not found"
        )));
    }
    Ok(())
}

/// Deletes an operator that no activity row references.
///
/// # Errors
///
/// Returns `PersistenceError::OperatorReferenced` if activity rows reference
/// the operator, or `PersistenceError::OperatorNotFound` if it does not exist.
pub fn delete_operator(
    conn: &mut SqliteConnection,
    operator_id: i64,
) -> Result<(), PersistenceError> {
    if is_operator_referenced(conn, operator_id)? {
        return Err(PersistenceError::OperatorReferenced { operator_id });
    }

    let affected: usize = diesel::delete(operators::table)
        .filter(operators::operator_id.eq(operator_id))
        .execute(conn)?;
    if affected == 0 {
        return Err(PersistenceError::OperatorNotFound(format!(
            "Operator with ID {operator_id} not found"
        )));
    }

    info!(operator_id, "Deleted operator");
    Ok(())
}

/// Replaces an operator's password and ends all of its sessions.
///
/// # Errors
///
/// Returns an error if the password cannot be hashed or the update fails.
pub fn update_password(
    conn: &mut SqliteConnection,
    operator_id: i64,
    new_password: &str,
) -> Result<(), PersistenceError> {
    let password_hash: String = hash_password(new_password)?;
    diesel::update(operators::table)
        .filter(operators::operator_id.eq(operator_id))
        .set(operators::password_hash.eq(&password_hash))
        .execute(conn)?;
    let ended: usize = diesel::delete(sessions::table)
        .filter(sessions::operator_id.eq(operator_id))
        .execute(conn)?;

    info!(operator_id, sessions_ended = ended, "Password updated");
    Ok(())
}

/// Creates a session and returns its id.
///
/// # Arguments
///
/// * `session_token` - The bearer token
/// * `operator_id` - The operator the session belongs to
/// * `expires_at` - RFC 3339 expiry
/// * `login_history_id` - The login that opened the session
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    operator_id: i64,
    expires_at: &str,
    login_history_id: Option<i64>,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::operator_id.eq(operator_id),
            sessions::expires_at.eq(expires_at),
            sessions::login_history_id.eq(login_history_id),
        ))
        .execute(conn)?;

    let session_id: i64 = get_last_insert_rowid(conn)?;
    debug!(session_id, operator_id, "Session created");
    Ok(session_id)
}

/// Touches the last activity timestamp of a session.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_session_activity(
    conn: &mut SqliteConnection,
    session_id: i64,
) -> Result<(), PersistenceError> {
    diesel::update(sessions::table)
        .filter(sessions::session_id.eq(session_id))
        .set(sessions::last_activity_at.eq(sql::<Text>("CURRENT_TIMESTAMP")))
        .execute(conn)?;
    Ok(())
}

/// Deletes a session by id and records the logout on its login row.
///
/// Returns whether a session was deleted.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn end_session(conn: &mut SqliteConnection, session_id: i64) -> Result<bool, PersistenceError> {
    let login_history_id: Option<Option<i64>> = sessions::table
        .filter(sessions::session_id.eq(session_id))
        .select(sessions::login_history_id)
        .first(conn)
        .optional()?;

    if let Some(login_history_id) = login_history_id.flatten() {
        diesel::update(login_history::table)
            .filter(login_history::login_history_id.eq(login_history_id))
            .set(login_history::logout_at.eq(sql::<Nullable<Text>>("CURRENT_TIMESTAMP")))
            .execute(conn)?;
    }

    let affected: usize = diesel::delete(sessions::table)
        .filter(sessions::session_id.eq(session_id))
        .execute(conn)?;
    debug!(session_id, ended = affected > 0, "Session ended");
    Ok(affected > 0)
}

/// Deletes every session that expired before `now`.
///
/// # Arguments
///
/// * `now` - RFC 3339 timestamp in the same format as `expires_at`
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_expired_sessions(
    conn: &mut SqliteConnection,
    now: &str,
) -> Result<usize, PersistenceError> {
    let affected: usize = diesel::delete(sessions::table)
        .filter(sessions::expires_at.lt(now))
        .execute(conn)?;
    if affected > 0 {
        info!(affected, "Deleted expired sessions");
    }
    Ok(affected)
}

/// Records one login attempt and returns its id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn record_login(
    conn: &mut SqliteConnection,
    attempt: &LoginAttempt,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(login_history::table)
        .values(NewLoginHistory::from_attempt(attempt))
        .execute(conn)?;
    let login_history_id: i64 = get_last_insert_rowid(conn)?;
    info!(
        login_history_id,
        login_name = %attempt.login_name,
        success = attempt.success,
        "Recorded login attempt"
    );
    Ok(login_history_id)
}
