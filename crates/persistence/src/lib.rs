// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for CrewPlan.
//!
//! Stores the roster, daily allocations, soft bookings, the activity log and
//! operator accounts in `SQLite` through Diesel. Migrations are embedded and
//! run on open. Foreign keys are enforced and file databases use WAL.
//!
//! ## Transactions
//!
//! Every public write on [`Persistence`] runs in one transaction. Import
//! commit, command application and undo use `BEGIN IMMEDIATE`, so the write
//! lock is taken before the rows they validate against are read.
//!
//! ## Testing
//!
//! [`Persistence::new_in_memory`] gives each call its own shared-cache
//! in-memory database, named from an atomic counter.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use diesel::connection::Connection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crewplan::{Command, CommitStrategy, ImportPreview, ParsedRow};
use crewplan_audit::{ActivityLogEntry, Actor};
use crewplan_domain::{Allocation, DateRange, Department, ResourceMember, SoftBooking};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{LoginAttempt, LoginHistoryData, OperatorData, SessionData};
pub use error::PersistenceError;
pub use mutations::{ImportCommitResult, MemberImportResult, PersistedTransition, SkippedMember};
pub use queries::{ActivityQuery, AllocationQuery};

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:crewplan_memdb_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::initialize_database(&shared_memory_url)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::initialize_database(path_str)?;
        backend::enable_wal_mode(&mut conn)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Validates a command against stored state and persists the mutation
    /// together with its activity rows.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Core` if the command is rejected, or a
    /// database error. Nothing is written on error.
    pub fn apply_command(
        &mut self,
        command: Command,
        actor: &Actor,
    ) -> Result<PersistedTransition, PersistenceError> {
        self.conn
            .immediate_transaction(|conn| mutations::transition::apply_command(conn, command, actor))
    }

    // ========================================================================
    // Roster Queries
    // ========================================================================

    /// Lists members ordered by employee ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_members(
        &mut self,
        include_inactive: bool,
        department: Option<Department>,
    ) -> Result<Vec<ResourceMember>, PersistenceError> {
        queries::list_members(&mut self.conn, include_inactive, department)
    }

    /// Retrieves a member by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_member(&mut self, member_id: i64) -> Result<Option<ResourceMember>, PersistenceError> {
        queries::get_member(&mut self.conn, member_id)
    }

    /// Counts active members, optionally within one department.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_active_members(
        &mut self,
        department: Option<Department>,
    ) -> Result<usize, PersistenceError> {
        queries::count_active_members(&mut self.conn, department)
    }

    /// Lists allocations matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_allocations(
        &mut self,
        filter: &AllocationQuery,
    ) -> Result<Vec<Allocation>, PersistenceError> {
        queries::list_allocations(&mut self.conn, filter)
    }

    /// Retrieves an allocation by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_allocation(
        &mut self,
        allocation_id: i64,
    ) -> Result<Option<Allocation>, PersistenceError> {
        queries::get_allocation(&mut self.conn, allocation_id)
    }

    /// Lists soft bookings overlapping `range`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_soft_bookings(
        &mut self,
        range: Option<DateRange>,
        department: Option<Department>,
    ) -> Result<Vec<SoftBooking>, PersistenceError> {
        queries::list_soft_bookings(&mut self.conn, range, department)
    }

    /// Retrieves a soft booking by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_soft_booking(
        &mut self,
        booking_id: i64,
    ) -> Result<Option<SoftBooking>, PersistenceError> {
        queries::get_soft_booking(&mut self.conn, booking_id)
    }

    // ========================================================================
    // Imports
    // ========================================================================

    /// Resolves parsed allocation rows against stored data without writing.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn preview_allocation_import(
        &mut self,
        rows: &[ParsedRow],
    ) -> Result<ImportPreview, PersistenceError> {
        mutations::import::resolve_against_store(&mut self.conn, rows)
    }

    /// Re-resolves and commits parsed allocation rows under `strategy`.
    ///
    /// # Errors
    ///
    /// Returns an error if a query or write fails. Nothing is written on error.
    pub fn commit_allocation_import(
        &mut self,
        rows: &[ParsedRow],
        strategy: CommitStrategy,
        actor: &Actor,
    ) -> Result<ImportCommitResult, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::import::commit_import(conn, rows, strategy, actor)
        })
    }

    /// Creates imported members, skipping rows that no longer validate.
    ///
    /// # Errors
    ///
    /// Returns an error if a query or write fails. Nothing is written on error.
    pub fn import_members(
        &mut self,
        members: &[ResourceMember],
        actor: &Actor,
    ) -> Result<MemberImportResult, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::import::import_members(conn, members, actor)
        })
    }

    // ========================================================================
    // Activity Log
    // ========================================================================

    /// Lists activity newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_activity(
        &mut self,
        filter: &ActivityQuery,
    ) -> Result<Vec<ActivityLogEntry>, PersistenceError> {
        queries::list_activity(&mut self.conn, filter)
    }

    /// Retrieves one activity row.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::ActivityNotFound` if it does not exist.
    pub fn get_activity(&mut self, log_id: i64) -> Result<ActivityLogEntry, PersistenceError> {
        queries::get_activity(&mut self.conn, log_id)
    }

    /// Undoes one activity row and returns it flagged as reversed.
    ///
    /// # Errors
    ///
    /// Returns `ActivityNotFound`, `AlreadyReversed` or `UndoBlocked`, or a
    /// database error. Nothing is written on error.
    pub fn undo_activity(&mut self, log_id: i64) -> Result<ActivityLogEntry, PersistenceError> {
        self.conn
            .immediate_transaction(|conn| mutations::undo::undo_activity(conn, log_id))
    }

    // ========================================================================
    // Operators & Sessions
    // ========================================================================

    /// Creates a new operator.
    ///
    /// # Errors
    ///
    /// Returns an error if the login name is taken or the insert fails.
    pub fn create_operator(
        &mut self,
        login_name: &str,
        display_name: &str,
        password: &str,
        role: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::operators::create_operator(
            &mut self.conn,
            login_name,
            display_name,
            password,
            role,
        )
    }

    /// Retrieves an operator by login name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_operator_by_login(
        &mut self,
        login_name: &str,
    ) -> Result<Option<OperatorData>, PersistenceError> {
        queries::get_operator_by_login(&mut self.conn, login_name)
    }

    /// Retrieves an operator by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_operator_by_id(
        &mut self,
        operator_id: i64,
    ) -> Result<Option<OperatorData>, PersistenceError> {
        queries::get_operator_by_id(&mut self.conn, operator_id)
    }

    /// Lists all operators.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_operators(&mut self) -> Result<Vec<OperatorData>, PersistenceError> {
        queries::list_operators(&mut self.conn)
    }

    /// Counts operators.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_operators(&mut self) -> Result<i64, PersistenceError> {
        queries::count_operators(&mut self.conn)
    }

    /// Records an operator's successful login time.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_last_login(&mut self, operator_id: i64) -> Result<(), PersistenceError> {
        mutations::operators::update_last_login(&mut self.conn, operator_id)
    }

    /// Disables or re-enables an operator.
    ///
    /// # Errors
    ///
    /// Returns an error if the operator does not exist.
    pub fn set_operator_disabled(
        &mut self,
        operator_id: i64,
        disabled: bool,
    ) -> Result<(), PersistenceError> {
        mutations::operators::set_operator_disabled(&mut self.conn, operator_id, disabled)
    }

    /// Deletes an operator no activity row references.
    ///
    /// # Errors
    ///
    /// Returns `OperatorReferenced` or `OperatorNotFound`.
    pub fn delete_operator(&mut self, operator_id: i64) -> Result<(), PersistenceError> {
        self.conn
            .transaction(|conn| mutations::operators::delete_operator(conn, operator_id))
    }

    /// Replaces an operator's password and ends its sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if hashing or the update fails.
    pub fn update_password(
        &mut self,
        operator_id: i64,
        new_password: &str,
    ) -> Result<(), PersistenceError> {
        self.conn.transaction(|conn| {
            mutations::operators::update_password(conn, operator_id, new_password)
        })
    }

    /// Creates a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_session(
        &mut self,
        session_token: &str,
        operator_id: i64,
        expires_at: &str,
        login_history_id: Option<i64>,
    ) -> Result<i64, PersistenceError> {
        mutations::operators::create_session(
            &mut self.conn,
            session_token,
            operator_id,
            expires_at,
            login_history_id,
        )
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::get_session_by_token(&mut self.conn, session_token)
    }

    /// Lists live sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_sessions(&mut self) -> Result<Vec<SessionData>, PersistenceError> {
        queries::list_sessions(&mut self.conn)
    }

    /// Touches a session's last activity time.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_session_activity(&mut self, session_id: i64) -> Result<(), PersistenceError> {
        mutations::operators::update_session_activity(&mut self.conn, session_id)
    }

    /// Ends a session and records the logout. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn end_session(&mut self, session_id: i64) -> Result<bool, PersistenceError> {
        self.conn
            .transaction(|conn| mutations::operators::end_session(conn, session_id))
    }

    /// Deletes sessions that expired before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_expired_sessions(&mut self, now: &str) -> Result<usize, PersistenceError> {
        mutations::operators::delete_expired_sessions(&mut self.conn, now)
    }

    /// Records a login attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn record_login(&mut self, attempt: &LoginAttempt) -> Result<i64, PersistenceError> {
        mutations::operators::record_login(&mut self.conn, attempt)
    }

    /// Lists login attempts newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_login_history(
        &mut self,
        limit: i64,
    ) -> Result<Vec<LoginHistoryData>, PersistenceError> {
        queries::list_login_history(&mut self.conn, limit)
    }
}
