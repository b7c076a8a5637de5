// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Spreadsheet import against stored data.
//!
//! Preview and commit both resolve the parsed rows against what is stored at
//! the time of the call. Commit runs inside the caller's immediate
//! transaction, so the conflicts it acts on are the ones it just read.

use diesel::SqliteConnection;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crewplan::{
    Command, CommitPlan, CommitStrategy, ImportPreview, Mutation, ParsedRow, Roster,
    TransitionResult, apply, creation_activity, deletion_activity, plan_commit, resolve_import,
};
use crewplan_audit::{Actor, EntityType};
use crewplan_domain::{Allocation, DateRange, ResourceMember};

use crate::error::PersistenceError;
use crate::mutations::activity::append_activity;
use crate::mutations::roster::{delete_allocation, insert_allocation};
use crate::mutations::transition::persist_transition;
use crate::queries::{AllocationQuery, list_allocations, list_members};

/// Outcome of committing an allocation import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportCommitResult {
    pub strategy: CommitStrategy,
    /// Daily allocations inserted.
    pub inserted: usize,
    /// Stored allocations deleted by `replace`.
    pub deleted: usize,
    /// Rows whose allocations were written.
    pub committed_rows: Vec<usize>,
    /// Conflicting rows left untouched by `skip`.
    pub skipped_rows: Vec<usize>,
    /// The resolution the commit acted on.
    pub preview: ImportPreview,
}

/// A member import row that was not created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedMember {
    pub emp_id: String,
    pub reason: String,
}

/// Outcome of committing a member import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberImportResult {
    pub created: Vec<ResourceMember>,
    pub skipped: Vec<SkippedMember>,
}

/// Resolves parsed rows against the stored roster and allocations.
///
/// Only allocations inside the span covered by the rows are loaded.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn resolve_against_store(
    conn: &mut SqliteConnection,
    rows: &[ParsedRow],
) -> Result<ImportPreview, PersistenceError> {
    let members: Vec<ResourceMember> = list_members(conn, true, None)?;
    let span: Option<DateRange> = resolve_import(rows, &members, &[]).date_span();
    let existing: Vec<Allocation> = match span {
        Some(range) => list_allocations(conn, &AllocationQuery::within(range))?,
        None => Vec::new(),
    };
    Ok(resolve_import(rows, &members, &existing))
}

/// Commits an allocation import under `strategy`.
///
/// Every deleted and inserted allocation gets its own activity row.
///
/// # Errors
///
/// Returns an error if a query or write fails.
pub fn commit_import(
    conn: &mut SqliteConnection,
    rows: &[ParsedRow],
    strategy: CommitStrategy,
    actor: &Actor,
) -> Result<ImportCommitResult, PersistenceError> {
    let preview: ImportPreview = resolve_against_store(conn, rows)?;
    let plan: CommitPlan = plan_commit(&preview, strategy);

    for allocation in &plan.deletions {
        let Some(allocation_id) = allocation.allocation_id else {
            continue;
        };
        delete_allocation(conn, allocation_id)?;
        append_activity(
            conn,
            &deletion_activity(
                EntityType::Allocation,
                allocation_id,
                allocation,
                actor.clone(),
            )?,
        )?;
    }

    for allocation in &plan.insertions {
        let allocation_id: i64 = insert_allocation(conn, allocation)?;
        let stored: Allocation = allocation.clone().with_id(allocation_id);
        append_activity(
            conn,
            &creation_activity(
                EntityType::Allocation,
                allocation_id,
                &stored,
                actor.clone(),
            )?,
        )?;
    }

    let skipped_rows: Vec<usize> = plan.skipped.iter().map(|c| c.row.row_number).collect();
    info!(
        %strategy,
        inserted = plan.insertions.len(),
        deleted = plan.deletions.len(),
        skipped = skipped_rows.len(),
        errors = preview.errors.len(),
        actor = %actor.login_name,
        "Committed allocation import"
    );

    Ok(ImportCommitResult {
        strategy,
        inserted: plan.insertions.len(),
        deleted: plan.deletions.len(),
        committed_rows: plan.committed_rows,
        skipped_rows,
        preview,
    })
}

/// Creates members from an import, one `CreateMember` command per row.
///
/// Rows rejected by validation, including employee IDs taken since the
/// preview, are reported as skipped and do not stop the batch.
///
/// # Errors
///
/// Returns an error if a query or write fails.
pub fn import_members(
    conn: &mut SqliteConnection,
    members: &[ResourceMember],
    actor: &Actor,
) -> Result<MemberImportResult, PersistenceError> {
    let mut roster: Roster = Roster::new(list_members(conn, true, None)?, Vec::new(), Vec::new());
    let mut result: MemberImportResult = MemberImportResult {
        created: Vec::new(),
        skipped: Vec::new(),
    };

    for member in members {
        let command: Command = Command::CreateMember {
            emp_id: member.emp_id.value().to_string(),
            name: member.name.clone(),
            designation: member.designation.clone(),
            department: member.department,
            shift: member.shift.clone(),
            employee_type: member.employee_type,
            reporting_to: member.reporting_to.clone(),
        };
        let transition: TransitionResult = match apply(&roster, command, actor) {
            Ok(transition) => transition,
            Err(err) => {
                warn!(emp_id = member.emp_id.value(), error = %err, "Skipping imported member");
                result.skipped.push(SkippedMember {
                    emp_id: member.emp_id.value().to_string(),
                    reason: err.to_string(),
                });
                continue;
            }
        };
        let member_id: i64 = persist_transition(conn, &transition, actor)?.entity_id;
        let created: ResourceMember = match transition.mutation {
            Mutation::InsertMember(inserted) => inserted.with_id(member_id),
            _ => member.clone().with_id(member_id),
        };
        roster.members.push(created.clone());
        result.created.push(created);
    }

    info!(
        created = result.created.len(),
        skipped = result.skipped.len(),
        actor = %actor.login_name,
        "Committed member import"
    );
    Ok(result)
}
