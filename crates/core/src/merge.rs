// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::import::{ImportConflict, ImportPreview, ImportRow};
use crewplan_domain::Allocation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// How conflicting rows are committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitStrategy {
    /// Delete every stored allocation on the row's dates, then insert the new rows.
    Replace,
    /// Insert the new rows next to the stored ones.
    Add,
    /// Insert only rows without conflicts.
    Skip,
}

impl CommitStrategy {
    /// Converts this strategy to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Add => "add",
            Self::Skip => "skip",
        }
    }
}

impl FromStr for CommitStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "add" => Ok(Self::Add),
            "skip" => Ok(Self::Skip),
            other => Err(format!(
                "Strategy must be replace, add or skip, got '{other}'"
            )),
        }
    }
}

impl std::fmt::Display for CommitStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The writes an import commit performs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitPlan {
    /// Stored allocations to delete, each listed once.
    pub deletions: Vec<Allocation>,
    /// New daily allocations to insert.
    pub insertions: Vec<Allocation>,
    /// Rows whose allocations are inserted.
    pub committed_rows: Vec<usize>,
    /// Conflicting rows left untouched.
    pub skipped: Vec<ImportConflict>,
}

fn insert_row(plan: &mut CommitPlan, row: &ImportRow) {
    plan.insertions.extend(row.daily_allocations());
    plan.committed_rows.push(row.row_number);
}

/// Plans the writes for committing a preview under a strategy.
///
/// Rows that failed validation are never committed. Valid rows are always
/// inserted. Conflicting rows follow `strategy`.
#[must_use]
pub fn plan_commit(preview: &ImportPreview, strategy: CommitStrategy) -> CommitPlan {
    let mut plan: CommitPlan = CommitPlan::default();
    let mut deleted_ids: BTreeSet<i64> = BTreeSet::new();

    for row in &preview.valid {
        insert_row(&mut plan, row);
    }

    for conflict in &preview.conflicts {
        match strategy {
            CommitStrategy::Replace => {
                for existing in &conflict.existing {
                    let newly_listed: bool = existing
                        .allocation_id
                        .is_none_or(|id| deleted_ids.insert(id));
                    if newly_listed {
                        plan.deletions.push(existing.clone());
                    }
                }
                insert_row(&mut plan, &conflict.row);
            }
            CommitStrategy::Add => insert_row(&mut plan, &conflict.row),
            CommitStrategy::Skip => plan.skipped.push(conflict.clone()),
        }
    }

    plan.committed_rows.sort_unstable();
    plan
}
