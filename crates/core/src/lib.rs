// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod apply;
mod command;
mod error;
mod export;
mod fields;
mod import;
mod merge;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::{apply, creation_activity, deletion_activity, snapshot};
pub use command::{AllocationChanges, Command, MemberChanges};
pub use error::CoreError;
pub use export::{AllocationRun, collapse_allocations};
pub use fields::{
    allocation_field_changes, format_man_days, member_field_changes, set_allocation_field,
    set_member_field,
};
pub use import::{
    ImportAction, ImportConflict, ImportPreview, ImportRow, ImportRowError, ImportWarning,
    ImportWarningKind, MAX_IMPORT_ROW_DAYS, ParsedRow, resolve_import,
};
pub use merge::{CommitPlan, CommitStrategy, plan_commit};
pub use state::{Mutation, Roster, TransitionResult};
