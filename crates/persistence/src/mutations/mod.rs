// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! - `roster`: row-level writes for members, allocations and soft bookings
//! - `activity`: appending to the activity log and marking rows reversed
//! - `transition`: persisting a core `TransitionResult` with its activity
//! - `import`: spreadsheet import resolution and commit
//! - `undo`: applying the inverse of one activity row
//! - `operators`: operators, sessions and login history
//!
//! Functions here never open their own transaction. `Persistence` wraps each
//! public operation in one so a failure leaves no partial writes.

pub mod activity;
pub mod import;
pub mod operators;
pub mod roster;
pub mod transition;
pub mod undo;

pub use import::{ImportCommitResult, MemberImportResult, SkippedMember};
pub use transition::PersistedTransition;
