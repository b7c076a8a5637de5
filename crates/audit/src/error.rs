// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors raised while interpreting activity log entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    /// The entry has already been undone.
    AlreadyReversed {
        /// The log entry identifier.
        log_id: Option<i64>,
    },
    /// An update entry carries no field name.
    MissingFieldName {
        /// The log entry identifier.
        log_id: Option<i64>,
    },
    /// A delete entry carries no usable snapshot of the removed entity.
    MissingSnapshot {
        /// The log entry identifier.
        log_id: Option<i64>,
        /// Why the snapshot is unusable.
        reason: String,
    },
    /// A stored entity type is not recognized.
    UnknownEntityType(String),
    /// A stored action type is not recognized.
    UnknownActionType(String),
}

impl std::fmt::Display for AuditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyReversed { log_id } => match log_id {
                Some(id) => write!(f, "Activity {id} has already been reversed"),
                None => write!(f, "Activity has already been reversed"),
            },
            Self::MissingFieldName { log_id } => {
                write!(f, "Update activity {log_id:?} does not name a field")
            }
            Self::MissingSnapshot { log_id, reason } => {
                write!(f, "Activity {log_id:?} has no usable snapshot: {reason}")
            }
            Self::UnknownEntityType(value) => write!(f, "Unknown entity type: {value}"),
            Self::UnknownActionType(value) => write!(f, "Unknown action type: {value}"),
        }
    }
}

impl std::error::Error for AuditError {}
