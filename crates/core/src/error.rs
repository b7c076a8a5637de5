// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crewplan_audit::{AuditError, EntityType};
use crewplan_domain::DomainError;

/// Errors that can occur during state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// An activity log entry could not be interpreted.
    Audit(AuditError),
    /// An entity could not be converted to or from its JSON snapshot.
    Snapshot(String),
    /// A logged field name does not exist on the entity.
    UnknownField {
        /// The kind of entity.
        entity_type: EntityType,
        /// The field name.
        field_name: String,
    },
    /// A logged field value cannot be restored onto the entity.
    InvalidFieldValue {
        /// The field name.
        field_name: String,
        /// The rejected value.
        value: Option<String>,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::Audit(err) => write!(f, "Activity log error: {err}"),
            Self::Snapshot(msg) => write!(f, "Snapshot error: {msg}"),
            Self::UnknownField {
                entity_type,
                field_name,
            } => write!(f, "{entity_type} has no field '{field_name}'"),
            Self::InvalidFieldValue { field_name, value } => match value {
                Some(value) => write!(f, "Cannot set '{field_name}' to '{value}'"),
                None => write!(f, "Field '{field_name}' cannot be empty"),
            },
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}

impl From<AuditError> for CoreError {
    fn from(err: AuditError) -> Self {
        Self::Audit(err)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Snapshot(err.to_string())
    }
}
