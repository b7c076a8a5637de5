// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::Actor;
use crate::error::AuditError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The kind of entity an activity row refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    /// A roster member.
    Member,
    /// A daily allocation.
    Allocation,
    /// A soft booking.
    SoftBooking,
}

impl EntityType {
    /// Converts this entity type to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "Member",
            Self::Allocation => "Allocation",
            Self::SoftBooking => "SoftBooking",
        }
    }
}

impl FromStr for EntityType {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Member" => Ok(Self::Member),
            "Allocation" => Ok(Self::Allocation),
            "SoftBooking" => Ok(Self::SoftBooking),
            _ => Err(AuditError::UnknownEntityType(s.to_string())),
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The kind of change an activity row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionType {
    /// The entity was created. `new_value` holds its JSON snapshot.
    Create,
    /// One field changed.
    Update,
    /// The entity was removed. `old_value` holds its JSON snapshot.
    Delete,
}

impl ActionType {
    /// Converts this action type to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl FromStr for ActionType {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATE" => Ok(Self::Create),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            _ => Err(AuditError::UnknownActionType(s.to_string())),
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One field's before and after values, as stored in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    /// Column name of the changed field.
    pub field_name: String,
    /// Value before the change.
    pub old_value: Option<String>,
    /// Value after the change.
    pub new_value: Option<String>,
}

impl FieldChange {
    /// Creates a field change.
    #[must_use]
    pub fn new(field_name: &str, old_value: Option<String>, new_value: Option<String>) -> Self {
        Self {
            field_name: field_name.to_string(),
            old_value,
            new_value,
        }
    }

    /// Returns whether the value actually changed.
    #[must_use]
    pub fn is_change(&self) -> bool {
        self.old_value != self.new_value
    }
}

/// An append-only activity log row.
///
/// Rows are never edited after they are written, except that undo flips
/// `is_reversed` exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    /// Identifier assigned by the database.
    pub log_id: Option<i64>,
    /// Kind of entity changed.
    pub entity_type: EntityType,
    /// Identifier of the changed entity.
    pub entity_id: i64,
    /// Kind of change.
    pub action_type: ActionType,
    /// Changed field, for updates.
    pub field_name: Option<String>,
    /// Previous value (or deleted snapshot).
    pub old_value: Option<String>,
    /// New value (or created snapshot).
    pub new_value: Option<String>,
    /// Who made the change.
    pub actor: Actor,
    /// When the row was written, as stored by the database.
    pub created_at: Option<String>,
    /// Whether the change has been undone.
    pub is_reversed: bool,
}

impl ActivityLogEntry {
    /// Records creation of an entity.
    ///
    /// # Arguments
    ///
    /// * `entity_type` - The kind of entity created
    /// * `entity_id` - The new entity's identifier
    /// * `snapshot` - JSON snapshot of the created entity
    /// * `actor` - Who created it
    #[must_use]
    pub const fn created(
        entity_type: EntityType,
        entity_id: i64,
        snapshot: String,
        actor: Actor,
    ) -> Self {
        Self {
            log_id: None,
            entity_type,
            entity_id,
            action_type: ActionType::Create,
            field_name: None,
            old_value: None,
            new_value: Some(snapshot),
            actor,
            created_at: None,
            is_reversed: false,
        }
    }

    /// Records deletion of an entity.
    ///
    /// # Arguments
    ///
    /// * `entity_type` - The kind of entity deleted
    /// * `entity_id` - The deleted entity's identifier
    /// * `snapshot` - JSON snapshot of the entity before deletion
    /// * `actor` - Who deleted it
    #[must_use]
    pub const fn deleted(
        entity_type: EntityType,
        entity_id: i64,
        snapshot: String,
        actor: Actor,
    ) -> Self {
        Self {
            log_id: None,
            entity_type,
            entity_id,
            action_type: ActionType::Delete,
            field_name: None,
            old_value: Some(snapshot),
            new_value: None,
            actor,
            created_at: None,
            is_reversed: false,
        }
    }

    /// Records a change to one field.
    #[must_use]
    pub fn updated(
        entity_type: EntityType,
        entity_id: i64,
        change: FieldChange,
        actor: Actor,
    ) -> Self {
        Self {
            log_id: None,
            entity_type,
            entity_id,
            action_type: ActionType::Update,
            field_name: Some(change.field_name),
            old_value: change.old_value,
            new_value: change.new_value,
            actor,
            created_at: None,
            is_reversed: false,
        }
    }

    /// Records one update row per field that actually changed.
    ///
    /// Unchanged fields produce no rows.
    #[must_use]
    pub fn field_updates(
        entity_type: EntityType,
        entity_id: i64,
        changes: Vec<FieldChange>,
        actor: &Actor,
    ) -> Vec<Self> {
        changes
            .into_iter()
            .filter(FieldChange::is_change)
            .map(|change| Self::updated(entity_type, entity_id, change, actor.clone()))
            .collect()
    }

    /// Plans the inverse of this entry.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The entry has already been reversed
    /// - An update entry has no field name
    /// - A delete entry has no parseable JSON snapshot
    pub fn reversal(&self) -> Result<Reversal, AuditError> {
        if self.is_reversed {
            return Err(AuditError::AlreadyReversed {
                log_id: self.log_id,
            });
        }

        match self.action_type {
            ActionType::Update => {
                let field_name: String =
                    self.field_name
                        .clone()
                        .ok_or(AuditError::MissingFieldName {
                            log_id: self.log_id,
                        })?;
                Ok(Reversal::RestoreField {
                    entity_type: self.entity_type,
                    entity_id: self.entity_id,
                    field_name,
                    value: self.old_value.clone(),
                })
            }
            ActionType::Create => Ok(Reversal::DeleteEntity {
                entity_type: self.entity_type,
                entity_id: self.entity_id,
            }),
            ActionType::Delete => {
                let snapshot: &str =
                    self.old_value
                        .as_deref()
                        .ok_or_else(|| AuditError::MissingSnapshot {
                            log_id: self.log_id,
                            reason: String::from("no snapshot recorded"),
                        })?;
                let parsed: serde_json::Value =
                    serde_json::from_str(snapshot).map_err(|e| AuditError::MissingSnapshot {
                        log_id: self.log_id,
                        reason: e.to_string(),
                    })?;
                if !parsed.is_object() {
                    return Err(AuditError::MissingSnapshot {
                        log_id: self.log_id,
                        reason: String::from("snapshot is not a JSON object"),
                    });
                }
                Ok(Reversal::RecreateEntity {
                    entity_type: self.entity_type,
                    entity_id: self.entity_id,
                    snapshot: parsed,
                })
            }
        }
    }
}

/// The inverse operation that undoes one activity entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Reversal {
    /// Put a field back to its previous value.
    RestoreField {
        /// Kind of entity.
        entity_type: EntityType,
        /// Entity identifier.
        entity_id: i64,
        /// Field to restore.
        field_name: String,
        /// Previous value.
        value: Option<String>,
    },
    /// Remove an entity that was created.
    DeleteEntity {
        /// Kind of entity.
        entity_type: EntityType,
        /// Entity identifier.
        entity_id: i64,
    },
    /// Recreate a deleted entity under its original identifier.
    RecreateEntity {
        /// Kind of entity.
        entity_type: EntityType,
        /// Original entity identifier.
        entity_id: i64,
        /// Snapshot of the entity as it was before deletion.
        snapshot: serde_json::Value,
    },
}
