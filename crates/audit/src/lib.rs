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
    clippy::all
)]

mod entry;
mod error;

#[cfg(test)]
mod tests;

pub use entry::{ActionType, ActivityLogEntry, EntityType, FieldChange, Reversal};
pub use error::AuditError;

use serde::{Deserialize, Serialize};

/// Represents the operator performing an action.
///
/// Every activity log row records who made the change. System-initiated
/// changes (e.g. bootstrap) carry no operator id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The operator's database identifier, if the actor is an operator.
    pub operator_id: Option<i64>,
    /// The login name recorded in the log.
    pub login_name: String,
    /// The type of actor (e.g., "operator", "system").
    pub actor_type: String,
}

impl Actor {
    /// Creates an actor for an authenticated operator.
    ///
    /// # Arguments
    ///
    /// * `operator_id` - The operator's database identifier
    /// * `login_name` - The operator's login name
    #[must_use]
    pub fn operator(operator_id: i64, login_name: String) -> Self {
        Self {
            operator_id: Some(operator_id),
            login_name,
            actor_type: String::from("operator"),
        }
    }

    /// Creates the actor used for changes the service makes on its own.
    #[must_use]
    pub fn system() -> Self {
        Self {
            operator_id: None,
            login_name: String::from("system"),
            actor_type: String::from("system"),
        }
    }
}
