// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability computation for authorization-aware UI gating.
//!
//! Capabilities expose what actions an operator is permitted to perform.
//! They are advisory only and do not replace backend authorization checks.

use crate::auth::{AuthenticatedActor, Role};
use crate::request_response::{Capability, GlobalCapabilities, OperatorCapabilities};
use crewplan_persistence::OperatorData;

/// Computes global capabilities for an authenticated operator.
///
/// Disabled operators have none.
#[must_use]
pub const fn compute_global_capabilities(
    actor: &AuthenticatedActor,
    operator: &OperatorData,
) -> GlobalCapabilities {
    if operator.is_disabled {
        return GlobalCapabilities {
            can_edit_roster: Capability::Denied,
            can_import: Capability::Denied,
            can_undo: Capability::Denied,
            can_export: Capability::Denied,
            can_manage_operators: Capability::Denied,
        };
    }

    let can_edit: bool = matches!(actor.role, Role::Admin | Role::Manager);
    GlobalCapabilities {
        can_edit_roster: Capability::from_bool(can_edit),
        can_import: Capability::from_bool(can_edit),
        can_undo: Capability::from_bool(can_edit),
        can_export: Capability::Allowed,
        can_manage_operators: Capability::from_bool(matches!(actor.role, Role::Admin)),
    }
}

/// Computes what `actor` may do to `target`.
///
/// Only admins act on operators. Nobody may disable or delete themselves,
/// and the last active admin is protected from both.
///
/// # Arguments
///
/// * `actor` - The authenticated actor
/// * `target` - The operator being evaluated
/// * `active_admin_count` - Active admins currently stored
#[must_use]
pub fn compute_operator_capabilities(
    actor: &AuthenticatedActor,
    target: &OperatorData,
    active_admin_count: usize,
) -> OperatorCapabilities {
    if actor.role != Role::Admin || actor.operator_id == target.operator_id {
        return OperatorCapabilities {
            can_disable: Capability::Denied,
            can_delete: Capability::Denied,
        };
    }

    let is_last_active_admin: bool =
        target.role == Role::Admin.as_str() && !target.is_disabled && active_admin_count <= 1;

    OperatorCapabilities {
        can_disable: Capability::from_bool(!target.is_disabled && !is_last_active_admin),
        can_delete: Capability::from_bool(!is_last_active_admin),
    }
}

/// Number of enabled operators holding the Admin role.
#[must_use]
pub fn count_active_admins(operators: &[OperatorData]) -> usize {
    operators
        .iter()
        .filter(|op| op.role == Role::Admin.as_str() && !op.is_disabled)
        .count()
}
