// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::password_policy::PasswordPolicyError;
use crewplan::CoreError;
use crewplan_audit::AuditError;
use crewplan_domain::DomainError;
use crewplan_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// An uploaded spreadsheet could not be read as a table.
    InvalidSpreadsheet {
        /// Why the file was rejected.
        reason: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The change has already been applied or undone.
    AlreadyApplied {
        /// A human-readable description.
        message: String,
    },
    /// The request conflicts with the current stored data.
    Conflict {
        /// A human-readable description.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
    /// Password policy violation.
    PasswordPolicyViolation {
        /// A human-readable description of the policy violation.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::InvalidSpreadsheet { reason } => {
                write!(f, "Invalid spreadsheet: {reason}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::AlreadyApplied { message } | Self::Conflict { message } => {
                write!(f, "{message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
            Self::PasswordPolicyViolation { message } => {
                write!(f, "Password policy violation: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::PasswordPolicyViolation {
            message: err.to_string(),
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        translate_persistence_error(err)
    }
}

fn invalid(field: &str, message: String) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message,
    }
}

fn not_found(resource_type: &str, message: String) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: resource_type.to_string(),
        message,
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidEmpId(msg) => invalid("emp_id", msg),
        DomainError::InvalidName(msg) => invalid("name", msg),
        DomainError::InvalidDesignation(msg) => invalid("designation", msg),
        DomainError::InvalidDepartment(msg) => invalid("department", msg),
        DomainError::InvalidEmployeeType(msg) => invalid("employee_type", msg),
        DomainError::InvalidShift(msg) => invalid("shift", msg),
        DomainError::InvalidShowName(msg) => invalid("show_name", msg),
        DomainError::InvalidManagerName(msg) => invalid("manager_name", msg),
        DomainError::InvalidManDays(msg) => invalid("man_days", msg),
        DomainError::ConflictingAllocationFlags(msg) => invalid("is_leave", msg),
        DomainError::DuplicateEmpId { emp_id } => ApiError::DomainRuleViolation {
            rule: String::from("unique_emp_id"),
            message: format!("Employee ID '{emp_id}' is already used by another member"),
        },
        DomainError::MemberNotFound { member_id } => {
            not_found("Member", format!("Member {member_id} does not exist"))
        }
        DomainError::EmpIdNotFound { emp_id } => {
            not_found("Member", format!("No member has employee ID '{emp_id}'"))
        }
        DomainError::AllocationNotFound { allocation_id } => not_found(
            "Allocation",
            format!("Allocation {allocation_id} does not exist"),
        ),
        DomainError::SoftBookingNotFound { booking_id } => not_found(
            "Soft booking",
            format!("Soft booking {booking_id} does not exist"),
        ),
        DomainError::InvalidDateRange { start, end } => invalid(
            "end_date",
            format!("End date {end} is before start date {start}"),
        ),
        DomainError::DateParseError { date_string, error } => invalid(
            "date",
            format!("Failed to parse date '{date_string}': {error}"),
        ),
        DomainError::DateArithmeticOverflow { operation } => invalid(
            "date",
            format!("Date arithmetic overflow while {operation}"),
        ),
        DomainError::InvalidDesignationSplit {
            senior,
            mid,
            junior,
        } => invalid(
            "split",
            format!("Senior {senior}% + mid {mid}% + junior {junior}% must equal 100%"),
        ),
    }
}

/// Translates an activity log error into an API error.
#[must_use]
pub fn translate_audit_error(err: AuditError) -> ApiError {
    match err {
        AuditError::AlreadyReversed { .. } => ApiError::AlreadyApplied {
            message: err.to_string(),
        },
        AuditError::MissingFieldName { .. }
        | AuditError::MissingSnapshot { .. }
        | AuditError::UnknownEntityType(_)
        | AuditError::UnknownActionType(_) => ApiError::Internal {
            message: err.to_string(),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::Audit(audit_err) => translate_audit_error(audit_err),
        CoreError::UnknownField { .. } | CoreError::InvalidFieldValue { .. } => {
            ApiError::Conflict {
                message: err.to_string(),
            }
        }
        CoreError::Snapshot(msg) => ApiError::Internal {
            message: format!("Snapshot error: {msg}"),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Storage details are not exposed beyond a short message.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::Core(core_err) => translate_core_error(core_err),
        PersistenceError::ActivityNotFound(log_id) => {
            not_found("Activity", format!("Activity {log_id} does not exist"))
        }
        PersistenceError::AlreadyReversed(log_id) => ApiError::AlreadyApplied {
            message: format!("Activity {log_id} has already been reversed"),
        },
        PersistenceError::UndoBlocked { log_id, reason } => ApiError::Conflict {
            message: format!("Activity {log_id} cannot be undone: {reason}"),
        },
        PersistenceError::OperatorNotFound(msg) => not_found("Operator", msg),
        PersistenceError::SessionNotFound(msg) => not_found("Session", msg),
        PersistenceError::NotFound(msg) => not_found("Record", msg),
        PersistenceError::OperatorReferenced { operator_id } => ApiError::Conflict {
            message: format!(
                "Operator {operator_id} is referenced by activity history; disable it instead"
            ),
        },
        PersistenceError::ConstraintViolation(msg) => ApiError::Conflict { message: msg },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
