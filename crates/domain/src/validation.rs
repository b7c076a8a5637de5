// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{EmpId, ResourceMember};

/// Validates that a member's basic field constraints are met.
///
/// This function checks that required fields are not empty.
/// It does NOT check for uniqueness (that requires context).
///
/// # Arguments
///
/// * `member` - The member to validate
///
/// # Errors
///
/// Returns an error if:
/// - The employee ID is empty or contains whitespace
/// - The name is empty
/// - The designation is empty
/// - The shift is empty
pub fn validate_member_fields(member: &ResourceMember) -> Result<(), DomainError> {
    let emp_id: &str = member.emp_id.value();
    if emp_id.is_empty() {
        return Err(DomainError::InvalidEmpId(String::from(
            "Employee ID cannot be empty",
        )));
    }
    if emp_id.chars().any(char::is_whitespace) {
        return Err(DomainError::InvalidEmpId(format!(
            "Employee ID '{emp_id}' cannot contain whitespace"
        )));
    }

    if member.name.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Name cannot be empty",
        )));
    }

    if member.designation.trim().is_empty() {
        return Err(DomainError::InvalidDesignation(String::from(
            "Designation cannot be empty",
        )));
    }

    if member.shift.trim().is_empty() {
        return Err(DomainError::InvalidShift(String::from(
            "Shift cannot be empty",
        )));
    }

    Ok(())
}

/// Validates that an employee ID is unique across the roster.
///
/// Comparison ignores ASCII case. The member identified by `exclude_member_id`
/// is skipped so a member can keep its own ID on update.
///
/// # Arguments
///
/// * `emp_id` - The employee ID to check
/// * `exclude_member_id` - The member being updated, if any
/// * `existing_members` - The current roster
///
/// # Errors
///
/// Returns `DomainError::DuplicateEmpId` if another member already uses the ID.
pub fn validate_emp_id_unique(
    emp_id: &EmpId,
    exclude_member_id: Option<i64>,
    existing_members: &[ResourceMember],
) -> Result<(), DomainError> {
    let taken: bool = existing_members
        .iter()
        .filter(|member| exclude_member_id.is_none() || member.member_id != exclude_member_id)
        .any(|member| member.emp_id.matches(emp_id.value()));

    if taken {
        return Err(DomainError::DuplicateEmpId {
            emp_id: emp_id.value().to_string(),
        });
    }
    Ok(())
}
