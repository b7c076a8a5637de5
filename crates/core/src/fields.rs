// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Field-level change tracking.
//!
//! Update rows in the activity log store one field per row as text. These
//! functions produce those rows from a before/after pair and write a logged
//! value back onto an entity when an update is undone.

use crate::error::CoreError;
use crewplan_audit::{EntityType, FieldChange};
use crewplan_domain::{
    Allocation, Department, EmpId, EmployeeType, ResourceMember, format_iso_date, parse_iso_date,
    parse_man_days,
};
use std::str::FromStr;

fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

fn flag(value: bool) -> Option<String> {
    Some(value.to_string())
}

/// Text form of a man-day quantity as written to the log.
#[must_use]
pub fn format_man_days(value: f64) -> String {
    format!("{value}")
}

/// Lists every member field, old against new.
#[must_use]
pub fn member_field_changes(before: &ResourceMember, after: &ResourceMember) -> Vec<FieldChange> {
    vec![
        FieldChange::new(
            "emp_id",
            text(before.emp_id.value()),
            text(after.emp_id.value()),
        ),
        FieldChange::new("name", text(&before.name), text(&after.name)),
        FieldChange::new(
            "designation",
            text(&before.designation),
            text(&after.designation),
        ),
        FieldChange::new(
            "department",
            text(before.department.as_str()),
            text(after.department.as_str()),
        ),
        FieldChange::new("shift", text(&before.shift), text(&after.shift)),
        FieldChange::new(
            "employee_type",
            text(before.employee_type.as_str()),
            text(after.employee_type.as_str()),
        ),
        FieldChange::new(
            "reporting_to",
            before.reporting_to.clone(),
            after.reporting_to.clone(),
        ),
        FieldChange::new("is_active", flag(before.is_active), flag(after.is_active)),
    ]
}

/// Lists every allocation field, old against new.
#[must_use]
pub fn allocation_field_changes(before: &Allocation, after: &Allocation) -> Vec<FieldChange> {
    vec![
        FieldChange::new(
            "allocation_date",
            Some(format_iso_date(before.allocation_date)),
            Some(format_iso_date(after.allocation_date)),
        ),
        FieldChange::new(
            "show_name",
            before.show_name.clone(),
            after.show_name.clone(),
        ),
        FieldChange::new(
            "shot_name",
            before.shot_name.clone(),
            after.shot_name.clone(),
        ),
        FieldChange::new(
            "man_days",
            Some(format_man_days(before.man_days)),
            Some(format_man_days(after.man_days)),
        ),
        FieldChange::new("is_leave", flag(before.is_leave), flag(after.is_leave)),
        FieldChange::new("is_idle", flag(before.is_idle), flag(after.is_idle)),
        FieldChange::new(
            "is_weekend_working",
            flag(before.is_weekend_working),
            flag(after.is_weekend_working),
        ),
        FieldChange::new("notes", before.notes.clone(), after.notes.clone()),
    ]
}

fn required<'a>(field_name: &str, value: Option<&'a str>) -> Result<&'a str, CoreError> {
    value.ok_or_else(|| CoreError::InvalidFieldValue {
        field_name: field_name.to_string(),
        value: None,
    })
}

fn parse_flag(field_name: &str, value: Option<&str>) -> Result<bool, CoreError> {
    match required(field_name, value)? {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(CoreError::InvalidFieldValue {
            field_name: field_name.to_string(),
            value: Some(other.to_string()),
        }),
    }
}

fn optional(value: Option<&str>) -> Option<String> {
    value.map(str::to_string).filter(|v| !v.trim().is_empty())
}

/// Writes a logged value back onto a member.
///
/// # Errors
///
/// Returns an error if the field is unknown or the value does not fit it.
pub fn set_member_field(
    member: &mut ResourceMember,
    field_name: &str,
    value: Option<&str>,
) -> Result<(), CoreError> {
    match field_name {
        "emp_id" => member.emp_id = EmpId::new(required(field_name, value)?),
        "name" => member.name = required(field_name, value)?.to_string(),
        "designation" => member.designation = required(field_name, value)?.to_string(),
        "department" => member.department = Department::from_str(required(field_name, value)?)?,
        "shift" => member.shift = required(field_name, value)?.to_string(),
        "employee_type" => {
            member.employee_type = EmployeeType::from_str(required(field_name, value)?)?;
        }
        "reporting_to" => member.reporting_to = optional(value),
        "is_active" => member.is_active = parse_flag(field_name, value)?,
        _ => {
            return Err(CoreError::UnknownField {
                entity_type: EntityType::Member,
                field_name: field_name.to_string(),
            });
        }
    }
    Ok(())
}

/// Writes a logged value back onto an allocation.
///
/// # Errors
///
/// Returns an error if the field is unknown or the value does not fit it.
pub fn set_allocation_field(
    allocation: &mut Allocation,
    field_name: &str,
    value: Option<&str>,
) -> Result<(), CoreError> {
    match field_name {
        "allocation_date" => {
            allocation.allocation_date = parse_iso_date(required(field_name, value)?)?;
        }
        "show_name" => allocation.show_name = optional(value),
        "shot_name" => allocation.shot_name = optional(value),
        "man_days" => allocation.man_days = parse_man_days(required(field_name, value)?)?,
        "is_leave" => allocation.is_leave = parse_flag(field_name, value)?,
        "is_idle" => allocation.is_idle = parse_flag(field_name, value)?,
        "is_weekend_working" => allocation.is_weekend_working = parse_flag(field_name, value)?,
        "notes" => allocation.notes = optional(value),
        _ => {
            return Err(CoreError::UnknownField {
                entity_type: EntityType::Allocation,
                field_name: field_name.to_string(),
            });
        }
    }
    Ok(())
}
