// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Member spreadsheet preview and validation for bulk roster import.
//!
//! Nothing here writes. Each row is checked on its own and collects every
//! problem found, so one preview tells the operator everything to fix.

use std::collections::HashSet;
use std::str::FromStr;

use crewplan_domain::{Department, EmpId, EmployeeType, ResourceMember, validate_member_fields};

use crate::error::ApiError;
use crate::request_response::{MemberRowPreview, MemberRowStatus};
use crate::spreadsheet::{Columns, SheetRow, SheetTable};

const REQUIRED_COLUMNS: [&str; 5] = ["emp_id", "emp_name", "designation", "department", "shift"];

const OPTIONAL_COLUMNS: [&str; 2] = ["reporting_to", "employee_type"];

const COLUMN_ALIASES: [(&str, &str); 5] = [
    ("name", "emp_name"),
    ("artist_name", "emp_name"),
    ("employee_name", "emp_name"),
    ("employee_id", "emp_id"),
    ("dept", "department"),
];

/// Result of checking a member spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPreview {
    /// One entry per data row, in file order.
    pub rows: Vec<MemberRowPreview>,
    /// Members built from the valid rows, in file order.
    pub members: Vec<ResourceMember>,
}

impl MemberPreview {
    /// Number of rows that can be imported.
    #[must_use]
    pub fn valid_count(&self) -> usize {
        self.members.len()
    }

    /// Number of rows that cannot be imported.
    #[must_use]
    pub fn invalid_count(&self) -> usize {
        self.rows.len() - self.members.len()
    }

    /// Rows rejected by validation.
    #[must_use]
    pub fn invalid_rows(&self) -> Vec<MemberRowPreview> {
        self.rows
            .iter()
            .filter(|row| row.status == MemberRowStatus::Invalid)
            .cloned()
            .collect()
    }
}

/// Validates every row of a member spreadsheet against the stored roster.
///
/// An employee ID is rejected if a stored member already uses it or an
/// earlier row of the same file does (ignoring case).
///
/// # Errors
///
/// Returns `ApiError::InvalidSpreadsheet` if a required column is missing.
pub fn preview_members(
    table: &SheetTable,
    existing: &[ResourceMember],
) -> Result<MemberPreview, ApiError> {
    let columns: Columns = table.columns(&REQUIRED_COLUMNS, &OPTIONAL_COLUMNS, &COLUMN_ALIASES)?;

    let stored: HashSet<String> = existing.iter().map(|m| m.emp_id.key()).collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut preview: MemberPreview = MemberPreview {
        rows: Vec::new(),
        members: Vec::new(),
    };

    for row in &table.rows {
        let (errors, member): (Vec<String>, Option<ResourceMember>) =
            check_row(&columns, row, &stored, &mut seen);

        let status: MemberRowStatus = if errors.is_empty() {
            MemberRowStatus::Valid
        } else {
            MemberRowStatus::Invalid
        };
        preview.rows.push(MemberRowPreview {
            row_number: row.row_number,
            emp_id: columns.get(row, "emp_id").to_string(),
            name: columns.get(row, "emp_name").to_string(),
            department: columns.get(row, "department").to_string(),
            status,
            errors,
        });
        if let Some(member) = member {
            preview.members.push(member);
        }
    }

    Ok(preview)
}

fn check_row(
    columns: &Columns,
    row: &SheetRow,
    stored: &HashSet<String>,
    seen: &mut HashSet<String>,
) -> (Vec<String>, Option<ResourceMember>) {
    let mut errors: Vec<String> = Vec::new();

    for (column, label) in [
        ("emp_id", "Emp ID"),
        ("emp_name", "Emp Name"),
        ("designation", "Designation"),
        ("department", "Department"),
        ("shift", "Shift"),
    ] {
        if columns.get(row, column).is_empty() {
            errors.push(format!("{label} is required"));
        }
    }

    let emp_id: EmpId = EmpId::new(columns.get(row, "emp_id"));
    if !emp_id.value().is_empty() {
        let key: String = emp_id.key();
        if stored.contains(&key) {
            errors.push(format!("Emp ID '{emp_id}' already exists on the roster"));
        } else if !seen.insert(key) {
            errors.push(format!("Emp ID '{emp_id}' appears more than once in the file"));
        }
    }

    let department_text: &str = columns.get(row, "department");
    let department: Option<Department> = if department_text.is_empty() {
        None
    } else {
        Department::from_str(department_text)
            .map_err(|_| {
                errors.push(format!(
                    "Unknown department '{department_text}' (expected Roto, Paint, Comp, MMRA, Prep or FX)"
                ));
            })
            .ok()
    };

    let employee_type_text: &str = columns.get(row, "employee_type");
    let employee_type: EmployeeType = if employee_type_text.is_empty() {
        EmployeeType::default()
    } else {
        EmployeeType::from_str(employee_type_text).unwrap_or_else(|_| {
            errors.push(format!("Unknown employee type '{employee_type_text}'"));
            EmployeeType::default()
        })
    };

    let reporting_to: &str = columns.get(row, "reporting_to");
    let member: Option<ResourceMember> = department.map(|department| {
        ResourceMember::new(
            emp_id,
            columns.get(row, "emp_name").to_string(),
            columns.get(row, "designation").to_string(),
            department,
            columns.get(row, "shift").to_string(),
            employee_type,
            (!reporting_to.is_empty()).then(|| reporting_to.to_string()),
        )
    });

    // Field rules beyond presence, e.g. whitespace inside the Emp ID.
    let field_error: Option<String> = if errors.is_empty() {
        member
            .as_ref()
            .and_then(|m| validate_member_fields(m).err())
            .map(|err| err.to_string())
    } else {
        None
    };
    errors.extend(field_error);

    if errors.is_empty() {
        (errors, member)
    } else {
        (errors, None)
    }
}
