// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Turning an allocation spreadsheet into rows for the conflict resolver.

use crewplan::ParsedRow;

use crate::error::ApiError;
use crate::spreadsheet::{Columns, SheetTable};

const REQUIRED_COLUMNS: [&str; 5] = ["action", "emp_id", "start_date", "end_date", "total_md"];

const OPTIONAL_COLUMNS: [&str; 3] = ["show_name", "shot_name", "notes"];

// Headers written by the allocation export, so an exported file re-imports.
const COLUMN_ALIASES: [(&str, &str); 4] = [
    ("show", "show_name"),
    ("shot", "shot_name"),
    ("md", "total_md"),
    ("employee_id", "emp_id"),
];

/// Reads every data row of an allocation spreadsheet as text.
///
/// No cell is validated here; that is the resolver's job, row by row.
///
/// # Errors
///
/// Returns `ApiError::InvalidSpreadsheet` if a required column is missing.
pub fn parse_allocation_rows(table: &SheetTable) -> Result<Vec<ParsedRow>, ApiError> {
    let columns: Columns = table.columns(&REQUIRED_COLUMNS, &OPTIONAL_COLUMNS, &COLUMN_ALIASES)?;

    Ok(table
        .rows
        .iter()
        .map(|row| ParsedRow {
            row_number: row.row_number,
            action: columns.get(row, "action").to_string(),
            emp_id: columns.get(row, "emp_id").to_string(),
            show_name: columns.get(row, "show_name").to_string(),
            shot_name: columns.get(row, "shot_name").to_string(),
            start_date: columns.get(row, "start_date").to_string(),
            end_date: columns.get(row, "end_date").to_string(),
            total_md: columns.get(row, "total_md").to_string(),
            notes: columns.get(row, "notes").to_string(),
        })
        .collect())
}
