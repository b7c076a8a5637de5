// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Allocation spreadsheet import: conflict resolution.
//!
//! Each spreadsheet row books one member for a date range. Rows are validated
//! one at a time, spread evenly over the calendar days of their range, and
//! checked against the allocations already stored. A bad row never stops the
//! batch. A row whose dates overlap an earlier row for the same member in the
//! same file is rejected, so one upload never books a member twice. Overlaps are reported as conflicts and are never merged here; the
//! caller decides what to do with them through a commit strategy.

use crewplan_domain::{
    Allocation, DateRange, DomainError, FULL_DAY_MAN_DAYS, MAN_DAY_EPSILON, ResourceMember,
    is_weekend, parse_iso_date, parse_man_days,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use time::Date;

/// Longest date range, in calendar days, a single import row may cover.
pub const MAX_IMPORT_ROW_DAYS: u32 = 366;

/// What the spreadsheet row asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImportAction {
    /// Add new bookings.
    New,
    /// Rebook dates that already carry allocations.
    Update,
}

impl ImportAction {
    /// Converts this action to its spreadsheet representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Update => "UPDATE",
        }
    }
}

impl FromStr for ImportAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NEW" => Ok(Self::New),
            "UPDATE" => Ok(Self::Update),
            other => Err(format!("Action must be NEW or UPDATE, got '{other}'")),
        }
    }
}

/// One spreadsheet row exactly as read, before any validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRow {
    /// 1-based position among data rows (header excluded).
    pub row_number: usize,
    /// `Action` column.
    pub action: String,
    /// `Emp ID` column.
    pub emp_id: String,
    /// `Show Name` column.
    pub show_name: String,
    /// `Shot Name` column.
    pub shot_name: String,
    /// `Start Date` column.
    pub start_date: String,
    /// `End Date` column.
    pub end_date: String,
    /// `Total MD` column.
    pub total_md: String,
    /// `Notes` column.
    pub notes: String,
}

/// A row that passed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRow {
    /// 1-based position among data rows.
    pub row_number: usize,
    /// Requested action.
    pub action: ImportAction,
    /// Resolved member.
    pub member_id: i64,
    /// Employee identifier as stored on the member.
    pub emp_id: String,
    /// Member display name.
    pub member_name: String,
    /// Show to book.
    pub show_name: Option<String>,
    /// Shot to book.
    pub shot_name: Option<String>,
    /// Booked dates.
    pub range: DateRange,
    /// Total man-days across the range.
    pub total_man_days: f64,
    /// Man-days per calendar day.
    pub per_day_man_days: f64,
    /// Notes copied onto every daily allocation.
    pub notes: Option<String>,
}

impl ImportRow {
    /// Expands the row into one allocation per calendar day.
    ///
    /// Saturday and Sunday allocations are flagged as weekend work.
    #[must_use]
    pub fn daily_allocations(&self) -> Vec<Allocation> {
        self.range
            .days()
            .map(|date| Allocation {
                allocation_id: None,
                member_id: self.member_id,
                allocation_date: date,
                show_name: self.show_name.clone(),
                shot_name: self.shot_name.clone(),
                man_days: self.per_day_man_days,
                is_leave: false,
                is_idle: false,
                is_weekend_working: is_weekend(date),
                notes: self.notes.clone(),
            })
            .collect()
    }
}

/// A valid row whose dates already carry allocations for the member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConflict {
    /// The incoming row.
    pub row: ImportRow,
    /// Stored allocations on the row's dates.
    pub existing: Vec<Allocation>,
}

/// A row that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRowError {
    /// 1-based position among data rows.
    pub row_number: usize,
    /// Employee identifier as written, if any.
    pub emp_id: Option<String>,
    /// Every problem found on the row.
    pub messages: Vec<String>,
}

/// Kinds of non-blocking observations about a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportWarningKind {
    /// Spreading the total puts more than one man-day on each day.
    PerDayOverFull,
    /// The range includes Saturday or Sunday.
    WeekendDays,
    /// An `UPDATE` row has no stored allocations to update.
    NothingToUpdate,
    /// The member is deactivated.
    InactiveMember,
}

/// A non-blocking observation about a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportWarning {
    /// 1-based position among data rows.
    pub row_number: usize,
    /// Employee identifier of the row.
    pub emp_id: String,
    /// What was observed.
    pub kind: ImportWarningKind,
    /// Human readable description.
    pub message: String,
}

/// Classification of every row in an import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportPreview {
    /// Rows with no stored allocations on their dates.
    pub valid: Vec<ImportRow>,
    /// Rows overlapping stored allocations.
    pub conflicts: Vec<ImportConflict>,
    /// Rows that failed validation.
    pub errors: Vec<ImportRowError>,
    /// Observations that do not block a row.
    pub warnings: Vec<ImportWarning>,
}

impl ImportPreview {
    /// Number of rows that can be committed under some strategy.
    #[must_use]
    pub fn committable_rows(&self) -> usize {
        self.valid.len() + self.conflicts.len()
    }

    /// Overall date span covered by valid and conflicting rows.
    #[must_use]
    pub fn date_span(&self) -> Option<DateRange> {
        let rows: Vec<&ImportRow> = self
            .valid
            .iter()
            .chain(self.conflicts.iter().map(|c| &c.row))
            .collect();
        let start: Option<Date> = rows.iter().map(|row| row.range.start()).min();
        let end: Option<Date> = rows.iter().map(|row| row.range.end()).max();
        start
            .zip(end)
            .and_then(|(start, end)| DateRange::new(start, end).ok())
    }
}

fn optional_text(value: &str) -> Option<String> {
    let trimmed: &str = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn date_field(label: &str, value: &str, messages: &mut Vec<String>) -> Option<Date> {
    if value.trim().is_empty() {
        messages.push(format!("{label} is required"));
        return None;
    }
    match parse_iso_date(value) {
        Ok(date) => Some(date),
        Err(DomainError::DateParseError { date_string, .. }) => {
            messages.push(format!("{label} '{date_string}' must be YYYY-MM-DD"));
            None
        }
        Err(err) => {
            messages.push(format!("{label}: {err}"));
            None
        }
    }
}

/// Validates one row against the roster.
///
/// # Errors
///
/// Returns every problem found on the row when it cannot be imported.
fn validate_row(
    row: &ParsedRow,
    members: &HashMap<String, &ResourceMember>,
) -> Result<ImportRow, ImportRowError> {
    let mut messages: Vec<String> = Vec::new();

    let action: Option<ImportAction> = match ImportAction::from_str(&row.action) {
        Ok(action) => Some(action),
        Err(msg) => {
            messages.push(msg);
            None
        }
    };

    let emp_id: &str = row.emp_id.trim();
    let member: Option<&ResourceMember> = if emp_id.is_empty() {
        messages.push(String::from("Emp ID is required"));
        None
    } else {
        let found: Option<&ResourceMember> =
            members.get(&emp_id.to_ascii_lowercase()).copied();
        if found.is_none() {
            messages.push(format!("Emp ID '{emp_id}' does not match any member"));
        }
        found
    };

    let start: Option<Date> = date_field("Start Date", &row.start_date, &mut messages);
    let end: Option<Date> = date_field("End Date", &row.end_date, &mut messages);
    let range: Option<DateRange> = match (start, end) {
        (Some(start), Some(end)) => match DateRange::new(start, end) {
            Ok(range) if range.calendar_days() > MAX_IMPORT_ROW_DAYS => {
                messages.push(format!(
                    "Date range covers {} days; a row may cover at most {MAX_IMPORT_ROW_DAYS}",
                    range.calendar_days()
                ));
                None
            }
            Ok(range) => Some(range),
            Err(_) => {
                messages.push(format!(
                    "End Date {} is before Start Date {}",
                    row.end_date.trim(),
                    row.start_date.trim()
                ));
                None
            }
        },
        _ => None,
    };

    let total: Option<f64> = if row.total_md.trim().is_empty() {
        messages.push(String::from("Total MD is required"));
        None
    } else {
        match parse_man_days(&row.total_md) {
            Ok(total) => Some(total),
            Err(_) => {
                messages.push(format!(
                    "Total MD '{}' must be a non-negative number",
                    row.total_md.trim()
                ));
                None
            }
        }
    };

    match (action, member, range, total) {
        (Some(action), Some(member), Some(range), Some(total)) if messages.is_empty() => {
            let member_id: i64 = member.member_id.unwrap_or_default();
            let per_day: f64 = total / f64::from(range.calendar_days());
            Ok(ImportRow {
                row_number: row.row_number,
                action,
                member_id,
                emp_id: member.emp_id.value().to_string(),
                member_name: member.name.clone(),
                show_name: optional_text(&row.show_name),
                shot_name: optional_text(&row.shot_name),
                range,
                total_man_days: total,
                per_day_man_days: per_day,
                notes: optional_text(&row.notes),
            })
        }
        _ => Err(ImportRowError {
            row_number: row.row_number,
            emp_id: optional_text(&row.emp_id),
            messages,
        }),
    }
}

fn warn(
    preview: &mut ImportPreview,
    row: &ImportRow,
    kind: ImportWarningKind,
    message: String,
) {
    preview.warnings.push(ImportWarning {
        row_number: row.row_number,
        emp_id: row.emp_id.clone(),
        kind,
        message,
    });
}

/// Classifies every row of an allocation import.
///
/// # Arguments
///
/// * `rows` - Spreadsheet rows as read
/// * `members` - The roster, used to resolve employee identifiers
/// * `existing` - Stored allocations that may overlap the rows
///
/// # Returns
///
/// The preview: valid rows, conflicts with the stored allocations they
/// overlap, per-row errors and warnings.
#[must_use]
pub fn resolve_import(
    rows: &[ParsedRow],
    members: &[ResourceMember],
    existing: &[Allocation],
) -> ImportPreview {
    let by_emp_id: HashMap<String, &ResourceMember> = members
        .iter()
        .filter(|m| m.member_id.is_some())
        .map(|m| (m.emp_id.key(), m))
        .collect();
    let active: HashMap<i64, bool> = members
        .iter()
        .filter_map(|m| m.member_id.map(|id| (id, m.is_active)))
        .collect();

    let mut preview: ImportPreview = ImportPreview::default();
    // Ranges already accepted from this file, per member.
    let mut accepted: HashMap<i64, Vec<(usize, DateRange)>> = HashMap::new();

    for parsed in rows {
        let row: ImportRow = match validate_row(parsed, &by_emp_id) {
            Ok(row) => row,
            Err(err) => {
                preview.errors.push(err);
                continue;
            }
        };

        let earlier: Option<usize> = accepted.get(&row.member_id).and_then(|ranges| {
            ranges
                .iter()
                .find(|(_, range)| range.overlaps(&row.range))
                .map(|(row_number, _)| *row_number)
        });
        if let Some(earlier) = earlier {
            preview.errors.push(ImportRowError {
                row_number: row.row_number,
                emp_id: optional_text(&parsed.emp_id),
                messages: vec![format!(
                    "Dates overlap row {earlier} for the same member in this file"
                )],
            });
            continue;
        }
        accepted
            .entry(row.member_id)
            .or_default()
            .push((row.row_number, row.range));

        if row.per_day_man_days > FULL_DAY_MAN_DAYS + MAN_DAY_EPSILON {
            warn(
                &mut preview,
                &row,
                ImportWarningKind::PerDayOverFull,
                format!(
                    "{:.2} MD per day exceeds a full day",
                    row.per_day_man_days
                ),
            );
        }

        let weekend_days: Vec<Date> = row.range.weekend_days();
        if !weekend_days.is_empty() {
            warn(
                &mut preview,
                &row,
                ImportWarningKind::WeekendDays,
                format!(
                    "Range includes {} weekend day(s); they will be booked as weekend work",
                    weekend_days.len()
                ),
            );
        }

        if active.get(&row.member_id) == Some(&false) {
            warn(
                &mut preview,
                &row,
                ImportWarningKind::InactiveMember,
                format!("Member '{}' is inactive", row.emp_id),
            );
        }

        let overlapping: Vec<Allocation> = existing
            .iter()
            .filter(|a| a.member_id == row.member_id && row.range.contains(a.allocation_date))
            .cloned()
            .collect();

        if overlapping.is_empty() {
            if row.action == ImportAction::Update {
                warn(
                    &mut preview,
                    &row,
                    ImportWarningKind::NothingToUpdate,
                    String::from("UPDATE row has no existing allocations; it will be added as new"),
                );
            }
            preview.valid.push(row);
        } else {
            preview.conflicts.push(ImportConflict {
                row,
                existing: overlapping,
            });
        }
    }

    preview
}
