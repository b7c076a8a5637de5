// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV exports.
//!
//! Every field is quoted. The allocation export writes one row per run of
//! consecutive days, with `UPDATE` as the action, so the file can be edited
//! and fed back through the allocation import.

use std::collections::HashMap;

use csv::{QuoteStyle, Writer, WriterBuilder};
use crewplan::{AllocationRun, collapse_allocations, format_man_days};
use crewplan_audit::ActivityLogEntry;
use crewplan_domain::{Allocation, ResourceMember, format_iso_date};

use crate::error::ApiError;

/// Header of the allocation export.
pub const ALLOCATION_EXPORT_HEADER: [&str; 12] = [
    "Action",
    "Emp ID",
    "Artist Name",
    "Designation",
    "Department",
    "Shift",
    "Show",
    "Shot",
    "Start Date",
    "End Date",
    "Days",
    "Total MD",
];

/// Header of the activity export.
pub const ACTIVITY_EXPORT_HEADER: [&str; 11] = [
    "Log ID",
    "Timestamp",
    "Operator",
    "Entity Type",
    "Entity ID",
    "Action",
    "Field",
    "Old Value",
    "New Value",
    "Reversed",
    "Actor Type",
];

fn quoted_writer() -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new())
}

fn write_error(err: &impl std::fmt::Display) -> ApiError {
    ApiError::Internal {
        message: format!("Failed to write CSV: {err}"),
    }
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String, ApiError> {
    let bytes: Vec<u8> = writer.into_inner().map_err(|e| write_error(&e))?;
    String::from_utf8(bytes).map_err(|e| write_error(&e))
}

/// Writes productive allocations as collapsed date ranges.
///
/// Runs are ordered by employee ID, then show, shot and start date.
/// Allocations whose member is not in `members` are left out.
///
/// # Errors
///
/// Returns `ApiError::Internal` if the CSV cannot be written.
pub fn export_allocations_csv(
    allocations: &[Allocation],
    members: &[ResourceMember],
) -> Result<String, ApiError> {
    let by_id: HashMap<i64, &ResourceMember> = members
        .iter()
        .filter_map(|m| m.member_id.map(|id| (id, m)))
        .collect();

    let mut runs: Vec<(&ResourceMember, AllocationRun)> = collapse_allocations(allocations)
        .into_iter()
        .filter_map(|run| by_id.get(&run.member_id).map(|member| (*member, run)))
        .collect();
    runs.sort_by(|(a_member, a_run), (b_member, b_run)| {
        (
            a_member.emp_id.key(),
            &a_run.show_name,
            &a_run.shot_name,
            a_run.range.start(),
        )
            .cmp(&(
                b_member.emp_id.key(),
                &b_run.show_name,
                &b_run.shot_name,
                b_run.range.start(),
            ))
    });

    let mut writer: Writer<Vec<u8>> = quoted_writer();
    writer
        .write_record(ALLOCATION_EXPORT_HEADER)
        .map_err(|e| write_error(&e))?;

    for (member, run) in &runs {
        let start: String = format_iso_date(run.range.start());
        let end: String = format_iso_date(run.range.end());
        let days: String = run.days.to_string();
        let total: String = format_man_days(run.total_man_days);
        let record: [&str; 12] = [
            "UPDATE",
            member.emp_id.value(),
            &member.name,
            &member.designation,
            member.department.as_str(),
            &member.shift,
            run.show_name.as_deref().unwrap_or(""),
            run.shot_name.as_deref().unwrap_or(""),
            &start,
            &end,
            &days,
            &total,
        ];
        writer
            .write_record(record)
            .map_err(|e| write_error(&e))?;
    }

    finish(writer)
}

/// Writes activity rows in the order given.
///
/// # Errors
///
/// Returns `ApiError::Internal` if the CSV cannot be written.
pub fn export_activity_csv(entries: &[ActivityLogEntry]) -> Result<String, ApiError> {
    let mut writer: Writer<Vec<u8>> = quoted_writer();
    writer
        .write_record(ACTIVITY_EXPORT_HEADER)
        .map_err(|e| write_error(&e))?;

    for entry in entries {
        let log_id: String = entry.log_id.map(|id| id.to_string()).unwrap_or_default();
        let entity_id: String = entry.entity_id.to_string();
        let record: [&str; 11] = [
            &log_id,
            entry.created_at.as_deref().unwrap_or(""),
            &entry.actor.login_name,
            entry.entity_type.as_str(),
            &entity_id,
            entry.action_type.as_str(),
            entry.field_name.as_deref().unwrap_or(""),
            entry.old_value.as_deref().unwrap_or(""),
            entry.new_value.as_deref().unwrap_or(""),
            if entry.is_reversed { "Yes" } else { "No" },
            &entry.actor.actor_type,
        ];
        writer
            .write_record(record)
            .map_err(|e| write_error(&e))?;
    }

    finish(writer)
}
