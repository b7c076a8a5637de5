// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use crewplan::{ImportWarningKind, ParsedRow};
use crewplan_domain::ResourceMember;
use crewplan_persistence::Persistence;

use super::helpers::{add_allocation, add_member, approx_eq, csv_upload, setup};
use crate::{
    AllocationImportCommitResponse, AllocationImportPreviewResponse, AllocationImportRequest,
    ApiError, AuthenticatedActor, ListAllocationsRequest, ListAllocationsResponse,
    MemberImportCommitResponse, MemberImportPreviewResponse, MemberRowStatus, SheetTable,
    SpreadsheetFormat, SpreadsheetUpload, commit_allocation_import, commit_member_import,
    list_allocations, parse_allocation_rows, preview_allocation_import, preview_member_import,
};

const MEMBER_HEADER: &str = "Emp ID,Emp Name,Designation,Department,Shift,Employee Type\n";

// First sheet: a header row, a NEW row with a numeric Emp ID and date-formatted
// cells, and an UPDATE row with text dates.
const ALLOCATION_WORKBOOK: &[u8] = include_bytes!("fixtures/allocations.xlsx");

const ALLOCATION_HEADER: &str =
    "Action,Emp ID,Show Name,Shot Name,Start Date,End Date,Total MD\n";

fn allocation_import(body: &str, strategy: Option<&str>) -> AllocationImportRequest {
    AllocationImportRequest {
        upload: csv_upload(&format!("{ALLOCATION_HEADER}{body}")),
        strategy: strategy.map(String::from),
    }
}

fn all_allocations(persistence: &mut Persistence) -> ListAllocationsResponse {
    list_allocations(persistence, &ListAllocationsRequest::default()).unwrap()
}

fn seeded() -> (Persistence, AuthenticatedActor) {
    let (mut persistence, admin) = setup();
    add_member(&mut persistence, &admin, "E001", "Comp");
    add_member(&mut persistence, &admin, "E002", "Roto");
    (persistence, admin)
}

// ============================================================================
// Member import
// ============================================================================

#[test]
fn test_member_preview_reports_every_problem_per_row() {
    let (mut persistence, admin) = setup();
    add_member(&mut persistence, &admin, "E001", "Comp");
    let upload: SpreadsheetUpload = csv_upload(&format!(
        "{MEMBER_HEADER}\
         E002,Ana,Compositor,Comp,Day,\n\
         e001,Ben,Roto Artist,Roto,Day,\n\
         E003,,Painter,Lighting,Night,\n\
         E002,Cy,Painter,Paint,Night,Contract\n\
         E004,Dee,Roto Artist,Roto,Day,Intern\n"
    ));

    let preview: MemberImportPreviewResponse =
        preview_member_import(&mut persistence, &admin, &upload).unwrap();

    assert_eq!(preview.valid_count, 2);
    assert_eq!(preview.invalid_count, 3);
    assert_eq!(preview.rows[0].status, MemberRowStatus::Valid);
    assert_eq!(preview.rows[0].row_number, 1);
    assert!(preview.rows[1].errors[0].contains("already exists"));
    assert_eq!(preview.rows[2].errors.len(), 2);
    assert!(preview.rows[3].errors[0].contains("more than once"));
    assert_eq!(preview.rows[4].status, MemberRowStatus::Valid);
    assert_eq!(persistence.list_members(true, None).unwrap().len(), 1);
}

#[test]
fn test_member_preview_requires_columns() {
    let (mut persistence, admin) = setup();
    let upload: SpreadsheetUpload = csv_upload("Emp ID,Emp Name\nE001,Ana\n");

    let result = preview_member_import(&mut persistence, &admin, &upload);

    assert!(matches!(
        result,
        Err(ApiError::InvalidSpreadsheet { reason }) if reason.contains("designation")
    ));
}

#[test]
fn test_member_commit_creates_valid_rows_only() {
    let (mut persistence, admin) = setup();
    let upload: SpreadsheetUpload = csv_upload(&format!(
        "{MEMBER_HEADER}\
         E001,Ana,Compositor,comp,Day,\n\
         E002,Ben,Roto Artist,Unknown,Day,\n\
         E003,Cy,Painter,Paint,Night,\n"
    ));

    let response: MemberImportCommitResponse =
        commit_member_import(&mut persistence, &admin, &upload).unwrap();

    assert_eq!(response.created.len(), 2);
    assert!(response.skipped.is_empty());
    assert_eq!(response.invalid_rows.len(), 1);
    assert_eq!(response.invalid_rows[0].row_number, 2);
    assert_eq!(persistence.list_members(true, None).unwrap().len(), 2);
}

#[test]
fn test_member_import_accepts_base64_csv_files() {
    let (mut persistence, admin) = setup();
    let text: String = format!("{MEMBER_HEADER}E001,Ana,Compositor,Comp,Day,\n");
    let upload: SpreadsheetUpload = SpreadsheetUpload {
        file_name: String::from("roster.CSV"),
        content_base64: Some(STANDARD.encode(text.as_bytes())),
        csv_text: None,
    };

    let response: MemberImportCommitResponse =
        commit_member_import(&mut persistence, &admin, &upload).unwrap();

    assert_eq!(response.created.len(), 1);
    assert_eq!(response.created[0].emp_id, "E001");
}

#[test]
fn test_unsupported_file_type_is_rejected() {
    let (mut persistence, admin) = setup();
    let upload: SpreadsheetUpload = SpreadsheetUpload {
        file_name: String::from("roster.ods"),
        content_base64: Some(String::from("AAAA")),
        csv_text: None,
    };

    let result = preview_member_import(&mut persistence, &admin, &upload);

    assert!(matches!(result, Err(ApiError::InvalidSpreadsheet { .. })));
}

// ============================================================================
// Allocation import
// ============================================================================

#[test]
fn test_allocation_preview_classifies_rows_without_writing() {
    let (mut persistence, admin) = seeded();
    let members: Vec<ResourceMember> = persistence.list_members(true, None).unwrap();
    let e002: i64 = members[1].member_id.unwrap();
    add_allocation(&mut persistence, &admin, e002, "2026-03-03", "Old Show", 1.0);

    let request: AllocationImportRequest = allocation_import(
        "NEW,E001,Show A,sh010,2026-03-02,2026-03-06,5\n\
         NEW,E002,Show A,,2026-03-02,2026-03-04,1.5\n\
         NEW,E999,Show A,,2026-03-02,2026-03-04,3\n\
         NEW,E001,Show B,,2026-03-09,2026-03-05,2\n",
        None,
    );

    let preview: AllocationImportPreviewResponse =
        preview_allocation_import(&mut persistence, &admin, &request).unwrap();

    assert_eq!(preview.preview.valid.len(), 1);
    assert_eq!(preview.preview.conflicts.len(), 1);
    assert_eq!(preview.preview.errors.len(), 2);
    assert_eq!(preview.committable_rows, 2);
    assert_eq!(preview.start_date.as_deref(), Some("2026-03-02"));
    assert_eq!(preview.end_date.as_deref(), Some("2026-03-06"));
    assert!(approx_eq(preview.preview.valid[0].per_day_man_days, 1.0));
    assert_eq!(preview.preview.errors[0].row_number, 3);
    assert_eq!(all_allocations(&mut persistence).allocations.len(), 1);
}

#[test]
fn test_allocation_commit_requires_a_known_strategy() {
    let (mut persistence, admin) = seeded();
    let body: &str = "NEW,E001,Show A,,2026-03-02,2026-03-03,2\n";

    let missing =
        commit_allocation_import(&mut persistence, &admin, &allocation_import(body, None));
    assert!(matches!(missing, Err(ApiError::InvalidInput { field, .. }) if field == "strategy"));

    let unknown = commit_allocation_import(
        &mut persistence,
        &admin,
        &allocation_import(body, Some("merge")),
    );
    assert!(matches!(unknown, Err(ApiError::InvalidInput { field, .. }) if field == "strategy"));
    assert!(all_allocations(&mut persistence).allocations.is_empty());
}

#[test]
fn test_allocation_commit_replace_swaps_conflicting_days() {
    let (mut persistence, admin) = seeded();
    let members: Vec<ResourceMember> = persistence.list_members(true, None).unwrap();
    let e001: i64 = members[0].member_id.unwrap();
    add_allocation(&mut persistence, &admin, e001, "2026-03-03", "Old Show", 1.0);

    let response: AllocationImportCommitResponse = commit_allocation_import(
        &mut persistence,
        &admin,
        &allocation_import(
            "UPDATE,E001,Show A,,2026-03-02,2026-03-04,3\n",
            Some("Replace"),
        ),
    )
    .unwrap();

    assert_eq!(response.result.inserted, 3);
    assert_eq!(response.result.deleted, 1);
    assert_eq!(response.result.committed_rows, vec![1]);
    let stored: ListAllocationsResponse = all_allocations(&mut persistence);
    assert_eq!(stored.allocations.len(), 3);
    assert!(
        stored
            .allocations
            .iter()
            .all(|a| a.show_name.as_deref() == Some("Show A"))
    );
    assert!(approx_eq(stored.total_man_days, 3.0));
}

#[test]
fn test_allocation_commit_skip_leaves_conflicts_alone() {
    let (mut persistence, admin) = seeded();
    let members: Vec<ResourceMember> = persistence.list_members(true, None).unwrap();
    let e001: i64 = members[0].member_id.unwrap();
    add_allocation(&mut persistence, &admin, e001, "2026-03-03", "Old Show", 1.0);

    let response: AllocationImportCommitResponse = commit_allocation_import(
        &mut persistence,
        &admin,
        &allocation_import(
            "NEW,E001,Show A,,2026-03-02,2026-03-04,3\n\
             NEW,E002,Show A,,2026-03-02,2026-03-03,1\n",
            Some("skip"),
        ),
    )
    .unwrap();

    assert_eq!(response.result.skipped_rows, vec![1]);
    assert_eq!(response.result.committed_rows, vec![2]);
    assert_eq!(response.result.inserted, 2);
    assert_eq!(all_allocations(&mut persistence).allocations.len(), 3);
}

#[test]
fn test_allocation_commit_add_keeps_existing_bookings() {
    let (mut persistence, admin) = seeded();
    let members: Vec<ResourceMember> = persistence.list_members(true, None).unwrap();
    let e001: i64 = members[0].member_id.unwrap();
    add_allocation(&mut persistence, &admin, e001, "2026-03-03", "Old Show", 0.5);

    let response: AllocationImportCommitResponse = commit_allocation_import(
        &mut persistence,
        &admin,
        &allocation_import("NEW,E001,Show A,,2026-03-03,2026-03-03,0.5\n", Some("add")),
    )
    .unwrap();

    assert_eq!(response.result.deleted, 0);
    assert_eq!(response.result.inserted, 1);
    let stored: ListAllocationsResponse = all_allocations(&mut persistence);
    assert_eq!(stored.allocations.len(), 2);
    assert!(approx_eq(stored.total_man_days, 1.0));
}

// ============================================================================
// Workbook uploads
// ============================================================================

#[test]
fn test_xlsx_cells_are_read_as_import_text() {
    let table: SheetTable =
        SheetTable::from_workbook(ALLOCATION_WORKBOOK.to_vec(), SpreadsheetFormat::Xlsx).unwrap();

    let rows: Vec<ParsedRow> = parse_allocation_rows(&table).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].row_number, 1);
    assert_eq!(rows[0].action, "NEW");
    assert_eq!(rows[0].emp_id, "1042");
    assert_eq!(rows[0].show_name, "Show A");
    assert_eq!(rows[0].shot_name, "sh010");
    assert_eq!(rows[0].start_date, "2026-03-02");
    assert_eq!(rows[0].end_date, "2026-03-04");
    assert_eq!(rows[0].total_md, "2.5");
    assert_eq!(rows[1].row_number, 2);
    assert_eq!(rows[1].emp_id, "E007");
    assert_eq!(rows[1].shot_name, "");
    assert_eq!(rows[1].start_date, "2026-03-09");
    assert_eq!(rows[1].total_md, "1");
    assert_eq!(rows[1].notes, "Client review");
}

#[test]
fn test_xlsx_upload_previews_like_csv() {
    let (mut persistence, admin) = setup();
    add_member(&mut persistence, &admin, "1042", "Comp");
    add_member(&mut persistence, &admin, "E007", "Roto");
    let request: AllocationImportRequest = AllocationImportRequest {
        upload: SpreadsheetUpload {
            file_name: String::from("week10.xlsx"),
            content_base64: Some(STANDARD.encode(ALLOCATION_WORKBOOK)),
            csv_text: None,
        },
        strategy: None,
    };

    let preview: AllocationImportPreviewResponse =
        preview_allocation_import(&mut persistence, &admin, &request).unwrap();

    assert!(preview.preview.errors.is_empty());
    assert_eq!(preview.preview.valid.len(), 2);
    assert_eq!(preview.preview.valid[0].emp_id, "1042");
    assert_eq!(preview.preview.valid[0].range.calendar_days(), 3);
    assert!(approx_eq(preview.preview.valid[0].per_day_man_days, 2.5 / 3.0));
    assert_eq!(preview.start_date.as_deref(), Some("2026-03-02"));
    assert_eq!(preview.end_date.as_deref(), Some("2026-03-09"));
    assert!(
        preview
            .preview
            .warnings
            .iter()
            .any(|w| w.row_number == 2 && w.kind == ImportWarningKind::NothingToUpdate)
    );
}
