// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use crewplan_domain::{Allocation, DateRange, Department, format_iso_date};

use crate::data_models::AllocationRow;
use crate::diesel_schema::{allocations, members};
use crate::error::PersistenceError;

/// Filters for listing allocations. Every field is optional and unset fields
/// do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationQuery {
    pub member_id: Option<i64>,
    pub department: Option<Department>,
    pub range: Option<DateRange>,
    pub show_name: Option<String>,
}

impl AllocationQuery {
    /// Every allocation whose date lies in `range`.
    #[must_use]
    pub fn within(range: DateRange) -> Self {
        Self {
            range: Some(range),
            ..Self::default()
        }
    }
}

/// Lists allocations ordered by member, date and id.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is invalid.
pub fn list_allocations(
    conn: &mut SqliteConnection,
    filter: &AllocationQuery,
) -> Result<Vec<Allocation>, PersistenceError> {
    debug!(?filter, "Listing allocations");

    let mut query = allocations::table
        .inner_join(members::table)
        .select(AllocationRow::as_select())
        .order((
            allocations::member_id.asc(),
            allocations::allocation_date.asc(),
            allocations::allocation_id.asc(),
        ))
        .into_boxed();
    if let Some(member_id) = filter.member_id {
        query = query.filter(allocations::member_id.eq(member_id));
    }
    if let Some(department) = filter.department {
        query = query.filter(members::department.eq(department.as_str()));
    }
    if let Some(range) = filter.range {
        query = query
            .filter(allocations::allocation_date.ge(format_iso_date(range.start())))
            .filter(allocations::allocation_date.le(format_iso_date(range.end())));
    }
    if let Some(show_name) = &filter.show_name {
        query = query.filter(allocations::show_name.eq(show_name.clone()));
    }

    let rows: Vec<AllocationRow> = query.load(conn)?;
    rows.into_iter().map(AllocationRow::into_allocation).collect()
}

/// Retrieves an allocation by id.
///
/// # Errors
///
/// Returns an error if the query fails. Returns `Ok(None)` if no such allocation exists.
pub fn get_allocation(
    conn: &mut SqliteConnection,
    allocation_id: i64,
) -> Result<Option<Allocation>, PersistenceError> {
    let row: Option<AllocationRow> = allocations::table
        .filter(allocations::allocation_id.eq(allocation_id))
        .select(AllocationRow::as_select())
        .first(conn)
        .optional()?;
    row.map(AllocationRow::into_allocation).transpose()
}
