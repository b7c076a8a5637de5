// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;

use crewplan_domain::{DateRange, Department, SoftBooking, format_iso_date};

use crate::data_models::SoftBookingRow;
use crate::diesel_schema::soft_bookings;
use crate::error::PersistenceError;

/// Lists soft bookings overlapping `range`, optionally within one department.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is invalid.
pub fn list_soft_bookings(
    conn: &mut SqliteConnection,
    range: Option<DateRange>,
    department: Option<Department>,
) -> Result<Vec<SoftBooking>, PersistenceError> {
    let mut query = soft_bookings::table
        .select(SoftBookingRow::as_select())
        .order((soft_bookings::start_date.asc(), soft_bookings::booking_id.asc()))
        .into_boxed();
    if let Some(range) = range {
        query = query
            .filter(soft_bookings::start_date.le(format_iso_date(range.end())))
            .filter(soft_bookings::end_date.ge(format_iso_date(range.start())));
    }
    if let Some(department) = department {
        query = query.filter(soft_bookings::department.eq(department.as_str()));
    }

    let rows: Vec<SoftBookingRow> = query.load(conn)?;
    rows.into_iter()
        .map(SoftBookingRow::into_soft_booking)
        .collect()
}

/// Retrieves a soft booking by id.
///
/// # Errors
///
/// Returns an error if the query fails. Returns `Ok(None)` if no such booking exists.
pub fn get_soft_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Option<SoftBooking>, PersistenceError> {
    let row: Option<SoftBookingRow> = soft_bookings::table
        .filter(soft_bookings::booking_id.eq(booking_id))
        .select(SoftBookingRow::as_select())
        .first(conn)
        .optional()?;
    row.map(SoftBookingRow::into_soft_booking).transpose()
}
