// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Duration, Weekday};

/// Format used for every date crossing a boundary: `YYYY-MM-DD`.
pub const ISO_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Parses an ISO 8601 calendar date (`YYYY-MM-DD`).
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the string is not a valid date.
pub fn parse_iso_date(value: &str) -> Result<Date, DomainError> {
    let trimmed: &str = value.trim();
    Date::parse(trimmed, ISO_DATE_FORMAT).map_err(|e| DomainError::DateParseError {
        date_string: trimmed.to_string(),
        error: e.to_string(),
    })
}

/// Formats a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_iso_date(date: Date) -> String {
    date.format(ISO_DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Returns whether a date falls on Saturday or Sunday.
#[must_use]
pub fn is_weekend(date: Date) -> bool {
    matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
}

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: Date,
    end: Date,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: Date,
    end: Date,
}

impl<'de> Deserialize<'de> for DateRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: RawDateRange = RawDateRange::deserialize(deserializer)?;
        Self::new(raw.start, raw.end).map_err(serde::de::Error::custom)
    }
}

impl DateRange {
    /// Creates a new inclusive date range.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDateRange` if `end` is before `start`.
    pub fn new(start: Date, end: Date) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a range covering exactly one day.
    #[must_use]
    pub const fn single(date: Date) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Returns the first day of the range.
    #[must_use]
    pub const fn start(&self) -> Date {
        self.start
    }

    /// Returns the last day of the range.
    #[must_use]
    pub const fn end(&self) -> Date {
        self.end
    }

    /// Number of calendar days in the range, both ends included.
    #[must_use]
    pub fn calendar_days(&self) -> u32 {
        let span: i64 = (self.end - self.start).whole_days();
        u32::try_from(span + 1).unwrap_or(u32::MAX)
    }

    /// Returns whether the date lies inside the range.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Returns whether two ranges share at least one day.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Returns an iterator over every date in the range.
    pub fn days(&self) -> impl Iterator<Item = Date> + use<> {
        let end: Date = self.end;
        std::iter::successors(Some(self.start), move |date| {
            date.next_day().filter(|next| *next <= end)
        })
    }

    /// Returns the Saturday and Sunday dates inside the range.
    #[must_use]
    pub fn weekend_days(&self) -> Vec<Date> {
        self.days().filter(|date| is_weekend(*date)).collect()
    }

    /// Extends the range by one day at the end.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DateArithmeticOverflow` at the end of the calendar.
    pub fn extend_by_one_day(&self) -> Result<Self, DomainError> {
        let end: Date = self
            .end
            .checked_add(Duration::days(1))
            .ok_or_else(|| DomainError::DateArithmeticOverflow {
                operation: format!("extending range ending {}", self.end),
            })?;
        Ok(Self {
            start: self.start,
            end,
        })
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}..={}",
            format_iso_date(self.start),
            format_iso_date(self.end)
        )
    }
}
