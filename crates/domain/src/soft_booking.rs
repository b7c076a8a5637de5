// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::allocation::validate_man_days;
use crate::date_range::DateRange;
use crate::error::DomainError;
use crate::types::Department;
use serde::{Deserialize, Serialize};

/// Seniority mix requested by a soft booking, in whole percentages.
///
/// The three shares always sum to exactly 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DesignationSplit {
    senior: u8,
    mid: u8,
    junior: u8,
}

impl DesignationSplit {
    /// Creates a split after checking the shares sum to 100.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDesignationSplit` otherwise.
    pub fn new(senior: u8, mid: u8, junior: u8) -> Result<Self, DomainError> {
        let total: u16 = u16::from(senior) + u16::from(mid) + u16::from(junior);
        if total != 100 {
            return Err(DomainError::InvalidDesignationSplit {
                senior,
                mid,
                junior,
            });
        }
        Ok(Self {
            senior,
            mid,
            junior,
        })
    }

    /// Senior share.
    #[must_use]
    pub const fn senior(&self) -> u8 {
        self.senior
    }

    /// Mid-level share.
    #[must_use]
    pub const fn mid(&self) -> u8 {
        self.mid
    }

    /// Junior share.
    #[must_use]
    pub const fn junior(&self) -> u8 {
        self.junior
    }
}

#[derive(Deserialize)]
struct RawDesignationSplit {
    senior: u8,
    mid: u8,
    junior: u8,
}

// Deserialization goes through `new` so a client cannot smuggle in a bad split.
impl<'de> Deserialize<'de> for DesignationSplit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: RawDesignationSplit = RawDesignationSplit::deserialize(deserializer)?;
        Self::new(raw.senior, raw.mid, raw.junior).map_err(serde::de::Error::custom)
    }
}

/// A provisional reservation of department capacity for a show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftBooking {
    /// Canonical internal identifier.
    /// `None` until persisted.
    pub booking_id: Option<i64>,
    /// Show being booked for.
    pub show_name: String,
    /// Production manager requesting the booking.
    pub manager_name: String,
    /// Department whose capacity is reserved.
    pub department: Department,
    /// Total man-days reserved across the range.
    pub man_days: f64,
    /// Booking window.
    pub range: DateRange,
    /// Optional seniority mix.
    pub split: Option<DesignationSplit>,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl SoftBooking {
    /// Creates a validated soft booking.
    ///
    /// # Arguments
    ///
    /// * `show_name` - The show being booked for
    /// * `manager_name` - The requesting manager
    /// * `department` - The department whose capacity is reserved
    /// * `man_days` - Total man-days across the range
    /// * `range` - The booking window
    /// * `split` - Optional seniority mix
    ///
    /// # Errors
    ///
    /// Returns an error if the show or manager name is blank or the man-days are invalid.
    pub fn new(
        show_name: &str,
        manager_name: &str,
        department: Department,
        man_days: f64,
        range: DateRange,
        split: Option<DesignationSplit>,
    ) -> Result<Self, DomainError> {
        let show_name: &str = show_name.trim();
        if show_name.is_empty() {
            return Err(DomainError::InvalidShowName(String::from(
                "Show name cannot be empty",
            )));
        }
        let manager_name: &str = manager_name.trim();
        if manager_name.is_empty() {
            return Err(DomainError::InvalidManagerName(String::from(
                "Manager name cannot be empty",
            )));
        }
        validate_man_days(man_days)?;

        Ok(Self {
            booking_id: None,
            show_name: show_name.to_string(),
            manager_name: manager_name.to_string(),
            department,
            man_days,
            range,
            split,
            notes: None,
        })
    }

    /// Returns this booking with the given persisted identifier.
    #[must_use]
    pub const fn with_id(mut self, booking_id: i64) -> Self {
        self.booking_id = Some(booking_id);
        self
    }

    /// Man-days of this booking that fall inside `window`, prorated by calendar day.
    #[must_use]
    pub fn man_days_within(&self, window: &DateRange) -> f64 {
        if !self.range.overlaps(window) {
            return 0.0;
        }
        let overlap_start: time::Date = self.range.start().max(window.start());
        let overlap_end: time::Date = self.range.end().min(window.end());
        let overlap_days: i64 = (overlap_end - overlap_start).whole_days() + 1;
        let total_days: u32 = self.range.calendar_days();
        let overlap_days: f64 = f64::from(u32::try_from(overlap_days).unwrap_or(0));
        self.man_days * overlap_days / f64::from(total_days)
    }
}
