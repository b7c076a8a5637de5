// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::is_real_show;
use serde::{Deserialize, Serialize};
use time::Date;

/// Maximum productive man-days a member can carry on one date before the day
/// is reported as overallocated.
pub const FULL_DAY_MAN_DAYS: f64 = 1.0;

/// One member's allocation for one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Canonical internal identifier.
    /// `None` until the allocation has been persisted.
    pub allocation_id: Option<i64>,
    /// The member this allocation belongs to.
    pub member_id: i64,
    /// The date worked.
    pub allocation_date: Date,
    /// Show name (optional; `"Default"` marks placeholder work).
    pub show_name: Option<String>,
    /// Shot name (optional).
    pub shot_name: Option<String>,
    /// Fractional man-days, finite and non-negative.
    pub man_days: f64,
    /// The member is on leave for this entry.
    pub is_leave: bool,
    /// The member is idle (benched) for this entry.
    pub is_idle: bool,
    /// This entry is weekend overtime.
    pub is_weekend_working: bool,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl Allocation {
    /// Creates a productive allocation without a persisted identifier.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidManDays` if `man_days` is negative or not finite.
    pub fn new(
        member_id: i64,
        allocation_date: Date,
        show_name: Option<String>,
        shot_name: Option<String>,
        man_days: f64,
    ) -> Result<Self, DomainError> {
        validate_man_days(man_days)?;
        Ok(Self {
            allocation_id: None,
            member_id,
            allocation_date,
            show_name: normalize_optional(show_name),
            shot_name: normalize_optional(shot_name),
            man_days,
            is_leave: false,
            is_idle: false,
            is_weekend_working: false,
            notes: None,
        })
    }

    /// Returns this allocation with the given persisted identifier.
    #[must_use]
    pub const fn with_id(mut self, allocation_id: i64) -> Self {
        self.allocation_id = Some(allocation_id);
        self
    }

    /// Returns this allocation with the leave flag set.
    #[must_use]
    pub const fn as_leave(mut self) -> Self {
        self.is_leave = true;
        self
    }

    /// Returns this allocation with the idle flag set.
    #[must_use]
    pub const fn as_idle(mut self) -> Self {
        self.is_idle = true;
        self
    }

    /// Returns this allocation with the weekend-working flag set.
    #[must_use]
    pub const fn as_weekend_working(mut self, is_weekend_working: bool) -> Self {
        self.is_weekend_working = is_weekend_working;
        self
    }

    /// Returns this allocation with the given notes.
    #[must_use]
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = normalize_optional(notes);
        self
    }

    /// Productive work: neither leave nor idle.
    #[must_use]
    pub const fn is_productive(&self) -> bool {
        !self.is_leave && !self.is_idle
    }

    /// Returns whether this entry belongs to a real show.
    #[must_use]
    pub fn has_real_show(&self) -> bool {
        is_real_show(self.show_name.as_deref())
    }
}

/// Validates a man-day quantity.
///
/// # Errors
///
/// Returns `DomainError::InvalidManDays` if the value is negative, NaN or infinite.
pub fn validate_man_days(man_days: f64) -> Result<(), DomainError> {
    if !man_days.is_finite() {
        return Err(DomainError::InvalidManDays(format!(
            "{man_days} is not a finite number"
        )));
    }
    if man_days < 0.0 {
        return Err(DomainError::InvalidManDays(format!(
            "{man_days} is negative"
        )));
    }
    Ok(())
}

/// Parses a man-day quantity from text.
///
/// # Errors
///
/// Returns `DomainError::InvalidManDays` if the text is not a finite, non-negative number.
pub fn parse_man_days(value: &str) -> Result<f64, DomainError> {
    let trimmed: &str = value.trim();
    let parsed: f64 = trimmed
        .parse::<f64>()
        .map_err(|_| DomainError::InvalidManDays(format!("'{trimmed}' is not a number")))?;
    validate_man_days(parsed)?;
    Ok(parsed)
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
