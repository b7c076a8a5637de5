// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Show name used for placeholder allocations that belong to no real show.
///
/// Rows carrying this name (compared case-insensitively) count toward member
/// totals but never toward show-level statistics.
pub const DEFAULT_SHOW_NAME: &str = "Default";

/// Returns whether a show name identifies a real show.
///
/// Absent, blank, and sentinel names are not real shows.
#[must_use]
pub fn is_real_show(show_name: Option<&str>) -> bool {
    show_name.is_some_and(|name| {
        let trimmed: &str = name.trim();
        !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case(DEFAULT_SHOW_NAME)
    })
}

/// Production department an artist works in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Department {
    /// Rotoscoping.
    Roto,
    /// Paint and cleanup.
    Paint,
    /// Compositing.
    Comp,
    /// Matchmove and rotomation.
    MMRA,
    /// Plate preparation.
    Prep,
    /// Effects.
    FX,
}

impl Department {
    /// All departments in display order.
    pub const ALL: [Self; 6] = [
        Self::Roto,
        Self::Paint,
        Self::Comp,
        Self::MMRA,
        Self::Prep,
        Self::FX,
    ];

    /// Converts this department to its canonical string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Roto => "Roto",
            Self::Paint => "Paint",
            Self::Comp => "Comp",
            Self::MMRA => "MMRA",
            Self::Prep => "Prep",
            Self::FX => "FX",
        }
    }
}

impl FromStr for Department {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed: &str = s.trim();
        Self::ALL
            .into_iter()
            .find(|department| department.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                DomainError::InvalidDepartment(format!(
                    "'{trimmed}' is not one of Roto, Paint, Comp, MMRA, Prep, FX"
                ))
            })
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Employment classification of a roster member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EmployeeType {
    /// Permanent staff.
    #[default]
    FullTime,
    /// Contract artist.
    Contract,
    /// Intern or trainee.
    Intern,
}

impl EmployeeType {
    /// Converts this employee type to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FullTime => "FullTime",
            Self::Contract => "Contract",
            Self::Intern => "Intern",
        }
    }
}

impl FromStr for EmployeeType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "fulltime" | "ft" | "permanent" => Ok(Self::FullTime),
            "contract" | "contractor" => Ok(Self::Contract),
            "intern" | "trainee" => Ok(Self::Intern),
            _ => Err(DomainError::InvalidEmployeeType(s.to_string())),
        }
    }
}

impl std::fmt::Display for EmployeeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Employee identifier.
///
/// Stored trimmed with its original case. Comparison through
/// [`EmpId::matches`] ignores ASCII case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmpId {
    value: String,
}

impl EmpId {
    /// Creates a new `EmpId`, trimming surrounding whitespace.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            value: value.trim().to_string(),
        }
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the lookup key used for case-insensitive comparisons.
    #[must_use]
    pub fn key(&self) -> String {
        self.value.to_ascii_lowercase()
    }

    /// Returns whether this identifier equals another, ignoring ASCII case.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.value.eq_ignore_ascii_case(other.trim())
    }
}

impl std::fmt::Display for EmpId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// An artist on the production roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMember {
    /// Canonical internal identifier.
    /// `None` until the member has been persisted.
    pub member_id: Option<i64>,
    /// Studio employee identifier (unique across the roster).
    pub emp_id: EmpId,
    /// Display name.
    pub name: String,
    /// Job title, e.g. "Senior Compositor".
    pub designation: String,
    /// Department the member works in.
    pub department: Department,
    /// Shift label, e.g. "Day" or "Night".
    pub shift: String,
    /// Employment classification.
    pub employee_type: EmployeeType,
    /// Name of the member's lead (optional).
    pub reporting_to: Option<String>,
    /// Inactive members keep their history but are excluded from capacity.
    pub is_active: bool,
}

impl ResourceMember {
    /// Creates a new active `ResourceMember` without a persisted `member_id`.
    ///
    /// # Arguments
    ///
    /// * `emp_id` - The employee identifier
    /// * `name` - The display name
    /// * `designation` - The job title
    /// * `department` - The department
    /// * `shift` - The shift label
    /// * `employee_type` - The employment classification
    /// * `reporting_to` - The lead's name (optional)
    #[must_use]
    pub const fn new(
        emp_id: EmpId,
        name: String,
        designation: String,
        department: Department,
        shift: String,
        employee_type: EmployeeType,
        reporting_to: Option<String>,
    ) -> Self {
        Self {
            member_id: None,
            emp_id,
            name,
            designation,
            department,
            shift,
            employee_type,
            reporting_to,
            is_active: true,
        }
    }

    /// Returns this member with the given persisted identifier.
    #[must_use]
    pub const fn with_id(mut self, member_id: i64) -> Self {
        self.member_id = Some(member_id);
        self
    }
}
