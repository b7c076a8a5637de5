// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Allocation aggregation.
//!
//! Every dashboard number derives from the same partitioning rules:
//!
//! - Leave and idle entries never count as allocated work. Either flag alone
//!   excludes the entry. Leave takes precedence when both are set.
//! - Entries without a real show (absent, blank, or `"Default"`) are left out
//!   of show-level statistics but still count toward member totals.
//! - A member-day above one man-day of productive work is an overallocation.

use crate::allocation::{Allocation, FULL_DAY_MAN_DAYS};
use crate::types::Department;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use time::Date;

/// Tolerance used when comparing summed fractional man-days.
pub const MAN_DAY_EPSILON: f64 = 1e-9;

/// Summed man-days and distinct work items for one partition of allocations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartitionTotals {
    /// Productive man-days (leave and idle excluded).
    pub allocated_man_days: f64,
    /// Man-days on leave.
    pub leave_man_days: f64,
    /// Man-days idle.
    pub idle_man_days: f64,
    /// Distinct real shows worked on.
    pub shows: BTreeSet<String>,
    /// Distinct shots worked on.
    pub shots: BTreeSet<String>,
    /// Number of entries folded into this partition.
    pub record_count: usize,
}

impl PartitionTotals {
    /// Folds one allocation into the totals.
    pub fn record(&mut self, allocation: &Allocation) {
        self.record_count += 1;

        if allocation.is_leave {
            self.leave_man_days += allocation.man_days;
            return;
        }
        if allocation.is_idle {
            self.idle_man_days += allocation.man_days;
            return;
        }

        self.allocated_man_days += allocation.man_days;

        if let Some(show) = allocation
            .show_name
            .as_deref()
            .filter(|_| allocation.has_real_show())
        {
            self.shows.insert(show.trim().to_string());
        }
        if let Some(shot) = allocation.shot_name.as_deref() {
            let shot: &str = shot.trim();
            if !shot.is_empty() {
                self.shots.insert(shot.to_string());
            }
        }
    }

    /// Number of distinct real shows.
    #[must_use]
    pub fn show_count(&self) -> usize {
        self.shows.len()
    }

    /// Number of distinct shots.
    #[must_use]
    pub fn shot_count(&self) -> usize {
        self.shots.len()
    }
}

/// Partitions allocations with `key_fn` and totals each partition.
///
/// # Arguments
///
/// * `records` - The allocations to aggregate
/// * `key_fn` - Maps an allocation to its partition key, or `None` to skip it
///
/// # Returns
///
/// Totals per partition, ordered by key.
pub fn aggregate_by<K, F>(records: &[Allocation], key_fn: F) -> BTreeMap<K, PartitionTotals>
where
    K: Ord,
    F: Fn(&Allocation) -> Option<K>,
{
    let mut partitions: BTreeMap<K, PartitionTotals> = BTreeMap::new();
    for record in records {
        if let Some(key) = key_fn(record) {
            partitions.entry(key).or_default().record(record);
        }
    }
    partitions
}

/// Totals for every record in one partition.
#[must_use]
pub fn overall_totals(records: &[Allocation]) -> PartitionTotals {
    let mut totals: PartitionTotals = PartitionTotals::default();
    for record in records {
        totals.record(record);
    }
    totals
}

/// Totals per member.
#[must_use]
pub fn totals_by_member(records: &[Allocation]) -> BTreeMap<i64, PartitionTotals> {
    aggregate_by(records, |a| Some(a.member_id))
}

/// Totals per (member, shot). Entries without a shot use `None`.
#[must_use]
pub fn totals_by_member_and_shot(
    records: &[Allocation],
) -> BTreeMap<(i64, Option<String>), PartitionTotals> {
    aggregate_by(records, |a| Some((a.member_id, a.shot_name.clone())))
}

/// Totals per (department, date).
///
/// Entries whose member is missing from `departments` are skipped.
#[must_use]
pub fn totals_by_department_and_date(
    records: &[Allocation],
    departments: &HashMap<i64, Department>,
) -> BTreeMap<(Department, Date), PartitionTotals> {
    aggregate_by(records, |a| {
        departments
            .get(&a.member_id)
            .map(|department| (*department, a.allocation_date))
    })
}

/// A member-day whose productive total exceeds one man-day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyOverallocation {
    /// The overallocated member.
    pub member_id: i64,
    /// The date.
    pub date: Date,
    /// Productive man-days booked that day.
    pub total_man_days: f64,
    /// Amount above a full day.
    pub excess_man_days: f64,
}

/// Reports every (member, date) carrying more than one productive man-day.
#[must_use]
pub fn daily_overallocations(records: &[Allocation]) -> Vec<DailyOverallocation> {
    aggregate_by(records, |a| Some((a.member_id, a.allocation_date)))
        .into_iter()
        .filter(|(_, totals)| totals.allocated_man_days > FULL_DAY_MAN_DAYS + MAN_DAY_EPSILON)
        .map(|((member_id, date), totals)| DailyOverallocation {
            member_id,
            date,
            total_man_days: totals.allocated_man_days,
            excess_man_days: totals.allocated_man_days - FULL_DAY_MAN_DAYS,
        })
        .collect()
}

/// Productive man-days per real show.
#[must_use]
pub fn show_totals(records: &[Allocation]) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for record in records {
        if !record.is_productive() || !record.has_real_show() {
            continue;
        }
        if let Some(show) = record.show_name.as_deref() {
            *totals.entry(show.trim().to_string()).or_insert(0.0) += record.man_days;
        }
    }
    totals
}
