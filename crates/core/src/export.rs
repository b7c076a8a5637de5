// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crewplan_domain::{Allocation, DateRange};
use serde::{Deserialize, Serialize};

/// A run of consecutive daily allocations on the same member, show and shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRun {
    /// The member.
    pub member_id: i64,
    /// Show name.
    pub show_name: Option<String>,
    /// Shot name.
    pub shot_name: Option<String>,
    /// First and last day of the run.
    pub range: DateRange,
    /// Distinct days in the run.
    pub days: u32,
    /// Summed man-days.
    pub total_man_days: f64,
}

/// Collapses productive daily allocations into consecutive runs.
///
/// Leave and idle entries are left out. Entries for the same member, show and
/// shot on consecutive dates join one run; a gap starts a new run.
#[must_use]
pub fn collapse_allocations(allocations: &[Allocation]) -> Vec<AllocationRun> {
    let mut productive: Vec<&Allocation> =
        allocations.iter().filter(|a| a.is_productive()).collect();
    productive.sort_by(|a, b| {
        (a.member_id, &a.show_name, &a.shot_name, a.allocation_date).cmp(&(
            b.member_id,
            &b.show_name,
            &b.shot_name,
            b.allocation_date,
        ))
    });

    let mut runs: Vec<AllocationRun> = Vec::new();
    for allocation in productive {
        if let Some(run) = runs.last_mut() {
            let same_work: bool = run.member_id == allocation.member_id
                && run.show_name == allocation.show_name
                && run.shot_name == allocation.shot_name;
            if same_work && run.range.end() == allocation.allocation_date {
                run.total_man_days += allocation.man_days;
                continue;
            }
            let extended: Option<DateRange> =
                if same_work && run.range.end().next_day() == Some(allocation.allocation_date) {
                    run.range.extend_by_one_day().ok()
                } else {
                    None
                };
            if let Some(extended) = extended {
                run.range = extended;
                run.days += 1;
                run.total_man_days += allocation.man_days;
                continue;
            }
        }
        runs.push(AllocationRun {
            member_id: allocation.member_id,
            show_name: allocation.show_name.clone(),
            shot_name: allocation.shot_name.clone(),
            range: DateRange::single(allocation.allocation_date),
            days: 1,
            total_man_days: allocation.man_days,
        });
    }
    runs
}
