//! Scope × profile planning
//!
//! Resolved effort is summed per `(scope, profile)` pair, independent of
//! product and cluster, and compared with the month-by-month distribution
//! entered for that pair. `remaining` is not clamped: over-distribution
//! shows up as a negative value.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use costplan_core::{BacklogItem, Planning, Profile, PLANNING_HORIZON_MONTHS};
use serde::Serialize;
use tracing::debug;

use crate::cost::ProfileIndex;
use crate::effort::{resolve_effort, total_build_effort};

/// Planning status of one scope/profile pair
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlanningRow {
    pub scope: String,
    pub profile_id: String,
    pub profile_name: String,
    /// Resolved effort of the pair's items
    pub total_effort: f64,
    /// Days placed in the distribution
    pub distributed: f64,
    /// `total_effort - distributed`
    pub remaining: f64,
    /// Month index to days (months inside the horizon only)
    pub distribution: BTreeMap<u32, f64>,
}

/// Sum of distribution values over the planning horizon; missing months count as 0
pub fn distributed_days(distribution: &BTreeMap<u32, f64>) -> f64 {
    distribution
        .range(..PLANNING_HORIZON_MONTHS)
        .map(|(_, days)| *days)
        .sum()
}

/// Effort left to distribute
pub fn remaining_effort(total_effort: f64, distribution: &BTreeMap<u32, f64>) -> f64 {
    total_effort - distributed_days(distribution)
}

/// Build one planning row per `(scope, profile)` pair that carries effort.
///
/// Items without a resolvable profile are skipped. Rows are ordered by
/// scope label, then profile ID.
pub fn aggregate_planning(
    items: &[BacklogItem],
    profiles: &[Profile],
    plannings: &[Planning],
) -> Vec<PlanningRow> {
    let base = total_build_effort(items);
    let index = ProfileIndex::new(profiles);

    let mut totals: BTreeMap<(&str, &str), (f64, &str)> = BTreeMap::new();
    for item in items {
        let Some(profile) = index.for_item(item) else {
            debug!(item = %item.id, "skipping item without resolvable profile in planning");
            continue;
        };
        let entry = totals
            .entry((item.scope_label(), profile.id.as_str()))
            .or_insert((0.0, profile.name.as_str()));
        entry.0 += resolve_effort(item, base);
    }

    totals
        .into_iter()
        .map(|((scope, profile_id), (total_effort, profile_name))| {
            let distribution: BTreeMap<u32, f64> = plannings
                .iter()
                .find(|p| p.matches(scope, profile_id))
                .map(|p| {
                    p.distribution
                        .range(..PLANNING_HORIZON_MONTHS)
                        .map(|(m, d)| (*m, *d))
                        .collect()
                })
                .unwrap_or_default();
            let distributed = distributed_days(&distribution);
            PlanningRow {
                scope: scope.to_string(),
                profile_id: profile_id.to_string(),
                profile_name: profile_name.to_string(),
                total_effort,
                distributed,
                remaining: total_effort - distributed,
                distribution,
            }
        })
        .collect()
}

/// `YYYY-MM` labels for `horizon` months starting at the month of `start`
pub fn month_labels(start: NaiveDate, horizon: u32) -> Vec<String> {
    let first = start.with_day(1).unwrap_or(start);
    (0..horizon)
        .filter_map(|offset| first.checked_add_months(Months::new(offset)))
        .map(|month| month.format("%Y-%m").to_string())
        .collect()
}
