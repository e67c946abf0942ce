//! Financial summaries and dashboard figures
//!
//! - **ProfileSummary**: days, price, internal cost and margin ratio per active profile
//! - **ScopeSummary**: the same figures per scope
//! - **ProjectSummary**: grand totals with the settings margin rate applied
//! - **Dashboard**: item counts and the most expensive items

use std::collections::BTreeMap;

use costplan_core::{BacklogItem, Profile, Settings};
use serde::Serialize;

use crate::aggregate::{group_by_scope, top_expensive_items, CostedItem};
use crate::cost::{cost, margin_ratio, CostBreakdown, ProfileIndex};
use crate::effort::{resolve_effort, total_build_effort};

/// Priority label for items without a MoSCoW priority
pub const NO_PRIORITY: &str = "No Priority";

/// Per-profile financial figures
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub profile_id: String,
    pub name: String,
    pub daily_rate: f64,
    pub days: f64,
    /// Days at the billing rate
    pub price: f64,
    /// Days at the internal SCR rate
    pub internal_cost: f64,
    pub margin_ratio: f64,
}

/// Per-scope financial figures
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScopeSummary {
    pub scope: String,
    pub item_count: usize,
    pub days: f64,
    pub price: f64,
    pub internal_cost: f64,
    pub margin_ratio: f64,
}

/// Project totals
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub project_name: String,
    pub currency: String,
    pub margin_rate: f64,
    pub item_count: usize,
    pub total_build_effort: f64,
    pub total_days: f64,
    #[serde(flatten)]
    pub breakdown: CostBreakdown,
    pub internal_cost: f64,
    pub margin_ratio: f64,
}

/// Dashboard counts and highlights
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dashboard<'a> {
    pub item_count: usize,
    pub total_days: f64,
    pub total_cost: f64,
    pub by_priority: BTreeMap<&'static str, usize>,
    pub by_scope: BTreeMap<&'a str, usize>,
    pub top_items: Vec<CostedItem<'a>>,
}

#[derive(Default)]
struct Totals {
    days: f64,
    price: f64,
    internal_cost: f64,
}

impl Totals {
    fn add(&mut self, days: f64, profile: Option<&Profile>) {
        self.days += days;
        if let Some(profile) = profile {
            self.price += cost(days, profile.daily_rate);
            self.internal_cost += cost(days, profile.internal_rate());
        }
    }
}

/// Figures for every active profile, in profile order
pub fn profile_summaries(items: &[BacklogItem], profiles: &[Profile]) -> Vec<ProfileSummary> {
    let base = total_build_effort(items);
    let mut days_by_profile: BTreeMap<&str, f64> = BTreeMap::new();
    for item in items {
        if let Some(id) = item.profile_id.as_deref() {
            *days_by_profile.entry(id).or_default() += resolve_effort(item, base);
        }
    }

    profiles
        .iter()
        .filter(|p| p.active)
        .map(|profile| {
            let days = days_by_profile.get(profile.id.as_str()).copied().unwrap_or(0.0);
            let price = cost(days, profile.daily_rate);
            let internal_cost = cost(days, profile.internal_rate());
            ProfileSummary {
                profile_id: profile.id.clone(),
                name: profile.name.clone(),
                daily_rate: profile.daily_rate,
                days,
                price,
                internal_cost,
                margin_ratio: margin_ratio(price, internal_cost),
            }
        })
        .collect()
}

/// Figures per scope label, sorted by label
pub fn scope_summaries(items: &[BacklogItem], profiles: &[Profile]) -> Vec<ScopeSummary> {
    let base = total_build_effort(items);
    let index = ProfileIndex::new(profiles);

    group_by_scope(items)
        .into_iter()
        .map(|(scope, scoped)| {
            let mut totals = Totals::default();
            for item in &scoped {
                totals.add(resolve_effort(item, base), index.for_item(item));
            }
            ScopeSummary {
                scope: scope.to_string(),
                item_count: scoped.len(),
                days: totals.days,
                price: totals.price,
                internal_cost: totals.internal_cost,
                margin_ratio: margin_ratio(totals.price, totals.internal_cost),
            }
        })
        .collect()
}

/// Grand totals; the base cost is the billing-rate price of all items
pub fn project_summary(items: &[BacklogItem], profiles: &[Profile], settings: &Settings) -> ProjectSummary {
    let base = total_build_effort(items);
    let index = ProfileIndex::new(profiles);

    let mut totals = Totals::default();
    for item in items {
        totals.add(resolve_effort(item, base), index.for_item(item));
    }

    ProjectSummary {
        project_name: settings.project_name.clone(),
        currency: settings.currency.clone(),
        margin_rate: settings.margin_rate,
        item_count: items.len(),
        total_build_effort: base,
        total_days: totals.days,
        breakdown: CostBreakdown::new(totals.price, settings.margin_rate),
        internal_cost: totals.internal_cost,
        margin_ratio: margin_ratio(totals.price, totals.internal_cost),
    }
}

/// Dashboard view: counts by priority and scope, totals, top-5 items
pub fn dashboard<'a>(items: &'a [BacklogItem], profiles: &'a [Profile]) -> Dashboard<'a> {
    let mut by_priority: BTreeMap<&'static str, usize> = BTreeMap::new();
    for item in items {
        let label = item.priority.as_ref().map_or(NO_PRIORITY, |p| p.as_str());
        *by_priority.entry(label).or_default() += 1;
    }

    let by_scope = group_by_scope(items)
        .into_iter()
        .map(|(scope, scoped)| (scope, scoped.len()))
        .collect();

    let costed = crate::aggregate::costed_items(items, profiles);
    Dashboard {
        item_count: items.len(),
        total_days: costed.iter().map(|c| c.effort_days).sum(),
        total_cost: costed.iter().map(|c| c.cost).sum(),
        by_priority,
        by_scope,
        top_items: top_expensive_items(items, profiles),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use costplan_core::{Priority, Scope};

    fn fixture() -> (Vec<BacklogItem>, Vec<Profile>) {
        let profiles = vec![
            Profile::new("dev").name("Developer").rate(500.0).scr(300.0),
            Profile::new("pm").name("Project Manager").rate(800.0).scr(900.0),
            Profile::new("old").name("Retired").rate(100.0).inactive(),
        ];
        let items = vec![
            BacklogItem::new("a").effort(10.0).scope(Scope::Mvp).assign("dev").priority(Priority::Must),
            BacklogItem::new("b").effort(10.0).scope(Scope::V1).assign("dev"),
            BacklogItem::new("c").ratio(10.0).other().scope(Scope::Mvp).assign("pm"),
        ];
        (items, profiles)
    }

    #[test]
    fn profile_figures() {
        let (items, profiles) = fixture();
        let summaries = profile_summaries(&items, &profiles);
        assert_eq!(summaries.len(), 2);

        let dev = &summaries[0];
        assert_eq!(dev.days, 20.0);
        assert_eq!(dev.price, 10000.0);
        assert_eq!(dev.internal_cost, 6000.0);
        assert_eq!(dev.margin_ratio, 0.4);

        let pm = &summaries[1];
        assert_eq!(pm.days, 2.0);
        assert_eq!(pm.price, 1600.0);
        assert!(pm.margin_ratio < 0.0);
    }

    #[test]
    fn profile_without_scr_has_full_margin() {
        let profiles = vec![Profile::new("dev").rate(500.0)];
        let items = vec![BacklogItem::new("a").effort(2.0).assign("dev")];
        let summaries = profile_summaries(&items, &profiles);
        assert_eq!(summaries[0].internal_cost, 0.0);
        assert_eq!(summaries[0].margin_ratio, 1.0);
    }

    #[test]
    fn scope_figures() {
        let (items, profiles) = fixture();
        let scopes = scope_summaries(&items, &profiles);
        assert_eq!(scopes.len(), 2);
        assert_eq!(scopes[0].scope, "MVP");
        assert_eq!(scopes[0].item_count, 2);
        assert_eq!(scopes[0].days, 12.0);
        assert_eq!(scopes[0].price, 6600.0);
        assert_eq!(scopes[1].scope, "V1");
        assert_eq!(scopes[1].price, 5000.0);
    }

    #[test]
    fn project_totals_apply_margin_rate() {
        let (items, profiles) = fixture();
        let settings = Settings::default().margin_rate(0.25);
        let summary = project_summary(&items, &profiles, &settings);

        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.total_build_effort, 20.0);
        assert_eq!(summary.total_days, 22.0);
        assert_eq!(summary.breakdown.base_cost, 11600.0);
        assert_eq!(summary.breakdown.margin_amount, 2900.0);
        assert_eq!(summary.breakdown.price_with_margin, 14500.0);
        assert_eq!(summary.internal_cost, 7800.0);
    }

    #[test]
    fn empty_backlog_is_all_zero() {
        let summary = project_summary(&[], &[], &Settings::default());
        assert_eq!(summary.total_days, 0.0);
        assert_eq!(summary.breakdown.price_with_margin, 0.0);
        assert_eq!(summary.margin_ratio, 0.0);
    }

    #[test]
    fn dashboard_counts() {
        let (items, profiles) = fixture();
        let board = dashboard(&items, &profiles);
        assert_eq!(board.item_count, 3);
        assert_eq!(board.by_priority["Must"], 1);
        assert_eq!(board.by_priority[NO_PRIORITY], 2);
        assert_eq!(board.by_scope["MVP"], 2);
        assert_eq!(board.total_cost, 11600.0);
        assert_eq!(board.top_items[0].item.id, "a");
        assert_eq!(board.top_items.len(), 3);
    }
}
