//! Plain-text reports
//!
//! Amounts are rounded half away from zero to two decimals through
//! `rust_decimal`, so `0.125` prints as `0.13` whatever the binary
//! representation of the float.

use chrono::NaiveDate;
use costplan_core::{Project, RenderError, Renderer, PLANNING_HORIZON_MONTHS};
use costplan_engine::{month_labels, CostSnapshot, PlanningRow, TopItem};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Round an amount to two decimals for display
pub fn money(value: f64) -> Option<Decimal> {
    let mut rounded =
        Decimal::from_f64(value)?.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    Some(rounded)
}

fn fmt_amount(value: f64) -> String {
    money(value).map_or_else(|| format!("{value:.2}"), |d| d.to_string())
}

fn fmt_percent(fraction: f64) -> String {
    format!("{}%", fmt_amount(fraction * 100.0))
}

/// Summary report: project totals, profiles, scopes
pub fn summary_text(snapshot: &CostSnapshot) -> String {
    let project = &snapshot.project;
    let currency = &project.currency;
    let mut out = String::new();

    out.push_str(&format!("Project: {}\n", project.project_name));
    out.push_str(&format!("Items: {}\n", project.item_count));
    out.push_str(&format!("Build effort: {} d\n", fmt_amount(project.total_build_effort)));
    out.push_str(&format!("Total effort: {} d\n", fmt_amount(project.total_days)));
    out.push('\n');
    out.push_str(&format!("Base cost:         {} {currency}\n", fmt_amount(project.breakdown.base_cost)));
    out.push_str(&format!(
        "Margin ({}):  {} {currency}\n",
        fmt_percent(project.margin_rate),
        fmt_amount(project.breakdown.margin_amount)
    ));
    out.push_str(&format!(
        "Price with margin: {} {currency}\n",
        fmt_amount(project.breakdown.price_with_margin)
    ));
    out.push_str(&format!("Internal cost:     {} {currency}\n", fmt_amount(project.internal_cost)));
    out.push_str(&format!("Margin ratio:      {}\n", fmt_percent(project.margin_ratio)));

    if !snapshot.profiles.is_empty() {
        out.push_str("\nProfiles\n");
        out.push_str(&format!(
            "  {:<24} {:>10} {:>8} {:>14} {:>8}\n",
            "Profile", "Rate /d", "Days", "Price", "Margin"
        ));
        for p in &snapshot.profiles {
            out.push_str(&format!(
                "  {:<24} {:>10} {:>8} {:>14} {:>8}\n",
                p.name,
                fmt_amount(p.daily_rate),
                fmt_amount(p.days),
                fmt_amount(p.price),
                fmt_percent(p.margin_ratio)
            ));
        }
    }

    if !snapshot.scopes.is_empty() {
        out.push_str("\nScopes\n");
        out.push_str(&format!(
            "  {:<10} {:>6} {:>8} {:>14} {:>8}\n",
            "Scope", "Items", "Days", "Price", "Margin"
        ));
        for s in &snapshot.scopes {
            out.push_str(&format!(
                "  {:<10} {:>6} {:>8} {:>14} {:>8}\n",
                s.scope,
                s.item_count,
                fmt_amount(s.days),
                fmt_amount(s.price),
                fmt_percent(s.margin_ratio)
            ));
        }
    }

    out
}

/// Planning report, one block per scope × profile pair.
///
/// Months are labelled `YYYY-MM` from `start`, or `M1`, `M2`, ... without one.
pub fn planning_text(rows: &[PlanningRow], start: Option<NaiveDate>) -> String {
    if rows.is_empty() {
        return "No planning rows\n".to_string();
    }

    let labels = start.map(|s| month_labels(s, PLANNING_HORIZON_MONTHS));
    let month_label = |index: u32| {
        labels
            .as_ref()
            .and_then(|l| l.get(index as usize).cloned())
            .unwrap_or_else(|| format!("M{}", index + 1))
    };

    let mut out = String::new();
    for row in rows {
        out.push_str(&format!(
            "{} / {}: total {} d, distributed {} d, remaining {} d\n",
            row.scope,
            row.profile_name,
            fmt_amount(row.total_effort),
            fmt_amount(row.distributed),
            fmt_amount(row.remaining)
        ));
        for (&month, &days) in &row.distribution {
            if month < PLANNING_HORIZON_MONTHS && days != 0.0 {
                out.push_str(&format!("  {}: {}\n", month_label(month), fmt_amount(days)));
            }
        }
    }
    out
}

/// Ranked list of the most expensive items
pub fn top_items_text(items: &[TopItem], currency: &str) -> String {
    let mut out = String::new();
    for (rank, item) in items.iter().enumerate() {
        out.push_str(&format!(
            "{:>2}. {:<32} {:<20} {:>8} d {:>14} {currency}\n",
            rank + 1,
            item.title,
            item.profile,
            fmt_amount(item.effort_days),
            fmt_amount(item.cost)
        ));
    }
    out
}

/// Text summary renderer
#[derive(Clone, Debug, Default)]
pub struct TextRenderer;

impl TextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for TextRenderer {
    type Output = String;

    fn render(&self, project: &Project) -> Result<String, RenderError> {
        Ok(summary_text(&CostSnapshot::compute(project)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use costplan_core::{BacklogItem, Planning, Profile, Scope};
    use rust_decimal_macros::dec;

    fn sample() -> Project {
        let mut project = Project::new("Sample");
        project.settings.margin_rate = 0.15;
        project.profiles = vec![Profile::new("dev").name("Developer").rate(500.0).scr(400.0)];
        project.items = vec![BacklogItem::new("a")
            .title("API")
            .scope(Scope::Mvp)
            .effort(2.0)
            .assign("dev")];
        project.plannings = vec![Planning::new("MVP", "dev").month(0, 1.5)];
        project
    }

    #[test]
    fn money_rounds_half_away_from_zero() {
        assert_eq!(money(0.125), Some(dec!(0.13)));
        assert_eq!(money(-0.125), Some(dec!(-0.13)));
        assert_eq!(money(1150.0).map(|d| d.to_string()), Some("1150.00".to_string()));
        assert_eq!(money(f64::NAN), None);
    }

    #[test]
    fn summary_lists_totals() {
        let text = TextRenderer::new().render(&sample()).unwrap();
        assert!(text.contains("Project: Sample"));
        assert!(text.contains("Base cost:         1000.00 EUR"));
        assert!(text.contains("Price with margin: 1150.00 EUR"));
        assert!(text.contains("Margin ratio:      20.00%"));
        assert!(text.contains("Developer"));
        assert!(text.contains("MVP"));
    }

    #[test]
    fn planning_months() {
        let snapshot = CostSnapshot::compute(&sample());
        let plain = planning_text(&snapshot.planning, None);
        assert!(plain.contains("MVP / Developer: total 2.00 d, distributed 1.50 d, remaining 0.50 d"));
        assert!(plain.contains("  M1: 1.50"));

        let dated = planning_text(&snapshot.planning, NaiveDate::from_ymd_opt(2026, 3, 15));
        assert!(dated.contains("  2026-03: 1.50"));
    }

    #[test]
    fn empty_planning() {
        assert_eq!(planning_text(&[], None), "No planning rows\n");
    }

    #[test]
    fn top_items_are_ranked() {
        let snapshot = CostSnapshot::compute(&sample());
        let text = top_items_text(&snapshot.top_items, "EUR");
        assert!(text.starts_with(" 1. API"));
        assert!(text.contains("1000.00 EUR"));
    }
}
