//! Effort resolution
//!
//! Ratio-charged items are expressed as a percentage of the build effort
//! base: the raw `effort_days` of every build (or untyped) item. Overhead
//! items typed `other` never feed the base, whatever their charge type.

use costplan_core::{BacklogItem, ChargeType};

/// Sum of raw `effort_days` over build items (type `build` or absent)
pub fn total_build_effort(items: &[BacklogItem]) -> f64 {
    items
        .iter()
        .filter(|item| item.is_build())
        .map(|item| item.effort_days)
        .sum()
}

/// Absolute days for an item.
///
/// `Days` items return `effort_days` unchanged; `Ratio` items return
/// `total_build_effort * effort_days / 100`. No clamping or rounding.
pub fn resolve_effort(item: &BacklogItem, total_build_effort: f64) -> f64 {
    match item.charge_type {
        ChargeType::Days => item.effort_days,
        ChargeType::Ratio => total_build_effort * item.effort_days / 100.0,
    }
}

/// Resolved days summed over a set of items
pub fn total_resolved_effort(items: &[BacklogItem]) -> f64 {
    let base = total_build_effort(items);
    items.iter().map(|item| resolve_effort(item, base)).sum()
}
