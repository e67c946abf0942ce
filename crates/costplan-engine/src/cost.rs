//! Cost and margin arithmetic
//!
//! Two margin notions coexist and are kept apart by name:
//!
//! - **margin rate**: the markup fraction configured in `Settings`,
//!   applied to a base cost with [`apply_margin`] / [`margin_amount`];
//! - **margin ratio**: the profitability `(price - cost) / price` computed
//!   from a profile's billing rate against its internal SCR rate, see
//!   [`margin_ratio`].
//!
//! No currency rounding happens here.

use std::collections::HashMap;

use costplan_core::{BacklogItem, Profile, UNKNOWN_PROFILE};
use serde::Serialize;
use tracing::warn;

use crate::effort::resolve_effort;

/// `effort_days * daily_rate`
pub fn cost(effort_days: f64, daily_rate: f64) -> f64 {
    effort_days * daily_rate
}

/// Price after markup: `base_cost * (1 + margin_rate)`
pub fn apply_margin(base_cost: f64, margin_rate: f64) -> f64 {
    base_cost * (1.0 + margin_rate)
}

/// Markup amount: `base_cost * margin_rate`
pub fn margin_amount(base_cost: f64, margin_rate: f64) -> f64 {
    base_cost * margin_rate
}

/// Cost of one item at the given daily rate
pub fn item_cost(item: &BacklogItem, total_build_effort: f64, daily_rate: f64) -> f64 {
    cost(resolve_effort(item, total_build_effort), daily_rate)
}

/// Profitability ratio `(price - internal_cost) / price`, 0 when price <= 0.
///
/// Negative when the internal cost exceeds the price.
pub fn margin_ratio(price: f64, internal_cost: f64) -> f64 {
    if price > 0.0 {
        (price - internal_cost) / price
    } else {
        0.0
    }
}

/// Base cost split into markup and final price
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub base_cost: f64,
    pub margin_amount: f64,
    pub price_with_margin: f64,
}

impl CostBreakdown {
    pub fn new(base_cost: f64, margin_rate: f64) -> Self {
        Self {
            base_cost,
            margin_amount: margin_amount(base_cost, margin_rate),
            price_with_margin: apply_margin(base_cost, margin_rate),
        }
    }
}

/// Profile lookup by ID
///
/// When several profiles share an ID the first one wins, matching
/// `Project::get_profile`.
#[derive(Clone, Debug, Default)]
pub struct ProfileIndex<'a> {
    by_id: HashMap<&'a str, &'a Profile>,
}

impl<'a> ProfileIndex<'a> {
    pub fn new(profiles: &'a [Profile]) -> Self {
        let mut by_id = HashMap::with_capacity(profiles.len());
        for profile in profiles {
            if by_id.contains_key(profile.id.as_str()) {
                warn!(profile = %profile.id, "duplicate profile ID, keeping the first");
                continue;
            }
            by_id.insert(profile.id.as_str(), profile);
        }
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&'a Profile> {
        self.by_id.get(id).copied()
    }

    /// Profile assigned to an item, if it can be resolved
    pub fn for_item(&self, item: &BacklogItem) -> Option<&'a Profile> {
        item.profile_id.as_deref().and_then(|id| self.get(id))
    }

    /// Billing rate for an item; 0 when its profile is unknown
    pub fn daily_rate(&self, item: &BacklogItem) -> f64 {
        self.for_item(item).map_or(0.0, |p| p.daily_rate)
    }

    /// Display name for an item's profile, `UNKNOWN_PROFILE` when unresolvable
    pub fn label(&self, item: &BacklogItem) -> &'a str {
        self.for_item(item).map_or(UNKNOWN_PROFILE, |p| p.name.as_str())
    }
}
