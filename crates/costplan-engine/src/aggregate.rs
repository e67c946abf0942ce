//! Backlog grouping
//!
//! Groups are keyed by display labels, with sentinel labels standing in for
//! absent keys (`Other Products`, `General`, `No Scope`). Group order is
//! lexicographic on the label so output is deterministic whatever the
//! input order.

use std::collections::BTreeMap;

use costplan_core::{BacklogItem, Profile};
use serde::Serialize;

use crate::cost::{cost, ProfileIndex};
use crate::effort::{resolve_effort, total_build_effort};

/// Number of items in the "top expensive items" view
pub const TOP_ITEMS: usize = 5;

/// Items of one product, split by cluster
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProductGroup<'a> {
    pub product: &'a str,
    pub clusters: Vec<ClusterGroup<'a>>,
}

impl ProductGroup<'_> {
    /// Number of items across all clusters
    pub fn item_count(&self) -> usize {
        self.clusters.iter().map(|c| c.items.len()).sum()
    }
}

/// Items of one cluster
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClusterGroup<'a> {
    pub cluster: &'a str,
    pub items: Vec<&'a BacklogItem>,
}

/// Group items as Product → Cluster → Items.
///
/// Products and clusters are sorted by label. Items keep their input order,
/// unless some item in the cluster carries a manual `order`: then the
/// cluster is stably sorted by it, unordered items last.
pub fn group_by_product_cluster(items: &[BacklogItem]) -> Vec<ProductGroup<'_>> {
    let mut tree: BTreeMap<&str, BTreeMap<&str, Vec<&BacklogItem>>> = BTreeMap::new();
    for item in items {
        tree.entry(item.product_label())
            .or_default()
            .entry(item.cluster_label())
            .or_default()
            .push(item);
    }

    tree.into_iter()
        .map(|(product, clusters)| ProductGroup {
            product,
            clusters: clusters
                .into_iter()
                .map(|(cluster, mut items)| {
                    if items.iter().any(|i| i.order.is_some()) {
                        items.sort_by_key(|i| (i.order.is_none(), i.order));
                    }
                    ClusterGroup { cluster, items }
                })
                .collect(),
        })
        .collect()
}

/// Group items by scope label (`No Scope` when absent), sorted by label
pub fn group_by_scope(items: &[BacklogItem]) -> BTreeMap<&str, Vec<&BacklogItem>> {
    let mut groups: BTreeMap<&str, Vec<&BacklogItem>> = BTreeMap::new();
    for item in items {
        groups.entry(item.scope_label()).or_default().push(item);
    }
    groups
}

/// An item with its resolved effort and cost
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CostedItem<'a> {
    pub item: &'a BacklogItem,
    /// Profile display name, `Unknown` when unresolvable
    pub profile: &'a str,
    pub effort_days: f64,
    pub daily_rate: f64,
    pub cost: f64,
}

/// Resolve effort and cost for every item, in input order.
///
/// Items whose profile cannot be resolved cost 0.
pub fn costed_items<'a>(items: &'a [BacklogItem], profiles: &'a [Profile]) -> Vec<CostedItem<'a>> {
    let base = total_build_effort(items);
    let index = ProfileIndex::new(profiles);
    items
        .iter()
        .map(|item| {
            let effort_days = resolve_effort(item, base);
            let daily_rate = index.daily_rate(item);
            CostedItem {
                item,
                profile: index.label(item),
                effort_days,
                daily_rate,
                cost: cost(effort_days, daily_rate),
            }
        })
        .collect()
}

/// The `n` most expensive items, cost descending; ties keep input order
pub fn top_items<'a>(
    items: &'a [BacklogItem],
    profiles: &'a [Profile],
    n: usize,
) -> Vec<CostedItem<'a>> {
    let mut costed = costed_items(items, profiles);
    costed.sort_by(|a, b| b.cost.total_cmp(&a.cost));
    costed.truncate(n);
    costed
}

/// The five most expensive items
pub fn top_expensive_items<'a>(items: &'a [BacklogItem], profiles: &'a [Profile]) -> Vec<CostedItem<'a>> {
    top_items(items, profiles, TOP_ITEMS)
}
