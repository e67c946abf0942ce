//! # costplan-engine
//!
//! Effort, cost and margin calculations with their aggregation pipeline.
//!
//! This crate provides:
//! - Effort resolution for day- and ratio-charged items
//! - Cost, margin-rate and margin-ratio arithmetic
//! - Grouping by product/cluster, scope and scope × profile
//! - Financial summaries, dashboard figures and top items
//! - A recompute-on-change session with subscribers
//!
//! Everything here is a pure function of the slices it is handed.
//!
//! ## Example
//!
//! ```rust
//! use costplan_core::{BacklogItem, Profile};
//! use costplan_engine::{item_cost, resolve_effort, total_build_effort};
//!
//! let items = vec![
//!     BacklogItem::new("api").effort(60.0),
//!     BacklogItem::new("ui").effort(40.0),
//!     BacklogItem::new("qa").ratio(20.0).other(),
//! ];
//! let base = total_build_effort(&items);
//! assert_eq!(base, 100.0);
//! assert_eq!(resolve_effort(&items[2], base), 20.0);
//! assert_eq!(item_cost(&items[2], base, 500.0), 10000.0);
//! ```

pub mod aggregate;
pub mod cost;
pub mod effort;
pub mod planning;
pub mod session;
pub mod summary;

pub use aggregate::{
    costed_items, group_by_product_cluster, group_by_scope, top_expensive_items, top_items,
    ClusterGroup, CostedItem, ProductGroup, TOP_ITEMS,
};
pub use cost::{
    apply_margin, cost, item_cost, margin_amount, margin_ratio, CostBreakdown, ProfileIndex,
};
pub use effort::{resolve_effort, total_build_effort, total_resolved_effort};
pub use planning::{aggregate_planning, distributed_days, month_labels, remaining_effort, PlanningRow};
pub use session::{CostSnapshot, CostingSession, SubscriptionId, TopItem};
pub use summary::{
    dashboard, profile_summaries, project_summary, scope_summaries, Dashboard, ProfileSummary,
    ProjectSummary, ScopeSummary, NO_PRIORITY,
};
