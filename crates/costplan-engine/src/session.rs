//! Recompute-on-change costing session
//!
//! A `CostingSession` owns the working set (items, profiles, settings,
//! plannings). Every mutation recomputes a full [`CostSnapshot`] from
//! scratch and hands it to each subscriber. There is no incremental state:
//! computing twice from the same inputs yields the same snapshot.

use costplan_core::{BacklogItem, Planning, Profile, Project, Settings};
use serde::Serialize;
use tracing::debug;

use crate::aggregate::{top_expensive_items, CostedItem};
use crate::planning::{aggregate_planning, PlanningRow};
use crate::summary::{
    profile_summaries, project_summary, scope_summaries, ProfileSummary, ProjectSummary,
    ScopeSummary,
};

/// One of the most expensive items, detached from the backlog
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TopItem {
    pub item_id: String,
    pub title: String,
    pub profile: String,
    pub effort_days: f64,
    pub cost: f64,
}

impl From<&CostedItem<'_>> for TopItem {
    fn from(costed: &CostedItem<'_>) -> Self {
        Self {
            item_id: costed.item.id.clone(),
            title: costed.item.title.clone(),
            profile: costed.profile.to_string(),
            effort_days: costed.effort_days,
            cost: costed.cost,
        }
    }
}

/// Everything derived from a project's working set
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CostSnapshot {
    pub project: ProjectSummary,
    pub profiles: Vec<ProfileSummary>,
    pub scopes: Vec<ScopeSummary>,
    pub planning: Vec<PlanningRow>,
    pub top_items: Vec<TopItem>,
}

impl CostSnapshot {
    /// Compute all summaries for a project
    pub fn compute(project: &Project) -> Self {
        let items = &project.items;
        let profiles = &project.profiles;
        Self {
            project: project_summary(items, profiles, &project.settings),
            profiles: profile_summaries(items, profiles),
            scopes: scope_summaries(items, profiles),
            planning: aggregate_planning(items, profiles, &project.plannings),
            top_items: top_expensive_items(items, profiles)
                .iter()
                .map(TopItem::from)
                .collect(),
        }
    }
}

/// Handle returned by [`CostingSession::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

type Subscriber = Box<dyn FnMut(&CostSnapshot)>;

/// Working set with change notification
pub struct CostingSession {
    project: Project,
    snapshot: CostSnapshot,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: usize,
}

impl CostingSession {
    pub fn new(project: Project) -> Self {
        let snapshot = CostSnapshot::compute(&project);
        Self {
            project,
            snapshot,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Latest computed snapshot
    pub fn snapshot(&self) -> &CostSnapshot {
        &self.snapshot
    }

    /// Register a callback run after every recompute
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&CostSnapshot) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn set_items(&mut self, items: Vec<BacklogItem>) {
        self.project.items = items;
        self.recompute();
    }

    pub fn set_profiles(&mut self, profiles: Vec<Profile>) {
        self.project.profiles = profiles;
        self.recompute();
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.project.settings = settings;
        self.recompute();
    }

    pub fn set_plannings(&mut self, plannings: Vec<Planning>) {
        self.project.plannings = plannings;
        self.recompute();
    }

    /// Insert an item or replace the one with the same ID
    pub fn upsert_item(&mut self, item: BacklogItem) {
        match self.project.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => *existing = item,
            None => self.project.items.push(item),
        }
        self.recompute();
    }

    /// Remove an item by ID. Recomputes only when something was removed.
    pub fn remove_item(&mut self, id: &str) -> bool {
        let before = self.project.items.len();
        self.project.items.retain(|i| i.id != id);
        let removed = self.project.items.len() != before;
        if removed {
            self.recompute();
        }
        removed
    }

    /// Recompute the snapshot and notify subscribers
    pub fn recompute(&mut self) {
        self.snapshot = CostSnapshot::compute(&self.project);
        debug!(
            items = self.project.items.len(),
            subscribers = self.subscribers.len(),
            total = self.snapshot.project.breakdown.price_with_margin,
            "recomputed cost snapshot"
        );
        for (_, callback) in &mut self.subscribers {
            callback(&self.snapshot);
        }
    }
}

impl std::fmt::Debug for CostingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CostingSession")
            .field("project", &self.project.settings.project_name)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
