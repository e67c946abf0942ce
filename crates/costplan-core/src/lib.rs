//! # costplan-core
//!
//! Core domain model and traits for the costplan costing engine.
//!
//! This crate provides:
//! - Domain types: `Project`, `BacklogItem`, `Profile`, `Settings`, `Planning`
//! - Sentinel labels used when grouping keys are absent
//! - Storage abstraction (`Repository`) with in-memory and JSON-file stores
//! - The JSON import/export bundle and TOML settings loader
//! - Error types and the `Renderer` trait
//!
//! ## Example
//!
//! ```rust
//! use costplan_core::{BacklogItem, Profile, Project, Scope};
//!
//! let mut project = Project::new("Portal Rebuild");
//! project.profiles.push(Profile::new("dev").name("Developer").rate(500.0));
//! project.items.push(
//!     BacklogItem::new("login")
//!         .title("Login page")
//!         .effort(5.0)
//!         .scope(Scope::Mvp)
//!         .assign("dev"),
//! );
//! project.items.push(
//!     BacklogItem::new("pm")
//!         .title("Project management")
//!         .ratio(10.0)
//!         .other(),
//! );
//! assert_eq!(project.items.len(), 2);
//! ```

pub mod bundle;
pub mod config;
pub mod layout;
pub mod numeric;
pub mod store;

pub use bundle::{BundleError, ProjectBundle};
pub use config::{ConfigError, CostplanConfig};
pub use store::{Entity, JsonFileRepository, MemoryRepository, Repository, StoreError};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Type Aliases and Sentinels
// ============================================================================

/// Unique identifier for a backlog item
pub type ItemId = String;

/// Unique identifier for a staffing profile
pub type ProfileId = String;

/// Product label used when an item has no product
pub const OTHER_PRODUCTS: &str = "Other Products";

/// Cluster label used when an item has no cluster
pub const GENERAL_CLUSTER: &str = "General";

/// Scope label used when an item has no scope
pub const NO_SCOPE: &str = "No Scope";

/// Label used when an item's profile cannot be resolved
pub const UNKNOWN_PROFILE: &str = "Unknown";

/// Number of months covered by a planning distribution (month indices 0..24)
pub const PLANNING_HORIZON_MONTHS: u32 = 24;

// ============================================================================
// Enumerations
// ============================================================================

/// Delivery milestone bucket
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Scope {
    #[serde(rename = "MVP")]
    Mvp,
    V1,
    V2,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Mvp => "MVP",
            Scope::V1 => "V1",
            Scope::V2 => "V2",
        }
    }

    /// Parse a scope label, ignoring case and surrounding whitespace
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "MVP" => Some(Scope::Mvp),
            "V1" => Some(Scope::V1),
            "V2" => Some(Scope::V2),
            _ => None,
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// MoSCoW priority
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Must,
    Should,
    Could,
    Wont,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Must => "Must",
            Priority::Should => "Should",
            Priority::Could => "Could",
            Priority::Wont => "Won't",
        }
    }

    /// Parse a MoSCoW label ("Must", "should", "Won't", "W", ...)
    pub fn parse(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();
        match normalized.as_str() {
            "must" | "m" => Some(Priority::Must),
            "should" | "s" => Some(Priority::Should),
            "could" | "c" => Some(Priority::Could),
            "wont" | "w" => Some(Priority::Wont),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of work an item represents
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// Delivery work; contributes to the build effort base
    #[default]
    Build,
    /// Overhead work (management, QA, ...); never part of the build base
    Other,
}

/// How an item's `effort_days` value is interpreted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeType {
    /// `effort_days` is an absolute number of days
    #[default]
    Days,
    /// `effort_days` is a percentage of the total build effort
    Ratio,
}

/// Coarse risk rating attached to an item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Error for an enum label that matches no variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognised label: {0:?}")]
pub struct ParseLabelError(pub String);

impl FromStr for Scope {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scope::parse(s).ok_or_else(|| ParseLabelError(s.to_string()))
    }
}

impl FromStr for Priority {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::parse(s).ok_or_else(|| ParseLabelError(s.to_string()))
    }
}

impl FromStr for ItemType {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "build" => Ok(ItemType::Build),
            "other" => Ok(ItemType::Other),
            _ => Err(ParseLabelError(s.to_string())),
        }
    }
}

impl FromStr for ChargeType {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "days" => Ok(ChargeType::Days),
            "ratio" => Ok(ChargeType::Ratio),
            _ => Err(ParseLabelError(s.to_string())),
        }
    }
}

impl FromStr for RiskLevel {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            _ => Err(ParseLabelError(s.to_string())),
        }
    }
}

// ============================================================================
// Profile
// ============================================================================

/// A staffing role with its billing and internal rates
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Unique identifier
    pub id: ProfileId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Person holding the role, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Billing rate per day
    #[serde(default, deserialize_with = "numeric::lenient_f64")]
    pub daily_rate: f64,
    /// Internal cost rate per day
    #[serde(default, deserialize_with = "numeric::lenient_opt_f64", skip_serializing_if = "Option::is_none")]
    pub scr: Option<f64>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Profile {
    /// Create an active profile with the given ID and no rates
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            username: None,
            daily_rate: 0.0,
            scr: None,
            active: true,
        }
    }

    /// Set the display name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the billing rate per day
    pub fn rate(mut self, daily_rate: f64) -> Self {
        self.daily_rate = daily_rate;
        self
    }

    /// Set the internal cost rate per day
    pub fn scr(mut self, scr: f64) -> Self {
        self.scr = Some(scr);
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Mark the profile as inactive
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Internal cost rate, 0 when no SCR is recorded
    pub fn internal_rate(&self) -> f64 {
        self.scr.unwrap_or(0.0)
    }
}

// ============================================================================
// Backlog Item
// ============================================================================

/// A costed unit of work
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogItem {
    /// Unique identifier
    pub id: ItemId,
    /// Short title
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hypotheses: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// Product label (top level of the backlog hierarchy)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    /// Cluster label (second level, inside a product)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(default, deserialize_with = "numeric::lenient_label", skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(default, deserialize_with = "numeric::lenient_label", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Item type; `None` counts as build
    #[serde(
        rename = "type",
        default,
        deserialize_with = "numeric::lenient_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub item_type: Option<ItemType>,
    #[serde(default, deserialize_with = "numeric::lenient_label_or_default")]
    pub charge_type: ChargeType,
    /// Days (`ChargeType::Days`) or percentage of build effort (`ChargeType::Ratio`)
    #[serde(default, deserialize_with = "numeric::lenient_f64")]
    pub effort_days: f64,
    /// Assigned staffing profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<ProfileId>,
    /// Manual position inside its cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "numeric::lenient_label", skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl BacklogItem {
    /// Create a build item charged in days with zero effort
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            description: None,
            hypotheses: None,
            comments: None,
            product: None,
            cluster: None,
            scope: None,
            priority: None,
            item_type: None,
            charge_type: ChargeType::Days,
            effort_days: 0.0,
            profile_id: None,
            order: None,
            tags: Vec::new(),
            risk: None,
            created_at: None,
            updated_at: None,
            created_by: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Charge a fixed number of days
    pub fn effort(mut self, days: f64) -> Self {
        self.charge_type = ChargeType::Days;
        self.effort_days = days;
        self
    }

    /// Charge a percentage (0-100) of the total build effort
    pub fn ratio(mut self, percent: f64) -> Self {
        self.charge_type = ChargeType::Ratio;
        self.effort_days = percent;
        self
    }

    /// Mark as build work
    pub fn build(mut self) -> Self {
        self.item_type = Some(ItemType::Build);
        self
    }

    /// Mark as overhead work, excluded from the build effort base
    pub fn other(mut self) -> Self {
        self.item_type = Some(ItemType::Other);
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Assign a staffing profile
    pub fn assign(mut self, profile_id: impl Into<String>) -> Self {
        self.profile_id = Some(profile_id.into());
        self
    }

    pub fn product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    pub fn cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = Some(cluster.into());
        self
    }

    /// Set the manual position inside the cluster
    pub fn order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Whether the item contributes to the build effort base
    pub fn is_build(&self) -> bool {
        !matches!(self.item_type, Some(ItemType::Other))
    }

    /// Effective type (absent counts as build)
    pub fn effective_type(&self) -> ItemType {
        self.item_type.unwrap_or_default()
    }

    /// Product label with the `OTHER_PRODUCTS` fallback
    pub fn product_label(&self) -> &str {
        non_blank(self.product.as_deref()).unwrap_or(OTHER_PRODUCTS)
    }

    /// Cluster label with the `GENERAL_CLUSTER` fallback
    pub fn cluster_label(&self) -> &str {
        non_blank(self.cluster.as_deref()).unwrap_or(GENERAL_CLUSTER)
    }

    /// Scope label with the `NO_SCOPE` fallback
    pub fn scope_label(&self) -> &str {
        self.scope.as_ref().map_or(NO_SCOPE, Scope::as_str)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// ============================================================================
// Settings and Planning
// ============================================================================

/// Project-level configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Markup fraction applied to base cost (0.15 = 15%)
    #[serde(deserialize_with = "numeric::lenient_f64")]
    pub margin_rate: f64,
    /// ISO currency code
    pub currency: String,
    pub project_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            margin_rate: 0.15,
            currency: "EUR".into(),
            project_name: "Untitled Project".into(),
            start_date: None,
        }
    }
}

impl Settings {
    pub fn margin_rate(mut self, margin_rate: f64) -> Self {
        self.margin_rate = margin_rate;
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

/// Month-by-month distribution of a profile's effort within one scope
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Planning {
    /// Scope label (`MVP`, `V1`, `V2` or `NO_SCOPE`)
    pub scope: String,
    pub profile_id: ProfileId,
    /// Month index (0-based from the project start) to effort days
    #[serde(default)]
    pub distribution: BTreeMap<u32, f64>,
}

impl Planning {
    pub fn new(scope: impl Into<String>, profile_id: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            profile_id: profile_id.into(),
            distribution: BTreeMap::new(),
        }
    }

    /// Set the days planned in a month (builder pattern)
    pub fn month(mut self, index: u32, days: f64) -> Self {
        self.distribution.insert(index, days);
        self
    }

    /// Days planned in a month; unset months count as 0
    pub fn days_in_month(&self, index: u32) -> f64 {
        self.distribution.get(&index).copied().unwrap_or(0.0)
    }

    /// Whether this planning row belongs to the given scope/profile pair
    pub fn matches(&self, scope: &str, profile_id: &str) -> bool {
        self.scope == scope && self.profile_id == profile_id
    }
}

// ============================================================================
// Project
// ============================================================================

/// A complete costing workspace
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub settings: Settings,
    pub items: Vec<BacklogItem>,
    pub profiles: Vec<Profile>,
    pub plannings: Vec<Planning>,
}

impl Project {
    /// Create an empty project with default settings
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            settings: Settings {
                project_name: name.into(),
                ..Settings::default()
            },
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.settings.project_name
    }

    /// Get a profile by ID
    pub fn get_profile(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Get a backlog item by ID
    pub fn get_item(&self, id: &str) -> Option<&BacklogItem> {
        self.items.iter().find(|i| i.id == id)
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Output rendering
pub trait Renderer {
    type Output;

    /// Render a project to the output format
    fn render(&self, project: &Project) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
