//! JSON import/export bundle
//!
//! The bundle is the portable form of a costing workspace:
//!
//! ```json
//! {
//!   "projectName": "Portal Rebuild",
//!   "exportDate": "2026-03-01T09:00:00Z",
//!   "items": [ ... ],
//!   "profiles": [ ... ]
//! }
//! ```
//!
//! `settings` and `plannings` are optional additions; older bundles
//! without them still load. A bundle that is not valid JSON, or whose
//! shape does not match, is rejected as a whole.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{BacklogItem, Planning, Profile, Project, Settings};

/// Serialized costing workspace
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBundle {
    pub project_name: String,
    pub export_date: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<BacklogItem>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plannings: Vec<Planning>,
}

impl ProjectBundle {
    /// Snapshot a project, stamping the current time as export date
    pub fn from_project(project: &Project) -> Self {
        Self::from_project_at(project, Utc::now())
    }

    pub fn from_project_at(project: &Project, export_date: DateTime<Utc>) -> Self {
        Self {
            project_name: project.settings.project_name.clone(),
            export_date,
            items: project.items.clone(),
            profiles: project.profiles.clone(),
            settings: Some(project.settings.clone()),
            plannings: project.plannings.clone(),
        }
    }

    /// Rebuild a project; the bundle's project name wins over settings
    pub fn into_project(self) -> Project {
        let mut settings = self.settings.unwrap_or_default();
        settings.project_name = self.project_name;
        Project {
            settings,
            items: self.items,
            profiles: self.profiles,
            plannings: self.plannings,
        }
    }

    pub fn from_json(input: &str) -> Result<Self, BundleError> {
        serde_json::from_str(input).map_err(BundleError::Parse)
    }

    pub fn to_json(&self) -> Result<String, BundleError> {
        serde_json::to_string_pretty(self).map_err(BundleError::Serialize)
    }

    /// Read a bundle file
    pub fn read(path: &Path) -> Result<Self, BundleError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Write a bundle file
    pub fn write(&self, path: &Path) -> Result<(), BundleError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Bundle error
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid bundle: {0}")]
    Parse(serde_json::Error),

    #[error("Cannot serialize bundle: {0}")]
    Serialize(serde_json::Error),
}
