//! `costplan.toml` configuration
//!
//! ```toml
//! [settings]
//! margin_rate = 0.18
//! currency = "EUR"
//! project_name = "Portal Rebuild"
//! start_date = "2026-01-05"
//! ```
//!
//! Every key is optional. Keys that are present override the settings a
//! project already carries; absent keys leave them untouched.

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::Settings;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "costplan.toml";

/// Parsed configuration file
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CostplanConfig {
    #[serde(default)]
    pub settings: SettingsOverrides,
}

/// Optional settings overrides
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsOverrides {
    pub margin_rate: Option<f64>,
    pub currency: Option<String>,
    pub project_name: Option<String>,
    pub start_date: Option<NaiveDate>,
}

impl CostplanConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load `costplan.toml` from a directory if it exists
    pub fn discover(dir: &Path) -> Result<Option<Self>, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path).map(Some)
        } else {
            Ok(None)
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(rate) = self.settings.margin_rate {
            if !rate.is_finite() {
                return Err(ConfigError::Invalid(format!("margin_rate must be finite, got {rate}")));
            }
        }
        Ok(())
    }

    /// Apply the configured overrides on top of existing settings
    pub fn apply(&self, settings: &Settings) -> Settings {
        let overrides = &self.settings;
        Settings {
            margin_rate: overrides.margin_rate.unwrap_or(settings.margin_rate),
            currency: overrides
                .currency
                .clone()
                .unwrap_or_else(|| settings.currency.clone()),
            project_name: overrides
                .project_name
                .clone()
                .unwrap_or_else(|| settings.project_name.clone()),
            start_date: overrides.start_date.or(settings.start_date),
        }
    }
}

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_full_settings() {
        let config = CostplanConfig::from_toml_str(
            r#"
            [settings]
            margin_rate = 0.18
            currency = "USD"
            project_name = "Portal"
            start_date = "2026-01-05"
            "#,
        )
        .unwrap();

        let settings = config.apply(&Settings::default());
        assert_eq!(
            settings,
            Settings {
                margin_rate: 0.18,
                currency: "USD".into(),
                project_name: "Portal".into(),
                start_date: NaiveDate::from_ymd_opt(2026, 1, 5),
            }
        );
    }

    #[test]
    fn absent_keys_keep_existing_values() {
        let config = CostplanConfig::from_toml_str("[settings]\ncurrency = \"GBP\"\n").unwrap();
        let base = Settings::default().margin_rate(0.3);
        let merged = config.apply(&base);
        assert_eq!(merged.margin_rate, 0.3);
        assert_eq!(merged.currency, "GBP");
        assert_eq!(merged.project_name, base.project_name);
    }

    #[test]
    fn empty_file_is_valid() {
        assert_eq!(CostplanConfig::from_toml_str("").unwrap(), CostplanConfig::default());
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(matches!(
            CostplanConfig::from_toml_str("[settings]\nmargin = 0.1\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn discover_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CostplanConfig::discover(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[settings]\nmargin_rate = 0.1\n").unwrap();
        let found = CostplanConfig::discover(dir.path()).unwrap().unwrap();
        assert_eq!(found.settings.margin_rate, Some(0.1));
    }
}
