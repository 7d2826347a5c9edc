//! # Application Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     GOLDLOAN_STORAGE_DIR=/srv/goldloan                                 │
//! │     GOLDLOAN_SLOT_KEY=ApplicationData                                  │
//! │     GOLDLOAN_SETTLE_MS=300                                             │
//! │     GOLDLOAN_DEFAULT_LTV=75                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/goldloan/goldloan.toml (Linux)                           │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [storage]
//! dir = "/var/lib/goldloan"
//! slot_key = "ApplicationData"
//!
//! [form]
//! settle_ms = 300
//! default_ltv_ratio = 75.0
//! ```

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use goldloan_core::{ApplicationData, APPLICATION_SLOT_KEY, DEFAULT_LTV_RATIO};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};

const CONFIG_FILE_NAME: &str = "goldloan.toml";

/// Longest settle window accepted.
const MAX_SETTLE_MS: u64 = 60_000;

// =============================================================================
// Storage Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory of the file backend. Defaults to the platform data dir.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Key of the application slot.
    #[serde(default = "default_slot_key")]
    pub slot_key: String,
}

fn default_slot_key() -> String {
    APPLICATION_SLOT_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            dir: None,
            slot_key: default_slot_key(),
        }
    }
}

// =============================================================================
// Form Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSettings {
    /// Quiet period before field edits are saved (ms).
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// LTV percentage written into a blank record.
    #[serde(default = "default_ltv_ratio")]
    pub default_ltv_ratio: f64,
}

fn default_settle_ms() -> u64 {
    300
}

fn default_ltv_ratio() -> f64 {
    DEFAULT_LTV_RATIO
}

impl Default for FormSettings {
    fn default() -> Self {
        FormSettings {
            settle_ms: default_settle_ms(),
            default_ltv_ratio: default_ltv_ratio(),
        }
    }
}

impl FormSettings {
    pub fn settle_window(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// A fresh record carrying the configured LTV.
    pub fn blank_record(&self) -> ApplicationData {
        let record = ApplicationData::new();
        let summary = record
            .loan_calculation_summary
            .clone()
            .with_ltv_ratio(self.default_ltv_ratio.to_string());
        record.with_loan_calculation_summary(summary)
    }
}

// =============================================================================
// App Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub form: FormSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (goldloan.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path).map_err(|e| {
                    StoreError::ConfigLoadFailed(format!("{}: {}", path.display(), e))
                })?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn validate(&self) -> StoreResult<()> {
        let key = &self.storage.slot_key;
        if key.is_empty() {
            return Err(StoreError::InvalidConfig("slot_key must not be empty".into()));
        }
        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(StoreError::InvalidConfig(format!(
                "slot_key may only contain letters, digits, '_' and '-', got: {}",
                key
            )));
        }

        if self.form.settle_ms == 0 || self.form.settle_ms > MAX_SETTLE_MS {
            return Err(StoreError::InvalidConfig(format!(
                "settle_ms must be between 1 and {}, got: {}",
                MAX_SETTLE_MS, self.form.settle_ms
            )));
        }

        let ltv = self.form.default_ltv_ratio;
        if !(ltv > 0.0 && ltv <= 100.0) {
            return Err(StoreError::InvalidConfig(format!(
                "default_ltv_ratio must be in (0, 100], got: {}",
                ltv
            )));
        }

        Ok(())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its
    /// value.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("GOLDLOAN_STORAGE_DIR") {
            debug!(dir = %dir, "Overriding storage dir from environment");
            self.storage.dir = Some(PathBuf::from(dir));
        }

        if let Some(key) = lookup("GOLDLOAN_SLOT_KEY") {
            self.storage.slot_key = key;
        }

        if let Some(ms) = lookup("GOLDLOAN_SETTLE_MS") {
            match ms.parse::<u64>() {
                Ok(ms) => self.form.settle_ms = ms,
                Err(_) => warn!(value = %ms, "Ignoring unreadable GOLDLOAN_SETTLE_MS"),
            }
        }

        if let Some(ltv) = lookup("GOLDLOAN_DEFAULT_LTV") {
            match ltv.parse::<f64>() {
                Ok(ltv) => self.form.default_ltv_ratio = ltv,
                Err(_) => warn!(value = %ltv, "Ignoring unreadable GOLDLOAN_DEFAULT_LTV"),
            }
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("in", "goldloan", "goldloan")
    }

    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Directory of the file backend.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage
            .dir
            .clone()
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.storage.slot_key, "ApplicationData");
        assert_eq!(config.form.settle_window(), Duration::from_millis(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();

        config.storage.slot_key = "../escape".into();
        assert!(config.validate().is_err());

        config.storage.slot_key = "Draft_1".into();
        config.form.settle_ms = 0;
        assert!(config.validate().is_err());

        config.form.settle_ms = 500;
        config.form.default_ltv_ratio = 120.0;
        assert!(config.validate().is_err());

        config.form.default_ltv_ratio = 60.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("GOLDLOAN_STORAGE_DIR", "/srv/goldloan"),
            ("GOLDLOAN_SETTLE_MS", "750"),
            ("GOLDLOAN_DEFAULT_LTV", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.storage.dir, Some(PathBuf::from("/srv/goldloan")));
        assert_eq!(config.form.settle_ms, 750);
        assert_eq!(config.form.default_ltv_ratio, 75.0);
        assert_eq!(config.storage_dir(), PathBuf::from("/srv/goldloan"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("goldloan.toml");
        std::fs::write(&path, "[form]\nsettle_ms = 150\n").unwrap();

        let config = AppConfig::load(Some(path)).unwrap();
        assert_eq!(config.form.settle_ms, 150);
        assert_eq!(config.form.default_ltv_ratio, 75.0);
        assert_eq!(config.storage.slot_key, "ApplicationData");
    }

    #[test]
    fn test_broken_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("goldloan.toml");
        std::fs::write(&path, "[form\n").unwrap();

        assert!(AppConfig::load(Some(path.clone())).is_err());
        assert_eq!(AppConfig::load_or_default(Some(path)), AppConfig::default());
    }

    #[test]
    fn test_blank_record_uses_configured_ltv() {
        let form = FormSettings {
            default_ltv_ratio: 60.0,
            ..FormSettings::default()
        };
        let record = form.blank_record();
        assert_eq!(record.loan_calculation_summary.ltv_ratio, "60");
        assert_eq!(FormSettings::default().blank_record(), ApplicationData::new());
    }
}
