//! Tracker configuration.
//!
//! Loaded from JSON; every field has a default so an empty object is a valid
//! configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::location::provider::PollingConfig;
use crate::permission::request::{ACCESS_COARSE_LOCATION, ACCESS_FINE_LOCATION};

/// Text of the foreground announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub title: String,
    pub text: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: "Location Tracking Service".to_string(),
            text: "Location tracking is running in the foreground.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// SQLite file for samples; `None` keeps samples in memory.
    pub database_path: Option<PathBuf>,
    pub permissions: Vec<String>,
    pub polling: PollingConfig,
    pub notification: NotificationConfig,
    pub counter_interval_ms: u64,
    pub log_level: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            permissions: vec![
                ACCESS_COARSE_LOCATION.to_string(),
                ACCESS_FINE_LOCATION.to_string(),
            ],
            polling: PollingConfig::default(),
            notification: NotificationConfig::default(),
            counter_interval_ms: 3_000,
            log_level: "info".to_string(),
        }
    }
}

impl TrackerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.polling.validate()?;
        if self.counter_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "counter_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.permissions.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Invalid("permission ids must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn log_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
