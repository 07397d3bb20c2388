//! Desk configuration loaded from TOML.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::DEFAULT_ACTIVITY_CAPACITY;
use crate::store::BatchDuplicatePolicy;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Desk configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    /// SQLite file backing the key-value store
    pub database_path: PathBuf,
    /// Entries kept in the activity log
    pub activity_log_capacity: usize,
    /// Entries returned for the history panel
    pub activity_display_limit: usize,
    pub batch_duplicates: BatchDuplicatePolicy,
    /// Keep store order among equal sort keys
    pub stable_sort: bool,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("proton.db"),
            activity_log_capacity: DEFAULT_ACTIVITY_CAPACITY,
            activity_display_limit: 20,
            batch_duplicates: BatchDuplicatePolicy::default(),
            stable_sort: true,
        }
    }
}

impl DeskConfig {
    /// Parse TOML; missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: DeskConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = Self::from_toml_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.activity_log_capacity == 0 {
            return Err(ConfigError::Invalid(
                "activity_log_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
