//! Operator settings persisted alongside the protocol state.

use serde::{Deserialize, Serialize};

/// Colour theme of the host UI.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Parse a stored value; anything unknown falls back to light.
    pub fn parse(s: &str) -> Self {
        match s {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

/// Settings that survive restarts and travel with backups.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeskSettings {
    /// Reviewer pinned as the default conference author
    #[serde(default)]
    pub fixed_reviewer: Option<String>,
    /// Convênio pinned as the default for new protocols
    #[serde(default)]
    pub fixed_convenio: Option<String>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub timer_seconds: u64,
}
