//! Backup file format and restore validation.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::STATE_VERSION;
use crate::models::{ActivityEntry, DeskSettings, ProtocolRecord, Theme};
use crate::store::check_format;

/// Restore errors. Every variant leaves current state untouched.
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Malformed backup: missing `{0}`")]
    MalformedBackup(&'static str),

    #[error("Malformed backup: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed backup: protocol {0} appears more than once")]
    DuplicateProtocol(String),

    #[error("Malformed backup: protocol {id:?} is invalid: {reason}")]
    InvalidRecord { id: String, reason: String },
}

/// Complete backup document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    #[serde(alias = "versao")]
    pub version: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    pub records: Vec<ProtocolRecord>,
    #[serde(default)]
    pub activity_log: Vec<ActivityEntry>,
    #[serde(default)]
    pub settings: SettingsSnapshot,
}

/// Settings carried by a backup. Absent fields leave the current value alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettingsSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_reviewer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_convenio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_seconds: Option<u64>,
}

impl SettingsSnapshot {
    /// Overwrite only the settings this snapshot carries.
    pub fn apply_to(&self, settings: &mut DeskSettings) {
        if let Some(reviewer) = &self.fixed_reviewer {
            settings.fixed_reviewer = Some(reviewer.clone());
        }
        if let Some(convenio) = &self.fixed_convenio {
            settings.fixed_convenio = Some(convenio.clone());
        }
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if let Some(seconds) = self.timer_seconds {
            settings.timer_seconds = seconds;
        }
    }
}

impl From<&DeskSettings> for SettingsSnapshot {
    fn from(settings: &DeskSettings) -> Self {
        Self {
            fixed_reviewer: settings.fixed_reviewer.clone(),
            fixed_convenio: settings.fixed_convenio.clone(),
            theme: Some(settings.theme),
            timer_seconds: Some(settings.timer_seconds),
        }
    }
}

impl Backup {
    /// Snapshot the current state.
    pub fn new(
        records: Vec<ProtocolRecord>,
        activity_log: Vec<ActivityEntry>,
        settings: &DeskSettings,
    ) -> Self {
        Self {
            version: STATE_VERSION.to_string(),
            timestamp: Utc::now(),
            records,
            activity_log,
            settings: settings.into(),
        }
    }

    /// Parse and validate a backup file.
    pub fn parse(json: &str) -> Result<Self, BackupError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let object = value
            .as_object()
            .ok_or(BackupError::MalformedBackup("version"))?;

        if !object.contains_key("version") && !object.contains_key("versao") {
            return Err(BackupError::MalformedBackup("version"));
        }
        if !object.contains_key("records") {
            return Err(BackupError::MalformedBackup("records"));
        }

        let backup: Backup = serde_json::from_value(value)?;

        let mut seen = HashSet::new();
        for record in &backup.records {
            check_record(record)?;
            if !seen.insert(record.id()) {
                return Err(BackupError::DuplicateProtocol(record.id().to_string()));
            }
        }

        Ok(backup)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Suggested download name.
    pub fn file_name(&self) -> String {
        format!("backup-proton-{}.json", self.timestamp.format("%Y-%m-%d"))
    }
}

/// Records must satisfy the same rules the store enforces on insert and commit.
fn check_record(record: &ProtocolRecord) -> Result<(), BackupError> {
    let invalid = |reason: String| BackupError::InvalidRecord {
        id: record.id().to_string(),
        reason,
    };

    match check_format(record.id()) {
        Ok(id) if id == record.id() => {}
        Ok(_) => return Err(invalid("surrounding whitespace".into())),
        Err(e) => return Err(invalid(e.to_string())),
    }
    if record.convenio().trim().is_empty() {
        return Err(invalid("convenio is blank".into()));
    }
    if let Some(conference) = record.conference() {
        if conference.quantities.is_empty() {
            return Err(invalid("processed without documents".into()));
        }
    }
    Ok(())
}
