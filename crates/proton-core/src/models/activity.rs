//! Activity history shown to the operator.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of entries kept in the log.
pub const DEFAULT_ACTIVITY_CAPACITY: usize = 100;

/// Kind of recorded activity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Add,
    Edit,
    Delete,
    Conference,
    Export,
    Backup,
    Restore,
    Clear,
}

/// A single history entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityEntry {
    pub id: String,
    pub kind: ActivityKind,
    /// Short description ("Protocol 123 added")
    pub action: String,
    /// Optional secondary line (may be empty)
    #[serde(default)]
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn new(kind: ActivityKind, action: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            action: action.into(),
            details: details.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Append-only, capped history. Newest entry first.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    capacity: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ACTIVITY_CAPACITY)
    }
}

impl ActivityLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Rebuild a log from persisted entries (newest first), trimming to capacity.
    pub fn from_entries(entries: Vec<ActivityEntry>, capacity: usize) -> Self {
        let mut log = Self::with_capacity(capacity);
        log.entries = entries.into_iter().take(log.capacity).collect();
        log
    }

    /// Record an entry, dropping the oldest when full.
    pub fn record(&mut self, entry: ActivityEntry) {
        self.entries.push_front(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
    }

    pub fn push(&mut self, kind: ActivityKind, action: impl Into<String>, details: impl Into<String>) {
        self.record(ActivityEntry::new(kind, action, details));
    }

    /// Newest `limit` entries.
    pub fn recent(&self, limit: usize) -> Vec<&ActivityEntry> {
        self.entries.iter().take(limit).collect()
    }

    /// All entries, newest first.
    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
