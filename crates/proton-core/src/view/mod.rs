//! Filtered, sorted projections of the record store.
//!
//! A view borrows records from the store and is rebuilt from scratch on
//! every call; it is never patched in place.

mod dashboard;

pub use dashboard::*;

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{ProtocolRecord, ProtocolStatus};

/// Filter criteria. Unset or blank criteria match everything; set ones are AND-combined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring matched against id, convênio and status text
    pub search: Option<String>,
    pub status: Option<ProtocolStatus>,
    pub convenio: Option<String>,
    pub received_date: Option<NaiveDate>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.search.as_deref().map_or(true, |s| s.trim().is_empty())
            && self.status.is_none()
            && self.convenio.as_deref().map_or(true, str::is_empty)
            && self.received_date.is_none()
    }

    /// Whether a record passes every set criterion.
    pub fn matches(&self, record: &ProtocolRecord) -> bool {
        if let Some(search) = self.search.as_deref() {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty() {
                let hit = record.id().to_lowercase().contains(&needle)
                    || record.convenio().to_lowercase().contains(&needle)
                    || record
                        .status()
                        .display_name()
                        .to_lowercase()
                        .contains(&needle);
                if !hit {
                    return false;
                }
            }
        }
        if let Some(status) = self.status {
            if record.status() != status {
                return false;
            }
        }
        if let Some(convenio) = self.convenio.as_deref() {
            if !convenio.is_empty() && record.convenio() != convenio {
                return false;
            }
        }
        if let Some(date) = self.received_date {
            if record.received_date() != date {
                return false;
            }
        }
        true
    }
}

/// Sortable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    /// Numeric comparison ("9" before "10")
    Id,
    Convenio,
    Status,
    ReceivedDate,
    AddedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn ascending(column: SortColumn) -> Self {
        Self {
            column,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(column: SortColumn) -> Self {
        Self {
            column,
            direction: SortDirection::Descending,
        }
    }

    fn compare(&self, a: &ProtocolRecord, b: &ProtocolRecord) -> Ordering {
        let ordering = match self.column {
            SortColumn::Id => compare_numeric(a.id(), b.id()),
            SortColumn::Convenio => a.convenio().cmp(b.convenio()),
            SortColumn::Status => a.status().display_name().cmp(b.status().display_name()),
            SortColumn::ReceivedDate => a.received_date().cmp(&b.received_date()),
            SortColumn::AddedAt => a.added_at().cmp(&b.added_at()),
        };
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Compare digit strings by numeric value without overflowing on long identifiers.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Builds views over the store's records.
#[derive(Debug, Clone, Copy)]
pub struct ViewBuilder {
    stable_sort: bool,
}

impl Default for ViewBuilder {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ViewBuilder {
    /// `stable_sort` keeps store order among records with equal sort keys.
    pub fn new(stable_sort: bool) -> Self {
        Self { stable_sort }
    }

    /// Filter then optionally sort. Without a sort key store order is kept.
    pub fn build<'a>(
        &self,
        records: &'a [ProtocolRecord],
        filter: &FilterCriteria,
        sort: Option<SortKey>,
    ) -> Vec<&'a ProtocolRecord> {
        let mut view: Vec<&ProtocolRecord> =
            records.iter().filter(|r| filter.matches(r)).collect();

        if let Some(key) = sort {
            if self.stable_sort {
                view.sort_by(|a, b| key.compare(a, b));
            } else {
                view.sort_unstable_by(|a, b| key.compare(a, b));
            }
        }

        view
    }
}

/// Build a view with the default (stable) builder.
pub fn build<'a>(
    records: &'a [ProtocolRecord],
    filter: &FilterCriteria,
    sort: Option<SortKey>,
) -> Vec<&'a ProtocolRecord> {
    ViewBuilder::default().build(records, filter, sort)
}
