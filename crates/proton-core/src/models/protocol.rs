//! Protocol records: the tracked document-receipt tickets.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Document categories counted during a conference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    Outpatient,
    Imaging,
    Emergency,
    Inpatient,
}

impl DocumentCategory {
    /// All categories in sheet/chart order.
    pub const ALL: [DocumentCategory; 4] = [
        DocumentCategory::Outpatient,
        DocumentCategory::Imaging,
        DocumentCategory::Emergency,
        DocumentCategory::Inpatient,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentCategory::Outpatient => "Outpatient",
            DocumentCategory::Imaging => "Imaging",
            DocumentCategory::Emergency => "Emergency",
            DocumentCategory::Inpatient => "Inpatient",
        }
    }

    /// Short code used in spreadsheet rows (first three letters, upper-cased).
    pub fn code(&self) -> String {
        self.label().chars().take(3).collect::<String>().to_uppercase()
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-category document counts recorded by a conference.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quantities {
    pub outpatient: u32,
    pub imaging: u32,
    pub emergency: u32,
    pub inpatient: u32,
}

impl Quantities {
    pub fn new(outpatient: u32, imaging: u32, emergency: u32, inpatient: u32) -> Self {
        Self {
            outpatient,
            imaging,
            emergency,
            inpatient,
        }
    }

    /// Count for a single category.
    pub fn get(&self, category: DocumentCategory) -> u32 {
        match category {
            DocumentCategory::Outpatient => self.outpatient,
            DocumentCategory::Imaging => self.imaging,
            DocumentCategory::Emergency => self.emergency,
            DocumentCategory::Inpatient => self.inpatient,
        }
    }

    /// Set the count for a single category.
    pub fn set(&mut self, category: DocumentCategory, count: u32) {
        match category {
            DocumentCategory::Outpatient => self.outpatient = count,
            DocumentCategory::Imaging => self.imaging = count,
            DocumentCategory::Emergency => self.emergency = count,
            DocumentCategory::Inpatient => self.inpatient = count,
        }
    }

    /// Sum across all categories.
    pub fn total(&self) -> u64 {
        DocumentCategory::ALL
            .iter()
            .map(|c| u64::from(self.get(*c)))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Iterate `(category, count)` pairs in category order.
    pub fn iter(&self) -> impl Iterator<Item = (DocumentCategory, u32)> + '_ {
        DocumentCategory::ALL.iter().map(move |c| (*c, self.get(*c)))
    }
}

/// Workflow status of a protocol.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolStatus {
    /// Received, waiting for conference
    Pending,
    /// Conference completed
    Processed,
}

impl ProtocolStatus {
    /// Display text, also matched by free-text search.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProtocolStatus::Pending => "Pending",
            ProtocolStatus::Processed => "Processed",
        }
    }
}

impl fmt::Display for ProtocolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Fields every protocol carries from the moment it is received.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Receipt {
    /// Protocol number (digits only, unique within the store)
    pub id: String,
    /// Payer/insurer label
    pub convenio: String,
    /// Reference date the documents were received
    pub received_date: NaiveDate,
    /// Creation timestamp, never changed
    pub added_at: DateTime<Utc>,
}

impl Receipt {
    pub fn new(id: String, convenio: String, received_date: NaiveDate) -> Self {
        Self {
            id,
            convenio,
            received_date,
            added_at: Utc::now(),
        }
    }
}

/// Data recorded when a protocol is conferred.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conference {
    pub quantities: Quantities,
    /// Free-text notes (may be empty)
    pub notes: String,
    /// Person who performed the conference
    pub reviewer: Option<String>,
    /// Set on first commit, re-stamped on every edit
    pub conferred_at: DateTime<Utc>,
}

/// Input collected for a conference commit or edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConferenceInput {
    pub quantities: Quantities,
    pub notes: String,
    pub reviewer: Option<String>,
}

impl ConferenceInput {
    pub fn new(quantities: Quantities) -> Self {
        Self {
            quantities,
            notes: String::new(),
            reviewer: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_reviewer(mut self, reviewer: impl Into<String>) -> Self {
        self.reviewer = Some(reviewer.into());
        self
    }

    pub(crate) fn into_conference(self) -> Conference {
        Conference {
            quantities: self.quantities,
            notes: self.notes,
            reviewer: self.reviewer,
            conferred_at: Utc::now(),
        }
    }
}

/// A protocol in the store. Conference data exists only once processed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProtocolRecord {
    Pending { receipt: Receipt },
    Processed { receipt: Receipt, conference: Conference },
}

impl ProtocolRecord {
    /// Create a freshly received (pending) protocol.
    pub fn new(id: String, convenio: String, received_date: NaiveDate) -> Self {
        ProtocolRecord::Pending {
            receipt: Receipt::new(id, convenio, received_date),
        }
    }

    pub fn receipt(&self) -> &Receipt {
        match self {
            ProtocolRecord::Pending { receipt } => receipt,
            ProtocolRecord::Processed { receipt, .. } => receipt,
        }
    }

    pub(crate) fn receipt_mut(&mut self) -> &mut Receipt {
        match self {
            ProtocolRecord::Pending { receipt } => receipt,
            ProtocolRecord::Processed { receipt, .. } => receipt,
        }
    }

    pub fn id(&self) -> &str {
        &self.receipt().id
    }

    pub fn convenio(&self) -> &str {
        &self.receipt().convenio
    }

    pub fn received_date(&self) -> NaiveDate {
        self.receipt().received_date
    }

    pub fn added_at(&self) -> DateTime<Utc> {
        self.receipt().added_at
    }

    pub fn status(&self) -> ProtocolStatus {
        match self {
            ProtocolRecord::Pending { .. } => ProtocolStatus::Pending,
            ProtocolRecord::Processed { .. } => ProtocolStatus::Processed,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ProtocolRecord::Pending { .. })
    }

    pub fn conference(&self) -> Option<&Conference> {
        match self {
            ProtocolRecord::Pending { .. } => None,
            ProtocolRecord::Processed { conference, .. } => Some(conference),
        }
    }

    /// Total documents counted (always 0 while pending).
    pub fn document_total(&self) -> u64 {
        self.conference()
            .map(|c| c.quantities.total())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_new_record_is_pending() {
        let record = ProtocolRecord::new("12345".into(), "Unimed".into(), date());
        assert_eq!(record.status(), ProtocolStatus::Pending);
        assert!(record.conference().is_none());
        assert_eq!(record.document_total(), 0);
        assert_eq!(record.id(), "12345");
    }

    #[test]
    fn test_category_codes() {
        let codes: Vec<String> = DocumentCategory::ALL.iter().map(|c| c.code()).collect();
        assert_eq!(codes, vec!["OUT", "IMA", "EME", "INP"]);
    }

    #[test]
    fn test_quantities_total() {
        let mut q = Quantities::new(2, 0, 1, 0);
        assert_eq!(q.total(), 3);
        q.set(DocumentCategory::Inpatient, 4);
        assert_eq!(q.get(DocumentCategory::Inpatient), 4);
        assert_eq!(q.total(), 7);
        assert!(Quantities::default().is_empty());
    }

    #[test]
    fn test_serialized_shape_is_tagged() {
        let record = ProtocolRecord::new("999".into(), "Particular".into(), date());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["receipt"]["received_date"], "2024-03-15");
        assert!(json.get("conference").is_none());

        let back: ProtocolRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
