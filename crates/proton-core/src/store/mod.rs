//! Record store: the single owner of the protocol collection.
//!
//! The store performs no I/O. Each successful mutation queues a
//! [`StoreEvent`]; the owner drains them with [`RecordStore::take_events`]
//! to drive persistence and the activity log.

mod batch;
mod confirm;
mod validator;

pub use batch::*;
pub use confirm::*;
pub use validator::*;

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::models::{ConferenceInput, ProtocolRecord};

/// Store errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Duplicate protocol: {0}")]
    DuplicateKey(String),

    #[error("At least one document type must have a quantity greater than zero")]
    EmptyQuantities,

    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("Protocol not found: {0}")]
    NotFound(String),

    #[error("Protocol {0} has already been conferred")]
    NotPending(String),

    #[error("Protocol {0} has not been conferred yet")]
    NotProcessed(String),

    #[error("Unknown or already used confirmation token")]
    UnknownToken,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Change notification raised after each successful mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Added { id: String, convenio: String },
    BatchAdded { count: usize, convenio: String },
    IdentifierChanged { from: String, to: String },
    Conferred { id: String, documents: u64 },
    ConferenceEdited { id: String, documents: u64 },
    Removed { id: String },
    Cleared { count: usize },
}

/// Ordered, uniquely keyed collection of protocol records.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<ProtocolRecord>,
    events: Vec<StoreEvent>,
    dirty: bool,
    confirmations: HashMap<String, PendingAction>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from persisted records, rejecting duplicate identifiers.
    pub fn from_records(records: Vec<ProtocolRecord>) -> StoreResult<Self> {
        ensure_unique(&records)?;
        Ok(Self {
            records,
            ..Self::default()
        })
    }

    /// The authoritative ordered collection.
    pub fn all(&self) -> &[ProtocolRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.iter().any(|r| r.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<&ProtocolRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Ordinal position of a record, for UI convenience.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    pub fn get_by_position(&self, index: usize) -> Option<&ProtocolRecord> {
        self.records.get(index)
    }

    /// Append a record whose identifier the caller already validated.
    pub fn add(&mut self, record: ProtocolRecord) -> StoreResult<()> {
        if self.contains(record.id()) {
            return Err(StoreError::DuplicateKey(record.id().to_string()));
        }
        let event = StoreEvent::Added {
            id: record.id().to_string(),
            convenio: record.convenio().to_string(),
        };
        self.records.push(record);
        self.notify(event);
        Ok(())
    }

    /// Rename a record. Renaming to the current value is a no-op.
    ///
    /// Returns true if the identifier changed.
    pub fn update_identifier(&mut self, id: &str, new_id: &str) -> StoreResult<bool> {
        let index = self.index_of(id)?;
        if new_id.trim() == id {
            return Ok(false);
        }
        let new_id = validate(new_id, self)?.to_string();

        self.records[index].receipt_mut().id = new_id.clone();
        self.notify(StoreEvent::IdentifierChanged {
            from: id.to_string(),
            to: new_id,
        });
        Ok(true)
    }

    /// First conference of a pending record.
    pub fn commit_conference(&mut self, id: &str, input: ConferenceInput) -> StoreResult<()> {
        let index = self.index_of(id)?;
        if input.quantities.is_empty() {
            return Err(StoreError::EmptyQuantities);
        }

        let record = &mut self.records[index];
        let receipt = match record {
            ProtocolRecord::Pending { receipt } => receipt.clone(),
            ProtocolRecord::Processed { .. } => return Err(StoreError::NotPending(id.to_string())),
        };
        let documents = input.quantities.total();
        *record = ProtocolRecord::Processed {
            receipt,
            conference: input.into_conference(),
        };

        self.notify(StoreEvent::Conferred {
            id: id.to_string(),
            documents,
        });
        Ok(())
    }

    /// Amend the conference of an already processed record.
    ///
    /// A missing reviewer keeps the previous one.
    pub fn edit_conference(&mut self, id: &str, input: ConferenceInput) -> StoreResult<()> {
        let index = self.index_of(id)?;
        if input.quantities.is_empty() {
            return Err(StoreError::EmptyQuantities);
        }

        let conference = match &mut self.records[index] {
            ProtocolRecord::Processed { conference, .. } => conference,
            ProtocolRecord::Pending { .. } => return Err(StoreError::NotProcessed(id.to_string())),
        };
        let previous_reviewer = conference.reviewer.take();
        let mut updated = input.into_conference();
        if updated.reviewer.is_none() {
            updated.reviewer = previous_reviewer;
        }
        let documents = updated.quantities.total();
        *conference = updated;

        self.notify(StoreEvent::ConferenceEdited {
            id: id.to_string(),
            documents,
        });
        Ok(())
    }

    /// Delete a record unconditionally.
    pub fn remove(&mut self, id: &str) -> StoreResult<ProtocolRecord> {
        let index = self.index_of(id)?;
        let record = self.records.remove(index);
        self.notify(StoreEvent::Removed { id: id.to_string() });
        Ok(record)
    }

    /// Delete every record. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.records.len();
        self.records.clear();
        self.confirmations.clear();
        self.notify(StoreEvent::Cleared { count });
        count
    }

    /// Drain queued change notifications.
    pub fn take_events(&mut self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.events)
    }

    /// True when mutations happened since the last [`mark_clean`](Self::mark_clean).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn index_of(&self, id: &str) -> StoreResult<usize> {
        self.position(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn notify(&mut self, event: StoreEvent) {
        self.dirty = true;
        self.events.push(event);
    }
}

fn ensure_unique(records: &[ProtocolRecord]) -> StoreResult<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id()) {
            return Err(StoreError::DuplicateKey(record.id().to_string()));
        }
    }
    Ok(())
}
