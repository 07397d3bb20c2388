//! Batch insertion with partial-failure reporting.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{check_format, RecordStore, StoreEvent, ValidationError};
use crate::models::ProtocolRecord;

/// How identifiers repeated inside one batch are treated.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchDuplicatePolicy {
    /// Keep the first occurrence, reject the later ones.
    #[default]
    RejectLater,
    /// Reject every occurrence of a repeated identifier.
    RejectAll,
}

/// Fields shared by every protocol of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedFields {
    pub convenio: String,
    pub received_date: NaiveDate,
}

/// A batch line that was not inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    pub candidate: String,
    pub reason: ValidationError,
}

/// Outcome of a batch insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Inserted identifiers, in input order
    pub accepted: Vec<String>,
    /// Refused entries, in input order
    pub rejected: Vec<RejectedEntry>,
}

impl BatchOutcome {
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }
}

impl RecordStore {
    /// Insert many protocols at once. Never fails as a whole.
    ///
    /// Each candidate is checked against the store as it stood before the
    /// batch plus the members already accepted from this batch.
    pub fn add_batch<S: AsRef<str>>(
        &mut self,
        candidates: &[S],
        shared: &SharedFields,
        policy: BatchDuplicatePolicy,
    ) -> BatchOutcome {
        let repeated = match policy {
            BatchDuplicatePolicy::RejectLater => HashSet::new(),
            BatchDuplicatePolicy::RejectAll => repeated_in_batch(candidates),
        };

        let mut outcome = BatchOutcome::default();
        let mut accepted_ids: HashSet<String> = HashSet::new();

        for candidate in candidates {
            let raw = candidate.as_ref();
            let verdict = check_format(raw).and_then(|id| {
                if self.contains(id) || accepted_ids.contains(id) || repeated.contains(id) {
                    Err(ValidationError::Duplicate)
                } else {
                    Ok(id.to_string())
                }
            });

            match verdict {
                Ok(id) => {
                    accepted_ids.insert(id.clone());
                    outcome.accepted.push(id);
                }
                Err(reason) => outcome.rejected.push(RejectedEntry {
                    candidate: raw.to_string(),
                    reason,
                }),
            }
        }

        for id in &outcome.accepted {
            self.records.push(ProtocolRecord::new(
                id.clone(),
                shared.convenio.clone(),
                shared.received_date,
            ));
        }

        if !outcome.accepted.is_empty() {
            self.notify(StoreEvent::BatchAdded {
                count: outcome.accepted.len(),
                convenio: shared.convenio.clone(),
            });
        }

        outcome
    }
}

/// Well-formed identifiers that appear more than once in the batch.
fn repeated_in_batch<S: AsRef<str>>(candidates: &[S]) -> HashSet<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for candidate in candidates {
        if let Ok(id) = check_format(candidate.as_ref()) {
            *counts.entry(id).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(id, _)| id.to_string())
        .collect()
}

/// Split pasted text into candidate lines, dropping blank ones.
pub fn split_batch_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}
