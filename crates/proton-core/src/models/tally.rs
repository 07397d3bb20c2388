//! Secondary digitization tally counter.

use serde::{Deserialize, Serialize};

/// Kind of document tallied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TallyKind {
    Outpatient,
    Inpatient,
}

impl TallyKind {
    pub const ALL: [TallyKind; 2] = [TallyKind::Outpatient, TallyKind::Inpatient];

    pub fn label(&self) -> &'static str {
        match self {
            TallyKind::Outpatient => "Outpatient",
            TallyKind::Inpatient => "Inpatient",
        }
    }
}

/// Running counts of digitized documents.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TallyCounter {
    pub outpatient: u64,
    pub inpatient: u64,
}

impl TallyCounter {
    pub fn increment(&mut self, kind: TallyKind) {
        match kind {
            TallyKind::Outpatient => self.outpatient += 1,
            TallyKind::Inpatient => self.inpatient += 1,
        }
    }

    pub fn get(&self, kind: TallyKind) -> u64 {
        match kind {
            TallyKind::Outpatient => self.outpatient,
            TallyKind::Inpatient => self.inpatient,
        }
    }

    pub fn total(&self) -> u64 {
        self.outpatient + self.inpatient
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
