//! Versioned protocol state persistence.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Database, DbError, DbResult};
use crate::models::{ActivityEntry, ProtocolRecord};

/// Version tag written with every state payload.
pub const STATE_VERSION: &str = "proton_v1";

/// Key holding the state payload.
pub const STATE_KEY: &str = "protocol_state";

/// Records and activity as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedState {
    pub version: String,
    pub records: Vec<ProtocolRecord>,
    #[serde(default)]
    pub activity: Vec<ActivityEntry>,
}

/// Borrowing twin of [`PersistedState`] used when saving.
#[derive(Serialize)]
struct StateRef<'a> {
    version: &'a str,
    records: &'a [ProtocolRecord],
    activity: &'a [ActivityEntry],
}

impl Database {
    /// Persist all records and the activity log.
    pub fn save_state(&self, records: &[ProtocolRecord], activity: &[ActivityEntry]) -> DbResult<()> {
        let payload = StateRef {
            version: STATE_VERSION,
            records,
            activity,
        };
        self.set_json(STATE_KEY, &payload)?;
        debug!(
            "Saved state: {} records, {} activities",
            records.len(),
            activity.len()
        );
        Ok(())
    }

    /// Load persisted state. `None` when nothing was saved yet.
    pub fn load_state(&self) -> DbResult<Option<PersistedState>> {
        let state: Option<PersistedState> = self.get_json(STATE_KEY)?;
        match state {
            Some(state) if state.version != STATE_VERSION => Err(DbError::VersionMismatch {
                expected: STATE_VERSION.to_string(),
                found: state.version,
            }),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityKind, ConferenceInput, Quantities};
    use crate::store::RecordStore;
    use chrono::NaiveDate;

    #[test]
    fn test_empty_database_has_no_state() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.load_state().unwrap(), None);
    }

    #[test]
    fn test_save_and_load() {
        let db = Database::open_in_memory().unwrap();
        let mut store = RecordStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 9, 9).unwrap();
        store
            .add(ProtocolRecord::new("321".into(), "Unimed".into(), date))
            .unwrap();
        store
            .add(ProtocolRecord::new("654".into(), "Particular".into(), date))
            .unwrap();
        store
            .commit_conference("654", ConferenceInput::new(Quantities::new(0, 0, 1, 1)))
            .unwrap();
        let activity = vec![ActivityEntry::new(ActivityKind::Add, "Protocol 321 added", "")];

        db.save_state(store.all(), &activity).unwrap();
        let loaded = db.load_state().unwrap().unwrap();

        assert_eq!(loaded.version, STATE_VERSION);
        assert_eq!(loaded.records, store.all());
        assert_eq!(loaded.activity, activity);
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.set_value(STATE_KEY, r#"{"version":"pro_v0","records":[]}"#)
            .unwrap();

        let result = db.load_state();
        assert!(matches!(
            result,
            Err(DbError::VersionMismatch { ref found, .. }) if found == "pro_v0"
        ));
    }
}
