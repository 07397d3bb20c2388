//! The protocol desk: store, history, settings and persistence in one place.
//!
//! Every operation that mutates the [`RecordStore`] ends with a sync step that
//! turns the store's queued change notifications into activity entries and
//! saves the whole state.

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::DeskConfig;
use crate::db::{Database, DbError};
use crate::export::{Backup, BackupError, ExportError, TallyReport, WorkbookExport};
use crate::models::{
    ActivityEntry, ActivityKind, ActivityLog, ConferenceInput, DeskSettings, ProtocolRecord,
    Stopwatch, TallyCounter, TallyKind, Theme,
};
use crate::store::{
    split_batch_lines, validate, BatchOutcome, ConfirmationToken, Confirmed, PendingAction,
    RecordStore, SharedFields, StoreError, StoreEvent,
};
use crate::view::{DashboardStats, FilterCriteria, SortKey, ViewBuilder};
use crate::workflow::{BulkConference, BulkState, WorkflowError, WorkflowEvent, WorkflowSignal};

/// Desk errors.
#[derive(Error, Debug)]
pub enum DeskError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Backup(#[from] BackupError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

pub type DeskResult<T> = Result<T, DeskError>;

/// Owns every piece of operator state and keeps it persisted.
pub struct Desk {
    config: DeskConfig,
    db: Database,
    store: RecordStore,
    activity: ActivityLog,
    settings: DeskSettings,
    stopwatch: Stopwatch,
    tally: TallyCounter,
    workflow: BulkConference,
    views: ViewBuilder,
}

impl Desk {
    /// Open the desk backed by the configured database file.
    pub fn open(config: DeskConfig) -> DeskResult<Self> {
        let db = Database::open(&config.database_path)?;
        Self::with_database(db, config)
    }

    /// Desk over an in-memory database.
    pub fn in_memory(config: DeskConfig) -> DeskResult<Self> {
        Self::with_database(Database::open_in_memory()?, config)
    }

    /// Load persisted state from `db`.
    pub fn with_database(db: Database, config: DeskConfig) -> DeskResult<Self> {
        let (store, activity) = match db.load_state()? {
            Some(state) => (
                RecordStore::from_records(state.records)?,
                ActivityLog::from_entries(state.activity, config.activity_log_capacity),
            ),
            None => (
                RecordStore::new(),
                ActivityLog::with_capacity(config.activity_log_capacity),
            ),
        };

        let settings = db.load_settings()?;
        let mut stopwatch = Stopwatch::new(settings.timer_seconds);
        if db.timer_was_running()? {
            stopwatch.start();
        }
        let tally = db.load_tally()?;

        info!(
            "Desk opened: {} protocols, {} activities",
            store.len(),
            activity.len()
        );

        Ok(Self {
            views: ViewBuilder::new(config.stable_sort),
            config,
            db,
            store,
            activity,
            settings,
            stopwatch,
            tally,
            workflow: BulkConference::new(),
        })
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn records(&self) -> &[ProtocolRecord] {
        self.store.all()
    }

    pub fn get(&self, id: &str) -> Option<&ProtocolRecord> {
        self.store.get(id)
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    /// Entries for the history panel, newest first.
    pub fn recent_activity(&self) -> Vec<&ActivityEntry> {
        self.activity.recent(self.config.activity_display_limit)
    }

    pub fn settings(&self) -> &DeskSettings {
        &self.settings
    }

    // =========================================================================
    // Protocols
    // =========================================================================

    /// Add one pending protocol.
    ///
    /// A blank convênio falls back to the fixed one.
    pub fn add_protocol(
        &mut self,
        raw_id: &str,
        convenio: &str,
        received_date: Option<NaiveDate>,
    ) -> DeskResult<String> {
        let shared = self.shared_fields(convenio, received_date)?;
        let id = validate(raw_id, &self.store)
            .map_err(StoreError::from)?
            .to_string();

        self.store.add(ProtocolRecord::new(
            id.clone(),
            shared.convenio,
            shared.received_date,
        ))?;
        self.sync()?;
        Ok(id)
    }

    /// Add one protocol per non-blank line of `text`.
    ///
    /// Rejected lines are reported in the outcome, never raised.
    pub fn add_batch(
        &mut self,
        text: &str,
        convenio: &str,
        received_date: Option<NaiveDate>,
    ) -> DeskResult<BatchOutcome> {
        let shared = self.shared_fields(convenio, received_date)?;
        let lines = split_batch_lines(text);
        let outcome = self
            .store
            .add_batch(lines.as_slice(), &shared, self.config.batch_duplicates);

        if outcome.rejected_count() > 0 {
            warn!(
                "Batch add: {} accepted, {} rejected",
                outcome.accepted_count(),
                outcome.rejected_count()
            );
        }
        self.sync()?;
        Ok(outcome)
    }

    /// Change a protocol's number. Returns false when the number is unchanged.
    pub fn rename(&mut self, id: &str, new_id: &str) -> DeskResult<bool> {
        let changed = self.store.update_identifier(id, new_id)?;
        self.sync()?;
        Ok(changed)
    }

    /// First conference of a pending protocol. A blank reviewer takes the fixed one.
    pub fn commit_conference(&mut self, id: &str, input: ConferenceInput) -> DeskResult<()> {
        let input = self.with_default_reviewer(input);
        self.store.commit_conference(id, input)?;
        self.sync()
    }

    /// Amend a processed protocol. A blank reviewer keeps the previous one.
    pub fn edit_conference(&mut self, id: &str, mut input: ConferenceInput) -> DeskResult<()> {
        input.reviewer = input.reviewer.filter(|r| !r.trim().is_empty());
        self.store.edit_conference(id, input)?;
        self.sync()
    }

    pub fn request_removal(&mut self, id: &str) -> DeskResult<ConfirmationToken> {
        Ok(self.store.request_removal(id)?)
    }

    /// Remove the protocol named by a removal token.
    pub fn confirm_removal(&mut self, token: &ConfirmationToken) -> DeskResult<ProtocolRecord> {
        if !matches!(
            self.store.pending_action(token),
            Some(PendingAction::Remove { .. })
        ) {
            return Err(StoreError::UnknownToken.into());
        }
        let Confirmed::Removed(record) = self.store.confirm(token)? else {
            return Err(StoreError::UnknownToken.into());
        };
        self.sync()?;
        Ok(record)
    }

    pub fn request_clear(&mut self) -> ConfirmationToken {
        self.store.request_clear()
    }

    /// Erase every protocol and the history. Returns how many protocols were removed.
    pub fn confirm_clear(&mut self, token: &ConfirmationToken) -> DeskResult<usize> {
        if self.store.pending_action(token) != Some(&PendingAction::ClearAll) {
            return Err(StoreError::UnknownToken.into());
        }
        let Confirmed::Cleared(count) = self.store.confirm(token)? else {
            return Err(StoreError::UnknownToken.into());
        };
        self.activity.clear();
        self.workflow = BulkConference::new();
        self.sync()?;
        info!("Cleared {} protocols", count);
        Ok(count)
    }

    /// Drop an outstanding confirmation request.
    pub fn discard_request(&mut self, token: &ConfirmationToken) -> bool {
        self.store.discard(token)
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn view(&self, filter: &FilterCriteria, sort: Option<SortKey>) -> Vec<&ProtocolRecord> {
        self.views.build(self.store.all(), filter, sort)
    }

    pub fn dashboard(&self, filter: &FilterCriteria) -> DashboardStats {
        let view = self.view(filter, None);
        DashboardStats::compute(&view, self.store.all())
    }

    // =========================================================================
    // Bulk conference
    // =========================================================================

    /// Drive the bulk workflow. Submissions take the fixed reviewer when blank.
    pub fn dispatch(&mut self, event: WorkflowEvent) -> DeskResult<WorkflowSignal> {
        let event = match event {
            WorkflowEvent::Submit(input) => WorkflowEvent::Submit(self.with_default_reviewer(input)),
            other => other,
        };
        let signal = self.workflow.dispatch(event, &mut self.store)?;
        self.sync()?;
        Ok(signal)
    }

    pub fn start_bulk(&mut self, selected: Vec<String>) -> DeskResult<WorkflowSignal> {
        self.dispatch(WorkflowEvent::Start(selected))
    }

    pub fn submit_bulk(&mut self, input: ConferenceInput) -> DeskResult<WorkflowSignal> {
        self.dispatch(WorkflowEvent::Submit(input))
    }

    pub fn skip_bulk(&mut self) -> DeskResult<WorkflowSignal> {
        self.dispatch(WorkflowEvent::Skip)
    }

    pub fn cancel_bulk(&mut self) -> DeskResult<WorkflowSignal> {
        self.dispatch(WorkflowEvent::Cancel)
    }

    pub fn bulk_state(&self) -> &BulkState {
        self.workflow.state()
    }

    pub fn bulk_current(&self) -> Option<&str> {
        self.workflow.current()
    }

    // =========================================================================
    // Backup and export
    // =========================================================================

    /// Serialize a full backup and note it in the history.
    pub fn backup_json(&mut self) -> DeskResult<String> {
        let backup = Backup::new(
            self.store.all().to_vec(),
            self.activity.entries(),
            &self.settings,
        );
        let json = backup.to_json().map_err(ExportError::from)?;

        self.activity.push(
            ActivityKind::Backup,
            "Backup created",
            format!("{} protocols", backup.records.len()),
        );
        self.persist()?;
        Ok(json)
    }

    /// Replace all state with a backup.
    ///
    /// The payload is validated and written in one transaction before memory
    /// is touched, so a rejected backup or a failed write changes nothing.
    /// Settings missing from the backup keep their current values.
    pub fn restore(&mut self, json: &str) -> DeskResult<usize> {
        let backup = Backup::parse(json)?;
        let count = backup.records.len();

        let store = RecordStore::from_records(backup.records)?;
        let mut activity =
            ActivityLog::from_entries(backup.activity_log, self.config.activity_log_capacity);
        activity.push(
            ActivityKind::Restore,
            "Backup restored",
            format!("{} protocols", count),
        );
        let mut settings = self.settings.clone();
        backup.settings.apply_to(&mut settings);
        let stopwatch = Stopwatch::new(settings.timer_seconds);

        self.db.atomically(|db| {
            db.save_settings(&settings)?;
            db.save_timer(stopwatch.elapsed_seconds, stopwatch.running)?;
            db.save_state(store.all(), &activity.entries())
        })?;

        self.store = store;
        self.workflow = BulkConference::new();
        self.activity = activity;
        self.settings = settings;
        self.stopwatch = stopwatch;
        info!("Restored backup with {} protocols", count);
        Ok(count)
    }

    /// Build the spreadsheet of processed protocols.
    ///
    /// Without a responsible name the fixed reviewer is used.
    pub fn export_spreadsheet(
        &mut self,
        reference_date: NaiveDate,
        responsible: Option<&str>,
    ) -> DeskResult<WorkbookExport> {
        let responsible = responsible
            .filter(|r| !r.trim().is_empty())
            .or(self.settings.fixed_reviewer.as_deref());
        let workbook = WorkbookExport::from_records(self.store.all(), reference_date, responsible)?;

        self.activity.push(
            ActivityKind::Export,
            "Spreadsheet exported",
            format!(
                "{} rows across {} sheets",
                workbook.row_count(),
                workbook.sheets.len()
            ),
        );
        self.persist()?;
        Ok(workbook)
    }

    // =========================================================================
    // Tally counter
    // =========================================================================

    pub fn tally(&self) -> &TallyCounter {
        &self.tally
    }

    pub fn increment_tally(&mut self, kind: TallyKind) -> DeskResult<u64> {
        self.tally.increment(kind);
        self.db.save_tally(&self.tally)?;
        Ok(self.tally.get(kind))
    }

    pub fn reset_tally(&mut self) -> DeskResult<()> {
        self.tally.reset();
        self.db.save_tally(&self.tally)?;
        Ok(())
    }

    pub fn tally_report(&self, generated_on: NaiveDate) -> TallyReport {
        TallyReport::from_counter(&self.tally, generated_on)
    }

    // =========================================================================
    // Stopwatch
    // =========================================================================

    pub fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }

    pub fn start_timer(&mut self) -> DeskResult<bool> {
        let started = self.stopwatch.start();
        if started {
            self.save_timer()?;
        }
        Ok(started)
    }

    pub fn pause_timer(&mut self) -> DeskResult<bool> {
        let paused = self.stopwatch.pause();
        if paused {
            self.save_timer()?;
        }
        Ok(paused)
    }

    /// One-second tick from the host. Returns the elapsed seconds.
    pub fn tick_timer(&mut self) -> DeskResult<u64> {
        if self.stopwatch.tick() {
            self.save_timer()?;
        }
        Ok(self.stopwatch.elapsed_seconds)
    }

    pub fn reset_timer(&mut self) -> DeskResult<()> {
        self.stopwatch.reset();
        self.save_timer()
    }

    // =========================================================================
    // Fixed fields and theme
    // =========================================================================

    pub fn fix_reviewer(&mut self, name: &str) -> DeskResult<()> {
        let name = non_blank(name, "reviewer")?;
        self.settings.fixed_reviewer = Some(name);
        self.save_settings()
    }

    pub fn release_reviewer(&mut self) -> DeskResult<()> {
        self.settings.fixed_reviewer = None;
        self.save_settings()
    }

    pub fn fix_convenio(&mut self, convenio: &str) -> DeskResult<()> {
        let convenio = non_blank(convenio, "convenio")?;
        self.settings.fixed_convenio = Some(convenio);
        self.save_settings()
    }

    pub fn release_convenio(&mut self) -> DeskResult<()> {
        self.settings.fixed_convenio = None;
        self.save_settings()
    }

    pub fn set_theme(&mut self, theme: Theme) -> DeskResult<()> {
        self.settings.theme = theme;
        self.save_settings()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn shared_fields(
        &self,
        convenio: &str,
        received_date: Option<NaiveDate>,
    ) -> DeskResult<SharedFields> {
        let convenio = match convenio.trim() {
            "" => self
                .settings
                .fixed_convenio
                .clone()
                .ok_or(StoreError::MissingRequiredField("convenio"))?,
            given => given.to_string(),
        };
        let received_date =
            received_date.ok_or(StoreError::MissingRequiredField("received_date"))?;
        Ok(SharedFields {
            convenio,
            received_date,
        })
    }

    fn with_default_reviewer(&self, mut input: ConferenceInput) -> ConferenceInput {
        if input.reviewer.as_deref().map_or(true, |r| r.trim().is_empty()) {
            input.reviewer = self.settings.fixed_reviewer.clone();
        }
        input
    }

    /// Record pending store events in the history and persist.
    fn sync(&mut self) -> DeskResult<()> {
        if !self.store.is_dirty() {
            return Ok(());
        }
        for event in self.store.take_events() {
            debug!("Store event: {:?}", event);
            self.activity.record(activity_for(&event));
        }
        self.persist()
    }

    fn persist(&mut self) -> DeskResult<()> {
        self.db
            .save_state(self.store.all(), &self.activity.entries())?;
        self.store.mark_clean();
        Ok(())
    }

    fn save_settings(&mut self) -> DeskResult<()> {
        self.settings.timer_seconds = self.stopwatch.elapsed_seconds;
        self.db.save_settings(&self.settings)?;
        Ok(())
    }

    fn save_timer(&mut self) -> DeskResult<()> {
        self.settings.timer_seconds = self.stopwatch.elapsed_seconds;
        self.db
            .save_timer(self.stopwatch.elapsed_seconds, self.stopwatch.running)?;
        Ok(())
    }
}

fn non_blank(value: &str, field: &'static str) -> DeskResult<String> {
    match value.trim() {
        "" => Err(StoreError::MissingRequiredField(field).into()),
        v => Ok(v.to_string()),
    }
}

/// History line for a store event.
fn activity_for(event: &StoreEvent) -> ActivityEntry {
    match event {
        StoreEvent::Added { id, convenio } => ActivityEntry::new(
            ActivityKind::Add,
            format!("Protocol {} added", id),
            format!("Convênio: {}", convenio),
        ),
        StoreEvent::BatchAdded { count, convenio } => ActivityEntry::new(
            ActivityKind::Add,
            format!("{} protocols added in batch", count),
            format!("Convênio: {}", convenio),
        ),
        StoreEvent::IdentifierChanged { from, to } => ActivityEntry::new(
            ActivityKind::Edit,
            format!("Protocol {} renamed", from),
            format!("New number: {}", to),
        ),
        StoreEvent::Conferred { id, documents } => ActivityEntry::new(
            ActivityKind::Conference,
            format!("Protocol {} conferred", id),
            format!("{} documents", documents),
        ),
        StoreEvent::ConferenceEdited { id, documents } => ActivityEntry::new(
            ActivityKind::Edit,
            format!("Conference of protocol {} edited", id),
            format!("{} documents", documents),
        ),
        StoreEvent::Removed { id } => {
            ActivityEntry::new(ActivityKind::Delete, format!("Protocol {} removed", id), "")
        }
        StoreEvent::Cleared { count } => ActivityEntry::new(
            ActivityKind::Clear,
            "All data cleared",
            format!("{} protocols removed", count),
        ),
    }
}

/// Today's date in UTC, the default reference date for exports.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProtocolStatus, Quantities};
    use crate::store::ValidationError;

    fn desk() -> Desk {
        Desk::in_memory(DeskConfig::default()).unwrap()
    }

    fn date() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 5, 10)
    }

    #[test]
    fn test_add_protocol_logs_and_persists() {
        let mut desk = desk();
        let id = desk.add_protocol(" 12345 ", "Unimed", date()).unwrap();
        assert_eq!(id, "12345");

        let recent = desk.recent_activity();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].kind, ActivityKind::Add);
        assert_eq!(recent[0].action, "Protocol 12345 added");

        let saved = desk.db.load_state().unwrap().unwrap();
        assert_eq!(saved.records.len(), 1);
        assert_eq!(saved.activity.len(), 1);
        assert!(!desk.store().is_dirty());
    }

    #[test]
    fn test_add_protocol_required_fields() {
        let mut desk = desk();
        assert!(matches!(
            desk.add_protocol("12345", "  ", date()),
            Err(DeskError::Store(StoreError::MissingRequiredField("convenio")))
        ));
        assert!(matches!(
            desk.add_protocol("12345", "Unimed", None),
            Err(DeskError::Store(StoreError::MissingRequiredField("received_date")))
        ));

        desk.fix_convenio("Particular").unwrap();
        desk.add_protocol("12345", "", date()).unwrap();
        assert_eq!(desk.get("12345").unwrap().convenio(), "Particular");
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut desk = desk();
        desk.add_protocol("12345", "Unimed", date()).unwrap();
        let err = desk.add_protocol("12345", "Unimed", date()).unwrap_err();
        assert!(matches!(
            err,
            DeskError::Store(StoreError::Validation(ValidationError::Duplicate))
        ));
        assert_eq!(desk.records().len(), 1);
        assert_eq!(desk.activity().len(), 1);
    }

    #[test]
    fn test_add_batch_text() {
        let mut desk = desk();
        let outcome = desk
            .add_batch("111\n\nabc\n 222 \n111\n", "Unimed", date())
            .unwrap();
        assert_eq!(outcome.accepted, vec!["111", "222"]);
        assert_eq!(outcome.rejected_count(), 2);
        assert_eq!(desk.records().len(), 2);
        assert_eq!(desk.recent_activity()[0].action, "2 protocols added in batch");

        let outcome = desk.add_batch("abc", "Unimed", date()).unwrap();
        assert_eq!(outcome.accepted_count(), 0);
        assert_eq!(desk.activity().len(), 1);
    }

    #[test]
    fn test_batch_policy_from_config() {
        let config = DeskConfig {
            batch_duplicates: crate::store::BatchDuplicatePolicy::RejectAll,
            ..DeskConfig::default()
        };
        let mut desk = Desk::in_memory(config).unwrap();
        let outcome = desk.add_batch("111\n222\n111", "Unimed", date()).unwrap();
        assert_eq!(outcome.accepted, vec!["222"]);
        assert_eq!(outcome.rejected_count(), 2);
    }

    #[test]
    fn test_conference_uses_fixed_reviewer() {
        let mut desk = desk();
        desk.add_protocol("111", "Unimed", date()).unwrap();
        desk.fix_reviewer(" Ana ").unwrap();

        desk.commit_conference("111", ConferenceInput::new(Quantities::new(2, 0, 0, 0)))
            .unwrap();
        let conference = desk.get("111").unwrap().conference().unwrap().clone();
        assert_eq!(conference.reviewer.as_deref(), Some("Ana"));

        desk.edit_conference(
            "111",
            ConferenceInput::new(Quantities::new(5, 0, 0, 0)).with_reviewer(""),
        )
        .unwrap();
        let record = desk.get("111").unwrap();
        assert_eq!(record.status(), ProtocolStatus::Processed);
        assert_eq!(record.document_total(), 5);
        assert_eq!(
            record.conference().unwrap().reviewer.as_deref(),
            Some("Ana")
        );
        assert_eq!(desk.recent_activity()[0].kind, ActivityKind::Edit);
    }

    #[test]
    fn test_fix_blank_value_rejected() {
        let mut desk = desk();
        assert!(matches!(
            desk.fix_reviewer("   "),
            Err(DeskError::Store(StoreError::MissingRequiredField("reviewer")))
        ));
        desk.fix_reviewer("Ana").unwrap();
        desk.release_reviewer().unwrap();
        assert!(desk.settings().fixed_reviewer.is_none());
    }

    #[test]
    fn test_removal_requires_matching_token() {
        let mut desk = desk();
        desk.add_protocol("111", "Unimed", date()).unwrap();

        let clear = desk.request_clear();
        assert!(matches!(
            desk.confirm_removal(&clear),
            Err(DeskError::Store(StoreError::UnknownToken))
        ));
        assert!(desk.discard_request(&clear));

        let token = desk.request_removal("111").unwrap();
        let removed = desk.confirm_removal(&token).unwrap();
        assert_eq!(removed.id(), "111");
        assert!(desk.records().is_empty());
        assert_eq!(desk.recent_activity()[0].kind, ActivityKind::Delete);

        assert!(desk.confirm_removal(&token).is_err());
    }

    #[test]
    fn test_clear_wipes_records_and_history() {
        let mut desk = desk();
        desk.add_batch("111\n222\n333", "Unimed", date()).unwrap();

        let token = desk.request_clear();
        assert_eq!(desk.confirm_clear(&token).unwrap(), 3);
        assert!(desk.records().is_empty());
        assert_eq!(desk.activity().len(), 1);
        assert_eq!(desk.recent_activity()[0].kind, ActivityKind::Clear);
    }

    #[test]
    fn test_bulk_run_through_desk() {
        let mut desk = desk();
        desk.add_batch("111\n222", "Unimed", date()).unwrap();
        desk.fix_reviewer("Ana").unwrap();

        desk.start_bulk(vec!["111".into(), "222".into()]).unwrap();
        assert_eq!(desk.bulk_current(), Some("111"));
        desk.submit_bulk(ConferenceInput::new(Quantities::new(1, 0, 0, 0)))
            .unwrap();
        let signal = desk.skip_bulk().unwrap();
        assert_eq!(
            signal,
            WorkflowSignal::Completed {
                total: 2,
                committed: 1
            }
        );

        let record = desk.get("111").unwrap();
        assert_eq!(
            record.conference().unwrap().reviewer.as_deref(),
            Some("Ana")
        );
        assert!(desk.get("222").unwrap().is_pending());
        assert_eq!(desk.recent_activity()[0].kind, ActivityKind::Conference);
    }

    #[test]
    fn test_dashboard_and_view() {
        let mut desk = desk();
        desk.add_batch("111\n222\n333", "Unimed", date()).unwrap();
        desk.add_batch("333\n900", "Particular", date()).unwrap();
        desk.commit_conference("900", ConferenceInput::new(Quantities::new(0, 1, 0, 0)))
            .unwrap();

        let filter = FilterCriteria {
            status: Some(ProtocolStatus::Processed),
            ..FilterCriteria::default()
        };
        let view = desk.view(&filter, None);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id(), "900");

        let stats = desk.dashboard(&FilterCriteria::default());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.completion_rate, 25);
        assert_eq!(stats.convenios, vec!["Unimed", "Particular"]);
    }

    #[test]
    fn test_export_logs_activity() {
        let mut desk = desk();
        desk.add_protocol("111", "Unimed", date()).unwrap();
        assert!(matches!(
            desk.export_spreadsheet(date().unwrap(), None),
            Err(DeskError::Export(ExportError::NothingToExport))
        ));

        desk.fix_reviewer("Ana").unwrap();
        desk.commit_conference("111", ConferenceInput::new(Quantities::new(0, 0, 3, 0)))
            .unwrap();
        let workbook = desk.export_spreadsheet(date().unwrap(), None).unwrap();
        assert_eq!(workbook.responsible, "Ana");
        assert_eq!(workbook.sheets[0].name, "Emergency Sheet");
        assert_eq!(desk.recent_activity()[0].kind, ActivityKind::Export);
    }

    #[test]
    fn test_tally_and_timer_persist() {
        let mut desk = desk();
        desk.increment_tally(TallyKind::Outpatient).unwrap();
        assert_eq!(desk.increment_tally(TallyKind::Outpatient).unwrap(), 2);
        desk.increment_tally(TallyKind::Inpatient).unwrap();
        assert_eq!(desk.db.load_tally().unwrap().total(), 3);
        assert_eq!(desk.tally_report(date().unwrap()).total, 3);

        assert!(desk.start_timer().unwrap());
        desk.tick_timer().unwrap();
        assert_eq!(desk.tick_timer().unwrap(), 2);
        assert!(desk.db.timer_was_running().unwrap());
        assert!(desk.pause_timer().unwrap());
        assert_eq!(desk.tick_timer().unwrap(), 2);
        assert_eq!(desk.db.load_settings().unwrap().timer_seconds, 2);

        desk.reset_timer().unwrap();
        desk.reset_tally().unwrap();
        assert_eq!(desk.stopwatch().display(), "00:00:00");
        assert_eq!(desk.db.load_tally().unwrap().total(), 0);
    }

    #[test]
    fn test_failed_restore_write_keeps_memory() {
        let mut desk = desk();
        desk.add_protocol("111", "Unimed", date()).unwrap();
        desk.fix_reviewer("Ana").unwrap();
        let json = desk.backup_json().unwrap();
        desk.add_protocol("222", "Unimed", date()).unwrap();
        let activity_before = desk.activity().len();

        desk.db.conn().execute_batch("DROP TABLE kv_store").unwrap();
        assert!(matches!(desk.restore(&json), Err(DeskError::Database(_))));

        assert_eq!(desk.records().len(), 2);
        assert_eq!(desk.activity().len(), activity_before);
        assert_eq!(desk.settings().fixed_reviewer.as_deref(), Some("Ana"));
    }
}
