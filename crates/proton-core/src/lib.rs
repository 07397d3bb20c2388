//! Proton Core Library
//!
//! Local-first tracking of document-receipt protocols through a two-step
//! workflow, pending to processed.
//!
//! # Architecture
//!
//! ```text
//!   add / batch add ──▶ Validator ──▶ RecordStore ──change events──▶ Desk
//!                                        │   ▲                         │
//!                                        │   └── BulkConference        ├─▶ ActivityLog
//!                                        ▼       (submit/skip/cancel)  ├─▶ SQLite key-value state
//!                                    ViewBuilder                       └─▶ Backup / Spreadsheet / Tally report
//!                                 (filter + sort, rebuilt
//!                                  on every call)
//! ```
//!
//! # Modules
//!
//! - [`models`]: Domain types (ProtocolRecord, ActivityLog, Stopwatch, TallyCounter, ...)
//! - [`store`]: Record store, identifier validator, batch insert, confirmation tokens
//! - [`view`]: Filtered and sorted projections, dashboard statistics
//! - [`workflow`]: Bulk conference state machine
//! - [`db`]: SQLite key-value persistence
//! - [`export`]: Backup, spreadsheet and tally report
//! - [`config`]: TOML configuration
//! - [`desk`]: Orchestrator tying everything together

pub mod config;
pub mod db;
pub mod desk;
pub mod export;
pub mod models;
pub mod store;
pub mod view;
pub mod workflow;

// Re-export commonly used types
pub use config::DeskConfig;
pub use db::Database;
pub use desk::{Desk, DeskError, DeskResult};
pub use models::{
    ActivityEntry, ActivityKind, ActivityLog, Conference, ConferenceInput, DocumentCategory,
    ProtocolRecord, ProtocolStatus, Quantities, Stopwatch, TallyCounter, TallyKind,
};
pub use store::{validate, BatchOutcome, ConfirmationToken, RecordStore, StoreError};
pub use view::{DashboardStats, FilterCriteria, SortColumn, SortDirection, SortKey, ViewBuilder};
pub use workflow::{BulkConference, BulkState, WorkflowEvent, WorkflowSignal};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ProtonError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Workflow error: {0}")]
    WorkflowError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Malformed backup: {0}")]
    MalformedBackup(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<StoreError> for ProtonError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => ProtonError::NotFound(e.to_string()),
            _ => ProtonError::InvalidInput(e.to_string()),
        }
    }
}

impl From<workflow::WorkflowError> for ProtonError {
    fn from(e: workflow::WorkflowError) -> Self {
        match e {
            workflow::WorkflowError::Store(inner) => inner.into(),
            other => ProtonError::WorkflowError(other.to_string()),
        }
    }
}

impl From<db::DbError> for ProtonError {
    fn from(e: db::DbError) -> Self {
        ProtonError::DatabaseError(e.to_string())
    }
}

impl From<export::BackupError> for ProtonError {
    fn from(e: export::BackupError) -> Self {
        ProtonError::MalformedBackup(e.to_string())
    }
}

impl From<export::ExportError> for ProtonError {
    fn from(e: export::ExportError) -> Self {
        ProtonError::ExportError(e.to_string())
    }
}

impl From<DeskError> for ProtonError {
    fn from(e: DeskError) -> Self {
        match e {
            DeskError::Store(e) => e.into(),
            DeskError::Workflow(e) => e.into(),
            DeskError::Database(e) => e.into(),
            DeskError::Backup(e) => e.into(),
            DeskError::Export(e) => e.into(),
        }
    }
}

impl From<serde_json::Error> for ProtonError {
    fn from(e: serde_json::Error) -> Self {
        ProtonError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ProtonError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ProtonError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a desk backed by the database at the given path.
#[uniffi::export]
pub fn open_desk(path: String) -> Result<Arc<ProtonCore>, ProtonError> {
    let config = DeskConfig {
        database_path: path.into(),
        ..DeskConfig::default()
    };
    let desk = Desk::open(config)?;
    Ok(ProtonCore::wrap(desk))
}

/// Create a desk over an in-memory database (for testing).
#[uniffi::export]
pub fn open_desk_in_memory() -> Result<Arc<ProtonCore>, ProtonError> {
    let desk = Desk::in_memory(DeskConfig::default())?;
    Ok(ProtonCore::wrap(desk))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe desk wrapper for FFI.
#[derive(uniffi::Object)]
pub struct ProtonCore {
    desk: Arc<Mutex<Desk>>,
}

impl ProtonCore {
    fn wrap(desk: Desk) -> Arc<Self> {
        Arc::new(Self {
            desk: Arc::new(Mutex::new(desk)),
        })
    }
}

#[uniffi::export]
impl ProtonCore {
    // =========================================================================
    // Protocol Operations
    // =========================================================================

    /// Add a pending protocol. Dates are `YYYY-MM-DD`.
    pub fn add_protocol(
        &self,
        id: String,
        convenio: String,
        received_date: Option<String>,
    ) -> Result<String, ProtonError> {
        let date = parse_optional_date(received_date)?;
        let mut desk = self.desk.lock()?;
        Ok(desk.add_protocol(&id, &convenio, date)?)
    }

    /// Add one protocol per line of `text`.
    pub fn add_batch(
        &self,
        text: String,
        convenio: String,
        received_date: Option<String>,
    ) -> Result<FfiBatchOutcome, ProtonError> {
        let date = parse_optional_date(received_date)?;
        let mut desk = self.desk.lock()?;
        Ok(desk.add_batch(&text, &convenio, date)?.into())
    }

    /// Change a protocol's number. Returns false when unchanged.
    pub fn rename(&self, id: String, new_id: String) -> Result<bool, ProtonError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.rename(&id, &new_id)?)
    }

    pub fn commit_conference(
        &self,
        id: String,
        conference: FfiConferenceInput,
    ) -> Result<(), ProtonError> {
        let mut desk = self.desk.lock()?;
        desk.commit_conference(&id, conference.into())?;
        Ok(())
    }

    pub fn edit_conference(
        &self,
        id: String,
        conference: FfiConferenceInput,
    ) -> Result<(), ProtonError> {
        let mut desk = self.desk.lock()?;
        desk.edit_conference(&id, conference.into())?;
        Ok(())
    }

    pub fn get_protocol(&self, id: String) -> Result<Option<FfiProtocol>, ProtonError> {
        let desk = self.desk.lock()?;
        Ok(desk.get(&id).map(FfiProtocol::from))
    }

    /// Filtered and optionally sorted protocols.
    pub fn list_protocols(
        &self,
        filter: FfiFilter,
        sort: Option<FfiSort>,
    ) -> Result<Vec<FfiProtocol>, ProtonError> {
        let filter = FilterCriteria::try_from(filter)?;
        let sort = sort.map(SortKey::try_from).transpose()?;
        let desk = self.desk.lock()?;
        Ok(desk
            .view(&filter, sort)
            .into_iter()
            .map(FfiProtocol::from)
            .collect())
    }

    pub fn dashboard(&self, filter: FfiFilter) -> Result<FfiDashboard, ProtonError> {
        let filter = FilterCriteria::try_from(filter)?;
        let desk = self.desk.lock()?;
        Ok(desk.dashboard(&filter).into())
    }

    // =========================================================================
    // Confirmation Operations
    // =========================================================================

    /// Returns a token to pass to `confirm_removal`.
    pub fn request_removal(&self, id: String) -> Result<String, ProtonError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.request_removal(&id)?.as_str().to_string())
    }

    pub fn confirm_removal(&self, token: String) -> Result<FfiProtocol, ProtonError> {
        let mut desk = self.desk.lock()?;
        let record = desk.confirm_removal(&ConfirmationToken::from(token))?;
        Ok(FfiProtocol::from(&record))
    }

    pub fn request_clear(&self) -> Result<String, ProtonError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.request_clear().as_str().to_string())
    }

    pub fn confirm_clear(&self, token: String) -> Result<u64, ProtonError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.confirm_clear(&ConfirmationToken::from(token))? as u64)
    }

    pub fn discard_request(&self, token: String) -> Result<bool, ProtonError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.discard_request(&ConfirmationToken::from(token)))
    }

    // =========================================================================
    // Bulk Conference Operations
    // =========================================================================

    pub fn start_bulk(&self, ids: Vec<String>) -> Result<FfiWorkflowSignal, ProtonError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.start_bulk(ids)?.into())
    }

    pub fn submit_bulk(
        &self,
        conference: FfiConferenceInput,
    ) -> Result<FfiWorkflowSignal, ProtonError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.submit_bulk(conference.into())?.into())
    }

    pub fn skip_bulk(&self) -> Result<FfiWorkflowSignal, ProtonError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.skip_bulk()?.into())
    }

    pub fn cancel_bulk(&self) -> Result<FfiWorkflowSignal, ProtonError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.cancel_bulk()?.into())
    }

    /// Protocol currently awaiting input in the bulk run.
    pub fn bulk_current(&self) -> Result<Option<String>, ProtonError> {
        let desk = self.desk.lock()?;
        Ok(desk.bulk_current().map(str::to_string))
    }

    // =========================================================================
    // Activity, Backup and Export Operations
    // =========================================================================

    pub fn recent_activity(&self) -> Result<Vec<FfiActivity>, ProtonError> {
        let desk = self.desk.lock()?;
        Ok(desk
            .recent_activity()
            .into_iter()
            .map(FfiActivity::from)
            .collect())
    }

    pub fn backup_json(&self) -> Result<String, ProtonError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.backup_json()?)
    }

    /// Restore a backup. Returns the number of protocols restored.
    pub fn restore(&self, json: String) -> Result<u64, ProtonError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.restore(&json)? as u64)
    }

    /// Workbook of processed protocols as JSON, for the spreadsheet writer.
    pub fn export_spreadsheet_json(
        &self,
        reference_date: Option<String>,
        responsible: Option<String>,
    ) -> Result<String, ProtonError> {
        let date = parse_optional_date(reference_date)?.unwrap_or_else(crate::desk::today);
        let mut desk = self.desk.lock()?;
        let workbook = desk.export_spreadsheet(date, responsible.as_deref())?;
        Ok(workbook.to_json()?)
    }

    // =========================================================================
    // Tally Operations
    // =========================================================================

    pub fn tally(&self) -> Result<FfiTally, ProtonError> {
        let desk = self.desk.lock()?;
        Ok(desk.tally().into())
    }

    /// `kind` is `outpatient` or `inpatient`.
    pub fn increment_tally(&self, kind: String) -> Result<u64, ProtonError> {
        let kind = parse_tally_kind(&kind)?;
        let mut desk = self.desk.lock()?;
        Ok(desk.increment_tally(kind)?)
    }

    pub fn reset_tally(&self) -> Result<(), ProtonError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.reset_tally()?)
    }

    /// Tally report as JSON, for the PDF writer.
    pub fn tally_report_json(&self) -> Result<String, ProtonError> {
        let desk = self.desk.lock()?;
        Ok(desk.tally_report(crate::desk::today()).to_json()?)
    }

    // =========================================================================
    // Stopwatch Operations
    // =========================================================================

    pub fn timer(&self) -> Result<FfiTimer, ProtonError> {
        let desk = self.desk.lock()?;
        Ok(desk.stopwatch().into())
    }

    pub fn start_timer(&self) -> Result<bool, ProtonError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.start_timer()?)
    }

    pub fn pause_timer(&self) -> Result<bool, ProtonError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.pause_timer()?)
    }

    pub fn tick_timer(&self) -> Result<u64, ProtonError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.tick_timer()?)
    }

    pub fn reset_timer(&self) -> Result<(), ProtonError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.reset_timer()?)
    }

    // =========================================================================
    // Settings Operations
    // =========================================================================

    pub fn settings(&self) -> Result<FfiSettings, ProtonError> {
        let desk = self.desk.lock()?;
        Ok(desk.settings().into())
    }

    pub fn fix_reviewer(&self, name: String) -> Result<(), ProtonError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.fix_reviewer(&name)?)
    }

    pub fn release_reviewer(&self) -> Result<(), ProtonError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.release_reviewer()?)
    }

    pub fn fix_convenio(&self, convenio: String) -> Result<(), ProtonError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.fix_convenio(&convenio)?)
    }

    pub fn release_convenio(&self) -> Result<(), ProtonError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.release_convenio()?)
    }

    /// `theme` is `light` or `dark`.
    pub fn set_theme(&self, theme: String) -> Result<(), ProtonError> {
        let mut desk = self.desk.lock()?;
        Ok(desk.set_theme(models::Theme::parse(&theme))?)
    }
}

// =========================================================================
// Parsing Helpers
// =========================================================================

fn parse_date(raw: &str) -> Result<NaiveDate, ProtonError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ProtonError::InvalidInput(format!("Invalid date: {}", raw)))
}

/// Blank strings count as absent.
fn parse_optional_date(raw: Option<String>) -> Result<Option<NaiveDate>, ProtonError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(value).map(Some),
    }
}

fn parse_status(raw: &str) -> Result<ProtocolStatus, ProtonError> {
    match raw.trim().to_lowercase().as_str() {
        "pending" => Ok(ProtocolStatus::Pending),
        "processed" => Ok(ProtocolStatus::Processed),
        other => Err(ProtonError::InvalidInput(format!("Unknown status: {}", other))),
    }
}

fn parse_tally_kind(raw: &str) -> Result<TallyKind, ProtonError> {
    match raw.trim().to_lowercase().as_str() {
        "outpatient" => Ok(TallyKind::Outpatient),
        "inpatient" => Ok(TallyKind::Inpatient),
        other => Err(ProtonError::InvalidInput(format!("Unknown tally kind: {}", other))),
    }
}

fn status_name(status: ProtocolStatus) -> String {
    match status {
        ProtocolStatus::Pending => "pending",
        ProtocolStatus::Processed => "processed",
    }
    .to_string()
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe document counts.
#[derive(Debug, Clone, Copy, uniffi::Record)]
pub struct FfiQuantities {
    pub outpatient: u32,
    pub imaging: u32,
    pub emergency: u32,
    pub inpatient: u32,
}

impl From<Quantities> for FfiQuantities {
    fn from(q: Quantities) -> Self {
        Self {
            outpatient: q.outpatient,
            imaging: q.imaging,
            emergency: q.emergency,
            inpatient: q.inpatient,
        }
    }
}

impl From<FfiQuantities> for Quantities {
    fn from(q: FfiQuantities) -> Self {
        Quantities::new(q.outpatient, q.imaging, q.emergency, q.inpatient)
    }
}

/// FFI-safe conference input.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiConferenceInput {
    pub quantities: FfiQuantities,
    pub notes: String,
    pub reviewer: Option<String>,
}

impl From<FfiConferenceInput> for ConferenceInput {
    fn from(input: FfiConferenceInput) -> Self {
        ConferenceInput {
            quantities: input.quantities.into(),
            notes: input.notes,
            reviewer: input.reviewer,
        }
    }
}

/// FFI-safe protocol. Conference fields are set only once processed.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProtocol {
    pub id: String,
    pub convenio: String,
    pub status: String,
    pub received_date: String,
    pub added_at: String,
    pub quantities: Option<FfiQuantities>,
    pub notes: Option<String>,
    pub reviewer: Option<String>,
    pub conferred_at: Option<String>,
}

impl From<&ProtocolRecord> for FfiProtocol {
    fn from(record: &ProtocolRecord) -> Self {
        let conference = record.conference();
        Self {
            id: record.id().to_string(),
            convenio: record.convenio().to_string(),
            status: status_name(record.status()),
            received_date: record.received_date().format("%Y-%m-%d").to_string(),
            added_at: record.added_at().to_rfc3339(),
            quantities: conference.map(|c| c.quantities.into()),
            notes: conference.map(|c| c.notes.clone()),
            reviewer: conference.and_then(|c| c.reviewer.clone()),
            conferred_at: conference.map(|c| c.conferred_at.to_rfc3339()),
        }
    }
}

/// FFI-safe rejected batch line.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRejectedEntry {
    pub candidate: String,
    pub reason: String,
}

/// FFI-safe batch outcome.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBatchOutcome {
    pub accepted: Vec<String>,
    pub rejected: Vec<FfiRejectedEntry>,
}

impl From<BatchOutcome> for FfiBatchOutcome {
    fn from(outcome: BatchOutcome) -> Self {
        Self {
            accepted: outcome.accepted,
            rejected: outcome
                .rejected
                .into_iter()
                .map(|r| FfiRejectedEntry {
                    candidate: r.candidate,
                    reason: r.reason.reason().to_string(),
                })
                .collect(),
        }
    }
}

/// FFI-safe filter criteria. Status is `pending` or `processed`; dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiFilter {
    pub search: Option<String>,
    pub status: Option<String>,
    pub convenio: Option<String>,
    pub received_date: Option<String>,
}

impl TryFrom<FfiFilter> for FilterCriteria {
    type Error = ProtonError;

    fn try_from(filter: FfiFilter) -> Result<Self, Self::Error> {
        let status = match filter.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_status(raw)?),
        };
        Ok(FilterCriteria {
            search: filter.search,
            status,
            convenio: filter.convenio,
            received_date: parse_optional_date(filter.received_date)?,
        })
    }
}

/// FFI-safe sort key. Column is one of `id`, `convenio`, `status`, `received_date`, `added_at`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSort {
    pub column: String,
    pub descending: bool,
}

impl TryFrom<FfiSort> for SortKey {
    type Error = ProtonError;

    fn try_from(sort: FfiSort) -> Result<Self, Self::Error> {
        let column = match sort.column.trim() {
            "id" => SortColumn::Id,
            "convenio" => SortColumn::Convenio,
            "status" => SortColumn::Status,
            "received_date" => SortColumn::ReceivedDate,
            "added_at" => SortColumn::AddedAt,
            other => {
                return Err(ProtonError::InvalidInput(format!(
                    "Unknown sort column: {}",
                    other
                )))
            }
        };
        Ok(if sort.descending {
            SortKey::descending(column)
        } else {
            SortKey::ascending(column)
        })
    }
}

/// FFI-safe chart entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCategoryTotal {
    pub code: String,
    pub label: String,
    pub documents: u64,
}

/// FFI-safe dashboard statistics.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDashboard {
    pub total: u64,
    pub processed: u64,
    pub pending: u64,
    pub completion_rate: u32,
    pub category_totals: Vec<FfiCategoryTotal>,
    pub convenios: Vec<String>,
}

impl From<DashboardStats> for FfiDashboard {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total: stats.total as u64,
            processed: stats.processed as u64,
            pending: stats.pending as u64,
            completion_rate: stats.completion_rate,
            category_totals: stats
                .category_totals
                .into_iter()
                .map(|t| FfiCategoryTotal {
                    code: t.category.code(),
                    label: t.category.label().to_string(),
                    documents: t.documents,
                })
                .collect(),
            convenios: stats.convenios,
        }
    }
}

/// FFI-safe workflow signal.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum FfiWorkflowSignal {
    RequestInput { id: String, position: u64, total: u64 },
    NothingToDo,
    Completed { total: u64, committed: u64 },
    Cancelled { committed: u64 },
}

impl From<WorkflowSignal> for FfiWorkflowSignal {
    fn from(signal: WorkflowSignal) -> Self {
        match signal {
            WorkflowSignal::RequestInput {
                id,
                position,
                total,
            } => FfiWorkflowSignal::RequestInput {
                id,
                position: position as u64,
                total: total as u64,
            },
            WorkflowSignal::NothingToDo => FfiWorkflowSignal::NothingToDo,
            WorkflowSignal::Completed { total, committed } => FfiWorkflowSignal::Completed {
                total: total as u64,
                committed: committed as u64,
            },
            WorkflowSignal::Cancelled { committed } => FfiWorkflowSignal::Cancelled {
                committed: committed as u64,
            },
        }
    }
}

/// FFI-safe activity entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiActivity {
    pub id: String,
    pub kind: String,
    pub action: String,
    pub details: String,
    pub timestamp: String,
}

impl From<&ActivityEntry> for FfiActivity {
    fn from(entry: &ActivityEntry) -> Self {
        Self {
            id: entry.id.clone(),
            kind: format!("{:?}", entry.kind).to_lowercase(),
            action: entry.action.clone(),
            details: entry.details.clone(),
            timestamp: entry.timestamp.to_rfc3339(),
        }
    }
}

/// FFI-safe tally counts.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTally {
    pub outpatient: u64,
    pub inpatient: u64,
    pub total: u64,
}

impl From<&TallyCounter> for FfiTally {
    fn from(tally: &TallyCounter) -> Self {
        Self {
            outpatient: tally.outpatient,
            inpatient: tally.inpatient,
            total: tally.total(),
        }
    }
}

/// FFI-safe stopwatch state.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTimer {
    pub elapsed_seconds: u64,
    pub running: bool,
    pub display: String,
}

impl From<&Stopwatch> for FfiTimer {
    fn from(stopwatch: &Stopwatch) -> Self {
        Self {
            elapsed_seconds: stopwatch.elapsed_seconds,
            running: stopwatch.running,
            display: stopwatch.display(),
        }
    }
}

/// FFI-safe settings.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSettings {
    pub fixed_reviewer: Option<String>,
    pub fixed_convenio: Option<String>,
    pub theme: String,
    pub timer_seconds: u64,
}

impl From<&models::DeskSettings> for FfiSettings {
    fn from(settings: &models::DeskSettings) -> Self {
        Self {
            fixed_reviewer: settings.fixed_reviewer.clone(),
            fixed_convenio: settings.fixed_convenio.clone(),
            theme: settings.theme.as_str().to_string(),
            timer_seconds: settings.timer_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conference(outpatient: u32) -> FfiConferenceInput {
        FfiConferenceInput {
            quantities: FfiQuantities {
                outpatient,
                imaging: 0,
                emergency: 0,
                inpatient: 0,
            },
            notes: String::new(),
            reviewer: None,
        }
    }

    #[test]
    fn test_ffi_round_trip() {
        let core = open_desk_in_memory().unwrap();
        core.add_protocol("111".into(), "Unimed".into(), Some("2024-05-10".into()))
            .unwrap();
        core.commit_conference("111".into(), conference(2)).unwrap();

        let protocol = core.get_protocol("111".into()).unwrap().unwrap();
        assert_eq!(protocol.status, "processed");
        assert_eq!(protocol.received_date, "2024-05-10");
        assert_eq!(protocol.quantities.unwrap().outpatient, 2);

        let filter = FfiFilter {
            status: Some("Processed".into()),
            ..FfiFilter::default()
        };
        assert_eq!(core.list_protocols(filter, None).unwrap().len(), 1);
    }

    #[test]
    fn test_ffi_errors() {
        let core = open_desk_in_memory().unwrap();
        assert!(matches!(
            core.add_protocol("111".into(), "Unimed".into(), Some("10/05/2024".into())),
            Err(ProtonError::InvalidInput(_))
        ));
        assert!(matches!(
            core.add_protocol("111".into(), "Unimed".into(), None),
            Err(ProtonError::InvalidInput(_))
        ));
        assert!(matches!(
            core.request_removal("404".into()),
            Err(ProtonError::NotFound(_))
        ));
        assert!(matches!(
            core.restore("{\"version\": \"proton_v1\"}".into()),
            Err(ProtonError::MalformedBackup(_))
        ));
        assert!(matches!(
            core.skip_bulk(),
            Err(ProtonError::WorkflowError(_))
        ));
    }

    #[test]
    fn test_ffi_bulk_and_sort() {
        let core = open_desk_in_memory().unwrap();
        core.add_batch("100\n999\n1000".into(), "Unimed".into(), Some("2024-05-10".into()))
            .unwrap();

        let sorted = core
            .list_protocols(
                FfiFilter::default(),
                Some(FfiSort {
                    column: "id".into(),
                    descending: true,
                }),
            )
            .unwrap();
        let ids: Vec<&str> = sorted.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1000", "999", "100"]);

        let signal = core.start_bulk(vec!["999".into()]).unwrap();
        assert_eq!(
            signal,
            FfiWorkflowSignal::RequestInput {
                id: "999".into(),
                position: 0,
                total: 1
            }
        );
        assert_eq!(
            core.submit_bulk(conference(1)).unwrap(),
            FfiWorkflowSignal::Completed {
                total: 1,
                committed: 1
            }
        );
        assert_eq!(core.recent_activity().unwrap()[0].kind, "conference");
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_ffi_counts_are_not_truncated() {
        let large = u32::MAX as usize + 7;
        assert_eq!(
            FfiWorkflowSignal::from(WorkflowSignal::Completed {
                total: large,
                committed: large,
            }),
            FfiWorkflowSignal::Completed {
                total: u32::MAX as u64 + 7,
                committed: u32::MAX as u64 + 7,
            }
        );

        let core = open_desk_in_memory().unwrap();
        core.add_batch("111\n222".into(), "Unimed".into(), Some("2024-05-10".into()))
            .unwrap();
        let token = core.request_clear().unwrap();
        let cleared: u64 = core.confirm_clear(token).unwrap();
        assert_eq!(cleared, 2);
    }
}
