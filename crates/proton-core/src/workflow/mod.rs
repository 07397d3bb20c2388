//! Bulk conference workflow.
//!
//! Walks a queue of pending protocols one at a time:
//!
//! ```text
//!   Idle ──start──▶ AwaitingInput(queue, position) ──submit/skip──▶ AwaitingInput(position + 1)
//!    ▲                    │                                            │ (end of queue)
//!    └──────cancel────────┘                                            ▼
//!                                                                  Completed
//! ```
//!
//! Commits made before a skip or cancel stay committed; nothing is rolled back.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, info};

use crate::models::ConferenceInput;
use crate::store::{RecordStore, StoreError};

/// Workflow errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("A bulk conference is already in progress")]
    AlreadyRunning,

    #[error("No protocol is awaiting input")]
    NotAwaitingInput,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Workflow state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BulkState {
    #[default]
    Idle,
    AwaitingInput {
        queue: Vec<String>,
        position: usize,
        committed: usize,
    },
    /// Terminal for the run; a new start resets it.
    Completed { total: usize, committed: usize },
}

/// Input driving the workflow.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    Start(Vec<String>),
    Submit(ConferenceInput),
    Skip,
    Cancel,
}

/// What the workflow asks of the operator after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowSignal {
    /// Collect a conference for this protocol
    RequestInput {
        id: String,
        position: usize,
        total: usize,
    },
    /// None of the selected protocols were pending
    NothingToDo,
    Completed { total: usize, committed: usize },
    Cancelled { committed: usize },
}

/// Sequential conference over several selected protocols.
#[derive(Debug, Clone, Default)]
pub struct BulkConference {
    state: BulkState,
}

impl BulkConference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &BulkState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, BulkState::AwaitingInput { .. })
    }

    /// Protocol currently awaiting input.
    pub fn current(&self) -> Option<&str> {
        match &self.state {
            BulkState::AwaitingInput { queue, position, .. } => {
                queue.get(*position).map(String::as_str)
            }
            _ => None,
        }
    }

    /// Single entry point for every transition.
    pub fn dispatch(
        &mut self,
        event: WorkflowEvent,
        store: &mut RecordStore,
    ) -> WorkflowResult<WorkflowSignal> {
        match event {
            WorkflowEvent::Start(selected) => self.start(selected.as_slice(), store),
            WorkflowEvent::Submit(input) => self.submit(input, store),
            WorkflowEvent::Skip => self.skip(),
            WorkflowEvent::Cancel => self.cancel(),
        }
    }

    /// Begin a run over the selected protocols that are still pending.
    pub fn start<S: AsRef<str>>(
        &mut self,
        selected: &[S],
        store: &RecordStore,
    ) -> WorkflowResult<WorkflowSignal> {
        if self.is_active() {
            return Err(WorkflowError::AlreadyRunning);
        }

        let mut seen = HashSet::new();
        let queue: Vec<String> = selected
            .iter()
            .map(|s| s.as_ref())
            .filter(|id| store.get(id).map_or(false, |r| r.is_pending()))
            .filter(|id| seen.insert(id.to_string()))
            .map(str::to_string)
            .collect();

        if queue.is_empty() {
            info!("Bulk conference: nothing pending among {} selected", selected.len());
            self.state = BulkState::Completed {
                total: 0,
                committed: 0,
            };
            return Ok(WorkflowSignal::NothingToDo);
        }

        info!("Bulk conference started over {} protocols", queue.len());
        let (state, signal) = advance(queue, 0, 0);
        self.state = state;
        Ok(signal)
    }

    /// Commit the current protocol and move on. On error nothing changes.
    pub fn submit(
        &mut self,
        input: ConferenceInput,
        store: &mut RecordStore,
    ) -> WorkflowResult<WorkflowSignal> {
        let id = self
            .current()
            .ok_or(WorkflowError::NotAwaitingInput)?
            .to_string();
        store.commit_conference(&id, input)?;
        debug!("Bulk conference: committed {}", id);

        match std::mem::take(&mut self.state) {
            BulkState::AwaitingInput {
                queue,
                position,
                committed,
            } => {
                let (state, signal) = advance(queue, position + 1, committed + 1);
                self.state = state;
                Ok(signal)
            }
            other => {
                self.state = other;
                Err(WorkflowError::NotAwaitingInput)
            }
        }
    }

    /// Move past the current protocol without committing it.
    pub fn skip(&mut self) -> WorkflowResult<WorkflowSignal> {
        match std::mem::take(&mut self.state) {
            BulkState::AwaitingInput {
                queue,
                position,
                committed,
            } => {
                debug!("Bulk conference: skipped {}", queue[position]);
                let (state, signal) = advance(queue, position + 1, committed);
                self.state = state;
                Ok(signal)
            }
            other => {
                self.state = other;
                Err(WorkflowError::NotAwaitingInput)
            }
        }
    }

    /// Abandon the run. Earlier commits are kept.
    pub fn cancel(&mut self) -> WorkflowResult<WorkflowSignal> {
        match std::mem::take(&mut self.state) {
            BulkState::AwaitingInput { committed, .. } => {
                info!("Bulk conference cancelled after {} commits", committed);
                Ok(WorkflowSignal::Cancelled { committed })
            }
            other => {
                self.state = other;
                Err(WorkflowError::NotAwaitingInput)
            }
        }
    }
}

/// Next state after moving to `position`.
fn advance(queue: Vec<String>, position: usize, committed: usize) -> (BulkState, WorkflowSignal) {
    let total = queue.len();
    if position < total {
        let signal = WorkflowSignal::RequestInput {
            id: queue[position].clone(),
            position,
            total,
        };
        let state = BulkState::AwaitingInput {
            queue,
            position,
            committed,
        };
        return (state, signal);
    }

    info!("Bulk conference completed: {}/{} committed", committed, total);
    (
        BulkState::Completed { total, committed },
        WorkflowSignal::Completed { total, committed },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProtocolRecord, ProtocolStatus, Quantities};
    use chrono::NaiveDate;

    fn store_with(ids: &[&str]) -> RecordStore {
        let mut store = RecordStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 8, 20).unwrap();
        for id in ids {
            store
                .add(ProtocolRecord::new(id.to_string(), "Unimed".into(), date))
                .unwrap();
        }
        store
    }

    fn input(n: u32) -> ConferenceInput {
        ConferenceInput::new(Quantities::new(n, 0, 0, 0))
    }

    #[test]
    fn test_full_run() {
        let mut store = store_with(&["111", "222"]);
        let mut wf = BulkConference::new();

        let signal = wf.start(&["111", "222"], &store).unwrap();
        assert_eq!(
            signal,
            WorkflowSignal::RequestInput {
                id: "111".into(),
                position: 0,
                total: 2
            }
        );

        wf.submit(input(1), &mut store).unwrap();
        let signal = wf.submit(input(2), &mut store).unwrap();
        assert_eq!(
            signal,
            WorkflowSignal::Completed {
                total: 2,
                committed: 2
            }
        );
        assert!(!wf.is_active());
        assert!(store.all().iter().all(|r| !r.is_pending()));
    }

    #[test]
    fn test_start_filters_non_pending() {
        let mut store = store_with(&["111", "222"]);
        store.commit_conference("111", input(1)).unwrap();
        let mut wf = BulkConference::new();

        let signal = wf.start(&["111", "404", "222", "222"], &store).unwrap();
        assert_eq!(
            signal,
            WorkflowSignal::RequestInput {
                id: "222".into(),
                position: 0,
                total: 1
            }
        );
    }

    #[test]
    fn test_nothing_to_do() {
        let store = store_with(&[]);
        let mut wf = BulkConference::new();
        let signal = wf.start(&["111"], &store).unwrap();
        assert_eq!(signal, WorkflowSignal::NothingToDo);
        assert_eq!(
            wf.state(),
            &BulkState::Completed {
                total: 0,
                committed: 0
            }
        );
    }

    #[test]
    fn test_failed_submit_keeps_position() {
        let mut store = store_with(&["111", "222"]);
        let mut wf = BulkConference::new();
        wf.start(&["111", "222"], &store).unwrap();

        let err = wf.submit(ConferenceInput::default(), &mut store).unwrap_err();
        assert_eq!(err, WorkflowError::Store(StoreError::EmptyQuantities));
        assert_eq!(wf.current(), Some("111"));
        assert_eq!(store.get("111").unwrap().status(), ProtocolStatus::Pending);
    }

    #[test]
    fn test_skip_then_complete() {
        let mut store = store_with(&["111", "222"]);
        let mut wf = BulkConference::new();
        wf.start(&["111", "222"], &store).unwrap();

        wf.skip().unwrap();
        assert_eq!(wf.current(), Some("222"));
        let signal = wf.skip().unwrap();
        assert_eq!(
            signal,
            WorkflowSignal::Completed {
                total: 2,
                committed: 0
            }
        );
        assert!(store.get("111").unwrap().is_pending());
        assert!(wf.submit(input(1), &mut store).is_err());
    }

    #[test]
    fn test_cancel_keeps_earlier_commits() {
        let mut store = store_with(&["111", "222", "333"]);
        let mut wf = BulkConference::new();
        wf.start(&["111", "222", "333"], &store).unwrap();
        wf.submit(input(1), &mut store).unwrap();
        wf.submit(input(1), &mut store).unwrap();

        assert_eq!(wf.cancel().unwrap(), WorkflowSignal::Cancelled { committed: 2 });
        assert_eq!(wf.state(), &BulkState::Idle);

        let pending: Vec<_> = store.all().iter().filter(|r| r.is_pending()).collect();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id(), "333");

        // a fresh run over the remaining protocol
        let signal = wf.start(&["111", "222", "333"], &store).unwrap();
        assert_eq!(
            signal,
            WorkflowSignal::RequestInput {
                id: "333".into(),
                position: 0,
                total: 1
            }
        );
    }

    #[test]
    fn test_start_while_running() {
        let mut store = store_with(&["111"]);
        let mut wf = BulkConference::new();
        wf.dispatch(WorkflowEvent::Start(vec!["111".into()]), &mut store)
            .unwrap();
        assert_eq!(
            wf.dispatch(WorkflowEvent::Start(vec!["111".into()]), &mut store),
            Err(WorkflowError::AlreadyRunning)
        );
        assert_eq!(
            wf.dispatch(WorkflowEvent::Cancel, &mut store),
            Ok(WorkflowSignal::Cancelled { committed: 0 })
        );
        assert_eq!(
            wf.dispatch(WorkflowEvent::Skip, &mut store),
            Err(WorkflowError::NotAwaitingInput)
        );
    }

    #[test]
    fn test_record_removed_mid_run() {
        let mut store = store_with(&["111", "222"]);
        let mut wf = BulkConference::new();
        wf.start(&["111", "222"], &store).unwrap();
        store.remove("111").unwrap();

        let err = wf.submit(input(1), &mut store).unwrap_err();
        assert_eq!(err, WorkflowError::Store(StoreError::NotFound("111".into())));
        assert_eq!(wf.current(), Some("111"));
        wf.skip().unwrap();
        assert_eq!(wf.current(), Some("222"));
    }
}
