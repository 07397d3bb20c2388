//! End-to-end protocol lifecycle tests through the store, view and bulk workflow.

use chrono::NaiveDate;
use proton_core::models::{ConferenceInput, ProtocolRecord, ProtocolStatus, Quantities};
use proton_core::store::{
    validate, BatchDuplicatePolicy, RecordStore, SharedFields, StoreError, ValidationError,
};
use proton_core::view::{build, FilterCriteria, SortColumn, SortKey, ViewBuilder};
use proton_core::workflow::{BulkConference, BulkState, WorkflowEvent, WorkflowSignal};

fn received() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, 1).unwrap()
}

fn add(store: &mut RecordStore, id: &str) {
    let id = validate(id, store).unwrap().to_string();
    store
        .add(ProtocolRecord::new(id, "Unimed".into(), received()))
        .unwrap();
}

fn one_outpatient() -> ConferenceInput {
    ConferenceInput::new(Quantities::new(1, 0, 0, 0))
}

#[test]
fn test_duplicate_insert_keeps_store_size() {
    let mut store = RecordStore::new();
    add(&mut store, "12345");

    assert_eq!(validate("12345", &store), Err(ValidationError::Duplicate));
    let again = ProtocolRecord::new("12345".into(), "Unimed".into(), received());
    assert_eq!(
        store.add(again),
        Err(StoreError::DuplicateKey("12345".into()))
    );
    assert_eq!(store.len(), 1);
}

#[test]
fn test_commit_then_edit() {
    let mut store = RecordStore::new();
    add(&mut store, "555");

    let zero = ConferenceInput::new(Quantities::new(0, 0, 0, 0));
    assert_eq!(
        store.commit_conference("555", zero),
        Err(StoreError::EmptyQuantities)
    );
    assert_eq!(store.get("555").unwrap().status(), ProtocolStatus::Pending);

    store
        .commit_conference("555", ConferenceInput::new(Quantities::new(2, 0, 0, 0)))
        .unwrap();
    let first_stamp = store.get("555").unwrap().conference().unwrap().conferred_at;

    store
        .edit_conference("555", ConferenceInput::new(Quantities::new(5, 0, 0, 0)))
        .unwrap();
    let record = store.get("555").unwrap();
    assert_eq!(record.status(), ProtocolStatus::Processed);
    assert_eq!(record.conference().unwrap().quantities.outpatient, 5);
    assert!(record.conference().unwrap().conferred_at >= first_stamp);
}

#[test]
fn test_processed_filter_after_one_commit() {
    let mut store = RecordStore::new();
    for id in ["101", "102", "103"] {
        add(&mut store, id);
    }
    store.commit_conference("102", one_outpatient()).unwrap();

    let filter = FilterCriteria {
        status: Some(ProtocolStatus::Processed),
        ..FilterCriteria::default()
    };
    let view = build(store.all(), &filter, None);
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].id(), "102");

    // the view is a fresh projection; the store is untouched
    assert_eq!(store.len(), 3);
}

#[test]
fn test_numeric_sort_descending() {
    let records: Vec<ProtocolRecord> = ["10", "9", "100"]
        .iter()
        .map(|id| ProtocolRecord::new(id.to_string(), "Unimed".into(), received()))
        .collect();

    for builder in [ViewBuilder::new(true), ViewBuilder::new(false)] {
        let view = builder.build(
            &records,
            &FilterCriteria::default(),
            Some(SortKey::descending(SortColumn::Id)),
        );
        let ids: Vec<&str> = view.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["100", "10", "9"]);
    }
}

#[test]
fn test_batch_partial_failure() {
    let mut store = RecordStore::new();
    let shared = SharedFields {
        convenio: "Unimed".into(),
        received_date: received(),
    };

    let outcome = store.add_batch(
        &["111", "abc", "222", "111"],
        &shared,
        BatchDuplicatePolicy::RejectLater,
    );
    assert_eq!(outcome.accepted, vec!["111", "222"]);
    assert_eq!(outcome.rejected.len(), 2);
    assert_eq!(outcome.rejected[0].candidate, "abc");
    assert_eq!(outcome.rejected[0].reason, ValidationError::NonNumeric);
    assert_eq!(outcome.rejected[1].candidate, "111");
    assert_eq!(outcome.rejected[1].reason, ValidationError::Duplicate);
    assert_eq!(store.len(), 2);
}

#[test]
fn test_bulk_cancel_keeps_partial_progress() {
    let mut store = RecordStore::new();
    for id in ["201", "202", "203"] {
        add(&mut store, id);
    }
    let selected: Vec<String> = vec!["201".into(), "202".into(), "203".into()];
    let mut wf = BulkConference::new();

    wf.dispatch(WorkflowEvent::Start(selected.clone()), &mut store)
        .unwrap();
    wf.dispatch(WorkflowEvent::Submit(one_outpatient()), &mut store)
        .unwrap();
    wf.dispatch(WorkflowEvent::Submit(one_outpatient()), &mut store)
        .unwrap();
    assert_eq!(
        wf.dispatch(WorkflowEvent::Cancel, &mut store).unwrap(),
        WorkflowSignal::Cancelled { committed: 2 }
    );

    let processed = store.all().iter().filter(|r| !r.is_pending()).count();
    assert_eq!(processed, 2);
    assert!(store.get("203").unwrap().is_pending());

    let signal = wf
        .dispatch(WorkflowEvent::Start(selected), &mut store)
        .unwrap();
    assert_eq!(
        signal,
        WorkflowSignal::RequestInput {
            id: "203".into(),
            position: 0,
            total: 1
        }
    );
    let signal = wf
        .dispatch(WorkflowEvent::Submit(one_outpatient()), &mut store)
        .unwrap();
    assert_eq!(
        signal,
        WorkflowSignal::Completed {
            total: 1,
            committed: 1
        }
    );
    assert_eq!(
        wf.state(),
        &BulkState::Completed {
            total: 1,
            committed: 1
        }
    );
}

#[test]
fn test_store_events_follow_mutations() {
    let mut store = RecordStore::new();
    add(&mut store, "301");
    store.commit_conference("301", one_outpatient()).unwrap();
    assert!(store.is_dirty());

    let events = store.take_events();
    assert_eq!(events.len(), 2);
    assert!(store.take_events().is_empty());

    store.mark_clean();
    assert_eq!(store.update_identifier("301", " 301 "), Ok(false));
    assert!(!store.is_dirty());
}
