//! Tests for the `ObservableArray<T>` primitive.

use live_results::reactive::{ArrayOperation, ObservableArray, ObservableArrayEvent, Operation};
use std::sync::{Arc, Mutex};

type Events = Arc<Mutex<Vec<ObservableArrayEvent<i32>>>>;

fn observe_all(array: &ObservableArray<i32>) -> Events {
    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = Arc::clone(&events);
    // Leak the unsubscribe closure; the array outlives every test body.
    let _unsub = array.observe(move |e| events_clone.lock().unwrap().push(e.clone()));
    std::mem::forget(_unsub);
    events
}

// ============================================================================
// Reads
// ============================================================================

#[test]
fn from_vec_exposes_contents() {
    let array = ObservableArray::from_vec(vec![10, 20, 30]);
    assert_eq!(array.len(), 3);
    assert!(!array.is_empty());
    assert_eq!(array.get(1), Some(20));
    assert_eq!(array.get(3), None);
    assert_eq!(array.item_at(2), 30);
    assert_eq!(array.to_vec(), vec![10, 20, 30]);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn item_at_panics_out_of_bounds() {
    let array = ObservableArray::from_vec(vec![1]);
    array.item_at(1);
}

#[test]
fn initial_value_publishes_no_event() {
    let array = ObservableArray::from_vec(vec![1, 2]);
    let events = observe_all(&array);
    assert!(events.lock().unwrap().is_empty());
}

// ============================================================================
// Structural edits
// ============================================================================

#[test]
fn insert_publishes_single_operation_batch() {
    let array = ObservableArray::from_vec(vec![1, 3]);
    let events = observe_all(&array);

    array.insert(1, 2);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].sequence, vec![1, 2, 3]);
    match &events[0].operation {
        ArrayOperation::Batch(batch) => {
            assert_eq!(
                batch.operations(),
                &[Operation::Insert {
                    items: vec![2],
                    at: 1
                }]
            );
        }
        other => panic!("expected Batch, got {other:?}"),
    }
}

#[test]
fn remove_at_publishes_removal_and_returns_item() {
    let array = ObservableArray::from_vec(vec![1, 2, 3]);
    let events = observe_all(&array);

    let removed = array.remove_at(1);

    assert_eq!(removed, 2);
    assert_eq!(array.to_vec(), vec![1, 3]);
    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    match &events[0].operation {
        ArrayOperation::Batch(batch) => {
            assert_eq!(batch.operations(), &[Operation::Remove { range: 1..2 }]);
        }
        other => panic!("expected Batch, got {other:?}"),
    }
}

#[test]
fn update_at_publishes_update() {
    let array = ObservableArray::from_vec(vec![1, 2]);
    let events = observe_all(&array);

    array.update_at(0, 9);

    assert_eq!(array.to_vec(), vec![9, 2]);
    let events = events.lock().unwrap();
    match &events[0].operation {
        ArrayOperation::Batch(batch) => {
            assert_eq!(
                batch.operations(),
                &[Operation::Update {
                    items: vec![9],
                    at: 0
                }]
            );
        }
        other => panic!("expected Batch, got {other:?}"),
    }
}

#[test]
fn replace_all_publishes_reset() {
    let array = ObservableArray::from_vec(vec![1]);
    let events = observe_all(&array);

    array.replace_all(vec![7, 8]);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].sequence, vec![7, 8]);
    assert_eq!(events[0].operation, ArrayOperation::Reset(vec![7, 8]));
}

#[test]
#[should_panic(expected = "out of bounds")]
fn insert_past_end_panics() {
    let array = ObservableArray::from_vec(vec![1]);
    array.insert(5, 2);
}

// ============================================================================
// Replay
// ============================================================================

#[test]
fn observe_replays_latest_event_to_late_subscriber() {
    let array = ObservableArray::from_vec(vec![1]);
    array.insert(1, 2);
    array.replace_all(vec![5, 6]);

    let events = observe_all(&array);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1, "only the latest event is replayed");
    assert_eq!(events[0].operation, ArrayOperation::Reset(vec![5, 6]));
}

#[test]
fn unsubscribe_stops_delivery() {
    let array = ObservableArray::from_vec(vec![1]);
    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = Arc::clone(&events);
    let unsub = array.observe(move |e| events_clone.lock().unwrap().push(e.clone()));

    array.insert(0, 0);
    unsub();
    array.insert(0, 9);

    assert_eq!(events.lock().unwrap().len(), 1);
}
