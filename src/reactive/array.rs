//! ObservableArray<T> — a reactive ordered container.
//!
//! Holds a current sequence and publishes one [`ObservableArrayEvent`] per
//! structural edit. Subscribers registered through [`ObservableArray::observe`]
//! immediately receive the most recent event (replay depth 1) and then every
//! subsequent event in publish order.
//!
//! The items lock is always released before an event is emitted, so observer
//! callbacks may read the array.

use std::sync::Arc;

use parking_lot::Mutex;

use super::emitter::{EventEmitter, Unsubscribe};
use super::event::{ChangeBatch, ObservableArrayEvent, Operation};

/// Generic reactive ordered collection.
pub struct ObservableArray<T> {
    items: Mutex<Vec<T>>,
    emitter: Arc<EventEmitter<ObservableArrayEvent<T>>>,
}

impl<T: Clone + Send + Sync + 'static> ObservableArray<T> {
    /// An empty array.
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// An array holding `items`. No event is published for the initial value.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items: Mutex::new(items),
            emitter: Arc::new(EventEmitter::new()),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// The item at `index`, if in bounds.
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.lock().get(index).cloned()
    }

    /// The item at `index`. Panics if out of bounds.
    pub fn item_at(&self, index: usize) -> T {
        let items = self.items.lock();
        match items.get(index) {
            Some(item) => item.clone(),
            None => panic!(
                "index {index} out of bounds for observable array of length {}",
                items.len()
            ),
        }
    }

    /// A copy of the current sequence.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.lock().clone()
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// Register `handler` for change events. The most recent event, if any,
    /// is replayed to the handler before this call returns.
    ///
    /// Returns an [`Unsubscribe`] closure that removes the subscription.
    pub fn observe(
        &self,
        handler: impl Fn(&ObservableArrayEvent<T>) + Send + Sync + 'static,
    ) -> Unsubscribe {
        let id = self.emitter.on_replay(handler);
        let emitter = Arc::clone(&self.emitter);
        Box::new(move || emitter.off(id))
    }

    // -----------------------------------------------------------------------
    // Structural edits
    // -----------------------------------------------------------------------

    /// Insert `item` at `index`, publishing a single-operation Batch event.
    pub fn insert(&self, index: usize, item: T) {
        let sequence = {
            let mut items = self.items.lock();
            assert!(
                index <= items.len(),
                "insert index {index} out of bounds for length {}",
                items.len()
            );
            items.insert(index, item.clone());
            items.clone()
        };
        let mut batch = ChangeBatch::new();
        batch.push(Operation::Insert {
            items: vec![item],
            at: index,
        });
        self.emitter.emit(ObservableArrayEvent::batch(sequence, batch));
    }

    /// Remove and return the item at `index`, publishing a single-operation
    /// Batch event. Panics if out of bounds.
    pub fn remove_at(&self, index: usize) -> T {
        let (removed, sequence) = {
            let mut items = self.items.lock();
            assert!(
                index < items.len(),
                "remove index {index} out of bounds for length {}",
                items.len()
            );
            let removed = items.remove(index);
            (removed, items.clone())
        };
        let mut batch = ChangeBatch::new();
        batch.push(Operation::Remove {
            range: index..index + 1,
        });
        self.emitter.emit(ObservableArrayEvent::batch(sequence, batch));
        removed
    }

    /// Replace the item at `index`, publishing a single-operation Batch
    /// event. Panics if out of bounds.
    pub fn update_at(&self, index: usize, item: T) {
        let sequence = {
            let mut items = self.items.lock();
            assert!(
                index < items.len(),
                "update index {index} out of bounds for length {}",
                items.len()
            );
            items[index] = item.clone();
            items.clone()
        };
        let mut batch = ChangeBatch::new();
        batch.push(Operation::Update {
            items: vec![item],
            at: index,
        });
        self.emitter.emit(ObservableArrayEvent::batch(sequence, batch));
    }

    /// Replace the whole sequence, publishing a Reset event.
    pub fn replace_all(&self, new_items: Vec<T>) {
        *self.items.lock() = new_items.clone();
        self.emitter.emit(ObservableArrayEvent::reset(new_items));
    }

    // -----------------------------------------------------------------------
    // Adapter entry points
    // -----------------------------------------------------------------------

    /// Replace the sequence and publish a Reset. Used by adapters that own
    /// the backing data elsewhere.
    pub(crate) fn publish_reset(&self, new_items: Vec<T>) {
        self.replace_all(new_items);
    }

    /// Replace the sequence and publish a consolidated Batch event.
    ///
    /// `new_items` must already reflect every operation in `batch`; this
    /// array does not re-apply the operations.
    pub(crate) fn publish_batch(&self, new_items: Vec<T>, batch: ChangeBatch<T>) {
        *self.items.lock() = new_items.clone();
        self.emitter.emit(ObservableArrayEvent::batch(new_items, batch));
    }
}

impl<T: Clone + Send + Sync + 'static> Default for ObservableArray<T> {
    fn default() -> Self {
        Self::new()
    }
}
