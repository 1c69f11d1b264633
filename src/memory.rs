//! MemoryResultSource — an in-process result source over JSON records.
//!
//! Fetching applies the configured [`Query`] (filter, sort, pagination) to
//! the backing record set and materializes the result view. Mutators apply
//! their change to the view first and notify the sink afterwards, so sink
//! handlers reading back through [`ResultSource::result_at`] observe the
//! post-change sequence — the contract the adapter relies on.
//!
//! Each mutator emits one bracketed batch on its own;
//! [`MemoryResultSource::begin_updates`] / [`MemoryResultSource::end_updates`]
//! group several mutations into a single batch.
//!
//! Sort and pagination are honored at fetch time only: a `push` appends a
//! matching record to the end of the view rather than re-sorting it. The
//! next fetch rebuilds the view in query order.
//!
//! No lock is held while the sink runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::error::Result;
use crate::query::Query;
use crate::source::{ChangeSink, RawChange, ResultSource, SectionChange};

/// An in-memory [`ResultSource`] with `serde_json::Value` items and a
/// [`Query`] filter.
pub struct MemoryResultSource {
    /// Unfiltered backing set in insertion order.
    records: Mutex<Vec<Value>>,
    /// The fetched result view. Empty before the first fetch.
    view: Mutex<Vec<Value>>,
    query: Mutex<Option<Query>>,
    sink: Mutex<Option<Arc<dyn ChangeSink>>>,
    /// Nesting depth of explicit update groups.
    depth: AtomicUsize,
}

impl MemoryResultSource {
    /// A source over `records` with no filter.
    pub fn new(records: Vec<Value>) -> Self {
        Self {
            records: Mutex::new(records),
            view: Mutex::new(Vec::new()),
            query: Mutex::new(None),
            sink: Mutex::new(None),
            depth: AtomicUsize::new(0),
        }
    }

    fn with_sink(&self, f: impl FnOnce(&dyn ChangeSink)) {
        let sink = self.sink.lock().clone();
        if let Some(sink) = sink {
            f(&*sink);
        }
    }

    /// Open an update group. The first (outermost) call emits `will_change`.
    pub fn begin_updates(&self) {
        if self.depth.fetch_add(1, Ordering::SeqCst) == 0 {
            self.with_sink(|s| s.will_change());
        }
    }

    /// Close an update group. The last (outermost) call emits `did_change`.
    pub fn end_updates(&self) {
        let prev = self.depth.fetch_sub(1, Ordering::SeqCst);
        assert!(prev > 0, "end_updates without a matching begin_updates");
        if prev == 1 {
            self.with_sink(|s| s.did_change());
        }
    }

    /// Add a record. If it satisfies the current filter it is appended to
    /// the view and reported as an insert at the new last index.
    pub fn push(&self, record: Value) {
        self.begin_updates();
        self.records.lock().push(record.clone());
        let inserted_at = {
            let query = self.query.lock().clone();
            let matches = query.as_ref().map_or(true, |q| q.matches(&record));
            if matches {
                let mut view = self.view.lock();
                view.push(record);
                Some(view.len() - 1)
            } else {
                None
            }
        };
        if let Some(new_index) = inserted_at {
            self.with_sink(|s| s.row_changed(RawChange::Insert { new_index }));
        }
        self.end_updates();
    }

    /// Remove the view item at `index` (and its backing record), reporting a
    /// removal at that index. Panics if out of bounds.
    pub fn remove_at(&self, index: usize) -> Value {
        self.begin_updates();
        let removed = {
            let mut view = self.view.lock();
            assert!(index < view.len(), "remove_at index {index} out of bounds");
            let removed = view.remove(index);
            let mut records = self.records.lock();
            if let Some(pos) = records.iter().position(|r| *r == removed) {
                records.remove(pos);
            }
            removed
        };
        self.with_sink(|s| s.row_changed(RawChange::Remove { old_index: index }));
        self.end_updates();
        removed
    }

    /// Replace the view item at `index`, reporting an in-place update.
    /// Panics if out of bounds.
    pub fn update_at(&self, index: usize, record: Value) {
        self.begin_updates();
        {
            let mut view = self.view.lock();
            assert!(index < view.len(), "update_at index {index} out of bounds");
            let old = std::mem::replace(&mut view[index], record.clone());
            let mut records = self.records.lock();
            if let Some(pos) = records.iter().position(|r| *r == old) {
                records[pos] = record;
            }
        }
        self.with_sink(|s| s.row_changed(RawChange::Update { index }));
        self.end_updates();
    }

    /// Move the view item at `old_index` to `new_index`, reporting a move.
    /// Panics if either index is out of bounds.
    pub fn move_to(&self, old_index: usize, new_index: usize) {
        self.begin_updates();
        {
            let mut view = self.view.lock();
            assert!(
                old_index < view.len() && new_index < view.len(),
                "move_to indices ({old_index}, {new_index}) out of bounds"
            );
            let item = view.remove(old_index);
            view.insert(new_index, item);
        }
        self.with_sink(|s| {
            s.row_changed(RawChange::Move {
                old_index,
                new_index,
            })
        });
        self.end_updates();
    }

    /// Report a sectioned change to the sink. Sections carry no data in this
    /// source; this exists so consumers can exercise their unsupported-input
    /// handling.
    pub fn emit_section_change(&self, change: SectionChange) {
        self.begin_updates();
        self.with_sink(|s| s.section_changed(change));
        self.end_updates();
    }
}

impl ResultSource for MemoryResultSource {
    type Item = Value;
    type Filter = Query;

    fn perform_fetch(&self) -> Result<()> {
        let records = self.records.lock().clone();
        let query = self.query.lock().clone();
        let view = match &query {
            Some(q) => q.apply(&records),
            None => records,
        };
        *self.view.lock() = view;
        Ok(())
    }

    fn results(&self) -> Vec<Value> {
        self.view.lock().clone()
    }

    fn result_at(&self, index: usize) -> Option<Value> {
        self.view.lock().get(index).cloned()
    }

    fn result_count(&self) -> usize {
        self.view.lock().len()
    }

    fn current_filter(&self) -> Option<Query> {
        self.query.lock().clone()
    }

    fn set_filter(&self, filter: Option<Query>) {
        *self.query.lock() = filter;
    }

    fn set_sink(&self, sink: Option<Arc<dyn ChangeSink>>) {
        *self.sink.lock() = sink;
    }

    fn sink(&self) -> Option<Arc<dyn ChangeSink>> {
        self.sink.lock().clone()
    }
}

// ============================================================================
// Tests
// ============================================================================
