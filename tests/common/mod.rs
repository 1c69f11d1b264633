//! Shared test fixtures.
#![allow(dead_code)] // not every test binary uses every fixture

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use parking_lot::Mutex;
use serde_json::Value;

use live_results::error::{FetchError, Result};
use live_results::query::Query;
use live_results::source::{ChangeSink, RawChange, ResultSource, SectionChange};

// ============================================================================
// ScriptedSource
// ============================================================================

/// A result source whose notification stream is driven explicitly by the
/// test: mutators apply the change to the current results first, then fire
/// the corresponding sink callback. `begin()` / `end()` bracket a batch.
pub struct ScriptedSource {
    backing: Mutex<Vec<Value>>,
    items: Mutex<Vec<Value>>,
    filter: Mutex<Option<Query>>,
    sink: Mutex<Option<Arc<dyn ChangeSink>>>,
    fail_next_fetch: AtomicBool,
}

impl ScriptedSource {
    pub fn new(backing: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            backing: Mutex::new(backing),
            items: Mutex::new(Vec::new()),
            filter: Mutex::new(None),
            sink: Mutex::new(None),
            fail_next_fetch: AtomicBool::new(false),
        })
    }

    pub fn set_fail_next_fetch(&self) {
        self.fail_next_fetch.store(true, Ordering::SeqCst);
    }

    fn with_sink(&self, f: impl FnOnce(&dyn ChangeSink)) {
        let sink = self.sink.lock().clone();
        if let Some(sink) = sink {
            f(&*sink);
        }
    }

    pub fn begin(&self) {
        self.with_sink(|s| s.will_change());
    }

    pub fn end(&self) {
        self.with_sink(|s| s.did_change());
    }

    pub fn insert_item(&self, index: usize, item: Value) {
        self.items.lock().insert(index, item);
        self.with_sink(|s| s.row_changed(RawChange::Insert { new_index: index }));
    }

    pub fn remove_item(&self, index: usize) {
        self.items.lock().remove(index);
        self.with_sink(|s| s.row_changed(RawChange::Remove { old_index: index }));
    }

    pub fn update_item(&self, index: usize, item: Value) {
        self.items.lock()[index] = item;
        self.with_sink(|s| s.row_changed(RawChange::Update { index }));
    }

    pub fn move_item(&self, old_index: usize, new_index: usize) {
        {
            let mut items = self.items.lock();
            let item = items.remove(old_index);
            items.insert(new_index, item);
        }
        self.with_sink(|s| {
            s.row_changed(RawChange::Move {
                old_index,
                new_index,
            })
        });
    }

    pub fn emit_section(&self, change: SectionChange) {
        self.with_sink(|s| s.section_changed(change));
    }
}

impl ResultSource for ScriptedSource {
    type Item = Value;
    type Filter = Query;

    fn perform_fetch(&self) -> Result<()> {
        if self.fail_next_fetch.swap(false, Ordering::SeqCst) {
            return Err(FetchError::Query("scripted fetch failure".to_string()));
        }
        *self.items.lock() = self.backing.lock().clone();
        Ok(())
    }

    fn results(&self) -> Vec<Value> {
        self.items.lock().clone()
    }

    fn result_at(&self, index: usize) -> Option<Value> {
        self.items.lock().get(index).cloned()
    }

    fn result_count(&self) -> usize {
        self.items.lock().len()
    }

    fn current_filter(&self) -> Option<Query> {
        self.filter.lock().clone()
    }

    fn set_filter(&self, filter: Option<Query>) {
        *self.filter.lock() = filter;
    }

    fn set_sink(&self, sink: Option<Arc<dyn ChangeSink>>) {
        *self.sink.lock() = sink;
    }

    fn sink(&self) -> Option<Arc<dyn ChangeSink>> {
        self.sink.lock().clone()
    }
}

// ============================================================================
// RecordingSink
// ============================================================================

/// Records the native callbacks it receives, for sink-chaining assertions.
#[derive(Default)]
pub struct RecordingSink {
    pub calls: StdMutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ChangeSink for RecordingSink {
    fn will_change(&self) {
        self.calls.lock().unwrap().push("will_change".to_string());
    }

    fn row_changed(&self, change: RawChange) {
        self.calls.lock().unwrap().push(format!("row:{change:?}"));
    }

    fn section_changed(&self, change: SectionChange) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("section:{change:?}"));
    }

    fn did_change(&self) {
        self.calls.lock().unwrap().push("did_change".to_string());
    }
}
