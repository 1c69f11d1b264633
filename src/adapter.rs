//! FetchedResultsArray<S> — an observable array over a result source.
//!
//! The adapter owns a live snapshot of the source's ordered results and
//! re-publishes the source's change notifications as consolidated
//! [`ObservableArrayEvent`]s: exactly one Reset per successful
//! [`FetchedResultsArray::reload_data`], exactly one Batch per
//! begin/end notification cycle.
//!
//! # Threading model
//!
//! Single designated execution context: the source must deliver all sink
//! callbacks on the thread the adapter was constructed on, and
//! `reload_data()` / predicate writes must happen there too. There is no
//! true concurrency, only re-entrancy risk, which is guarded by a phase
//! assertion (Idle → Fetching / Batching → Idle).
//!
//! # Teardown
//!
//! [`FetchedResultsArray::close`] must be treated as mandatory: it detaches
//! the bridge from the source (the source holds its sink strongly, so a
//! forgotten detach keeps the bridge alive and the source silently feeding
//! a dead adapter). `Drop` also detaches as a backstop, so every exit path
//! ends detached.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

use parking_lot::Mutex;
use tracing::error;

use crate::bridge::{Dispatcher, NotificationBridge};
use crate::reactive::array::ObservableArray;
use crate::reactive::cell::Observable;
use crate::reactive::emitter::{ListenerId, Unsubscribe};
use crate::reactive::event::{ChangeBatch, ObservableArrayEvent, Operation};
use crate::source::{ChangeSink, ResultSource};

// ============================================================================
// Phase
// ============================================================================

/// Lifecycle phase of the adapter. Transitions away from `Idle` assert the
/// current phase, which catches fetches triggered from inside a notification
/// handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Fetching,
    Batching,
}

// ============================================================================
// Core
// ============================================================================

/// Shared adapter state. The bridge reaches it through a `Weak` so the
/// source → bridge → core chain never forms a strong cycle.
struct Core<S: ResultSource> {
    source: Arc<S>,
    /// Event channel plus the latest published snapshot.
    array: ObservableArray<S::Item>,
    /// Operations accumulated during the current batch.
    batch: Mutex<ChangeBatch<S::Item>>,
    phase: Mutex<Phase>,
    /// Reactive count, recomputed after every publish.
    count: Observable<usize>,
    home: ThreadId,
}

impl<S: ResultSource> Core<S> {
    fn assert_home_thread(&self, call: &str) {
        assert_eq!(
            thread::current().id(),
            self.home,
            "{call} invoked off the designated thread the adapter was built on"
        );
    }

    fn enter(&self, next: Phase) {
        let mut phase = self.phase.lock();
        assert_eq!(
            *phase,
            Phase::Idle,
            "cannot start {next:?} while the adapter is {:?}; \
             fetches must not be triggered from inside a notification handler",
            *phase
        );
        *phase = next;
    }

    fn leave(&self, from: Phase) {
        let mut phase = self.phase.lock();
        assert_eq!(*phase, from, "phase left out of order");
        *phase = Phase::Idle;
    }

    /// Re-execute the query and publish one Reset on success. On failure the
    /// previous snapshot, count, and subscribers are left untouched.
    fn reload(&self) {
        self.assert_home_thread("reload_data");
        self.enter(Phase::Fetching);
        self.source.invalidate_cache();
        match self.source.perform_fetch() {
            Ok(()) => {
                let items = self.source.results();
                // Back to Idle before publishing so observers may legally
                // trigger another reload from their callback.
                self.leave(Phase::Fetching);
                self.count.set(items.len());
                self.array.publish_reset(items);
            }
            Err(e) => {
                self.leave(Phase::Fetching);
                error!(error = %e, "fetch failed; keeping previous results");
            }
        }
    }
}

impl<S: ResultSource> Dispatcher<S::Item> for Core<S> {
    fn begin_batch(&self) {
        // The batch itself was drained at the previous batch end.
        self.enter(Phase::Batching);
    }

    fn append(&self, op: Operation<S::Item>) {
        self.batch.lock().push(op);
    }

    fn item_at(&self, index: usize) -> S::Item {
        self.source.result_at(index).unwrap_or_else(|| {
            panic!("result source reported a change at index {index} outside its current results")
        })
    }

    fn end_batch(&self) {
        self.leave(Phase::Batching);
        let batch = self.batch.lock().take();
        let items = self.source.results();
        self.count.set(items.len());
        self.array.publish_batch(items, batch);
    }
}

// ============================================================================
// FetchedResultsArray
// ============================================================================

/// A read-only observable array backed by an external [`ResultSource`].
///
/// Reads (`len`, `get`, `item_at`, `to_vec`) are always consistent with the
/// source's latest fetch. Structural mutation is not supported — the backing
/// data is owned by the source, and a falsely-mutable facade would silently
/// desynchronize from it — so every mutating entry point panics.
pub struct FetchedResultsArray<S: ResultSource> {
    core: Arc<Core<S>>,
    predicate: Arc<Observable<Option<S::Filter>>>,
    predicate_sub: ListenerId,
    closed: AtomicBool,
}

impl<S: ResultSource> FetchedResultsArray<S> {
    /// Attach to `source` and perform an initial `reload_data()`.
    ///
    /// The adapter installs itself as the source's sole notification sink,
    /// chaining any previously registered sink so existing consumers keep
    /// receiving native callbacks.
    pub fn new(source: Arc<S>) -> Self {
        let this = Self::without_initial_load(source);
        this.reload_data();
        this
    }

    /// Attach to `source` without fetching. The array stays empty until the
    /// first `reload_data()` or predicate change.
    pub fn without_initial_load(source: Arc<S>) -> Self {
        let bridge = Arc::new(NotificationBridge::<S::Item>::new(source.sink()));
        let core = Arc::new(Core {
            source: Arc::clone(&source),
            array: ObservableArray::new(),
            batch: Mutex::new(ChangeBatch::new()),
            phase: Mutex::new(Phase::Idle),
            count: Observable::new(0),
            home: thread::current().id(),
        });
        bridge.set_dispatcher(Arc::downgrade(&core) as Weak<dyn Dispatcher<S::Item>>);
        source.set_sink(Some(bridge as Arc<dyn ChangeSink>));

        let predicate = Arc::new(Observable::new(source.current_filter()));
        let weak_core = Arc::downgrade(&core);
        let predicate_sub = predicate.subscribe(move |filter: &Option<S::Filter>| {
            if let Some(core) = weak_core.upgrade() {
                core.source.set_filter(filter.clone());
                core.reload();
            }
        });

        Self {
            core,
            predicate,
            predicate_sub,
            closed: AtomicBool::new(false),
        }
    }

    // -----------------------------------------------------------------------
    // Fetching
    // -----------------------------------------------------------------------

    /// Invalidate any cached fetch state, re-execute the query, and publish
    /// exactly one Reset event on success. A failed fetch is logged and
    /// leaves the previous snapshot and subscribers unaffected; retry by
    /// calling this again.
    pub fn reload_data(&self) {
        self.core.reload();
    }

    /// The reactive filter. Setting it pushes the new filter into the source
    /// and synchronously reloads — always a full Reset, never a diffed
    /// batch, since a filter change can rearrange the whole set.
    pub fn predicate(&self) -> &Observable<Option<S::Filter>> {
        &self.predicate
    }

    /// Reactive item count, updated after every published event.
    pub fn live_count(&self) -> &Observable<usize> {
        &self.core.count
    }

    /// The source this adapter is attached to.
    pub fn source(&self) -> &Arc<S> {
        &self.core.source
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.core.source.result_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The item at `index`, if in bounds.
    pub fn get(&self, index: usize) -> Option<S::Item> {
        self.core.source.result_at(index)
    }

    /// The item at `index`. Panics if out of bounds.
    pub fn item_at(&self, index: usize) -> S::Item {
        self.get(index).unwrap_or_else(|| {
            panic!(
                "index {index} out of bounds for fetched results of length {}",
                self.len()
            )
        })
    }

    /// A copy of the current result sequence.
    pub fn to_vec(&self) -> Vec<S::Item> {
        self.core.source.results()
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// Register `handler` for change events. The most recent event, if any,
    /// is replayed immediately (replay depth 1).
    pub fn observe(
        &self,
        handler: impl Fn(&ObservableArrayEvent<S::Item>) + Send + Sync + 'static,
    ) -> Unsubscribe {
        self.core.array.observe(handler)
    }

    // -----------------------------------------------------------------------
    // Mutation — unsupported
    // -----------------------------------------------------------------------

    /// Unsupported; panics. Mutate the result source instead.
    pub fn insert(&self, _index: usize, _item: S::Item) -> ! {
        mutation_unsupported()
    }

    /// Unsupported; panics. Mutate the result source instead.
    pub fn remove_at(&self, _index: usize) -> ! {
        mutation_unsupported()
    }

    /// Unsupported; panics. Mutate the result source instead.
    pub fn update_at(&self, _index: usize, _item: S::Item) -> ! {
        mutation_unsupported()
    }

    /// Unsupported; panics. Mutate the result source instead.
    pub fn replace_all(&self, _items: Vec<S::Item>) -> ! {
        mutation_unsupported()
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    /// Detach from the source: the notification sink is set back to `None`
    /// and the predicate subscription is dropped. Idempotent; called
    /// automatically on drop, but calling it explicitly at the end of the
    /// adapter's useful life is the intended discipline.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.predicate.unsubscribe(self.predicate_sub);
        self.core.source.set_sink(None);
    }
}

impl<S: ResultSource> Drop for FetchedResultsArray<S> {
    fn drop(&mut self) {
        self.close();
    }
}

fn mutation_unsupported() -> ! {
    panic!("modifying a fetched results array is not supported; mutate the result source instead")
}
