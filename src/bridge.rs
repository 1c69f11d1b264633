//! NotificationBridge — adapts the source's sink protocol for the adapter.
//!
//! The bridge is installed as the result source's sole [`ChangeSink`]. It
//! translates each [`RawChange`] into batch operations (reading items from
//! the live snapshot via its dispatcher), then forwards the untouched native
//! callback to the sink that was registered before it — a composite of at
//! most two sinks in fixed order, not native multi-subscriber support.
//!
//! Sectioned notifications are not supported: they are logged as a warning
//! and dropped, and the batch continues (lenient mode).

use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

use parking_lot::Mutex;
use tracing::warn;

use crate::reactive::event::Operation;
use crate::source::{ChangeSink, RawChange, SectionChange};

// ============================================================================
// Dispatcher
// ============================================================================

/// The adapter-side surface the bridge drives. Holds the pending batch and
/// the live snapshot reads.
pub(crate) trait Dispatcher<T>: Send + Sync {
    /// A batch is starting; begin accumulating.
    fn begin_batch(&self);

    /// Append one translated operation to the pending batch.
    fn append(&self, op: Operation<T>);

    /// The item currently at `index` in the source's results. The source has
    /// already applied the reported change, so this reads the post-change
    /// sequence.
    fn item_at(&self, index: usize) -> T;

    /// The batch is complete; consolidate and publish.
    fn end_batch(&self);
}

// ============================================================================
// NotificationBridge
// ============================================================================

pub(crate) struct NotificationBridge<T> {
    /// Back-reference to the adapter core. Weak: the source holds this bridge
    /// strongly, and a strong back-reference would form a cycle that `close`
    /// could be forgotten to break.
    dispatcher: Mutex<Option<Weak<dyn Dispatcher<T>>>>,
    /// The sink that was registered on the source before this bridge.
    next: Option<Arc<dyn ChangeSink>>,
    /// The designated execution context. The source guarantees all sink
    /// calls arrive here; anything else would corrupt index accounting.
    home: ThreadId,
}

impl<T> NotificationBridge<T> {
    /// A bridge chaining to `next`, pinned to the calling thread.
    pub(crate) fn new(next: Option<Arc<dyn ChangeSink>>) -> Self {
        Self {
            dispatcher: Mutex::new(None),
            next,
            home: thread::current().id(),
        }
    }

    /// Attach the adapter core. Two-phase because the core is allocated
    /// after the bridge.
    pub(crate) fn set_dispatcher(&self, dispatcher: Weak<dyn Dispatcher<T>>) {
        *self.dispatcher.lock() = Some(dispatcher);
    }

    fn dispatcher(&self) -> Option<Arc<dyn Dispatcher<T>>> {
        self.dispatcher.lock().as_ref().and_then(Weak::upgrade)
    }

    fn assert_home_thread(&self, call: &str) {
        assert_eq!(
            thread::current().id(),
            self.home,
            "{call} arrived off the designated thread; \
             change notifications must stay on the thread the adapter was built on"
        );
    }
}

impl<T: Clone + Send + Sync + 'static> ChangeSink for NotificationBridge<T> {
    fn will_change(&self) {
        self.assert_home_thread("will_change");
        if let Some(dispatcher) = self.dispatcher() {
            dispatcher.begin_batch();
        }
        if let Some(next) = &self.next {
            next.will_change();
        }
    }

    fn row_changed(&self, change: RawChange) {
        self.assert_home_thread("row_changed");
        if let Some(dispatcher) = self.dispatcher() {
            match change {
                RawChange::Insert { new_index } => {
                    dispatcher.append(Operation::Insert {
                        items: vec![dispatcher.item_at(new_index)],
                        at: new_index,
                    });
                }
                RawChange::Remove { old_index } => {
                    dispatcher.append(remove_operation(old_index));
                }
                RawChange::Update { index } => {
                    dispatcher.append(Operation::Update {
                        items: vec![dispatcher.item_at(index)],
                        at: index,
                    });
                }
                // No native move operation exists at this level: record the
                // insert, then the remove, in that fixed order.
                RawChange::Move {
                    old_index,
                    new_index,
                } => {
                    dispatcher.append(Operation::Insert {
                        items: vec![dispatcher.item_at(new_index)],
                        at: new_index,
                    });
                    dispatcher.append(remove_operation(old_index));
                }
            }
        }
        if let Some(next) = &self.next {
            next.row_changed(change);
        }
    }

    fn section_changed(&self, change: SectionChange) {
        self.assert_home_thread("section_changed");
        warn!(
            ?change,
            "sectioned results are not supported; dropping section change"
        );
        if let Some(next) = &self.next {
            next.section_changed(change);
        }
    }

    fn did_change(&self) {
        self.assert_home_thread("did_change");
        if let Some(dispatcher) = self.dispatcher() {
            dispatcher.end_batch();
        }
        if let Some(next) = &self.next {
            next.did_change();
        }
    }
}

/// The removal range for a single-item removal at `index`.
///
/// This keeps the source's half-open `index-1 .. index` convention
/// (saturating at zero) rather than the naive `index .. index+1`. Consumers
/// of this protocol address removals one below the reported index; the
/// convention is pinned by a property test.
pub(crate) fn remove_operation<T>(index: usize) -> Operation<T> {
    Operation::Remove {
        range: index.saturating_sub(1)..index,
    }
}
