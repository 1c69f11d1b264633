//! EventEmitter<T> — a typed pub/sub primitive with optional replay.
//!
//! Listeners are stored as `Arc<dyn Fn(&T)>` so snapshots are cheap.
//! Snapshot-on-emit semantics mean:
//!   - A listener removed *during* emission is still called in that round.
//!   - A listener added *during* emission is NOT called until the next emit.
//!
//! The emitter keeps the most recently emitted event so that
//! [`EventEmitter::on_replay`] can deliver it to a late subscriber before any
//! new event (replay depth 1).
//!
//! All methods take `&self` (interior mutability via `parking_lot::Mutex`);
//! no lock is held while listeners run, so listeners can call `on()`/`off()`
//! from inside a callback without deadlocking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// A listener ID returned by [`EventEmitter::on`] that can be passed to
/// [`EventEmitter::off`] to remove the listener.
pub type ListenerId = u64;

/// Closure type for event listeners.
pub type ListenerFn<T> = dyn Fn(&T) + Send + Sync;

/// An owned one-shot closure that removes a subscription when called.
pub type Unsubscribe = Box<dyn FnOnce() + Send + Sync>;

/// Typed synchronous event emitter with replay depth 1.
pub struct EventEmitter<T> {
    listeners: Mutex<Vec<(ListenerId, Arc<ListenerFn<T>>)>>,
    last: Mutex<Option<T>>,
    next_id: AtomicU64,
}

impl<T: Clone> EventEmitter<T> {
    /// Create a new, empty emitter with no retained event.
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            last: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register `callback` and return its [`ListenerId`].
    pub fn on(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push((id, Arc::new(callback)));
        id
    }

    /// Register `callback` and immediately replay the most recent event to
    /// it, if one has been emitted. The replay happens before the callback
    /// can observe any subsequent event.
    pub fn on_replay(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> ListenerId {
        let callback = Arc::new(callback);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push((id, Arc::clone(&callback) as Arc<ListenerFn<T>>));
        // Clone out of the lock before calling back.
        let replay = self.last.lock().clone();
        if let Some(event) = replay {
            callback(&event);
        }
        id
    }

    /// Remove the listener identified by `id`.
    ///
    /// Does nothing if `id` is not present (safe to call multiple times).
    pub fn off(&self, id: ListenerId) {
        self.listeners.lock().retain(|(lid, _)| *lid != id);
    }

    /// Emit `event` to all currently registered listeners and retain it for
    /// replay.
    ///
    /// A snapshot of the listener list is taken before iteration so that
    /// additions or removals during a callback do not affect the current
    /// emission round. No lock is held while callbacks run.
    pub fn emit(&self, event: T) {
        *self.last.lock() = Some(event.clone());
        let snapshot: Vec<Arc<ListenerFn<T>>> = {
            let guard = self.listeners.lock();
            guard.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };
        for cb in snapshot {
            cb(&event);
        }
    }

    /// The most recently emitted event, if any.
    pub fn last(&self) -> Option<T> {
        self.last.lock().clone()
    }

    /// Number of currently registered listeners.
    pub fn size(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl<T: Clone> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}
