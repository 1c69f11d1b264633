//! Observable<T> — a single reactive value.
//!
//! Used for the adapter's predicate and live count. `set` stores the new
//! value and then notifies subscribers synchronously with the value lock
//! already released, so a subscriber may read or even re-set the cell.

use parking_lot::Mutex;

use super::emitter::{EventEmitter, ListenerId};

/// A reactive single-value cell with synchronous change notification.
pub struct Observable<T> {
    value: Mutex<T>,
    emitter: EventEmitter<T>,
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
    /// Create a cell holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
            emitter: EventEmitter::new(),
        }
    }

    /// The current value.
    pub fn get(&self) -> T {
        self.value.lock().clone()
    }

    /// Replace the value and notify subscribers with the new value.
    pub fn set(&self, value: T) {
        *self.value.lock() = value.clone();
        self.emitter.emit(value);
    }

    /// Register `callback` to observe every subsequent `set`. The current
    /// value is not replayed; use [`Observable::get`] for the initial read.
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> ListenerId {
        self.emitter.on(callback)
    }

    /// Remove a subscription registered with [`Observable::subscribe`].
    pub fn unsubscribe(&self, id: ListenerId) {
        self.emitter.off(id);
    }
}
