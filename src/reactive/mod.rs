//! Reactive primitives — events, emitters, cells, and the observable array.
//!
//! # Modules
//!
//! - [`event`] — [`Operation`], [`ChangeBatch`], [`ObservableArrayEvent`].
//! - [`emitter`] — typed pub/sub with replay depth 1 ([`EventEmitter<T>`]).
//! - [`cell`] — single reactive value ([`Observable<T>`]).
//! - [`array`] — reactive ordered container ([`ObservableArray<T>`]).

pub mod array;
pub mod cell;
pub mod emitter;
pub mod event;

pub use array::ObservableArray;
pub use cell::Observable;
pub use emitter::{EventEmitter, ListenerId, Unsubscribe};
pub use event::{ArrayOperation, ChangeBatch, ObservableArrayEvent, Operation};
