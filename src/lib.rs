//! live-results — an observable, read-only array over an external query
//! source.
//!
//! A [`ResultSource`] runs a query and reports per-item changes one at a
//! time between `will_change` / `did_change` brackets. A
//! [`FetchedResultsArray`] attaches to such a source, accumulates each burst
//! of raw changes into a [`ChangeBatch`], and publishes exactly one
//! [`ObservableArrayEvent`] per batch (and one Reset per reload), so
//! observers apply cheap structural edits instead of re-deriving the
//! collection.
//!
//! The whole subsystem is synchronous and pinned to one designated execution
//! context; see the [`adapter`] module docs for the threading and teardown
//! contract.

pub mod adapter;
mod bridge;
pub mod convert;
pub mod error;
pub mod memory;
pub mod query;
pub mod reactive;
pub mod source;

pub use adapter::FetchedResultsArray;
pub use convert::TypedSource;
pub use error::{FetchError, Result};
pub use memory::MemoryResultSource;
pub use query::{Query, SortDirection, SortEntry};
pub use reactive::{
    ArrayOperation, ChangeBatch, EventEmitter, Observable, ObservableArray, ObservableArrayEvent,
    Operation, Unsubscribe,
};
pub use source::{ChangeSink, RawChange, ResultSource, SectionChange};
