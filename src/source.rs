//! Boundary traits for the external fetch/query engine.
//!
//! A [`ResultSource`] knows how to run a query and re-evaluate it; this crate
//! never re-implements that. The source reports changes one at a time through
//! a single registered [`ChangeSink`], bracketed by `will_change` /
//! `did_change`, with every index valid *at the moment the change is
//! reported*. The source must have already applied a change internally by the
//! time it notifies, so `result_at` reads observe the post-change sequence.

use std::sync::Arc;

use crate::error::Result;

// ============================================================================
// RawChange / SectionChange
// ============================================================================

/// One per-item change reported by a result source, addressed by position.
///
/// Indices are zero-based and valid at receipt time, before any other change
/// in the same batch is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawChange {
    /// An item appeared at `new_index`.
    Insert { new_index: usize },
    /// The item previously at `old_index` disappeared.
    Remove { old_index: usize },
    /// The item at `index` changed in place.
    Update { index: usize },
    /// The item moved from `old_index` to `new_index`.
    Move { old_index: usize, new_index: usize },
}

/// A sectioned-results change. Sections are unsupported by this crate; these
/// notifications are dropped with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionChange {
    Insert { index: usize },
    Remove { index: usize },
}

// ============================================================================
// ChangeSink
// ============================================================================

/// The source's native notification protocol.
///
/// A source supports exactly one registered sink. Consumers that need to
/// preserve a previously registered sink must forward to it explicitly (see
/// `NotificationBridge`). All calls happen on the source's designated
/// execution context; one logical batch is `will_change`, zero or more
/// `row_changed` / `section_changed` calls, then `did_change`.
pub trait ChangeSink: Send + Sync {
    /// One batch of changes is about to be reported.
    fn will_change(&self);

    /// One per-item change, already applied inside the source.
    fn row_changed(&self, change: RawChange);

    /// One per-section change. Implementations that do not support sections
    /// must at minimum warn rather than corrupt index accounting.
    fn section_changed(&self, change: SectionChange);

    /// The current batch is complete.
    fn did_change(&self);
}

// ============================================================================
// ResultSource
// ============================================================================

/// An external query/fetch engine producing an ordered, filterable sequence.
///
/// All methods take `&self`; implementations use interior mutability and must
/// release their own locks before invoking the sink, since sink handlers read
/// back through [`ResultSource::result_at`].
pub trait ResultSource: Send + Sync + 'static {
    /// The record type this source produces.
    type Item: Clone + Send + Sync + 'static;
    /// The filter expression this source understands.
    type Filter: Clone + Send + Sync + 'static;

    /// Execute (or re-execute) the query. On success the results are
    /// observable through [`ResultSource::results`]; on failure the previous
    /// results must remain intact.
    fn perform_fetch(&self) -> Result<()>;

    /// The current ordered result sequence. Empty before the first fetch.
    fn results(&self) -> Vec<Self::Item>;

    /// The item at `index` in the current results, if in bounds.
    fn result_at(&self, index: usize) -> Option<Self::Item> {
        self.results().into_iter().nth(index)
    }

    /// Number of items in the current results.
    fn result_count(&self) -> usize {
        self.results().len()
    }

    /// The currently configured filter.
    fn current_filter(&self) -> Option<Self::Filter>;

    /// Replace the filter. Takes effect on the next fetch.
    fn set_filter(&self, filter: Option<Self::Filter>);

    /// Install (or clear) the sole notification sink.
    fn set_sink(&self, sink: Option<Arc<dyn ChangeSink>>);

    /// The currently registered sink, if any.
    fn sink(&self) -> Option<Arc<dyn ChangeSink>>;

    /// Discard any cached fetch state so the next fetch re-runs the query
    /// from scratch. Default: no-op.
    fn invalidate_cache(&self) {}
}
