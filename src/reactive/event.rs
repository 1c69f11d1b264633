//! Structural change events published by observable arrays.
//!
//! A [`ChangeBatch`] is the ordered sequence of atomic edits accumulated
//! during one notification cycle; an [`ObservableArrayEvent`] is the unit
//! delivered to observers — the full new sequence plus either a wholesale
//! [`ArrayOperation::Reset`] or a consolidated [`ArrayOperation::Batch`].

use std::ops::Range;

// ============================================================================
// Operation
// ============================================================================

/// One atomic structural edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation<T> {
    /// `items` were inserted starting at index `at`.
    Insert { items: Vec<T>, at: usize },
    /// The items in `range` were removed.
    Remove { range: Range<usize> },
    /// The items starting at index `at` were replaced by `items`.
    Update { items: Vec<T>, at: usize },
}

// ============================================================================
// ChangeBatch
// ============================================================================

/// An ordered sequence of [`Operation`]s from one notification cycle.
///
/// Operations are appended in the exact order raw changes were received and
/// the batch is consumed whole at batch end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeBatch<T> {
    ops: Vec<Operation<T>>,
}

impl<T> ChangeBatch<T> {
    /// An empty batch.
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Append one operation, preserving arrival order.
    pub fn push(&mut self, op: Operation<T>) {
        self.ops.push(op);
    }

    /// The accumulated operations in arrival order.
    pub fn operations(&self) -> &[Operation<T>] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Drain this batch, leaving it empty for the next cycle.
    pub fn take(&mut self) -> ChangeBatch<T> {
        ChangeBatch {
            ops: std::mem::take(&mut self.ops),
        }
    }
}

impl<T> Default for ChangeBatch<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<Operation<T>>> for ChangeBatch<T> {
    fn from(ops: Vec<Operation<T>>) -> Self {
        Self { ops }
    }
}

impl<T> IntoIterator for ChangeBatch<T> {
    type Item = Operation<T>;
    type IntoIter = std::vec::IntoIter<Operation<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

// ============================================================================
// ObservableArrayEvent
// ============================================================================

/// How the sequence changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayOperation<T> {
    /// The entire sequence was replaced.
    Reset(Vec<T>),
    /// The sequence was edited by the contained batch of operations.
    Batch(ChangeBatch<T>),
}

/// The unit published to observers: the full sequence after the change, plus
/// the change itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableArrayEvent<T> {
    /// The complete sequence as of this event.
    pub sequence: Vec<T>,
    /// What happened.
    pub operation: ArrayOperation<T>,
}

impl<T: Clone> ObservableArrayEvent<T> {
    /// A Reset event carrying `sequence` as both snapshot and operation.
    pub fn reset(sequence: Vec<T>) -> Self {
        Self {
            operation: ArrayOperation::Reset(sequence.clone()),
            sequence,
        }
    }

    /// A Batch event.
    pub fn batch(sequence: Vec<T>, batch: ChangeBatch<T>) -> Self {
        Self {
            sequence,
            operation: ArrayOperation::Batch(batch),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
