//! TypedSource — a typed view over an untyped result source.
//!
//! Sources whose boundary is untyped (items are `serde_json::Value`) can be
//! wrapped so the adapter works with a concrete record type. Records are
//! converted with `serde_json::from_value` during `perform_fetch`, and a
//! record that fails to deserialize surfaces as
//! [`FetchError::Conversion`](crate::error::FetchError::Conversion) — the
//! fetch fails cleanly instead of an unchecked cast blowing up later.
//!
//! Reads re-convert from the inner source so they stay consistent with it
//! between fetches. A record that deserialized during the fetch but fails
//! during a later read means the source mutated it to an ill-typed shape —
//! a contract violation, reported as a panic.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{FetchError, Result};
use crate::source::{ChangeSink, ResultSource};

/// A [`ResultSource`] adapter converting `Value` records to `T`.
pub struct TypedSource<S, T> {
    inner: S,
    _marker: PhantomData<fn() -> T>,
}

impl<S, T> TypedSource<S, T>
where
    S: ResultSource<Item = Value>,
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// The wrapped untyped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn convert(record: Value, index: usize) -> Result<T> {
        serde_json::from_value(record).map_err(|e| FetchError::Conversion {
            index,
            source: Box::new(e),
        })
    }
}

impl<S, T> ResultSource for TypedSource<S, T>
where
    S: ResultSource<Item = Value>,
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Item = T;
    type Filter = S::Filter;

    /// Fetch through the inner source, then validate that every fetched
    /// record deserializes to `T`.
    fn perform_fetch(&self) -> Result<()> {
        self.inner.perform_fetch()?;
        for (index, record) in self.inner.results().into_iter().enumerate() {
            Self::convert(record, index)?;
        }
        Ok(())
    }

    fn results(&self) -> Vec<T> {
        self.inner
            .results()
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                Self::convert(record, index).unwrap_or_else(|e| {
                    panic!("source produced a record that no longer deserializes: {e}")
                })
            })
            .collect()
    }

    fn result_at(&self, index: usize) -> Option<T> {
        self.inner.result_at(index).map(|record| {
            Self::convert(record, index).unwrap_or_else(|e| {
                panic!("source produced a record that no longer deserializes: {e}")
            })
        })
    }

    fn result_count(&self) -> usize {
        self.inner.result_count()
    }

    fn current_filter(&self) -> Option<Self::Filter> {
        self.inner.current_filter()
    }

    fn set_filter(&self, filter: Option<Self::Filter>) {
        self.inner.set_filter(filter);
    }

    fn set_sink(&self, sink: Option<Arc<dyn ChangeSink>>) {
        self.inner.set_sink(sink);
    }

    fn sink(&self) -> Option<Arc<dyn ChangeSink>> {
        self.inner.sink()
    }

    fn invalidate_cache(&self) {
        self.inner.invalidate_cache();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryResultSource;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct User {
        name: String,
        age: u32,
    }

    #[test]
    fn fetch_converts_well_typed_records() {
        let inner = MemoryResultSource::new(vec![
            json!({ "name": "a", "age": 1 }),
            json!({ "name": "b", "age": 2 }),
        ]);
        let source: TypedSource<_, User> = TypedSource::new(inner);
        source.perform_fetch().unwrap();

        let users = source.results();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name, "a");
        assert_eq!(
            source.result_at(1),
            Some(User {
                name: "b".to_string(),
                age: 2
            })
        );
    }

    #[test]
    fn fetch_surfaces_conversion_failure_with_index() {
        let inner = MemoryResultSource::new(vec![
            json!({ "name": "a", "age": 1 }),
            json!({ "name": "b", "age": "not a number" }),
        ]);
        let source: TypedSource<_, User> = TypedSource::new(inner);

        let err = source.perform_fetch().unwrap_err();
        match err {
            FetchError::Conversion { index, .. } => assert_eq!(index, 1),
            other => panic!("expected Conversion error, got {other:?}"),
        }
    }

    #[test]
    fn filter_passes_through_to_inner() {
        use crate::query::Query;

        let inner = MemoryResultSource::new(vec![
            json!({ "name": "a", "age": 1 }),
            json!({ "name": "b", "age": 2 }),
        ]);
        let source: TypedSource<_, User> = TypedSource::new(inner);
        source.set_filter(Some(Query::filtered(json!({ "name": "b" }))));
        source.perform_fetch().unwrap();

        let users = source.results();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "b");
    }
}
