//! Query type definitions: filter, sort, and pagination for bundled sources.
//!
//! A [`Query`] is the filter value a [`crate::adapter::FetchedResultsArray`]
//! predicate cell holds when the source is one of the bundled `Value`-record
//! sources. Matching is deliberately simple: a filter object matches a record
//! when every top-level key compares equal to the record's field.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

// ============================================================================
// Sort types
// ============================================================================

/// Sort direction for a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A sort specification for a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortEntry {
    pub field: String,
    pub direction: SortDirection,
}

impl SortEntry {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

// ============================================================================
// Query
// ============================================================================

/// Complete query specification with filter, sort, and pagination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Flat equality filter object. `None` matches everything.
    pub filter: Option<Value>,
    /// Ordered sort entries, applied at fetch time.
    pub sort: Vec<SortEntry>,
    /// Maximum number of results to return.
    pub limit: Option<usize>,
    /// Number of results to skip.
    pub offset: Option<usize>,
}

impl Query {
    /// A query that matches every record in fetch order.
    pub fn all() -> Self {
        Self::default()
    }

    /// A filter-only query.
    pub fn filtered(filter: Value) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }

    /// Whether `record` satisfies the filter (sort/pagination ignored).
    ///
    /// A non-object filter matches nothing; a missing filter matches all.
    pub fn matches(&self, record: &Value) -> bool {
        let filter = match &self.filter {
            None => return true,
            Some(f) => f,
        };
        let obj = match filter.as_object() {
            Some(o) => o,
            None => return false,
        };
        obj.iter().all(|(key, expected)| record.get(key) == Some(expected))
    }

    /// Apply the full query (filter, sort, offset, limit) to `records`.
    pub fn apply(&self, records: &[Value]) -> Vec<Value> {
        let mut out: Vec<Value> = records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect();

        if !self.sort.is_empty() {
            out.sort_by(|a, b| {
                for entry in &self.sort {
                    let ord = compare_fields(a.get(&entry.field), b.get(&entry.field));
                    let ord = match entry.direction {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }

        let offset = self.offset.unwrap_or(0);
        let mut out: Vec<Value> = out.into_iter().skip(offset).collect();
        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }
}

/// Total order over optional JSON field values: missing < null < bool <
/// number < string < everything else, with natural ordering within a type.
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(_) => 5,
        }
    }
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

// ============================================================================
// Tests
// ============================================================================
