use thiserror::Error;

// ---------------------------------------------------------------------------
// FetchError
// ---------------------------------------------------------------------------

/// Errors produced by a result source while (re-)executing its query.
///
/// All variants are recoverable at the adapter level: a failed fetch is logged
/// once, the previous snapshot stays in place, and no event is published.
/// Contract violations (re-entrancy, wrong thread, mutation of a fetched
/// results array) are not errors — they panic.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The query itself could not be executed.
    #[error("Query execution failed: {0}")]
    Query(String),

    /// The source failed for a reason other than the query.
    #[error("Result source error: {message}")]
    Source {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A fetched record could not be converted to the requested item type.
    #[error("Failed to convert fetched record at index {index}")]
    Conversion {
        index: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl FetchError {
    pub fn source_error(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
            source: None,
        }
    }
}

/// Convenience alias — the default error type is `FetchError`.
pub type Result<T, E = FetchError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_error_display() {
        let e = FetchError::Query("bad filter".to_string());
        assert_eq!(e.to_string(), "Query execution failed: bad filter");
    }

    #[test]
    fn source_error_display_without_source() {
        let e = FetchError::source_error("store closed");
        assert_eq!(e.to_string(), "Result source error: store closed");
    }

    #[test]
    fn source_error_display_with_source() {
        let inner: Box<dyn std::error::Error + Send + Sync> = "io failure".into();
        let e = FetchError::Source {
            message: "store closed".to_string(),
            source: Some(inner),
        };
        let msg = e.to_string();
        assert!(msg.contains("store closed"), "message missing: {msg}");
    }

    #[test]
    fn conversion_error_mentions_index() {
        let e = FetchError::Conversion {
            index: 7,
            source: "type mismatch".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains('7'), "index missing: {msg}");
    }
}
