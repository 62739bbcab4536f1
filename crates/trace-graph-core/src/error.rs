//! Unified error type and sub-errors for the trace-graph workspace.
//!
//! Every fallible operation in the workspace returns [`Result`], and all
//! adapter crates convert their backend errors into one of the sub-enums
//! here so the serving layer has a single type to map onto HTTP statuses.

use thiserror::Error;

/// Top-level unified error type for trace-graph.
///
/// All crate errors are convertible to this type via `From` implementations.
#[derive(Debug, Error)]
pub enum TraceGraphError {
    /// Graph backend error (connection, query execution).
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    /// Vector index error (collection management, upsert, search).
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// Embedding or chat service error.
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    /// Import failure, tagged with the record kind that failed.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Malformed input data.
    ///
    /// Covers records missing their required business id and relationship
    /// type strings that fail the identifier check (which are rejected
    /// before any query is built, never executed).
    #[error("validation error: {0}")]
    Validation(String),

    /// Invariant violation or unrecoverable internal state.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TraceGraphError {
    /// Create a validation error from a message.
    #[inline]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error from a message.
    #[inline]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error was caused by the request rather than the system.
    ///
    /// The HTTP layer maps caller errors to 4xx and everything else to 5xx.
    pub fn is_caller_error(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::Import(e) => e.source.is_caller_error(),
            _ => false,
        }
    }
}

/// Graph backend failures.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Could not establish or maintain a connection to the graph backend.
    #[error("connection failed: {0}")]
    Connect(String),

    /// A query failed to execute.
    #[error("query failed: {0}")]
    Backend(String),

    /// A result row did not have the expected shape.
    #[error("malformed result row: {0}")]
    MalformedRow(String),
}

/// Vector index failures.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The vector backend rejected an operation.
    #[error("backend error: {0}")]
    Backend(String),

    /// An entry's vector length does not match the collection dimension.
    ///
    /// Surfaced at upsert time; a pre-existing collection with a different
    /// dimensionality is never silently accepted.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A stored hit could not be decoded into a typed payload.
    #[error("malformed hit: {0}")]
    MalformedHit(String),
}

/// Embedding / chat service failures.
///
/// Both providers are opaque text services behind HTTP; their failure modes
/// are identical, so they share one sub-enum. No retry happens at this
/// level; retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service could not be reached, errored, or timed out.
    #[error("{service} unavailable: {reason}")]
    Unavailable { service: &'static str, reason: String },

    /// The service answered with a body we cannot use.
    #[error("{service} returned an invalid response: {reason}")]
    InvalidResponse { service: &'static str, reason: String },
}

impl ServiceError {
    pub fn unavailable(service: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable { service, reason: reason.into() }
    }

    pub fn invalid_response(service: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidResponse { service, reason: reason.into() }
    }
}

/// Which record kind of an import batch failed.
///
/// Import is not atomic across kinds: requirements may already be committed
/// when test cases fail. The error names the failing kind so callers can
/// reason about what reached the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Requirements,
    TestCases,
    TestRuns,
    Links,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Requirements => "requirements",
            Self::TestCases => "testCases",
            Self::TestRuns => "testRuns",
            Self::Links => "links",
        };
        f.write_str(s)
    }
}

/// An import failure wrapping the underlying cause with the failing kind.
#[derive(Debug, Error)]
#[error("import of {kind} records failed: {source}")]
pub struct ImportError {
    pub kind: RecordKind,
    #[source]
    pub source: Box<TraceGraphError>,
}

impl ImportError {
    pub fn new(kind: RecordKind, source: TraceGraphError) -> Self {
        Self { kind, source: Box::new(source) }
    }
}

/// Result type alias for trace-graph operations.
pub type Result<T> = std::result::Result<T, TraceGraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_error_carries_kind_and_source() {
        let err = ImportError::new(
            RecordKind::TestCases,
            TraceGraphError::validation("test case record missing id"),
        );
        let msg = err.to_string();
        assert!(msg.contains("testCases"));
        assert!(msg.contains("missing id"));
    }

    #[test]
    fn validation_errors_are_caller_errors() {
        assert!(TraceGraphError::validation("bad").is_caller_error());
        assert!(!TraceGraphError::internal("bug").is_caller_error());

        let wrapped = TraceGraphError::Import(ImportError::new(
            RecordKind::Links,
            TraceGraphError::validation("bad link type"),
        ));
        assert!(wrapped.is_caller_error());

        let backend = TraceGraphError::Import(ImportError::new(
            RecordKind::Requirements,
            GraphError::Backend("boom".into()).into(),
        ));
        assert!(!backend.is_caller_error());
    }
}
