//! Huginn error types

use std::time::Duration;

use crate::schema::Violation;
use crate::types::FailureKind;

/// Huginn error types
#[derive(Debug, thiserror::Error)]
pub enum HuginnError {
    // Provider/network errors
    #[error("provider timed out after {0:?}")]
    Timeout(Duration),

    #[error("provider rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("provider unreachable: {0}")]
    Unreachable(String),

    // Output recovery errors
    #[error("no JSON value found in provider output")]
    NoJsonFound,

    #[error("schema violation: {0}")]
    SchemaViolation(#[from] Violation),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl HuginnError {
    /// Classify this error into the failure taxonomy recorded per attempt.
    ///
    /// Configuration problems surface while building a request for one
    /// provider, so they count as that provider rejecting the call.
    pub fn kind(&self) -> FailureKind {
        match self {
            HuginnError::Timeout(_) => FailureKind::Timeout,
            HuginnError::Rejected { .. }
            | HuginnError::RateLimited { .. }
            | HuginnError::Configuration(_) => FailureKind::Rejected,
            HuginnError::Unreachable(_) => FailureKind::Unreachable,
            HuginnError::NoJsonFound | HuginnError::Json(_) => FailureKind::NoJsonFound,
            HuginnError::SchemaViolation(_) => FailureKind::SchemaViolation,
        }
    }

    /// Whether retrying the same provider may succeed.
    ///
    /// Timeouts, transport failures, rate limits and 5xx responses are
    /// transient. Everything else (4xx, unusable output, config) is not.
    pub fn is_transient(&self) -> bool {
        match self {
            HuginnError::Timeout(_)
            | HuginnError::Unreachable(_)
            | HuginnError::RateLimited { .. } => true,
            HuginnError::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Provider-suggested delay before retrying, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            HuginnError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Result type alias for Huginn operations
pub type Result<T> = std::result::Result<T, HuginnError>;
