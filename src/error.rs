//! Mimir error types

use std::fmt;
use std::time::Duration;

use crate::types::Category;

/// Mimir error types
#[derive(Debug, thiserror::Error)]
pub enum MimirError {
    // Request errors
    #[error("invalid request: {0}")]
    Validation(String),

    // Service/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("empty response from model")]
    EmptyResponse,

    /// No strategy in the resolver chain produced content.
    #[error("no template or generation service for {category} '{name}'")]
    Unresolved { category: Category, name: String },

    // Batch errors
    /// A category exceeded its failure threshold.
    #[error(
        "{category} batch failed: {failed} of {total} items failed{}; {summary}",
        systemic_hint(.dominant_kind)
    )]
    AggregateBatch {
        category: Category,
        failed: usize,
        total: usize,
        /// Set when every failure shares one kind.
        dominant_kind: Option<ErrorKind>,
        /// First few underlying failures, `item: error` joined by `; `.
        summary: String,
    },

    #[error("task for '{0}' panicked")]
    TaskPanicked(String),

    // Cache errors (never surfaced from CacheStore)
    #[error("cache write failed: {0}")]
    CacheWrite(String),

    #[error("cache read failed: {0}")]
    CacheRead(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

fn systemic_hint(kind: &Option<ErrorKind>) -> String {
    match kind {
        Some(kind) => format!(" (all {kind}, likely systemic)"),
        None => String::new(),
    }
}

/// Coarse classification used for retry decisions and failure summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    TransientService,
    FatalService,
    AggregateBatch,
    CacheWrite,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation errors",
            ErrorKind::TransientService => "transient service errors",
            ErrorKind::FatalService => "fatal service errors",
            ErrorKind::AggregateBatch => "aggregate batch errors",
            ErrorKind::CacheWrite => "cache write errors",
            ErrorKind::Internal => "internal errors",
        };
        f.write_str(s)
    }
}

impl MimirError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MimirError::Validation(_) => ErrorKind::Validation,
            MimirError::Http(_) | MimirError::RateLimited { .. } | MimirError::Timeout(_) => {
                ErrorKind::TransientService
            }
            MimirError::Api { status, .. } if is_transient_status(*status) => {
                ErrorKind::TransientService
            }
            MimirError::Api { .. }
            | MimirError::AuthenticationFailed
            | MimirError::MalformedRequest(_)
            | MimirError::EmptyResponse
            | MimirError::Unresolved { .. } => ErrorKind::FatalService,
            MimirError::AggregateBatch { .. } => ErrorKind::AggregateBatch,
            MimirError::CacheWrite(_) | MimirError::CacheRead(_) => ErrorKind::CacheWrite,
            MimirError::TaskPanicked(_) | MimirError::Json(_) | MimirError::Configuration(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Whether the failed operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::TransientService
    }

    /// Provider-supplied delay hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            MimirError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Server faults worth retrying. 529 is Anthropic's "overloaded".
fn is_transient_status(status: u16) -> bool {
    matches!(status, 500..=599)
}

/// Result type alias for Mimir operations
pub type Result<T> = std::result::Result<T, MimirError>;
