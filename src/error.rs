//! Error type for store retrievals.

use thiserror::Error;

/// A read against the store failed.
///
/// Displays as the store's message verbatim; `table` records which
/// retrieval failed for logging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RetrievalError {
    pub table: &'static str,
    pub message: String,
}

impl RetrievalError {
    pub fn new(table: &'static str, message: impl Into<String>) -> Self {
        Self {
            table,
            message: message.into(),
        }
    }

    /// Wrap any displayable failure (transport, decode, SQL) raised while
    /// reading `table`.
    pub fn from_display(table: &'static str, err: impl std::fmt::Display) -> Self {
        Self::new(table, err.to_string())
    }
}

/// Result type for store retrievals.
pub type RetrievalResult<T> = std::result::Result<T, RetrievalError>;
