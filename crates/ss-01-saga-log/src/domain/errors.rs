//! # Domain Errors
//!
//! Error types for the Transaction Log Aggregator.

use shared_types::ApiError;
use thiserror::Error;

/// SAGA log error types.
///
/// Aggregation itself cannot fail; only fetching the log can.
#[derive(Debug, Error)]
pub enum SagaLogError {
    /// The log source could not be read. The previously loaded view, if
    /// any, is kept.
    #[error("Failed to fetch SAGA log: {0}")]
    Fetch(#[from] ApiError),
}

impl SagaLogError {
    /// Whether a later refresh may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(err) => err.is_retryable(),
        }
    }
}
