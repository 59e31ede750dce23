//! # Domain Errors

use shared_types::ApiError;
use thiserror::Error;

/// Coordinator error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoordinatorError {
    /// The coordinator was disposed.
    #[error("Query coordinator has been disposed")]
    Disposed,

    /// `start` was called twice.
    #[error("Query coordinator is already running")]
    AlreadyRunning,

    /// The listing fetch failed.
    #[error("Listing fetch failed: {0}")]
    Fetch(#[from] ApiError),
}
