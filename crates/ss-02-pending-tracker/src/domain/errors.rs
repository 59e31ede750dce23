//! # Domain Errors
//!
//! Error types for the Pending Operation Tracker.

use shared_types::ApiError;
use thiserror::Error;

/// Tracker error types.
///
/// Compensation is not an error: it is reported through
/// [`ReconcileReport`](super::ReconcileReport) and the event bus.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackerError {
    /// The tracker was disposed; it no longer mutates.
    #[error("Tracker has been disposed")]
    Disposed,

    /// The authoritative fetch failed. Tracked state is unchanged.
    #[error("Reconciliation fetch failed: {0}")]
    Fetch(#[from] ApiError),
}

impl TrackerError {
    /// Whether a later cycle may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Disposed => false,
            Self::Fetch(err) => err.is_retryable(),
        }
    }
}
