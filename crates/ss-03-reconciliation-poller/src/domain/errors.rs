//! # Domain Errors
//!
//! Error types for the Reconciliation Poller. Tick failures are reported
//! through [`TickOutcome`](super::TickOutcome), not here.

use thiserror::Error;

/// Poller lifecycle errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PollerError {
    /// `start` was called while the loop is running.
    #[error("Poller is already running")]
    AlreadyRunning,

    /// The poller was stopped and cannot be restarted.
    #[error("Poller has been stopped")]
    Stopped,
}
