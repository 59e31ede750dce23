//! # Session Errors

use shared_types::ApiError;
use ss_01_saga_log::SagaLogError;
use ss_02_pending_tracker::TrackerError;
use ss_03_reconciliation_poller::PollerError;
use ss_04_query_coordinator::CoordinatorError;
use thiserror::Error;

use super::config::ConfigError;

/// Errors surfaced by a [`ReconciliationSession`](super::ReconciliationSession).
#[derive(Debug, Error)]
pub enum SessionError {
    /// The create call failed. Nothing was registered as pending.
    #[error("{message}")]
    CreateFailed {
        /// Message for the presentation layer.
        message: String,
        /// The backend rolled the create back because a downstream service
        /// was unavailable.
        service_unavailable: bool,
        /// Underlying API error.
        #[source]
        source: ApiError,
    },

    /// The session was disposed.
    #[error("Reconciliation session has been disposed")]
    Disposed,

    /// The backend has no transaction log.
    #[error("No transaction log source is configured")]
    NoTransactionLog,

    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Pending tracker failure.
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    /// Query coordinator failure.
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),

    /// Poller lifecycle failure.
    #[error(transparent)]
    Poller(#[from] PollerError),

    /// SAGA log failure.
    #[error(transparent)]
    SagaLog(#[from] SagaLogError),
}

impl SessionError {
    /// Build the create failure for `error`.
    pub fn create_failed(error: ApiError) -> Self {
        Self::CreateFailed {
            message: error.user_message(),
            service_unavailable: error.is_service_unavailable(),
            source: error,
        }
    }

    /// Whether this is the "service unavailable" rollback of a create.
    #[must_use]
    pub fn is_service_unavailable(&self) -> bool {
        matches!(
            self,
            Self::CreateFailed {
                service_unavailable: true,
                ..
            }
        )
    }

    /// Whether a later retry may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::CreateFailed { source, .. } => source.is_retryable(),
            Self::Tracker(e) => e.is_retryable(),
            Self::SagaLog(e) => e.is_retryable(),
            Self::Coordinator(CoordinatorError::Fetch(e)) => e.is_retryable(),
            _ => false,
        }
    }
}
