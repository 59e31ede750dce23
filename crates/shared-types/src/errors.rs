//! # Error Types
//!
//! Errors returned by the external collaborators (create, list, log and
//! broker APIs).

use thiserror::Error;

/// HTTP status the backend uses when the SAGA rolled back because a
/// downstream service was unavailable.
pub const SERVICE_UNAVAILABLE_STATUS: u16 = 503;

/// Errors from a collaborator API call.
///
/// None of these is ever a compensation signal for an already-tracked
/// entity. They describe the call that failed, nothing more.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// A downstream service was unavailable; for creates this means the
    /// SAGA was compensated and nothing was persisted.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The request reached the server and was refused.
    #[error("Request rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Server-provided detail.
        message: String,
    },

    /// The request never completed (connection refused, reset, DNS...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The transport gave up waiting.
    #[error("Request timed out")]
    Timeout,

    /// The response body could not be decoded.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Map an HTTP error status and detail into the taxonomy.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == SERVICE_UNAVAILABLE_STATUS {
            Self::ServiceUnavailable(message)
        } else {
            Self::Rejected { status, message }
        }
    }

    /// Whether retrying the same call later may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ServiceUnavailable(_) | Self::Transport(_) | Self::Timeout => true,
            Self::Rejected { status, .. } => *status >= 500,
            Self::Malformed(_) => false,
        }
    }

    /// Whether this is the "service unavailable" signal.
    #[must_use]
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_))
    }

    /// Human-readable message for the presentation layer.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ServiceUnavailable(detail) if !detail.is_empty() => detail.clone(),
            Self::ServiceUnavailable(_) => {
                "The notification service is unavailable. The task was not created.".to_string()
            }
            Self::Rejected { message, .. } if !message.is_empty() => message.clone(),
            Self::Transport(_) | Self::Timeout => {
                "Could not reach the server. Please try again.".to_string()
            }
            _ => "The request failed. Please try again.".to_string(),
        }
    }
}
