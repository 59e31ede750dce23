//! # Domain Value Objects
//!
//! Outcome and display badges derived from SAGA statuses.

use serde::{Deserialize, Serialize};
use shared_types::SagaStatus;

/// Terminal outcome of a SAGA, derived from its last log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Last entry is not a rollback status.
    Successful,
    /// Last entry is COMPENSATED or COMPENSATION_FAILED.
    RolledBack,
}

impl Outcome {
    /// Derive the outcome from a final status.
    #[must_use]
    pub fn from_last_status(status: &SagaStatus) -> Self {
        if status.is_rollback() {
            Self::RolledBack
        } else {
            Self::Successful
        }
    }

    /// Badge rendered next to the transaction id.
    #[must_use]
    pub fn badge(self) -> StatusBadge {
        match self {
            Self::Successful => StatusBadge::new("SUCCESSFUL", BadgeColor::Success, "✅"),
            Self::RolledBack => StatusBadge::new("ROLLBACK", BadgeColor::Warning, "🔄"),
        }
    }
}

/// Colour class of a badge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BadgeColor {
    /// Neutral progress.
    Info,
    /// Intermediate step.
    Primary,
    /// Committed.
    Success,
    /// Rolled back.
    Warning,
    /// Failed.
    Error,
    /// Fallback for unrecognized statuses.
    Default,
}

/// What the presentation layer draws for a status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBadge {
    /// Text on the chip.
    pub label: String,
    /// Colour class.
    pub color: BadgeColor,
    /// Leading glyph.
    pub glyph: String,
}

impl StatusBadge {
    fn new(label: &str, color: BadgeColor, glyph: &str) -> Self {
        Self {
            label: label.to_string(),
            color,
            glyph: glyph.to_string(),
        }
    }
}

/// Badge for a step status. Unknown labels get the default badge and keep
/// their original text.
#[must_use]
pub fn status_badge(status: &SagaStatus) -> StatusBadge {
    let (color, glyph) = match status {
        SagaStatus::Started => (BadgeColor::Info, "🔵"),
        SagaStatus::TaskCreated => (BadgeColor::Primary, "📝"),
        SagaStatus::StepCompleted => (BadgeColor::Primary, "➡"),
        SagaStatus::Completed => (BadgeColor::Success, "✅"),
        SagaStatus::Compensated => (BadgeColor::Warning, "🔄"),
        SagaStatus::Failed => (BadgeColor::Error, "❌"),
        SagaStatus::CompensationFailed => (BadgeColor::Error, "💥"),
        SagaStatus::Unknown(_) => (BadgeColor::Default, "•"),
    };
    StatusBadge::new(status.as_str(), color, glyph)
}

/// `status.badge()` sugar over [`status_badge`].
pub trait StatusBadgeExt {
    /// Display badge for this status.
    fn badge(&self) -> StatusBadge;
}

impl StatusBadgeExt for SagaStatus {
    fn badge(&self) -> StatusBadge {
        status_badge(self)
    }
}
