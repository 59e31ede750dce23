//! # Domain Invariants
//!
//! Legal SAGA progressions. A timeline starts with STARTED, moves through
//! intermediate steps and ends in COMPLETED, or compensates and then
//! optionally records FAILED.
//!
//! These rules are reported, never enforced: the outcome of a timeline is
//! always the last-entry heuristic.

use serde::Serialize;
use shared_types::SagaStatus;
use std::fmt;

/// Maximum number of transactions the presentation layer renders by default.
pub const DEFAULT_DISPLAY_LIMIT: usize = 10;

/// One illegal step in a timeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransitionViolation {
    /// Position of the offending entry.
    pub index: usize,
    /// Previous status (`None` for the first entry).
    pub from: Option<String>,
    /// Offending status.
    pub to: String,
}

impl fmt::Display for TransitionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.from {
            Some(from) => write!(f, "entry {}: {} -> {}", self.index, from, self.to),
            None => write!(f, "entry {}: timeline begins with {}", self.index, self.to),
        }
    }
}

/// Whether `to` may directly follow `from`.
///
/// Unknown labels are never judged.
#[must_use]
pub fn is_legal_transition(from: &SagaStatus, to: &SagaStatus) -> bool {
    use SagaStatus::*;

    if !from.is_known() || !to.is_known() {
        return true;
    }

    match from {
        Started => matches!(
            to,
            TaskCreated | StepCompleted | Completed | Compensated | Failed
        ),
        TaskCreated | StepCompleted => matches!(
            to,
            TaskCreated | StepCompleted | Completed | Compensated | CompensationFailed | Failed
        ),
        Compensated | CompensationFailed => matches!(to, Failed),
        Completed | Failed => false,
        Unknown(_) => true,
    }
}

/// Check a status sequence and collect every violation.
#[must_use]
pub fn check_progression(statuses: &[&SagaStatus]) -> Vec<TransitionViolation> {
    let mut violations = Vec::new();

    if let Some(first) = statuses.first() {
        if first.is_known() && **first != SagaStatus::Started {
            violations.push(TransitionViolation {
                index: 0,
                from: None,
                to: first.to_string(),
            });
        }
    }

    for (offset, pair) in statuses.windows(2).enumerate() {
        if !is_legal_transition(pair[0], pair[1]) {
            violations.push(TransitionViolation {
                index: offset + 1,
                from: Some(pair[0].to_string()),
                to: pair[1].to_string(),
            });
        }
    }

    violations
}
