//! # Domain Invariants
//!
//! Defaults and checks shared by the reconciliation algorithms.

use std::time::Duration;

use super::entities::{PendingSet, TrackingState};

/// Delay between registration and the one-off confirmation fetch.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(3);

/// Inconclusive periodic reconciliations tolerated before an entity is
/// dropped. `0` disables the timeout.
pub const DEFAULT_MAX_PENDING_CYCLES: u32 = 15;

/// Every stored entity is PENDING.
#[must_use]
pub fn invariant_only_pending(set: &PendingSet) -> bool {
    set.entities()
        .iter()
        .all(|t| t.state == TrackingState::Pending)
}

/// No stored entity has outlived the timeout.
#[must_use]
pub fn invariant_within_cycle_budget(set: &PendingSet, max_pending_cycles: u32) -> bool {
    max_pending_cycles == 0
        || set
            .entities()
            .iter()
            .all(|t| t.missed_cycles < max_pending_cycles)
}
