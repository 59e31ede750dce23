//! # Domain Value Objects
//!
//! Tick outcomes and poller statistics.

use serde::{Deserialize, Serialize};
use ss_02_pending_tracker::ReconcileReport;
use std::time::Duration;

/// Default poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// What a single tick did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickOutcome {
    /// Nothing was pending; no fetch was issued.
    Idle,
    /// A fetch was already in flight; this tick did nothing.
    Skipped,
    /// A fetch completed and was reconciled.
    Reconciled(ReconcileReport),
    /// The fetch failed; tracked state is unchanged.
    Failed(String),
}

impl TickOutcome {
    /// Whether this tick issued a fetch.
    #[must_use]
    pub fn fetched(&self) -> bool {
        matches!(self, Self::Reconciled(_) | Self::Failed(_))
    }
}

/// Poller counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollerStats {
    /// Ticks evaluated, manual and scheduled.
    pub ticks: u64,
    /// Ticks with nothing pending.
    pub idle: u64,
    /// Ticks dropped because a fetch was in flight.
    pub skipped: u64,
    /// Ticks that reconciled.
    pub reconciled: u64,
    /// Ticks whose fetch failed.
    pub failed: u64,
}

impl PollerStats {
    /// Ticks that issued a fetch.
    #[must_use]
    pub fn fetches(&self) -> u64 {
        self.reconciled + self.failed
    }
}
