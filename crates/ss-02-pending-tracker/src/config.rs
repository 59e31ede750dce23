//! # Tracker Configuration
//!
//! Configuration for the Pending Operation Tracker.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::{DEFAULT_MAX_PENDING_CYCLES, DEFAULT_SETTLE_DELAY};

/// Pending tracker configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Delay before the one-off confirmation fetch, in milliseconds.
    pub settle_delay_ms: u64,

    /// Inconclusive periodic reconciliations before an entity is dropped.
    /// `0` disables the timeout.
    pub max_pending_cycles: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY.as_millis() as u64,
            max_pending_cycles: DEFAULT_MAX_PENDING_CYCLES,
        }
    }
}

impl TrackerConfig {
    /// Create a config for testing (short delays).
    pub fn for_testing() -> Self {
        Self {
            settle_delay_ms: 100,
            max_pending_cycles: 3,
        }
    }

    /// Settle delay as a [`Duration`].
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
