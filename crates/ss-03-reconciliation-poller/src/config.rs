//! # Poller Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::DEFAULT_POLL_INTERVAL;

/// Reconciliation poller configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Interval between ticks in milliseconds.
    pub interval_ms: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
        }
    }
}

impl PollerConfig {
    /// Create a config for testing (short interval).
    pub fn for_testing() -> Self {
        Self { interval_ms: 100 }
    }

    /// Interval as a [`Duration`]. Zero is clamped to one millisecond.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_interval() {
        assert_eq!(PollerConfig::default().interval(), Duration::from_secs(2));
    }

    #[test]
    fn test_zero_interval_clamped() {
        let config = PollerConfig { interval_ms: 0 };
        assert_eq!(config.interval(), Duration::from_millis(1));
    }
}
