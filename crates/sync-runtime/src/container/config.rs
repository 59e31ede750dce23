//! # Session Configuration
//!
//! Unified configuration for every component of a reconciliation session.
//!
//! All timings have sane defaults and can be overridden from the
//! environment; unparsable values are logged and ignored.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use ss_01_saga_log::SagaLogConfig;
use ss_02_pending_tracker::TrackerConfig;
use ss_03_reconciliation_poller::PollerConfig;
use ss_04_query_coordinator::CoordinatorConfig;

/// Broker panel refresh period.
pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_secs(5);

/// Complete session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Pending tracker configuration.
    pub tracker: TrackerConfig,
    /// Reconciliation poller configuration.
    pub poller: PollerConfig,
    /// Query coordinator configuration.
    pub coordinator: CoordinatorConfig,
    /// SAGA log configuration.
    pub saga_log: SagaLogConfig,
    /// Broker stats refresh period in milliseconds.
    pub monitor_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            poller: PollerConfig::default(),
            coordinator: CoordinatorConfig::default(),
            saga_log: SagaLogConfig::default(),
            monitor_interval_ms: DEFAULT_MONITOR_INTERVAL.as_millis() as u64,
        }
    }
}

impl SessionConfig {
    /// Short timings for tests.
    pub fn for_testing() -> Self {
        Self {
            tracker: TrackerConfig::for_testing(),
            poller: PollerConfig::for_testing(),
            coordinator: CoordinatorConfig::for_testing(),
            saga_log: SagaLogConfig::for_testing(),
            monitor_interval_ms: 100,
        }
    }

    /// Defaults overridden by `SS_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `SS_*` key.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ms) = parse_var(&lookup, "SS_POLL_INTERVAL_MS") {
            config.poller.interval_ms = ms;
        }
        if let Some(ms) = parse_var(&lookup, "SS_SETTLE_DELAY_MS") {
            config.tracker.settle_delay_ms = ms;
        }
        if let Some(cycles) = parse_var(&lookup, "SS_MAX_PENDING_CYCLES") {
            config.tracker.max_pending_cycles = cycles;
        }
        if let Some(ms) = parse_var(&lookup, "SS_SEARCH_DEBOUNCE_MS") {
            config.coordinator.search_debounce_ms = ms;
        }
        if let Some(ms) = parse_var(&lookup, "SS_MONITOR_INTERVAL_MS") {
            config.monitor_interval_ms = ms;
        }

        info!(
            poll_interval_ms = config.poller.interval_ms,
            settle_delay_ms = config.tracker.settle_delay_ms,
            max_pending_cycles = config.tracker.max_pending_cycles,
            search_debounce_ms = config.coordinator.search_debounce_ms,
            monitor_interval_ms = config.monitor_interval_ms,
            "Session configuration loaded"
        );
        config
    }

    /// Broker stats refresh period.
    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms)
    }

    /// Reject configurations that would spin.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poller.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("poll interval"));
        }
        if self.monitor_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("monitor interval"));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A periodic task was configured with no period.
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparsable environment override");
            None
        }
    }
}
