//! # Coordinator Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::DEFAULT_SEARCH_DEBOUNCE;

/// Query coordinator configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Quiescence window for search input, in milliseconds.
    pub search_debounce_ms: u64,

    /// Fetch the unfiltered listing as soon as the worker starts.
    pub fetch_on_start: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE.as_millis() as u64,
            fetch_on_start: true,
        }
    }
}

impl CoordinatorConfig {
    /// Create a config for testing (no fetch on start).
    pub fn for_testing() -> Self {
        Self {
            fetch_on_start: false,
            ..Self::default()
        }
    }

    /// Debounce window as a [`Duration`].
    #[must_use]
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}
