//! # SAGA Log Configuration

use serde::{Deserialize, Serialize};

use crate::domain::DEFAULT_DISPLAY_LIMIT;

/// Transaction log aggregator configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SagaLogConfig {
    /// Transactions returned by `load_recent`.
    pub display_limit: usize,

    /// Log timelines with illegal transitions at `warn` level.
    pub report_violations: bool,
}

impl Default for SagaLogConfig {
    fn default() -> Self {
        Self {
            display_limit: DEFAULT_DISPLAY_LIMIT,
            report_violations: true,
        }
    }
}

impl SagaLogConfig {
    /// Create a config for testing (smaller values).
    pub fn for_testing() -> Self {
        Self {
            display_limit: 3,
            report_violations: false,
        }
    }
}
