//! # SAGA Log Service
//!
//! Fetches the transaction log through the outbound port and aggregates it.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::TransactionLogApi;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::algorithms::aggregate;
use crate::config::SagaLogConfig;
use crate::domain::{AggregatedLog, SagaLogError, SagaTimeline};
use crate::ports::SagaLogApi;

/// SAGA Log Service - keeps the last good aggregation.
pub struct SagaLogService<L: TransactionLogApi + ?Sized> {
    /// Configuration.
    config: SagaLogConfig,
    /// Log source (driven port).
    source: Arc<L>,
    /// Last successful aggregation.
    last: RwLock<Option<AggregatedLog>>,
}

impl<L: TransactionLogApi + ?Sized> SagaLogService<L> {
    /// Create a new service.
    pub fn new(source: Arc<L>, config: SagaLogConfig) -> Self {
        Self {
            config,
            source,
            last: RwLock::new(None),
        }
    }

    fn report_violations(&self, log: &AggregatedLog) {
        if !self.config.report_violations {
            return;
        }
        for timeline in log {
            let violations = timeline.transition_violations();
            if !violations.is_empty() {
                warn!(
                    transaction_id = %timeline.transaction_id(),
                    violations = violations.len(),
                    first = %violations[0],
                    "SAGA timeline has illegal transitions"
                );
            }
        }
    }
}

#[async_trait]
impl<L: TransactionLogApi + ?Sized + 'static> SagaLogApi for SagaLogService<L> {
    async fn load(&self) -> Result<AggregatedLog, SagaLogError> {
        let entries = match self.source.fetch_log().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "SAGA log fetch failed, keeping previous view");
                return Err(e.into());
            }
        };

        let log = aggregate(entries);
        let (successful, rolled_back) = log.outcome_counts();
        debug!(
            transactions = log.len(),
            entries = log.entry_count(),
            successful,
            rolled_back,
            "SAGA log aggregated"
        );
        self.report_violations(&log);

        *self.last.write() = Some(log.clone());
        Ok(log)
    }

    async fn load_recent(&self) -> Result<Vec<SagaTimeline>, SagaLogError> {
        let log = self.load().await?;
        Ok(log
            .most_recent(self.config.display_limit)
            .into_iter()
            .cloned()
            .collect())
    }

    fn last_loaded(&self) -> Option<AggregatedLog> {
        self.last.read().clone()
    }
}
