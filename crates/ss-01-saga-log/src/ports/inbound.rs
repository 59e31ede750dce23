//! # Inbound Ports
//!
//! API trait defining what the SAGA log component offers the presentation
//! layer.

use async_trait::async_trait;

use crate::domain::{AggregatedLog, SagaLogError, SagaTimeline};

/// SAGA Log API - inbound port.
#[async_trait]
pub trait SagaLogApi: Send + Sync {
    /// Fetch the log and aggregate it.
    async fn load(&self) -> Result<AggregatedLog, SagaLogError>;

    /// Fetch, aggregate and keep only the most recent transactions.
    async fn load_recent(&self) -> Result<Vec<SagaTimeline>, SagaLogError>;

    /// Last successfully loaded aggregation, if any.
    fn last_loaded(&self) -> Option<AggregatedLog>;
}
