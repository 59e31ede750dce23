//! # Inbound Ports

use async_trait::async_trait;

use crate::domain::{PollerError, PollerStats, TickOutcome};

/// Reconciliation poller API - inbound port.
#[async_trait]
pub trait ReconciliationPollerApi: Send + Sync {
    /// Spawn the periodic loop.
    fn start(&self) -> Result<(), PollerError>;

    /// Run one tick now (manual refresh). Shares the in-flight guard with
    /// the loop, so it is skipped while a fetch is running.
    async fn tick(&self) -> TickOutcome;

    /// Stop the loop. In-flight fetches are abandoned.
    fn stop(&self);

    /// Whether the loop is running.
    fn is_running(&self) -> bool;

    /// Counter snapshot.
    fn stats(&self) -> PollerStats;
}
