//! # Broker Monitor
//!
//! Informational panel feed: refreshes broker counters on mount and then
//! every interval, exposes the latest snapshot on a watch channel and
//! publishes `BrokerStatsUpdated` on the bus.
//!
//! A failed read keeps the previous snapshot. The monitor has no influence
//! on reconciliation.

use parking_lot::Mutex;
use shared_bus::{InMemoryEventBus, ReconciliationEvent};
use shared_types::{BrokerStats, BrokerStatsSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Periodic broker stats reader.
pub struct BrokerMonitor {
    latest: watch::Receiver<BrokerStats>,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl BrokerMonitor {
    /// Spawn the refresh loop. The first read happens immediately.
    pub fn start(
        source: Arc<dyn BrokerStatsSource>,
        bus: Arc<InMemoryEventBus>,
        interval: Duration,
    ) -> Self {
        let (latest_tx, latest) = watch::channel(BrokerStats::default());
        let (shutdown, shutdown_rx) = watch::channel(false);

        info!(interval_ms = interval.as_millis() as u64, "Starting broker monitor");
        let task = tokio::spawn(run_monitor(source, bus, interval, latest_tx, shutdown_rx));

        Self {
            latest,
            shutdown,
            task: Mutex::new(Some(task)),
        }
    }

    /// Most recent snapshot (default until the first successful read).
    pub fn latest(&self) -> BrokerStats {
        self.latest.borrow().clone()
    }

    /// Watch the snapshot.
    pub fn subscribe(&self) -> watch::Receiver<BrokerStats> {
        self.latest.clone()
    }

    /// Stop refreshing. Idempotent.
    pub fn stop(&self) {
        if !self.shutdown.send_replace(true) {
            debug!("Broker monitor stopped");
        }
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

impl Drop for BrokerMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_monitor(
    source: Arc<dyn BrokerStatsSource>,
    bus: Arc<InMemoryEventBus>,
    interval: Duration,
    latest: watch::Sender<BrokerStats>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => break,
        }

        match source.stats().await {
            Ok(stats) => {
                debug!(
                    exchanges = stats.exchanges.len(),
                    pending_messages = stats.pending_messages,
                    "Broker stats refreshed"
                );
                latest.send_replace(stats.clone());
                bus.publish_now(ReconciliationEvent::BrokerStatsUpdated(stats));
            }
            Err(e) => {
                warn!(error = %e, "Broker stats unavailable, keeping previous snapshot");
            }
        }
    }
}
