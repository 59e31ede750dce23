//! # Metrics Recorder
//!
//! Subscribes to the bus and mirrors reconciliation events into the
//! global Prometheus registry.

use saga_telemetry::{
    BROKER_BACKLOG, BUS_EVENTS, ENTITIES_COMPENSATED, ENTITIES_CONFIRMED, ENTITIES_TIMED_OUT,
    LISTING_FETCHES, PENDING_ENTITIES, RECONCILE_FAILURES,
};
use shared_bus::{EventFilter, InMemoryEventBus, ReconciliationEvent, Subscription};
use ss_02_pending_tracker::PendingTrackerApi;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Apply one event to the metrics. `pending` is the tracker's current
/// pending count.
pub fn record_event(event: &ReconciliationEvent, pending: usize) {
    BUS_EVENTS.with_label_values(&[event.topic().name()]).inc();

    match event {
        ReconciliationEvent::EntityRegistered { .. } => {}
        ReconciliationEvent::EntityConfirmed { .. } => ENTITIES_CONFIRMED.inc(),
        ReconciliationEvent::EntityCompensated(_) => ENTITIES_COMPENSATED.inc(),
        ReconciliationEvent::EntityTimedOut { .. } => ENTITIES_TIMED_OUT.inc(),
        ReconciliationEvent::ReconcileFailed {
            source, retryable, ..
        } => {
            let retryable = if *retryable { "true" } else { "false" };
            RECONCILE_FAILURES
                .with_label_values(&[source.as_str(), retryable])
                .inc();
        }
        ReconciliationEvent::ListingRefreshed { .. } => LISTING_FETCHES.inc(),
        ReconciliationEvent::BrokerStatsUpdated(stats) => {
            for exchange in &stats.exchanges {
                BROKER_BACKLOG
                    .with_label_values(&[exchange.name.as_str()])
                    .set(exchange.backlog() as f64);
            }
        }
    }

    if event.entity_id().is_some() {
        PENDING_ENTITIES.set(pending as f64);
    }
}

/// Spawn the recorder. Runs until `shutdown` flips or the bus closes.
pub fn spawn_metrics_recorder(
    bus: &InMemoryEventBus,
    tracker: Arc<dyn PendingTrackerApi>,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let subscription = bus.subscribe(EventFilter::all());
    tokio::spawn(run_recorder(subscription, tracker, shutdown))
}

async fn run_recorder(
    mut subscription: Subscription,
    tracker: Arc<dyn PendingTrackerApi>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            event = subscription.recv() => match event {
                Some(event) => record_event(&event, tracker.pending_count()),
                None => break,
            },
            _ = shutdown.changed() => break,
        }
    }
    PENDING_ENTITIES.set(tracker.pending_count() as f64);
    debug!("Metrics recorder stopped");
}
