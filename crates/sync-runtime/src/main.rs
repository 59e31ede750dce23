//! # Saga-Sync Demo Runtime
//!
//! Mounts a reconciliation session against the simulated backend and walks
//! through the interesting cases:
//!
//! 1. Optimistic creates that the backend confirms
//! 2. A create the backend compensates after it returned
//! 3. A create rejected with 503 while the notification service is down
//! 4. A filtered listing (status + debounced search)
//!
//! On Ctrl+C the SAGA log is printed with outcome badges, followed by the
//! Prometheus exposition.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use saga_telemetry::{gather_metrics, init_telemetry, TelemetryConfig};
use shared_bus::{EventFilter, EventTopic, ReconciliationEvent};
use shared_types::NewEntity;
use ss_01_saga_log::StatusBadgeExt;
use ss_04_query_coordinator::QueryCoordinatorApi;
use sync_runtime::adapters::SimulatedBackend;
use sync_runtime::{Backend, ReconciliationSession, SessionConfig};
use tracing::{info, warn};

const DEMO_TASKS: &[&str] = &[
    "Draft quarterly report",
    "Review pull requests",
    "Book conference room",
    "Update onboarding guide",
];

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry =
        init_telemetry(TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    let config = SessionConfig::from_env();
    let backend = Arc::new(SimulatedBackend::new(3, Duration::from_millis(1500)));
    let session = ReconciliationSession::mount(Backend::from_service(backend.clone()), config)
        .context("Failed to mount reconciliation session")?;

    let mut events = session.subscribe(EventFilter::topics(vec![EventTopic::Tracking]));
    let reporter = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                ReconciliationEvent::EntityConfirmed { entity_id } => {
                    info!(entity_id = %entity_id, "Task confirmed");
                }
                ReconciliationEvent::EntityCompensated(notice) => {
                    warn!(entity_id = %notice.entity_id, "{}", notice.message);
                }
                ReconciliationEvent::EntityTimedOut {
                    entity_id,
                    missed_cycles,
                } => {
                    warn!(entity_id = %entity_id, missed_cycles, "Task outcome unknown");
                }
                _ => {}
            }
        }
    });

    for title in DEMO_TASKS {
        match session.create(NewEntity::titled(*title)).await {
            Ok(entity) => info!(entity_id = %entity.id, title, "Task submitted"),
            Err(e) => warn!(title, error = %e, "Task rejected"),
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    backend.set_notifications_down(true);
    if let Err(e) = session.create(NewEntity::titled("Send weekly digest")).await {
        warn!(service_unavailable = e.is_service_unavailable(), "{}", e);
    }
    backend.set_notifications_down(false);

    let coordinator = session.coordinator();
    coordinator.set_status(Some("pending"))?;
    coordinator.set_search(Some("report"))?;

    info!("Session running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    match session.load_saga_log().await {
        Ok(log) => {
            let (successful, rolled_back) = log.outcome_counts();
            info!(transactions = log.len(), successful, rolled_back, "SAGA log");
            for timeline in log.iter() {
                let outcome = timeline.outcome().badge();
                let last = timeline.last_status().badge();
                info!(
                    transaction_id = %timeline.transaction_id(),
                    steps = timeline.entries().len(),
                    "{} {} (last step {} {})",
                    outcome.glyph,
                    outcome.label,
                    last.glyph,
                    last.label
                );
            }
        }
        Err(e) => warn!(error = %e, "SAGA log unavailable"),
    }

    println!("{}", gather_metrics()?);

    session.dispose();
    reporter.abort();
    Ok(())
}
