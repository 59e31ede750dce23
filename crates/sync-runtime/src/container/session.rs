//! # Reconciliation Session
//!
//! Owns every reconciliation component for the lifetime of one view:
//! mounting wires them together, disposing tears them down. Nothing here
//! is a process-wide singleton.
//!
//! ## Wiring
//!
//! ```text
//!  create() ──► EntityCreateApi ──ok──► PendingOperationTracker.track(id)
//!                                            ▲              │
//!  QueryCoordinator ── ParameterSource ──────┘              │ events
//!        │                                                  ▼
//!        └── ListingRefreshed ───────────────────────► InMemoryEventBus ──► metrics recorder
//!                                                           ▲
//!  ReconciliationPoller ── reconcile_fetch() ──► tracker ───┘
//!  BrokerMonitor ── BrokerStatsUpdated ─────────────────────┘
//! ```

use shared_bus::{EventFilter, InMemoryEventBus, Subscription};
use shared_types::{
    BrokerStats, BrokerStatsSource, Entity, EntityCreateApi, EntityListApi, NewEntity,
    ParameterSource, TransactionLogApi,
};
use ss_01_saga_log::{AggregatedLog, SagaLogApi, SagaLogService, SagaTimeline};
use ss_02_pending_tracker::{PendingOperationTracker, PendingTrackerApi};
use ss_03_reconciliation_poller::{ReconciliationPoller, ReconciliationPollerApi};
use ss_04_query_coordinator::{QueryCoordinator, QueryCoordinatorApi};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::config::SessionConfig;
use super::errors::SessionError;
use crate::handlers::{spawn_metrics_recorder, BrokerMonitor};

/// Collaborator APIs a session talks to.
#[derive(Clone)]
pub struct Backend {
    /// Create endpoint.
    pub creator: Arc<dyn EntityCreateApi>,
    /// Authoritative listing.
    pub listing: Arc<dyn EntityListApi>,
    /// SAGA transaction log, if the backend exposes one.
    pub transaction_log: Option<Arc<dyn TransactionLogApi>>,
    /// Broker counters, if the backend exposes them.
    pub broker: Option<Arc<dyn BrokerStatsSource>>,
}

impl Backend {
    /// Backend with only the create and list endpoints.
    pub fn new(creator: Arc<dyn EntityCreateApi>, listing: Arc<dyn EntityListApi>) -> Self {
        Self {
            creator,
            listing,
            transaction_log: None,
            broker: None,
        }
    }

    /// Backend where one service implements every endpoint.
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: EntityCreateApi + EntityListApi + TransactionLogApi + BrokerStatsSource + 'static,
    {
        Self {
            creator: service.clone(),
            listing: service.clone(),
            transaction_log: Some(service.clone()),
            broker: Some(service),
        }
    }

    /// Attach a transaction log.
    pub fn with_transaction_log(mut self, log: Arc<dyn TransactionLogApi>) -> Self {
        self.transaction_log = Some(log);
        self
    }

    /// Attach a broker stats feed.
    pub fn with_broker(mut self, broker: Arc<dyn BrokerStatsSource>) -> Self {
        self.broker = Some(broker);
        self
    }
}

/// A mounted set of reconciliation components.
pub struct ReconciliationSession {
    config: SessionConfig,
    bus: Arc<InMemoryEventBus>,
    creator: Arc<dyn EntityCreateApi>,
    coordinator: Arc<QueryCoordinator>,
    tracker: Arc<PendingOperationTracker>,
    poller: ReconciliationPoller,
    saga_log: Option<SagaLogService<dyn TransactionLogApi>>,
    monitor: Option<BrokerMonitor>,
    shutdown: watch::Sender<bool>,
}

impl ReconciliationSession {
    /// Mount a session: wire the components and start the coordinator,
    /// poller, metrics recorder and (if available) broker monitor.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn mount(backend: Backend, config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;

        let bus = Arc::new(InMemoryEventBus::new());
        let (shutdown, _) = watch::channel(false);

        let coordinator = Arc::new(QueryCoordinator::new(
            Arc::clone(&backend.listing),
            Arc::clone(&bus),
            config.coordinator.clone(),
        ));
        let parameters: Arc<dyn ParameterSource> = coordinator.clone();
        let tracker = Arc::new(PendingOperationTracker::new(
            Arc::clone(&backend.listing),
            parameters,
            Arc::clone(&bus),
            config.tracker.clone(),
        ));

        // Subscribe before anything can publish.
        spawn_metrics_recorder(&bus, tracker.clone(), shutdown.subscribe());

        coordinator.start()?;
        let poller = ReconciliationPoller::new(tracker.clone(), config.poller.clone());
        poller.start()?;

        let saga_log = backend
            .transaction_log
            .map(|log| SagaLogService::new(log, config.saga_log.clone()));
        let monitor = backend
            .broker
            .map(|broker| BrokerMonitor::start(broker, Arc::clone(&bus), config.monitor_interval()));

        info!(
            saga_log = saga_log.is_some(),
            broker_monitor = monitor.is_some(),
            "Reconciliation session mounted"
        );

        Ok(Self {
            config,
            bus,
            creator: backend.creator,
            coordinator,
            tracker,
            poller,
            saga_log,
            monitor,
            shutdown,
        })
    }

    /// Create an entity and track it until the authoritative source
    /// confirms or drops it.
    ///
    /// A failed create registers nothing; the error carries the
    /// user-facing message and whether it was a service-unavailable
    /// rollback.
    pub async fn create(&self, fields: NewEntity) -> Result<Entity, SessionError> {
        self.ensure_live()?;

        let title = fields.title.clone();
        let entity = match self.creator.create(fields).await {
            Ok(entity) => entity,
            Err(e) => {
                warn!(
                    title = %title,
                    error = %e,
                    service_unavailable = e.is_service_unavailable(),
                    "Create failed, nothing tracked"
                );
                return Err(SessionError::create_failed(e));
            }
        };

        self.tracker.track(entity.id.clone())?;
        info!(entity_id = %entity.id, "Entity created, pending reconciliation");

        if let Err(e) = self.coordinator.refresh().await {
            debug!(error = %e, "Listing refresh after create failed");
        }
        Ok(entity)
    }

    /// Fetch and aggregate the SAGA log.
    pub async fn load_saga_log(&self) -> Result<AggregatedLog, SessionError> {
        self.ensure_live()?;
        let service = self.saga_log.as_ref().ok_or(SessionError::NoTransactionLog)?;
        Ok(service.load().await?)
    }

    /// Fetch the SAGA log and keep the most recent transactions.
    pub async fn recent_sagas(&self) -> Result<Vec<SagaTimeline>, SessionError> {
        self.ensure_live()?;
        let service = self.saga_log.as_ref().ok_or(SessionError::NoTransactionLog)?;
        Ok(service.load_recent().await?)
    }

    /// Subscribe to reconciliation events.
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.bus.subscribe(filter)
    }

    /// Watch broker counters, if the backend exposes them.
    pub fn broker_stats(&self) -> Option<watch::Receiver<BrokerStats>> {
        self.monitor.as_ref().map(BrokerMonitor::subscribe)
    }

    /// Entities still awaiting a verdict.
    pub fn pending_count(&self) -> usize {
        self.tracker.pending_count()
    }

    /// The event bus.
    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    /// The pending tracker.
    pub fn tracker(&self) -> &Arc<PendingOperationTracker> {
        &self.tracker
    }

    /// The query coordinator (filter controls and display listing).
    pub fn coordinator(&self) -> &Arc<QueryCoordinator> {
        &self.coordinator
    }

    /// The reconciliation poller.
    pub fn poller(&self) -> &ReconciliationPoller {
        &self.poller
    }

    /// Active configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Stop every periodic task and discard tracked state. Idempotent.
    pub fn dispose(&self) {
        if self.shutdown.send_replace(true) {
            return;
        }
        self.poller.stop();
        self.tracker.dispose();
        self.coordinator.dispose();
        if let Some(monitor) = &self.monitor {
            monitor.stop();
        }
        info!("Reconciliation session disposed");
    }

    fn ensure_live(&self) -> Result<(), SessionError> {
        if self.is_disposed() {
            Err(SessionError::Disposed)
        } else {
            Ok(())
        }
    }
}

impl Drop for ReconciliationSession {
    fn drop(&mut self) {
        self.dispose();
    }
}
