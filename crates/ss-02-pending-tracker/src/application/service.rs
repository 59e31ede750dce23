//! # Pending Operation Tracker Service
//!
//! Owns the pending set, performs authoritative fetches and publishes the
//! resulting notifications on the event bus.
//!
//! The pending set sits behind a `parking_lot` mutex that is only taken
//! between awaits, so every reconciliation judges all pending entities
//! against one snapshot with no interleaving.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::{CompensationNotice, InMemoryEventBus, ReconciliationEvent};
use shared_types::{ApiError, EntityId, EntityListApi, ParameterSource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::algorithms::{self, SettleVerdict};
use crate::config::TrackerConfig;
use crate::domain::{
    AuthoritativeSnapshot, PendingSet, ReconcileReport, SettleOutcome, TrackedEntity, TrackerError,
};
use crate::metrics::{TrackerMetrics, TrackerMetricsSnapshot};
use crate::ports::PendingTrackerApi;

/// Pending Operation Tracker - the optimistic entity state machine.
pub struct PendingOperationTracker {
    /// Configuration.
    config: TrackerConfig,
    /// PENDING entities.
    pending: Mutex<PendingSet>,
    /// Mirror of `pending.len()` for lock-free reads.
    pending_count: AtomicUsize,
    /// Authoritative listing (driven port).
    source: Arc<dyn EntityListApi>,
    /// Filter parameters shared with the display listing.
    parameters: Arc<dyn ParameterSource>,
    /// Notification sink.
    bus: Arc<InMemoryEventBus>,
    /// Activity counters.
    metrics: TrackerMetrics,
    /// Flips to `true` on dispose.
    shutdown: watch::Sender<bool>,
}

impl PendingOperationTracker {
    /// Create a new tracker.
    pub fn new(
        source: Arc<dyn EntityListApi>,
        parameters: Arc<dyn ParameterSource>,
        bus: Arc<InMemoryEventBus>,
        config: TrackerConfig,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            pending: Mutex::new(PendingSet::new()),
            pending_count: AtomicUsize::new(0),
            source,
            parameters,
            bus,
            metrics: TrackerMetrics::new(),
            shutdown,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Counter snapshot.
    pub fn metrics(&self) -> TrackerMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Register `id` and schedule its settle check with the configured
    /// delay. Returns the settle handle, or `None` if `id` was already
    /// tracked (its settle check is already scheduled).
    pub fn track(
        self: &Arc<Self>,
        id: EntityId,
    ) -> Result<Option<JoinHandle<SettleOutcome>>, TrackerError> {
        if !self.register(id.clone())? {
            return Ok(None);
        }
        Ok(Some(self.settle_after(id, self.config.settle_delay())))
    }

    /// After `delay`, confirm `id` if a fresh fetch shows it.
    ///
    /// Absence leaves the entity PENDING for the periodic reconcile to
    /// conclude. Dispose cancels the wait and any fetch in flight.
    pub fn settle_after(
        self: &Arc<Self>,
        id: EntityId,
        delay: Duration,
    ) -> JoinHandle<SettleOutcome> {
        let tracker = Arc::clone(self);
        let mut shutdown = self.shutdown.subscribe();

        tokio::spawn(async move {
            if *shutdown.borrow_and_update() {
                return SettleOutcome::Cancelled;
            }
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => return SettleOutcome::Cancelled,
            }
            tracker.settle_now(&id).await
        })
    }

    async fn settle_now(&self, id: &EntityId) -> SettleOutcome {
        if self.is_disposed() {
            return SettleOutcome::Cancelled;
        }
        {
            let mut set = self.pending.lock();
            if !set.contains(id) {
                return SettleOutcome::AlreadySettled;
            }
            algorithms::mark_settle_elapsed(&mut set, id);
        }

        let mut shutdown = self.shutdown.subscribe();
        let fetched = tokio::select! {
            fetched = self.fetch_snapshot() => fetched,
            _ = shutdown.changed() => return SettleOutcome::Cancelled,
        };
        if self.is_disposed() {
            return SettleOutcome::Cancelled;
        }

        let snapshot = match fetched {
            Ok(snapshot) => snapshot,
            Err(err) => {
                self.report_fetch_failure("settle", &err);
                return SettleOutcome::FetchFailed;
            }
        };

        let verdict = {
            let mut set = self.pending.lock();
            let verdict = algorithms::settle(&mut set, id, &snapshot);
            self.pending_count.store(set.len(), Ordering::Release);
            verdict
        };

        match verdict {
            SettleVerdict::Confirmed => {
                self.metrics.record_confirmed(1);
                info!(entity_id = %id, "Pending entity confirmed");
                self.bus
                    .publish_now(ReconciliationEvent::EntityConfirmed { entity_id: id.clone() });
                SettleOutcome::Confirmed
            }
            SettleVerdict::Deferred => {
                debug!(entity_id = %id, "Entity absent at settle time, awaiting periodic reconcile");
                SettleOutcome::StillPending
            }
            SettleVerdict::NotTracked => SettleOutcome::AlreadySettled,
        }
    }

    /// Fetch the authoritative listing under the current parameters.
    ///
    /// The snapshot is stamped with the instant the request went out, so
    /// entities registered while it was in flight are not judged by it.
    pub async fn fetch_snapshot(&self) -> Result<AuthoritativeSnapshot, ApiError> {
        let parameters = self.parameters.current_parameters();
        let requested = Instant::now();
        let entities = self.source.list(&parameters).await?;
        Ok(AuthoritativeSnapshot::from_listing(&entities, &parameters).requested_at(requested))
    }

    fn ensure_live(&self) -> Result<(), TrackerError> {
        if self.is_disposed() {
            Err(TrackerError::Disposed)
        } else {
            Ok(())
        }
    }

    fn report_fetch_failure(&self, origin: &str, err: &ApiError) {
        self.metrics.record_fetch_failure();
        warn!(
            origin,
            error = %err,
            retryable = err.is_retryable(),
            pending = self.pending_count(),
            "Authoritative fetch failed, tracked state unchanged"
        );
        self.bus.publish_now(ReconciliationEvent::ReconcileFailed {
            source: format!("pending-tracker/{origin}"),
            error: err.to_string(),
            retryable: err.is_retryable(),
        });
    }

    fn publish_report(&self, report: &ReconcileReport) {
        for id in &report.confirmed {
            info!(entity_id = %id, "Pending entity confirmed");
            self.bus
                .publish_now(ReconciliationEvent::EntityConfirmed { entity_id: id.clone() });
        }
        for id in &report.compensated {
            info!(entity_id = %id, "Pending entity compensated");
            self.bus.publish_now(ReconciliationEvent::EntityCompensated(
                CompensationNotice::rolled_back(id.clone()),
            ));
        }
        for id in &report.timed_out {
            warn!(
                entity_id = %id,
                missed_cycles = self.config.max_pending_cycles,
                "Pending entity unresolved, dropping without verdict"
            );
            self.bus.publish_now(ReconciliationEvent::EntityTimedOut {
                entity_id: id.clone(),
                missed_cycles: self.config.max_pending_cycles,
            });
        }
    }
}

#[async_trait]
impl PendingTrackerApi for PendingOperationTracker {
    fn register(&self, id: EntityId) -> Result<bool, TrackerError> {
        self.ensure_live()?;
        let inserted = {
            let mut set = self.pending.lock();
            let inserted = set.register(id.clone(), Instant::now());
            self.pending_count.store(set.len(), Ordering::Release);
            inserted
        };

        if inserted {
            self.metrics.record_registered();
            debug!(entity_id = %id, pending = self.pending_count(), "Entity registered as pending");
            self.bus
                .publish_now(ReconciliationEvent::EntityRegistered { entity_id: id });
        }
        Ok(inserted)
    }

    fn reconcile(&self, snapshot: &AuthoritativeSnapshot) -> Result<ReconcileReport, TrackerError> {
        self.ensure_live()?;
        let report = {
            let mut set = self.pending.lock();
            let report = algorithms::reconcile(&mut set, snapshot, self.config.max_pending_cycles);
            self.pending_count.store(set.len(), Ordering::Release);
            report
        };

        self.metrics.record_pass(
            report.confirmed.len(),
            report.compensated.len(),
            report.timed_out.len(),
        );
        self.publish_report(&report);
        debug!(
            snapshot = snapshot.len(),
            filtered = snapshot.is_filtered(),
            confirmed = report.confirmed.len(),
            compensated = report.compensated.len(),
            timed_out = report.timed_out.len(),
            still_pending = report.still_pending,
            "Reconciliation applied"
        );
        Ok(report)
    }

    async fn reconcile_fetch(&self) -> Result<ReconcileReport, TrackerError> {
        self.ensure_live()?;
        match self.fetch_snapshot().await {
            Ok(snapshot) => self.reconcile(&snapshot),
            Err(err) => {
                self.report_fetch_failure("reconcile", &err);
                Err(err.into())
            }
        }
    }

    fn pending_count(&self) -> usize {
        self.pending_count.load(Ordering::Acquire)
    }

    fn is_pending(&self, id: &EntityId) -> bool {
        self.pending.lock().contains(id)
    }

    fn pending(&self) -> Vec<TrackedEntity> {
        self.pending.lock().entities()
    }

    fn dispose(&self) {
        if self.shutdown.send_replace(true) {
            return;
        }
        let dropped = {
            let mut set = self.pending.lock();
            let dropped = set.len();
            set.clear();
            self.pending_count.store(0, Ordering::Release);
            dropped
        };
        info!(dropped, "Pending tracker disposed");
    }

    fn is_disposed(&self) -> bool {
        *self.shutdown.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::EventFilter;
    use shared_types::testing::MockEntityStore;
    use shared_types::{Entity, QueryParameters, Unfiltered};

    /// Listing that reads the store when the request arrives and answers
    /// after a delay, like a server whose response is already on the wire.
    struct SlowListing {
        store: Arc<MockEntityStore>,
        delay: Duration,
    }

    #[async_trait]
    impl EntityListApi for SlowListing {
        async fn list(&self, parameters: &QueryParameters) -> Result<Vec<Entity>, ApiError> {
            let rows = self.store.list(parameters).await;
            tokio::time::sleep(self.delay).await;
            rows
        }
    }

    struct StatusFilter;

    impl ParameterSource for StatusFilter {
        fn current_parameters(&self) -> QueryParameters {
            let mut params = QueryParameters::new();
            params.insert("status".into(), "done".into());
            params
        }
    }

    fn tracker_with(
        store: Arc<MockEntityStore>,
        parameters: Arc<dyn ParameterSource>,
    ) -> (Arc<PendingOperationTracker>, Arc<InMemoryEventBus>) {
        let bus = Arc::new(InMemoryEventBus::new());
        let tracker = Arc::new(PendingOperationTracker::new(
            store,
            parameters,
            bus.clone(),
            TrackerConfig::for_testing(),
        ));
        (tracker, bus)
    }

    fn tracker(
        store: Arc<MockEntityStore>,
    ) -> (Arc<PendingOperationTracker>, Arc<InMemoryEventBus>) {
        tracker_with(store, Arc::new(Unfiltered))
    }

    #[tokio::test]
    async fn test_register_idempotent() {
        let (tracker, bus) = tracker(Arc::new(MockEntityStore::new()));
        let mut sub = bus.subscribe(EventFilter::all());

        assert!(tracker.register(EntityId::from("A")).unwrap());
        assert!(!tracker.register(EntityId::from("A")).unwrap());
        assert_eq!(tracker.pending_count(), 1);
        assert_eq!(sub.drain().len(), 1);
        assert_eq!(tracker.metrics().registered, 1);
    }

    #[tokio::test]
    async fn test_empty_listing_compensates() {
        let (tracker, bus) = tracker(Arc::new(MockEntityStore::new()));
        let mut sub = bus.subscribe(EventFilter::all());
        tracker.register(EntityId::from("A")).unwrap();

        let report = tracker.reconcile(&AuthoritativeSnapshot::unfiltered(vec![])).unwrap();
        assert_eq!(report.compensated, vec![EntityId::from("A")]);
        assert_eq!(tracker.pending_count(), 0);

        let notices: Vec<_> = sub
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                ReconciliationEvent::EntityCompensated(notice) => Some(notice),
                _ => None,
            })
            .collect();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].entity_id, EntityId::from("A"));
        assert!(!notices[0].message.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_changes_nothing() {
        let store = Arc::new(MockEntityStore::new());
        store.set_list_failing(true);
        let (tracker, bus) = tracker(store);
        let mut sub = bus.subscribe(EventFilter::all());
        tracker.register(EntityId::from("A")).unwrap();
        sub.drain();

        let err = tracker.reconcile_fetch().await.unwrap_err();
        assert!(err.is_retryable());
        assert!(tracker.is_pending(&EntityId::from("A")));
        assert_eq!(tracker.pending()[0].missed_cycles, 0);
        assert_eq!(tracker.metrics().fetch_failures, 1);

        let events = sub.drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ReconciliationEvent::ReconcileFailed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_present_confirms() {
        let store = Arc::new(MockEntityStore::with_entities(vec![Entity::new(1u64, "a")]));
        let (tracker, _bus) = tracker(store.clone());
        tracker.register(EntityId::from(1u64)).unwrap();

        let started = Instant::now();
        let outcome = tracker
            .settle_after(EntityId::from(1u64), Duration::from_secs(3))
            .await
            .unwrap();

        assert_eq!(outcome, SettleOutcome::Confirmed);
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert_eq!(tracker.pending_count(), 0);
        assert_eq!(store.list_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_absent_then_periodic_concludes() {
        let store = Arc::new(MockEntityStore::new());
        let (tracker, _bus) = tracker(store);
        tracker.register(EntityId::from("A")).unwrap();

        let outcome = tracker
            .settle_after(EntityId::from("A"), Duration::from_secs(3))
            .await
            .unwrap();
        assert_eq!(outcome, SettleOutcome::StillPending);
        assert_eq!(tracker.pending_count(), 1);

        let report = tracker.reconcile_fetch().await.unwrap();
        assert_eq!(report.compensated, vec![EntityId::from("A")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_fetch_failure_then_periodic_confirms() {
        let store = Arc::new(MockEntityStore::with_entities(vec![Entity::new("A", "a")]));
        store.set_list_failing(true);
        let (tracker, _bus) = tracker(store.clone());
        tracker.register(EntityId::from("A")).unwrap();

        let outcome = tracker
            .settle_after(EntityId::from("A"), Duration::from_secs(3))
            .await
            .unwrap();
        assert_eq!(outcome, SettleOutcome::FetchFailed);
        assert!(tracker.is_pending(&EntityId::from("A")));

        store.set_list_failing(false);
        let report = tracker.reconcile_fetch().await.unwrap();
        assert_eq!(report.confirmed, vec![EntityId::from("A")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_after_compensation_is_noop() {
        let (tracker, _bus) = tracker(Arc::new(MockEntityStore::new()));
        tracker.register(EntityId::from("A")).unwrap();
        let handle = tracker.settle_after(EntityId::from("A"), Duration::from_secs(3));

        tracker.reconcile(&AuthoritativeSnapshot::unfiltered(vec![])).unwrap();
        assert_eq!(handle.await.unwrap(), SettleOutcome::AlreadySettled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_filtered_fetch_never_compensates() {
        let store = Arc::new(MockEntityStore::new());
        let (tracker, _bus) = tracker_with(store.clone(), Arc::new(StatusFilter));
        tracker.register(EntityId::from("A")).unwrap();

        let report = tracker.reconcile_fetch().await.unwrap();
        assert!(report.compensated.is_empty());
        assert_eq!(tracker.pending_count(), 1);
        assert_eq!(
            store.last_parameters().unwrap().get("status").map(String::as_str),
            Some("done")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_drops_unresolved() {
        let (tracker, bus) = tracker_with(Arc::new(MockEntityStore::new()), Arc::new(StatusFilter));
        let mut sub = bus.subscribe(EventFilter::all());
        tracker.register(EntityId::from("A")).unwrap();

        for _ in 0..3 {
            tracker.reconcile_fetch().await.unwrap();
        }
        assert_eq!(tracker.pending_count(), 0);
        assert!(sub.drain().iter().any(|e| matches!(
            e,
            ReconciliationEvent::EntityTimedOut { missed_cycles: 3, .. }
        )));
        assert_eq!(tracker.metrics().timed_out, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_track_schedules_settle_once() {
        let store = Arc::new(MockEntityStore::with_entities(vec![Entity::new("A", "a")]));
        let (tracker, _bus) = tracker(store);

        let handle = tracker.track(EntityId::from("A")).unwrap();
        assert!(handle.is_some());
        assert!(tracker.track(EntityId::from("A")).unwrap().is_none());

        assert_eq!(handle.unwrap().await.unwrap(), SettleOutcome::Confirmed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_cancels_settle_and_refuses_mutation() {
        let (tracker, _bus) = tracker(Arc::new(MockEntityStore::new()));
        tracker.register(EntityId::from("A")).unwrap();
        let handle = tracker.settle_after(EntityId::from("A"), Duration::from_secs(3));

        tracker.dispose();
        assert_eq!(handle.await.unwrap(), SettleOutcome::Cancelled);
        assert!(tracker.is_disposed());
        assert_eq!(tracker.pending_count(), 0);
        assert_eq!(
            tracker.register(EntityId::from("B")).unwrap_err(),
            TrackerError::Disposed
        );
        assert_eq!(
            tracker.reconcile_fetch().await.unwrap_err(),
            TrackerError::Disposed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_registration_during_fetch_is_not_compensated() {
        let store = Arc::new(MockEntityStore::with_entities(vec![Entity::new("A", "a")]));
        let source = Arc::new(SlowListing {
            store: store.clone(),
            delay: Duration::from_millis(200),
        });
        let bus = Arc::new(InMemoryEventBus::new());
        let tracker = Arc::new(PendingOperationTracker::new(
            source,
            Arc::new(Unfiltered),
            bus.clone(),
            TrackerConfig::for_testing(),
        ));
        let mut sub = bus.subscribe(EventFilter::all());
        tracker.register(EntityId::from("A")).unwrap();

        let in_flight = tokio::spawn({
            let tracker = Arc::clone(&tracker);
            async move { tracker.reconcile_fetch().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.insert(Entity::new("B", "b"));
        tracker.register(EntityId::from("B")).unwrap();

        let report = in_flight.await.unwrap().unwrap();
        assert!(report.compensated.is_empty());
        assert!(tracker.is_pending(&EntityId::from("B")));
        let fresh = tracker
            .pending()
            .into_iter()
            .find(|t| t.id == EntityId::from("B"))
            .unwrap();
        assert_eq!(fresh.missed_cycles, 0);
        assert!(!sub
            .drain()
            .iter()
            .any(|e| matches!(e, ReconciliationEvent::EntityCompensated(_))));

        let report = tracker.reconcile_fetch().await.unwrap();
        assert!(report.compensated.is_empty());
        assert_eq!(tracker.pending_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_during_settle_fetch() {
        let store = Arc::new(MockEntityStore::with_entities(vec![Entity::new("A", "a")]));
        store.set_latency(Some(Duration::from_secs(10)));
        let (tracker, _bus) = tracker(store);
        tracker.register(EntityId::from("A")).unwrap();
        let handle = tracker.settle_after(EntityId::from("A"), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_secs(2)).await;
        tracker.dispose();
        assert_eq!(handle.await.unwrap(), SettleOutcome::Cancelled);
    }
}
