//! # Integration Test Flows
//!
//! Tests that ss-02-pending-tracker, ss-03-reconciliation-poller and
//! ss-04-query-coordinator work together over the shared bus when wired by
//! hand, the same way a session wires them.
//!
//! ## Flows Tested:
//!
//! 1. **Coordinator → Tracker**: reconciliation fetches use the display filters
//! 2. **Poller → Tracker**: periodic reconciliation concludes pending entities
//! 3. **Tracker → Bus**: every verdict is published exactly once

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, ReconciliationEvent, Subscription};
    use shared_types::testing::MockEntityStore;
    use shared_types::{EntityCreateApi, EntityId, NewEntity};

    use ss_02_pending_tracker::{PendingOperationTracker, PendingTrackerApi, TrackerConfig};
    use ss_03_reconciliation_poller::{
        PollerConfig, ReconciliationPoller, ReconciliationPollerApi, TickOutcome,
    };
    use ss_04_query_coordinator::{CoordinatorConfig, QueryCoordinator, QueryCoordinatorApi};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Harness {
        store: Arc<MockEntityStore>,
        bus: Arc<InMemoryEventBus>,
        coordinator: Arc<QueryCoordinator>,
        tracker: Arc<PendingOperationTracker>,
        poller: ReconciliationPoller,
    }

    impl Harness {
        fn new(max_pending_cycles: u32) -> Self {
            let store = Arc::new(MockEntityStore::new());
            let bus = Arc::new(InMemoryEventBus::new());
            let coordinator = Arc::new(QueryCoordinator::new(
                store.clone(),
                bus.clone(),
                CoordinatorConfig::for_testing(),
            ));
            coordinator.start().unwrap();
            let tracker = Arc::new(PendingOperationTracker::new(
                store.clone(),
                coordinator.clone(),
                bus.clone(),
                TrackerConfig {
                    settle_delay_ms: 100,
                    max_pending_cycles,
                },
            ));
            let poller = ReconciliationPoller::new(tracker.clone(), PollerConfig::for_testing());
            Self {
                store,
                bus,
                coordinator,
                tracker,
                poller,
            }
        }

        fn tracking(&self) -> Subscription {
            self.bus
                .subscribe(EventFilter::topics(vec![EventTopic::Tracking, EventTopic::Faults]))
        }

        /// Create through the store and hand the id to the tracker, as the
        /// create flow does.
        async fn create(&self, title: &str) -> EntityId {
            let entity = self.store.create(NewEntity::titled(title)).await.unwrap();
            self.tracker.track(entity.id.clone()).unwrap();
            entity.id
        }
    }

    fn reconciled(outcome: TickOutcome) -> ss_02_pending_tracker::ReconcileReport {
        match outcome {
            TickOutcome::Reconciled(report) => report,
            other => panic!("Expected a reconciled tick, got {:?}", other),
        }
    }

    fn compensations(events: &[ReconciliationEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, ReconciliationEvent::EntityCompensated(_)))
            .count()
    }

    // =============================================================================
    // COORDINATOR → TRACKER
    // =============================================================================

    /// Absence from a filtered listing proves nothing; once the filter is
    /// cleared the entity is confirmed.
    #[tokio::test(start_paused = true)]
    async fn test_filtered_snapshot_defers_verdict() {
        let h = Harness::new(10);
        let mut events = h.tracking();
        h.coordinator.set_status(Some("done")).unwrap();

        let id = h.create("Write report").await;
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(h.tracker.is_pending(&id));

        for _ in 0..2 {
            let report = reconciled(h.poller.tick().await);
            assert!(report.is_quiet());
            assert_eq!(report.still_pending, 1);
        }
        let parameters = h.store.last_parameters().unwrap();
        assert_eq!(parameters.get("status").map(String::as_str), Some("done"));

        h.coordinator.set_status(None).unwrap();
        let report = reconciled(h.poller.tick().await);
        assert_eq!(report.confirmed, vec![id]);
        assert_eq!(h.tracker.pending_count(), 0);

        let events = events.drain();
        assert_eq!(compensations(&events), 0);
    }

    /// An entity that stays invisible behind a filter is eventually dropped
    /// without a verdict.
    #[tokio::test(start_paused = true)]
    async fn test_filtered_absence_times_out() {
        let h = Harness::new(3);
        let mut events = h.tracking();
        h.coordinator.set_category(Some("work")).unwrap();

        let id = h.create("Buy milk").await;
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(reconciled(h.poller.tick().await).is_quiet());
        assert!(reconciled(h.poller.tick().await).is_quiet());
        let report = reconciled(h.poller.tick().await);
        assert_eq!(report.timed_out, vec![id.clone()]);
        assert_eq!(h.tracker.pending_count(), 0);

        let events = events.drain();
        assert_eq!(compensations(&events), 0);
        assert!(events.contains(&ReconciliationEvent::EntityTimedOut {
            entity_id: id,
            missed_cycles: 3,
        }));
    }

    // =============================================================================
    // POLLER → TRACKER
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_unfiltered_absence_compensates() {
        let h = Harness::new(10);
        let mut events = h.tracking();

        let id = h.create("Doomed").await;
        h.store.remove(&id);

        let report = reconciled(h.poller.tick().await);
        assert_eq!(report.compensated, vec![id.clone()]);
        assert!(!h.tracker.is_pending(&id));

        let notice = events
            .drain()
            .into_iter()
            .find_map(|e| match e {
                ReconciliationEvent::EntityCompensated(notice) => Some(notice),
                _ => None,
            })
            .expect("compensation notice");
        assert_eq!(notice.entity_id, id);
        assert!(notice.message.contains("rolled back"));
    }

    /// A failed fetch changes nothing and the next cycle retries.
    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_leaves_state_unchanged() {
        let h = Harness::new(10);
        let mut events = h.tracking();

        let id = h.create("Flaky").await;
        h.store.set_list_failing(true);

        assert!(matches!(h.poller.tick().await, TickOutcome::Failed(_)));
        assert!(h.tracker.is_pending(&id));
        assert!(events.drain().iter().any(|e| matches!(
            e,
            ReconciliationEvent::ReconcileFailed { retryable: true, .. }
        )));

        h.store.set_list_failing(false);
        h.store.remove(&id);
        let report = reconciled(h.poller.tick().await);
        assert_eq!(report.compensated, vec![id]);
    }

    /// The running loop resolves a mixed batch: survivors confirm after the
    /// settle delay, the removed one compensates, nothing is reported twice.
    #[tokio::test(start_paused = true)]
    async fn test_running_poller_resolves_mixed_batch() {
        let h = Harness::new(10);
        let mut events = h.tracking();
        h.poller.start().unwrap();

        let kept_a = h.create("Kept A").await;
        let removed = h.create("Removed").await;
        let kept_b = h.create("Kept B").await;
        h.store.remove(&removed);

        tokio::time::sleep(Duration::from_millis(450)).await;
        assert_eq!(h.tracker.pending_count(), 0);

        let events = events.drain();
        let confirmed: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                ReconciliationEvent::EntityConfirmed { entity_id } => Some(entity_id.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(confirmed.len(), 2);
        assert!(confirmed.contains(&kept_a));
        assert!(confirmed.contains(&kept_b));
        assert_eq!(compensations(&events), 1);

        let stats = h.poller.stats();
        assert!(stats.reconciled >= 1);
        h.poller.stop();
    }

    // =============================================================================
    // COORDINATOR ALONE
    // =============================================================================

    /// Three keystrokes inside 100 ms produce one fetch, 500 ms after the
    /// last one, with the final search text.
    #[tokio::test(start_paused = true)]
    async fn test_debounced_search_single_fetch() {
        let h = Harness::new(10);

        h.coordinator.set_search(Some("r")).unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        h.coordinator.set_search(Some("re")).unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        h.coordinator.set_search(Some("rep")).unwrap();

        tokio::time::sleep(Duration::from_millis(490)).await;
        assert_eq!(h.store.list_calls(), 0);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(h.store.list_calls(), 1);
        let parameters = h.store.last_parameters().unwrap();
        assert_eq!(parameters.get("search").map(String::as_str), Some("rep"));
    }
}
