//! # End-to-End Session Tests
//!
//! Drives a mounted `ReconciliationSession` against the simulated backend:
//! optimistic create, backend-side compensation, 503 rejection, SAGA log
//! aggregation and metrics, all through the public session API.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use saga_telemetry::{gather_metrics, register_metrics, ENTITIES_COMPENSATED};
    use shared_bus::{EventFilter, EventTopic, ReconciliationEvent};
    use shared_types::{NewEntity, SagaStatus};
    use ss_01_saga_log::Outcome;
    use ss_04_query_coordinator::{Listing, QueryCoordinatorApi};
    use sync_runtime::adapters::{SimulatedBackend, TASK_EXCHANGE};
    use sync_runtime::{Backend, ReconciliationSession, SessionConfig, SessionError};

    fn mount(backend: &Arc<SimulatedBackend>) -> ReconciliationSession {
        ReconciliationSession::mount(
            Backend::from_service(backend.clone()),
            SessionConfig::for_testing(),
        )
        .unwrap()
    }

    /// Every second create is rolled back 50 ms after it returned, before
    /// its settle check runs.
    fn backend() -> Arc<SimulatedBackend> {
        Arc::new(SimulatedBackend::new(2, Duration::from_millis(50)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_and_compensate_through_session() {
        let backend = backend();
        let session = mount(&backend);
        let mut events = session.subscribe(EventFilter::topics(vec![EventTopic::Tracking]));

        let kept = session.create(NewEntity::titled("Kept")).await.unwrap();
        let rolled_back = session.create(NewEntity::titled("Rolled back")).await.unwrap();
        assert_eq!(session.pending_count(), 2);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(session.pending_count(), 0);

        let events = events.drain();
        assert!(events.contains(&ReconciliationEvent::EntityConfirmed {
            entity_id: kept.id.clone()
        }));
        assert!(events.iter().any(|e| matches!(
            e,
            ReconciliationEvent::EntityCompensated(notice) if notice.entity_id == rolled_back.id
        )));
        assert!(!events.contains(&ReconciliationEvent::EntityConfirmed {
            entity_id: rolled_back.id
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_saga_log_reflects_outcomes() {
        let backend = backend();
        let session = mount(&backend);

        session.create(NewEntity::titled("First")).await.unwrap();
        session.create(NewEntity::titled("Second")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        let log = session.load_saga_log().await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.outcome_counts(), (1, 1));

        let rolled_back = log
            .iter()
            .find(|t| t.outcome() == Outcome::RolledBack)
            .unwrap();
        assert_eq!(rolled_back.last_status(), &SagaStatus::Compensated);
        assert!(rolled_back.transition_violations().is_empty());

        let recent = session.recent_sagas().await.unwrap();
        assert!(recent.len() <= session.config().saga_log.display_limit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_503_create_tracks_nothing() {
        let backend = backend();
        let session = mount(&backend);
        let mut events = session.subscribe(EventFilter::all());

        backend.set_notifications_down(true);
        let err = session
            .create(NewEntity::titled("Send digest"))
            .await
            .unwrap_err();

        assert!(err.is_service_unavailable());
        assert!(matches!(err, SessionError::CreateFailed { .. }));
        assert!(err.to_string().contains("not created"));
        assert_eq!(session.pending_count(), 0);
        assert!(!events
            .drain()
            .iter()
            .any(|e| matches!(e, ReconciliationEvent::EntityRegistered { .. })));

        let log = session.load_saga_log().await.unwrap();
        let timeline = log.iter().next().unwrap();
        assert_eq!(timeline.last_status(), &SagaStatus::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_refreshes_listing() {
        let backend = backend();
        let session = mount(&backend);
        let mut listing = session.coordinator().subscribe_listing();

        session.create(NewEntity::titled("Visible")).await.unwrap();

        assert!(listing.has_changed().unwrap());
        match &*listing.borrow_and_update() {
            Listing::Loaded { entities, .. } => assert_eq!(entities.len(), 1),
            other => panic!("Expected a loaded listing, got {:?}", other),
        };
    }

    #[tokio::test(start_paused = true)]
    async fn test_broker_panel_tracks_backlog() {
        let backend = backend();
        let session = mount(&backend);
        let stats = session.broker_stats().unwrap();

        session.create(NewEntity::titled("One")).await.unwrap();
        session.create(NewEntity::titled("Two")).await.unwrap();

        tokio::time::sleep(Duration::from_millis(110)).await;
        let exchange = stats.borrow().exchanges[0].clone();
        assert_eq!(exchange.name, TASK_EXCHANGE);
        assert_eq!(exchange.published, 2);
        assert_eq!(exchange.consumed, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_compensation_recorded_in_metrics() {
        register_metrics().unwrap();
        let before = ENTITIES_COMPENSATED.get();

        let backend = backend();
        let session = mount(&backend);
        session.create(NewEntity::titled("One")).await.unwrap();
        session.create(NewEntity::titled("Two")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert!(ENTITIES_COMPENSATED.get() >= before + 1.0);
        let exposition = gather_metrics().unwrap();
        assert!(exposition.contains("ss_tracker_entities_compensated_total"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_session_stops_polling() {
        let backend = backend();
        let session = mount(&backend);
        session.create(NewEntity::titled("Orphan")).await.unwrap();
        drop(session);

        let before = backend.list_calls();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(backend.list_calls(), before);
    }
}
