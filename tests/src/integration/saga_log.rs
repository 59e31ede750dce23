//! # SAGA Log Integration
//!
//! Feeds backend-shaped JSON through the transaction log port and checks
//! the aggregated view the log panel renders.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shared_types::testing::MockTransactionLog;
    use shared_types::{SagaStatus, TransactionId, TransactionLogEntry};
    use ss_01_saga_log::{
        BadgeColor, Outcome, SagaLogApi, SagaLogConfig, SagaLogService, StatusBadgeExt,
    };

    /// Log as the backend serves it: `saga_id`, naive timestamps, an
    /// interleaved second transaction and one label the UI has never seen.
    const WIRE_LOG: &str = r#"[
        {"saga_id": "t1", "status": "STARTED", "timestamp": "2024-05-01T10:00:00", "details": "Create task"},
        {"saga_id": "t2", "status": "STARTED", "timestamp": "2024-05-01T10:00:01", "details": "Create task"},
        {"saga_id": "t1", "status": "TASK_CREATED", "timestamp": "2024-05-01T10:00:02", "details": "Task 7"},
        {"saga_id": "t2", "status": "COMPENSATED", "timestamp": "2024-05-01T10:00:03", "details": "Rolled back"},
        {"saga_id": "t1", "status": "COMPLETED", "timestamp": "2024-05-01T10:00:04", "details": "Notified"},
        {"saga_id": "t3", "status": "RETRYING", "timestamp": "2024-05-01T10:00:05", "details": ""}
    ]"#;

    fn service(entries: Vec<TransactionLogEntry>) -> SagaLogService<MockTransactionLog> {
        SagaLogService::new(
            Arc::new(MockTransactionLog::with_entries(entries)),
            SagaLogConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_wire_log_aggregates_per_transaction() {
        let entries: Vec<TransactionLogEntry> = serde_json::from_str(WIRE_LOG).unwrap();
        let log = service(entries).load().await.unwrap();

        let ids: Vec<_> = log.transaction_ids().map(TransactionId::as_str).collect();
        assert_eq!(ids, vec!["t1", "t2", "t3"]);
        assert_eq!(log.entry_count(), 6);

        let t1 = log.get(&TransactionId::new("t1")).unwrap();
        assert_eq!(t1.outcome(), Outcome::Successful);
        assert_eq!(t1.entries().len(), 3);
        assert!(t1.is_time_ordered());

        let t2 = log.get(&TransactionId::new("t2")).unwrap();
        assert_eq!(t2.outcome(), Outcome::RolledBack);
        assert_eq!(t2.outcome().badge().label, "ROLLBACK");
    }

    #[tokio::test]
    async fn test_unknown_status_gets_default_badge() {
        let entries: Vec<TransactionLogEntry> = serde_json::from_str(WIRE_LOG).unwrap();
        let log = service(entries).load().await.unwrap();

        let t3 = log.get(&TransactionId::new("t3")).unwrap();
        assert_eq!(t3.last_status(), &SagaStatus::Unknown("RETRYING".into()));
        let badge = t3.last_status().badge();
        assert_eq!(badge.color, BadgeColor::Default);
        assert_eq!(badge.label, "RETRYING");
        assert_eq!(t3.unknown_status_count(), 1);
    }

    #[tokio::test]
    async fn test_recent_view_is_newest_first() {
        let entries: Vec<TransactionLogEntry> = serde_json::from_str(WIRE_LOG).unwrap();
        let service = SagaLogService::new(
            Arc::new(MockTransactionLog::with_entries(entries)),
            SagaLogConfig {
                display_limit: 2,
                report_violations: true,
            },
        );

        let recent = service.load_recent().await.unwrap();
        let ids: Vec<_> = recent.iter().map(|t| t.transaction_id().as_str()).collect();
        assert_eq!(ids, vec!["t3", "t1"]);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_view() {
        let source = Arc::new(MockTransactionLog::with_entries(
            serde_json::from_str(WIRE_LOG).unwrap(),
        ));
        let service = SagaLogService::new(source.clone(), SagaLogConfig::default());
        let first = service.load().await.unwrap();

        source.set_failing(true);
        let err = service.load().await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(service.last_loaded(), Some(first));
    }
}
