//! # Simulated Backend
//!
//! In-memory stand-in for the SAGA-backed task service, used by the demo
//! binary. Every create writes a SAGA timeline to the transaction log.
//! Every `compensate_every`-th create is rolled back shortly after it
//! returned: the entity disappears from the listing and the timeline ends
//! with COMPENSATED, which is what the reconciliation components have to
//! discover.

use async_trait::async_trait;
use chrono::Utc;
use shared_types::testing::{MockEntityStore, MockTransactionLog};
use shared_types::{
    ApiError, BrokerStats, BrokerStatsSource, Entity, EntityCreateApi, EntityListApi,
    ExchangeStats, NewEntity, QueryParameters, SagaStatus, TransactionId, TransactionLogApi,
    TransactionLogEntry,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Exchange the create SAGA publishes to.
pub const TASK_EXCHANGE: &str = "task_events";

/// Simulated task service.
pub struct SimulatedBackend {
    store: Arc<MockEntityStore>,
    log: Arc<MockTransactionLog>,
    compensate_every: u64,
    compensation_delay: Duration,
    creates: AtomicU64,
    consumed: Arc<AtomicU64>,
}

impl SimulatedBackend {
    /// Backend that rolls back every `compensate_every`-th create (0 never)
    /// `compensation_delay` after returning it.
    pub fn new(compensate_every: u64, compensation_delay: Duration) -> Self {
        Self {
            store: Arc::new(MockEntityStore::new()),
            log: Arc::new(MockTransactionLog::default()),
            compensate_every,
            compensation_delay,
            creates: AtomicU64::new(0),
            consumed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Make every create fail with a 503, as when the notification
    /// service is down.
    pub fn set_notifications_down(&self, down: bool) {
        let error = down.then(|| {
            ApiError::from_status(
                503,
                "Notification service is unavailable. The task was not created.",
            )
        });
        self.store.set_create_error(error);
    }

    /// Listing requests received so far.
    pub fn list_calls(&self) -> usize {
        self.store.list_calls()
    }

    fn record(&self, transaction_id: &TransactionId, status: SagaStatus, details: &str) {
        self.log.push(TransactionLogEntry::new(
            transaction_id.clone(),
            status,
            Utc::now(),
            details,
        ));
    }
}

#[async_trait]
impl EntityCreateApi for SimulatedBackend {
    async fn create(&self, fields: NewEntity) -> Result<Entity, ApiError> {
        let n = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
        let transaction_id = TransactionId::new(format!("saga-{n:04}"));
        self.record(&transaction_id, SagaStatus::Started, "Create task SAGA started");

        let entity = match self.store.create(fields).await {
            Ok(entity) => entity,
            Err(e) => {
                self.record(&transaction_id, SagaStatus::Failed, &e.to_string());
                return Err(e);
            }
        };
        self.record(
            &transaction_id,
            SagaStatus::TaskCreated,
            &format!("Task {} persisted", entity.id),
        );

        if self.compensate_every > 0 && n % self.compensate_every == 0 {
            let store = Arc::clone(&self.store);
            let log = Arc::clone(&self.log);
            let consumed = Arc::clone(&self.consumed);
            let delay = self.compensation_delay;
            let id = entity.id.clone();
            debug!(entity_id = %id, transaction_id = %transaction_id, "Scheduling compensation");
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                store.remove(&id);
                log.push(TransactionLogEntry::new(
                    transaction_id,
                    SagaStatus::Compensated,
                    Utc::now(),
                    format!("Task {id} deleted by compensating action"),
                ));
                consumed.fetch_add(1, Ordering::SeqCst);
            });
        } else {
            self.record(&transaction_id, SagaStatus::Completed, "Notification sent");
            self.consumed.fetch_add(1, Ordering::SeqCst);
        }

        Ok(entity)
    }
}

#[async_trait]
impl EntityListApi for SimulatedBackend {
    async fn list(&self, parameters: &QueryParameters) -> Result<Vec<Entity>, ApiError> {
        self.store.list(parameters).await
    }
}

#[async_trait]
impl TransactionLogApi for SimulatedBackend {
    async fn fetch_log(&self) -> Result<Vec<TransactionLogEntry>, ApiError> {
        self.log.fetch_log().await
    }
}

#[async_trait]
impl BrokerStatsSource for SimulatedBackend {
    async fn stats(&self) -> Result<BrokerStats, ApiError> {
        let exchange = ExchangeStats {
            name: TASK_EXCHANGE.to_string(),
            published: self.creates.load(Ordering::SeqCst),
            consumed: self.consumed.load(Ordering::SeqCst),
        };
        Ok(BrokerStats {
            pending_messages: exchange.backlog(),
            exchanges: vec![exchange],
        })
    }
}
