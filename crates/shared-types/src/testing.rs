//! # Test Adapters
//!
//! In-memory implementations of the collaborator ports, shared by the unit
//! tests of every component crate and by the integration suite.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use crate::entities::{
    BrokerStats, Entity, EntityId, NewEntity, QueryParameters, TransactionLogEntry,
};
use crate::errors::ApiError;
use crate::ports::{BrokerStatsSource, EntityCreateApi, EntityListApi, TransactionLogApi};

/// In-memory entity store implementing the create and list ports.
///
/// Listing applies the same filter semantics as the backend: exact match on
/// `status`/`category`/`priority`, case-insensitive substring on `search`.
#[derive(Default)]
pub struct MockEntityStore {
    entities: Mutex<Vec<Entity>>,
    next_id: AtomicU64,
    list_failing: AtomicBool,
    create_error: Mutex<Option<ApiError>>,
    list_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    latency: Mutex<Option<Duration>>,
    last_parameters: Mutex<Option<QueryParameters>>,
}

impl MockEntityStore {
    /// Empty store.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            ..Self::default()
        }
    }

    /// Store pre-populated with entities.
    pub fn with_entities(entities: Vec<Entity>) -> Self {
        let store = Self::new();
        *store.entities.lock() = entities;
        store
    }

    /// Insert or replace an entity.
    pub fn insert(&self, entity: Entity) {
        let mut entities = self.entities.lock();
        entities.retain(|e| e.id != entity.id);
        entities.push(entity);
    }

    /// Remove an entity (simulates a compensating delete).
    pub fn remove(&self, id: &EntityId) -> bool {
        let mut entities = self.entities.lock();
        let before = entities.len();
        entities.retain(|e| &e.id != id);
        entities.len() != before
    }

    /// Make every list call fail until reset.
    pub fn set_list_failing(&self, failing: bool) {
        self.list_failing.store(failing, Ordering::SeqCst);
    }

    /// Make every create call fail with `error` until cleared.
    pub fn set_create_error(&self, error: Option<ApiError>) {
        *self.create_error.lock() = error;
    }

    /// Delay each list response.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    /// Number of list calls received.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Highest number of list calls observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Parameters of the most recent list call.
    pub fn last_parameters(&self) -> Option<QueryParameters> {
        self.last_parameters.lock().clone()
    }

    fn matches(entity: &Entity, parameters: &QueryParameters) -> bool {
        parameters.iter().all(|(name, value)| match name.as_str() {
            "search" => {
                let needle = value.to_lowercase();
                entity.title.to_lowercase().contains(&needle)
                    || entity
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            }
            "status" => entity.status == *value,
            "category" => entity.category.as_deref() == Some(value.as_str()),
            "priority" => entity.priority.as_deref() == Some(value.as_str()),
            _ => true,
        })
    }
}

#[async_trait]
impl EntityListApi for MockEntityStore {
    async fn list(&self, parameters: &QueryParameters) -> Result<Vec<Entity>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_parameters.lock() = Some(parameters.clone());

        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.list_failing.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("mock list failure".to_string()));
        }

        Ok(self
            .entities
            .lock()
            .iter()
            .filter(|e| Self::matches(e, parameters))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EntityCreateApi for MockEntityStore {
    async fn create(&self, fields: NewEntity) -> Result<Entity, ApiError> {
        if let Some(error) = self.create_error.lock().clone() {
            return Err(error);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let entity = Entity {
            id: EntityId::from(id),
            title: fields.title,
            description: fields.description,
            status: "pending".to_string(),
            category: fields.category,
            priority: fields.priority,
            created_at: None,
        };
        self.entities.lock().push(entity.clone());
        Ok(entity)
    }
}

/// In-memory SAGA log implementing the log port.
#[derive(Default)]
pub struct MockTransactionLog {
    entries: Mutex<Vec<TransactionLogEntry>>,
    failing: AtomicBool,
}

impl MockTransactionLog {
    /// Log with initial entries.
    pub fn with_entries(entries: Vec<TransactionLogEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            failing: AtomicBool::new(false),
        }
    }

    /// Append an entry.
    pub fn push(&self, entry: TransactionLogEntry) {
        self.entries.lock().push(entry);
    }

    /// Make fetches fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl TransactionLogApi for MockTransactionLog {
    async fn fetch_log(&self) -> Result<Vec<TransactionLogEntry>, ApiError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("mock log failure".to_string()));
        }
        Ok(self.entries.lock().clone())
    }
}

/// Broker feed returning a fixed snapshot.
#[derive(Default)]
pub struct MockBrokerStats {
    stats: Mutex<BrokerStats>,
    failing: AtomicBool,
}

impl MockBrokerStats {
    /// Replace the reported snapshot.
    pub fn set(&self, stats: BrokerStats) {
        *self.stats.lock() = stats;
    }

    /// Make reads fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl BrokerStatsSource for MockBrokerStats {
    async fn stats(&self) -> Result<BrokerStats, ApiError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ApiError::ServiceUnavailable("broker management API down".into()));
        }
        Ok(self.stats.lock().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: u64, title: &str, status: &str) -> Entity {
        Entity {
            status: status.to_string(),
            ..Entity::new(id, title)
        }
    }

    #[tokio::test]
    async fn test_list_applies_filters() {
        let store = MockEntityStore::with_entities(vec![
            task(1, "Write report", "pending"),
            task(2, "Review report", "done"),
            task(3, "Buy milk", "pending"),
        ]);

        let mut params = QueryParameters::new();
        params.insert("search".into(), "REPORT".into());
        let found = store.list(&params).await.unwrap();
        assert_eq!(found.len(), 2);

        params.insert("status".into(), "done".into());
        let found = store.list(&params).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, EntityId::from(2u64));
        assert_eq!(store.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_list_failure() {
        let store = MockEntityStore::new();
        store.set_list_failing(true);
        assert!(store.list(&QueryParameters::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_create_assigns_ids() {
        let store = MockEntityStore::new();
        let a = store.create(NewEntity::titled("a")).await.unwrap();
        let b = store.create(NewEntity::titled("b")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.list(&QueryParameters::new()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_error_persists_nothing() {
        let store = MockEntityStore::new();
        store.set_create_error(Some(ApiError::ServiceUnavailable("down".into())));
        assert!(store.create(NewEntity::titled("a")).await.is_err());
        assert!(store.list(&QueryParameters::new()).await.unwrap().is_empty());
    }
}
