//! # Collaborator Ports
//!
//! Driven ports for the external services the reconciliation core consumes.
//! Adapters (REST clients, in-memory fakes) implement these; the core only
//! ever sees the traits.

use async_trait::async_trait;

use crate::entities::{BrokerStats, Entity, NewEntity, QueryParameters, TransactionLogEntry};
use crate::errors::ApiError;

/// Entity Create API (Driven Port).
///
/// A successful create has started a distributed transaction whose outcome
/// is not yet known.
#[async_trait]
pub trait EntityCreateApi: Send + Sync {
    /// Create an entity.
    async fn create(&self, fields: NewEntity) -> Result<Entity, ApiError>;
}

/// Entity List API (Driven Port).
///
/// Used for display and as the authoritative source for reconciliation.
#[async_trait]
pub trait EntityListApi: Send + Sync {
    /// List entities matching the filter parameters.
    async fn list(&self, parameters: &QueryParameters) -> Result<Vec<Entity>, ApiError>;
}

/// Transaction Log API (Driven Port).
#[async_trait]
pub trait TransactionLogApi: Send + Sync {
    /// Fetch the raw SAGA log.
    async fn fetch_log(&self) -> Result<Vec<TransactionLogEntry>, ApiError>;
}

/// Broker monitoring feed (Driven Port, display only).
#[async_trait]
pub trait BrokerStatsSource: Send + Sync {
    /// Current broker counters.
    async fn stats(&self) -> Result<BrokerStats, ApiError>;
}

/// Source of the current server-side filter parameters.
///
/// Every fetch (display, poll, settle check) reads from the same source so
/// they all observe one consistent filtered view.
pub trait ParameterSource: Send + Sync {
    /// Current parameters.
    fn current_parameters(&self) -> QueryParameters;

    /// Whether the current parameters narrow the listing.
    fn is_filtered(&self) -> bool {
        !self.current_parameters().is_empty()
    }
}

/// Parameter source that never filters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unfiltered;

impl ParameterSource for Unfiltered {
    fn current_parameters(&self) -> QueryParameters {
        QueryParameters::new()
    }
}
