//! # Inbound Ports
//!
//! Filter controls exposed to the presentation layer.

use async_trait::async_trait;
use shared_types::Entity;
use tokio::sync::watch;

use crate::domain::{CoordinatorError, FilterCriteria, Listing};

/// Query coordinator API - inbound port.
///
/// Setters return whether the value changed; unchanged values trigger no
/// fetch.
#[async_trait]
pub trait QueryCoordinatorApi: Send + Sync {
    /// Update the search text. The fetch waits for typing to pause.
    fn set_search(&self, value: Option<&str>) -> Result<bool, CoordinatorError>;

    /// Update the status filter and fetch immediately.
    fn set_status(&self, value: Option<&str>) -> Result<bool, CoordinatorError>;

    /// Update the category filter and fetch immediately.
    fn set_category(&self, value: Option<&str>) -> Result<bool, CoordinatorError>;

    /// Update the priority filter and fetch immediately.
    fn set_priority(&self, value: Option<&str>) -> Result<bool, CoordinatorError>;

    /// Drop every filter and fetch the unfiltered listing.
    fn clear_all(&self) -> Result<bool, CoordinatorError>;

    /// Current criteria.
    fn criteria(&self) -> FilterCriteria;

    /// Fetch now with the current parameters, bypassing the debounce.
    async fn refresh(&self) -> Result<Vec<Entity>, CoordinatorError>;

    /// Latest listing state.
    fn listing(&self) -> Listing;

    /// Watch the listing state.
    fn subscribe_listing(&self) -> watch::Receiver<Listing>;

    /// Cancel the debounce timer and stop the worker.
    fn dispose(&self);
}
