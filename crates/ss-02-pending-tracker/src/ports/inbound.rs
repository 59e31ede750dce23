//! # Inbound Ports
//!
//! API exposed to the poller, the session and the presentation layer.

use async_trait::async_trait;
use shared_types::EntityId;

use crate::domain::{AuthoritativeSnapshot, ReconcileReport, TrackedEntity, TrackerError};

/// Pending tracker API - inbound port.
#[async_trait]
pub trait PendingTrackerApi: Send + Sync {
    /// Track `id` as PENDING. Returns `Ok(false)` if it was already tracked.
    fn register(&self, id: EntityId) -> Result<bool, TrackerError>;

    /// Judge every PENDING entity against one snapshot.
    fn reconcile(&self, snapshot: &AuthoritativeSnapshot) -> Result<ReconcileReport, TrackerError>;

    /// Fetch the authoritative listing with the current parameters and
    /// reconcile against it. A failed fetch changes nothing.
    async fn reconcile_fetch(&self) -> Result<ReconcileReport, TrackerError>;

    /// Number of PENDING entities. Never does I/O.
    fn pending_count(&self) -> usize;

    /// Whether `id` is PENDING.
    fn is_pending(&self, id: &EntityId) -> bool;

    /// Copies of the PENDING records.
    fn pending(&self) -> Vec<TrackedEntity>;

    /// Cancel scheduled work and refuse further mutation.
    fn dispose(&self);

    /// Whether [`dispose`](Self::dispose) has been called.
    fn is_disposed(&self) -> bool;
}
