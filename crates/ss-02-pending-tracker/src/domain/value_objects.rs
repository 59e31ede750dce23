//! # Domain Value Objects
//!
//! Snapshots handed to reconciliation and the reports it produces.

use serde::{Deserialize, Serialize};
use shared_types::{Entity, EntityId, QueryParameters};
use std::collections::HashSet;
use tokio::time::Instant;

/// The set of ids present in one authoritative listing.
///
/// A snapshot taken under narrowing filter parameters is `filtered`: an id
/// missing from it may simply be filtered out, so it can confirm entities
/// but never prove a rollback.
///
/// `taken_at` is when the request went out. Entities registered after it
/// cannot appear in the answer, so the snapshot says nothing about them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthoritativeSnapshot {
    ids: HashSet<EntityId>,
    filtered: bool,
    taken_at: Instant,
}

impl AuthoritativeSnapshot {
    /// Snapshot of the complete listing.
    pub fn unfiltered<I: IntoIterator<Item = EntityId>>(ids: I) -> Self {
        Self {
            ids: ids.into_iter().collect(),
            filtered: false,
            taken_at: Instant::now(),
        }
    }

    /// Snapshot of a narrowed listing.
    pub fn filtered<I: IntoIterator<Item = EntityId>>(ids: I) -> Self {
        Self {
            ids: ids.into_iter().collect(),
            filtered: true,
            taken_at: Instant::now(),
        }
    }

    /// Build from a listing response and the parameters it was fetched with.
    #[must_use]
    pub fn from_listing(entities: &[Entity], parameters: &QueryParameters) -> Self {
        Self {
            ids: entities.iter().map(|e| e.id.clone()).collect(),
            filtered: !parameters.is_empty(),
            taken_at: Instant::now(),
        }
    }

    /// Stamp the instant the request was sent.
    #[must_use]
    pub fn requested_at(mut self, at: Instant) -> Self {
        self.taken_at = at;
        self
    }

    /// When the request behind this snapshot was sent.
    #[must_use]
    pub fn taken_at(&self) -> Instant {
        self.taken_at
    }

    /// Whether the request went out before `registered_at`.
    #[must_use]
    pub fn predates(&self, registered_at: Instant) -> bool {
        registered_at > self.taken_at
    }

    /// Whether `id` is present.
    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.ids.contains(id)
    }

    /// Whether absence in this snapshot proves a rollback.
    #[must_use]
    pub fn proves_absence(&self) -> bool {
        !self.filtered
    }

    /// Whether the listing was narrowed by filters.
    #[must_use]
    pub fn is_filtered(&self) -> bool {
        self.filtered
    }

    /// Number of ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the listing was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Result of one reconciliation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Entities confirmed by this pass.
    pub confirmed: Vec<EntityId>,
    /// Entities compensated by this pass.
    pub compensated: Vec<EntityId>,
    /// Entities dropped after too many inconclusive cycles.
    pub timed_out: Vec<EntityId>,
    /// Entities still PENDING afterwards.
    pub still_pending: usize,
}

impl ReconcileReport {
    /// Whether the pass concluded nothing.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.confirmed.is_empty() && self.compensated.is_empty() && self.timed_out.is_empty()
    }
}

/// How a settle check ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettleOutcome {
    /// Present in the fresh fetch: now CONFIRMED.
    Confirmed,
    /// Absent from the fresh fetch: left for the periodic reconcile.
    StillPending,
    /// Concluded by someone else before the check ran.
    AlreadySettled,
    /// The fetch failed; nothing changed.
    FetchFailed,
    /// The tracker was disposed first.
    Cancelled,
}
