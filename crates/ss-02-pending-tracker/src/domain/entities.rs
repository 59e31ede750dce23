//! # Domain Entities
//!
//! Tracked entities and the pending set that owns them.

use serde::{Deserialize, Serialize};
use shared_types::EntityId;
use std::collections::HashMap;
use tokio::time::Instant;

/// Lifecycle state of a tracked entity.
///
/// ```text
/// PENDING ──present after settle──► CONFIRMED
///    │
///    └──absent from unfiltered snapshot──► COMPENSATED
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackingState {
    /// Created optimistically, outcome unknown.
    Pending,
    /// Observed in the authoritative source after the settle delay.
    Confirmed,
    /// Disappeared from the authoritative source.
    Compensated,
}

impl TrackingState {
    /// Whether this is a terminal state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// An optimistically-created entity whose transaction outcome is unknown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackedEntity {
    /// Entity id returned by the create call.
    pub id: EntityId,
    /// Current state.
    pub state: TrackingState,
    /// When the entity entered PENDING.
    pub registered_at: Instant,
    /// Periodic reconciliations that did not conclude this entity.
    pub missed_cycles: u32,
    /// Set once the settle check has run without confirming.
    pub settle_elapsed: bool,
    sequence: u64,
}

impl TrackedEntity {
    /// Time spent in the tracker so far.
    #[must_use]
    pub fn age(&self) -> std::time::Duration {
        self.registered_at.elapsed()
    }
}

/// The set of PENDING entities.
///
/// Only PENDING entities are stored: concluding an entity removes it and
/// hands the final record back to the caller.
#[derive(Debug, Default)]
pub struct PendingSet {
    entries: HashMap<EntityId, TrackedEntity>,
    next_sequence: u64,
}

impl PendingSet {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `id` as PENDING. Returns `false` if it was already tracked.
    pub fn register(&mut self, id: EntityId, now: Instant) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.insert(
            id.clone(),
            TrackedEntity {
                id,
                state: TrackingState::Pending,
                registered_at: now,
                missed_cycles: 0,
                settle_elapsed: false,
                sequence,
            },
        );
        true
    }

    /// Number of PENDING entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `id` is PENDING.
    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.entries.contains_key(id)
    }

    /// Look up a PENDING entity.
    #[must_use]
    pub fn get(&self, id: &EntityId) -> Option<&TrackedEntity> {
        self.entries.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &EntityId) -> Option<&mut TrackedEntity> {
        self.entries.get_mut(id)
    }

    /// PENDING ids in registration order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        let mut tracked: Vec<&TrackedEntity> = self.entries.values().collect();
        tracked.sort_by_key(|t| t.sequence);
        tracked.into_iter().map(|t| t.id.clone()).collect()
    }

    /// Copies of every PENDING record, in registration order.
    #[must_use]
    pub fn entities(&self) -> Vec<TrackedEntity> {
        let mut tracked: Vec<TrackedEntity> = self.entries.values().cloned().collect();
        tracked.sort_by_key(|t| t.sequence);
        tracked
    }

    /// Remove `id`, stamping the record with its final `state`.
    pub fn conclude(&mut self, id: &EntityId, state: TrackingState) -> Option<TrackedEntity> {
        let mut tracked = self.entries.remove(id)?;
        tracked.state = state;
        Some(tracked)
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
