//! # Reconciliation
//!
//! Compares the pending set against one authoritative snapshot.
//!
//! Every pending entity is judged against the same snapshot:
//!
//! | Present? | Snapshot | Settle check ran | Verdict |
//! |----------|----------|------------------|---------|
//! | any | requested before registration | any | skipped |
//! | no | unfiltered | any | COMPENSATED |
//! | no | filtered | any | inconclusive |
//! | yes | any | yes | CONFIRMED |
//! | yes | any | no | inconclusive (confirmation waits for the settle delay) |
//!
//! The periodic pass confirming settled entities is intentional: a settle
//! check whose own fetch failed would otherwise leave the entity to time out.
//!
//! Inconclusive entities accrue a missed cycle; once `max_pending_cycles`
//! is reached they are dropped without a verdict. Skipped entities accrue
//! nothing.

use shared_types::EntityId;

use crate::domain::{AuthoritativeSnapshot, PendingSet, ReconcileReport, TrackingState};

/// Run one periodic reconciliation over `set`.
pub fn reconcile(
    set: &mut PendingSet,
    snapshot: &AuthoritativeSnapshot,
    max_pending_cycles: u32,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for id in set.ids() {
        let Some(tracked) = set.get(&id) else {
            continue;
        };
        if snapshot.predates(tracked.registered_at) {
            continue;
        }
        let settle_elapsed = tracked.settle_elapsed;
        let present = snapshot.contains(&id);

        if !present && snapshot.proves_absence() {
            set.conclude(&id, TrackingState::Compensated);
            report.compensated.push(id);
        } else if present && settle_elapsed {
            set.conclude(&id, TrackingState::Confirmed);
            report.confirmed.push(id);
        } else if miss_cycle(set, &id, max_pending_cycles) {
            set.conclude(&id, TrackingState::Pending);
            report.timed_out.push(id);
        }
    }

    report.still_pending = set.len();
    report
}

/// Result of checking one entity against a settle-time snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettleVerdict {
    /// Present: confirmed and removed.
    Confirmed,
    /// Absent: left PENDING for the periodic reconcile.
    Deferred,
    /// Not pending any more.
    NotTracked,
}

/// Settle one entity against a fresh snapshot.
///
/// Absence never compensates here, even in an unfiltered snapshot: the
/// periodic reconcile owns that verdict.
pub fn settle(
    set: &mut PendingSet,
    id: &EntityId,
    snapshot: &AuthoritativeSnapshot,
) -> SettleVerdict {
    if !set.contains(id) {
        return SettleVerdict::NotTracked;
    }
    if snapshot.contains(id) {
        set.conclude(id, TrackingState::Confirmed);
        SettleVerdict::Confirmed
    } else {
        mark_settle_elapsed(set, id);
        SettleVerdict::Deferred
    }
}

/// Record that the settle check for `id` ran without confirming it.
pub fn mark_settle_elapsed(set: &mut PendingSet, id: &EntityId) {
    if let Some(tracked) = set.get_mut(id) {
        tracked.settle_elapsed = true;
    }
}

/// Bump the missed-cycle counter. Returns `true` when the budget is spent.
fn miss_cycle(set: &mut PendingSet, id: &EntityId, max_pending_cycles: u32) -> bool {
    match set.get_mut(id) {
        Some(tracked) => {
            tracked.missed_cycles = tracked.missed_cycles.saturating_add(1);
            max_pending_cycles > 0 && tracked.missed_cycles >= max_pending_cycles
        }
        None => false,
    }
}
