//! Lock-free counters for tracker activity.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one tracker instance.
#[derive(Debug, Default)]
pub struct TrackerMetrics {
    /// Entities that entered PENDING
    pub registered: AtomicU64,
    /// Entities confirmed
    pub confirmed: AtomicU64,
    /// Entities compensated
    pub compensated: AtomicU64,
    /// Entities dropped by the cycle budget
    pub timed_out: AtomicU64,
    /// Reconciliation passes applied
    pub reconciliations: AtomicU64,
    /// Authoritative fetches that failed
    pub fetch_failures: AtomicU64,
}

impl TrackerMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a registration
    pub fn record_registered(&self) {
        self.registered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the conclusions of one pass
    pub fn record_pass(&self, confirmed: usize, compensated: usize, timed_out: usize) {
        self.reconciliations.fetch_add(1, Ordering::Relaxed);
        self.record_confirmed(confirmed);
        self.compensated
            .fetch_add(compensated as u64, Ordering::Relaxed);
        self.timed_out.fetch_add(timed_out as u64, Ordering::Relaxed);
    }

    /// Record confirmations outside a periodic pass
    pub fn record_confirmed(&self, count: usize) {
        self.confirmed.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record a failed fetch
    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> TrackerMetricsSnapshot {
        TrackerMetricsSnapshot {
            registered: self.registered.load(Ordering::Relaxed),
            confirmed: self.confirmed.load(Ordering::Relaxed),
            compensated: self.compensated.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            reconciliations: self.reconciliations.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`TrackerMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerMetricsSnapshot {
    /// Entities that entered PENDING
    pub registered: u64,
    /// Entities confirmed
    pub confirmed: u64,
    /// Entities compensated
    pub compensated: u64,
    /// Entities dropped by the cycle budget
    pub timed_out: u64,
    /// Reconciliation passes applied
    pub reconciliations: u64,
    /// Authoritative fetches that failed
    pub fetch_failures: u64,
}

impl TrackerMetricsSnapshot {
    /// Entities that reached a verdict or were dropped.
    pub fn concluded(&self) -> u64 {
        self.confirmed + self.compensated + self.timed_out
    }
}
