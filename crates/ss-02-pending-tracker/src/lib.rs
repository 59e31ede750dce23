//! # SS-02 Pending Tracker
//!
//! Pending Operation Tracker: follows optimistically-created entities until
//! the authoritative source confirms or drops them.
//!
//! **Component ID:** 02
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## State Machine
//!
//! ```text
//! register ──► PENDING ──settle_after(d): present──────────► CONFIRMED
//!                 │
//!                 ├──reconcile: absent (unfiltered)────────► COMPENSATED
//!                 │
//!                 └──reconcile: inconclusive × max cycles──► dropped (timed out)
//! ```
//!
//! ## Rules
//!
//! | Rule | Description |
//! |------|-------------|
//! | Idempotent registration | Registering a tracked id is a no-op |
//! | One snapshot per pass | All pending entities are judged against the same fetch |
//! | Fetch errors are not evidence | A failed fetch never compensates |
//! | Filtered views are not evidence | Absence under narrowing filters never compensates |
//! | Disposal | After `dispose()` every mutating call returns `TrackerError::Disposed` |
//!
//! ## Module Structure
//!
//! ```text
//! ss-02-pending-tracker/
//! ├── domain/          # PendingSet, TrackedEntity, AuthoritativeSnapshot, reports
//! ├── algorithms/      # reconcile(), settle()
//! ├── ports/           # PendingTrackerApi (inbound), EntityListApi (outbound)
//! ├── application/     # PendingOperationTracker
//! ├── metrics.rs       # Lock-free counters
//! └── config.rs        # TrackerConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod ports;

// Re-exports
pub use application::PendingOperationTracker;
pub use config::TrackerConfig;
pub use domain::{
    AuthoritativeSnapshot, PendingSet, ReconcileReport, SettleOutcome, TrackedEntity,
    TrackerError, TrackingState, DEFAULT_MAX_PENDING_CYCLES, DEFAULT_SETTLE_DELAY,
};
pub use metrics::{TrackerMetrics, TrackerMetricsSnapshot};
pub use ports::PendingTrackerApi;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
