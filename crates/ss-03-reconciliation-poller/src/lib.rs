//! # SS-03 Reconciliation Poller
//!
//! Periodically asks the Pending Operation Tracker to reconcile against a
//! fresh authoritative listing.
//!
//! **Component ID:** 03
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Tick Rules
//!
//! | Condition | Tick does |
//! |-----------|-----------|
//! | Nothing pending | Nothing (no fetch) |
//! | Fetch in flight | Nothing (skipped, not queued) |
//! | Otherwise | `reconcile_fetch()` on the tracker |
//!
//! Settle checks are scheduled by the tracker per entity and run
//! independently of this loop.
//!
//! ## Usage
//!
//! ```ignore
//! let poller = ReconciliationPoller::new(tracker, PollerConfig::default());
//! poller.start()?;
//! // manual refresh
//! let outcome = poller.tick().await;
//! poller.stop();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use application::ReconciliationPoller;
pub use config::PollerConfig;
pub use domain::{PollerError, PollerStats, TickOutcome, DEFAULT_POLL_INTERVAL};
pub use ports::ReconciliationPollerApi;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
