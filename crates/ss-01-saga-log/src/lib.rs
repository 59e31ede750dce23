//! # SS-01 SAGA Log
//!
//! Transaction Log Aggregator: turns a flat distributed-transaction log into
//! per-transaction timelines with a derived outcome.
//!
//! **Component ID:** 01
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Rules
//!
//! | Rule | Description |
//! |------|-------------|
//! | Stable grouping | Transactions iterate in order of first appearance |
//! | Arrival order | Entries keep arrival order inside a timeline |
//! | Last-entry outcome | COMPENSATED / COMPENSATION_FAILED last ⇒ `RolledBack` |
//! | Lenient statuses | Unknown labels get a default badge, never abort |
//! | Purity | `aggregate` does no I/O and reads no clock |
//!
//! ## Module Structure
//!
//! ```text
//! ss-01-saga-log/
//! ├── domain/          # SagaTimeline, AggregatedLog, Outcome, badges, invariants
//! ├── algorithms/      # aggregate()
//! ├── ports/           # SagaLogApi (inbound)
//! ├── application/     # SagaLogService over shared_types::TransactionLogApi
//! └── config.rs        # SagaLogConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use algorithms::aggregate;
pub use application::SagaLogService;
pub use config::SagaLogConfig;
pub use domain::{
    check_progression, is_legal_transition, status_badge, AggregatedLog, BadgeColor, Outcome,
    SagaLogError, SagaTimeline, StatusBadge, StatusBadgeExt, TransitionViolation,
    DEFAULT_DISPLAY_LIMIT,
};
pub use ports::SagaLogApi;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
