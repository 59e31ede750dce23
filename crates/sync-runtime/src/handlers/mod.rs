//! # Background Handlers
//!
//! Tasks a session spawns next to the reconciliation components.

pub mod broker_monitor;
pub mod metrics_recorder;

pub use broker_monitor::BrokerMonitor;
pub use metrics_recorder::{record_event, spawn_metrics_recorder};
