//! # Sync Runtime Library
//!
//! Mounts the reconciliation components as one session and exposes them
//! for embedding and testing. The demo entry point is the `main.rs` binary.
//!
//! ## Modules
//!
//! - `container/` - Session configuration, lifecycle and errors
//! - `handlers/` - Broker monitor and metrics recorder tasks
//! - `adapters/` - Simulated backend implementing every collaborator port
//!
//! ## Lifecycle
//!
//! 1. `ReconciliationSession::mount` wires bus, coordinator, tracker and poller
//! 2. `create` registers successful creates as pending
//! 3. Poller and settle checks conclude each pending entity
//! 4. `dispose` (or drop) stops every periodic task

#![warn(missing_docs)]
#![allow(clippy::type_complexity)]

pub mod adapters;
pub mod container;
pub mod handlers;

pub use container::{
    Backend, ConfigError, ReconciliationSession, SessionConfig, SessionError,
    DEFAULT_MONITOR_INTERVAL,
};
pub use handlers::BrokerMonitor;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
