//! # Session Container
//!
//! Configuration, lifecycle and error types of a reconciliation session.

pub mod config;
pub mod errors;
pub mod session;

pub use config::{ConfigError, SessionConfig, DEFAULT_MONITOR_INTERVAL};
pub use errors::SessionError;
pub use session::{Backend, ReconciliationSession};
