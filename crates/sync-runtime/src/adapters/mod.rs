//! # Adapters
//!
//! Port implementations for running a session without a real backend.

pub mod simulated;

pub use simulated::{SimulatedBackend, TASK_EXCHANGE};
