//! # Integration Tests
//!
//! Cross-component flows over the shared bus.

pub mod e2e_session;
pub mod flows;
pub mod saga_log;
