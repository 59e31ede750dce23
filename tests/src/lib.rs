//! # Saga-Sync Test Suite
//!
//! Unified test crate for flows that cross component boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs        # Tracker + poller + coordinator wired by hand
//!     ├── e2e_session.rs  # Full session against the simulated backend
//!     └── saga_log.rs     # Log aggregation through the service port
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ss-tests
//!
//! # By category
//! cargo test -p ss-tests integration::flows
//! cargo test -p ss-tests integration::e2e_session
//! ```

pub mod integration;
