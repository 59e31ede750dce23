//! # SS-04 Query Coordinator
//!
//! Filtered Query Coordinator: owns the listing filters and decides when a
//! filter change becomes a fetch.
//!
//! **Component ID:** 04
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Trigger Rules
//!
//! | Change | Fetch |
//! |--------|-------|
//! | `search` | After 500 ms without further search input |
//! | `status` / `category` / `priority` | Immediately, cancelling a pending search debounce |
//! | `clear_all` | Immediately, unfiltered |
//! | Unchanged or blank-to-absent value | None |
//!
//! The coordinator implements [`shared_types::ParameterSource`]; the
//! pending tracker reads its parameters so reconciliation and display see
//! the same filtered view.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use application::QueryCoordinator;
pub use config::CoordinatorConfig;
pub use domain::{CoordinatorError, FilterCriteria, FilterField, Listing, DEFAULT_SEARCH_DEBOUNCE};
pub use ports::QueryCoordinatorApi;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
