//! # Ports Module
//!
//! The poller's only driven port is the tracker's inbound API.

pub mod inbound;

pub use inbound::*;
pub use ss_02_pending_tracker::PendingTrackerApi;
