//! # Application Layer
//!
//! Tracker service implementing the inbound port.

pub mod service;

pub use service::PendingOperationTracker;
