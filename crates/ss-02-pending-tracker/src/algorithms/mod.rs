//! # Algorithms Module
//!
//! Pure state-machine steps over the pending set.

pub mod reconcile;

pub use reconcile::{mark_settle_elapsed, reconcile, settle, SettleVerdict};
