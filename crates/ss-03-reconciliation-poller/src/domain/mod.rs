//! # Domain Module
//!
//! Core domain types for the Reconciliation Poller.

pub mod errors;
pub mod value_objects;

pub use errors::*;
pub use value_objects::*;
