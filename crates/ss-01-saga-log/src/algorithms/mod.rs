//! # Algorithms Module
//!
//! Pure log aggregation.

pub mod aggregate;

pub use aggregate::aggregate;
