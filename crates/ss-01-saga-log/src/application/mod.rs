//! # Application Module
//!
//! Application service wiring the aggregator to the log source.

pub mod service;

pub use service::SagaLogService;
