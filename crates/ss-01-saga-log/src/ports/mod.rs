//! # Ports Module
//!
//! Inbound API of the aggregator. The outbound port is
//! `shared_types::TransactionLogApi`.

pub mod inbound;

pub use inbound::*;
