//! # Ports Module

pub mod inbound;

pub use inbound::*;
pub use shared_types::{EntityListApi, ParameterSource};
