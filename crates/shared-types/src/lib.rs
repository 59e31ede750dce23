//! # Shared Types Crate
//!
//! This crate contains the wire model (entities, SAGA log entries, query
//! parameters, broker counters), the collaborator ports and the API error
//! taxonomy shared by every Saga-Sync component.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-component types are defined here.
//! - **Lenient Decoding**: Unknown SAGA statuses and numeric ids decode
//!   without error; only structurally broken payloads are rejected.
//! - **Ports, not Clients**: Components depend on the traits in `ports`,
//!   never on a concrete transport.

pub mod entities;
pub mod errors;
pub mod ports;
pub mod testing;

pub use entities::*;
pub use errors::*;
pub use ports::*;
