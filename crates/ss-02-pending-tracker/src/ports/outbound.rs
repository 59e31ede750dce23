//! # Outbound Ports
//!
//! The tracker reads the authoritative listing through
//! [`EntityListApi`] using the filter parameters of a [`ParameterSource`],
//! so display, poll and settle fetches all observe one consistent view.

pub use shared_types::{EntityListApi, ParameterSource, Unfiltered};
