//! # Domain Value Objects

use serde::{Deserialize, Serialize};
use shared_types::{Entity, QueryParameters};
use std::time::Duration;

/// Default quiescence window for search input.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// State of the display listing, as seen by the presentation layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Listing {
    /// No fetch has completed yet.
    #[default]
    NotLoaded,
    /// The latest fetch succeeded.
    Loaded {
        /// Rows returned.
        entities: Vec<Entity>,
        /// Parameters the rows were fetched with.
        parameters: QueryParameters,
    },
    /// The latest fetch failed.
    Failed {
        /// User-facing message.
        message: String,
        /// Whether retrying may help.
        retryable: bool,
        /// Parameters of the failed fetch.
        parameters: QueryParameters,
    },
}

impl Listing {
    /// Rows, if loaded.
    #[must_use]
    pub fn entities(&self) -> Option<&[Entity]> {
        match self {
            Self::Loaded { entities, .. } => Some(entities),
            _ => None,
        }
    }

    /// Parameters of the fetch that produced this state.
    #[must_use]
    pub fn parameters(&self) -> Option<&QueryParameters> {
        match self {
            Self::NotLoaded => None,
            Self::Loaded { parameters, .. } | Self::Failed { parameters, .. } => Some(parameters),
        }
    }
}
