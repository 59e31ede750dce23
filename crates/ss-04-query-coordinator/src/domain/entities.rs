//! # Domain Entities
//!
//! The filter criteria held by the coordinator.

use serde::{Deserialize, Serialize};
use shared_types::QueryParameters;

/// A filterable field of the listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterField {
    /// Free-text search over title and description.
    Search,
    /// Exact status.
    Status,
    /// Exact category.
    Category,
    /// Exact priority.
    Priority,
}

impl FilterField {
    /// All fields, in parameter order.
    pub const ALL: [FilterField; 4] = [Self::Search, Self::Status, Self::Category, Self::Priority];

    /// Query parameter name.
    #[must_use]
    pub fn param_name(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Status => "status",
            Self::Category => "category",
            Self::Priority => "priority",
        }
    }

    /// Whether changes to this field wait for typing to pause.
    #[must_use]
    pub fn is_debounced(self) -> bool {
        matches!(self, Self::Search)
    }
}

/// Current filter values. `None` means "no constraint".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Free-text search.
    pub search: Option<String>,
    /// Exact status.
    pub status: Option<String>,
    /// Exact category.
    pub category: Option<String>,
    /// Exact priority.
    pub priority: Option<String>,
}

impl FilterCriteria {
    /// No constraints.
    #[must_use]
    pub fn unfiltered() -> Self {
        Self::default()
    }

    /// Trim `raw`; blank input means absent.
    #[must_use]
    pub fn normalize(raw: Option<&str>) -> Option<String> {
        raw.map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Current value of `field`.
    #[must_use]
    pub fn get(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::Search => self.search.as_deref(),
            FilterField::Status => self.status.as_deref(),
            FilterField::Category => self.category.as_deref(),
            FilterField::Priority => self.priority.as_deref(),
        }
    }

    /// Set `field` to the normalized `raw`. Returns whether it changed.
    pub fn set(&mut self, field: FilterField, raw: Option<&str>) -> bool {
        let value = Self::normalize(raw);
        let slot = match field {
            FilterField::Search => &mut self.search,
            FilterField::Status => &mut self.status,
            FilterField::Category => &mut self.category,
            FilterField::Priority => &mut self.priority,
        };
        if *slot == value {
            return false;
        }
        *slot = value;
        true
    }

    /// Reset every field. Returns whether anything was set.
    pub fn clear(&mut self) -> bool {
        let changed = !self.is_empty();
        *self = Self::default();
        changed
    }

    /// Whether no field constrains the listing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        FilterField::ALL.iter().all(|f| self.get(*f).is_none())
    }

    /// Parameters for the list call. Absent fields are omitted.
    #[must_use]
    pub fn to_parameters(&self) -> QueryParameters {
        FilterField::ALL
            .iter()
            .filter_map(|f| {
                self.get(*f)
                    .map(|v| (f.param_name().to_string(), v.to_string()))
            })
            .collect()
    }
}
