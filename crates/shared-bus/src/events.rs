//! # Reconciliation Events
//!
//! Defines every notification that flows through the shared bus. The
//! tracker is the only producer of entity lifecycle events; the coordinator
//! and broker monitor publish informational events.

use serde::{Deserialize, Serialize};
use shared_types::entities::{BrokerStats, EntityId, QueryParameters};

/// User-facing notice that an optimistically-created entity was rolled back.
///
/// Compensation is a normal terminal state, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensationNotice {
    /// The entity that disappeared from the authoritative source.
    pub entity_id: EntityId,
    /// Human-readable explanation.
    pub message: String,
}

impl CompensationNotice {
    /// Notice with the standard rollback message.
    #[must_use]
    pub fn rolled_back(entity_id: EntityId) -> Self {
        let message = format!(
            "Task {entity_id} was rolled back: the distributed transaction was compensated"
        );
        Self { entity_id, message }
    }
}

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReconciliationEvent {
    // =========================================================================
    // PENDING OPERATION TRACKER
    // =========================================================================
    /// An entity entered PENDING.
    EntityRegistered {
        /// Registered entity.
        entity_id: EntityId,
    },

    /// A pending entity was observed in the authoritative source after its
    /// settle delay and is now CONFIRMED.
    EntityConfirmed {
        /// Confirmed entity.
        entity_id: EntityId,
    },

    /// A pending entity was missing from an unfiltered authoritative
    /// snapshot and is now COMPENSATED.
    EntityCompensated(CompensationNotice),

    /// A pending entity stayed unresolved for too many cycles and was
    /// dropped without a verdict.
    EntityTimedOut {
        /// Dropped entity.
        entity_id: EntityId,
        /// Reconciliation cycles it survived.
        missed_cycles: u32,
    },

    /// A reconciliation fetch failed. Tracked state was left untouched.
    ReconcileFailed {
        /// Component that issued the fetch.
        source: String,
        /// Error text.
        error: String,
        /// Whether a later retry may succeed.
        retryable: bool,
    },

    // =========================================================================
    // FILTERED QUERY COORDINATOR
    // =========================================================================
    /// The display listing was refreshed.
    ListingRefreshed {
        /// Rows returned.
        count: usize,
        /// Parameters used for the fetch.
        parameters: QueryParameters,
    },

    // =========================================================================
    // BROKER MONITOR
    // =========================================================================
    /// New broker counters are available.
    BrokerStatsUpdated(BrokerStats),
}

impl ReconciliationEvent {
    /// Get the topic for this event.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::EntityRegistered { .. }
            | Self::EntityConfirmed { .. }
            | Self::EntityCompensated(_)
            | Self::EntityTimedOut { .. } => EventTopic::Tracking,
            Self::ReconcileFailed { .. } => EventTopic::Faults,
            Self::ListingRefreshed { .. } => EventTopic::Listing,
            Self::BrokerStatsUpdated(_) => EventTopic::Monitoring,
        }
    }

    /// Entity the event is about, if any.
    #[must_use]
    pub fn entity_id(&self) -> Option<&EntityId> {
        match self {
            Self::EntityRegistered { entity_id }
            | Self::EntityConfirmed { entity_id }
            | Self::EntityTimedOut { entity_id, .. } => Some(entity_id),
            Self::EntityCompensated(notice) => Some(&notice.entity_id),
            _ => None,
        }
    }
}

/// Event topics for filtering subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Entity lifecycle transitions.
    Tracking,
    /// Transient fetch failures.
    Faults,
    /// Display listing refreshes.
    Listing,
    /// Broker counters.
    Monitoring,
    /// Wildcard.
    All,
}

impl EventTopic {
    /// Lowercase label, used for metric labels.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tracking => "tracking",
            Self::Faults => "faults",
            Self::Listing => "listing",
            Self::Monitoring => "monitoring",
            Self::All => "all",
        }
    }
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to subscribe to (empty = all topics).
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &ReconciliationEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_topic_mapping() {
        let event = ReconciliationEvent::EntityConfirmed {
            entity_id: EntityId::from("A"),
        };
        assert_eq!(event.topic(), EventTopic::Tracking);
        assert_eq!(event.entity_id(), Some(&EntityId::from("A")));
        assert_eq!(event.topic().name(), "tracking");
    }

    #[test]
    fn test_filter_all() {
        let filter = EventFilter::all();
        let event = ReconciliationEvent::BrokerStatsUpdated(BrokerStats::default());
        assert!(filter.matches(&event));
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = EventFilter::topics(vec![EventTopic::Tracking]);

        let tracking = ReconciliationEvent::EntityCompensated(CompensationNotice::rolled_back(
            EntityId::from("A"),
        ));
        assert!(filter.matches(&tracking));

        let fault = ReconciliationEvent::ReconcileFailed {
            source: "poller".into(),
            error: "timeout".into(),
            retryable: true,
        };
        assert!(!filter.matches(&fault));
    }

    #[test]
    fn test_rolled_back_notice_names_entity() {
        let notice = CompensationNotice::rolled_back(EntityId::from(12u64));
        assert!(notice.message.contains("12"));
        assert!(notice.message.contains("rolled back"));
    }
}
