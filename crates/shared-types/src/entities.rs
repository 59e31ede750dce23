//! # Core Domain Entities
//!
//! Defines the wire model shared by every Saga-Sync component.
//!
//! ## Clusters
//!
//! - **Entities**: `EntityId`, `Entity`, `NewEntity`
//! - **SAGA Log**: `TransactionId`, `SagaStatus`, `TransactionLogEntry`
//! - **Queries**: `QueryParameters`
//! - **Broker**: `BrokerStats`, `ExchangeStats`

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// CLUSTER A: ENTITIES
// =============================================================================

/// Identifier of an optimistically-created business entity (a task).
///
/// Backends disagree on whether ids are numbers or strings, so both forms
/// are accepted on the wire and normalized to text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create an id from any textual representation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the textual form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Self(text),
            RawId::Number(number) => Self(number.to_string()),
        })
    }
}

/// A row of the authoritative entity listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity identifier.
    pub id: EntityId,
    /// Short title.
    pub title: String,
    /// Optional long description.
    #[serde(default)]
    pub description: Option<String>,
    /// Business status (e.g. "pending", "done").
    #[serde(default = "default_entity_status")]
    pub status: String,
    /// Optional category label.
    #[serde(default)]
    pub category: Option<String>,
    /// Optional priority label.
    #[serde(default)]
    pub priority: Option<String>,
    /// Creation time, when the backend reports it.
    #[serde(default, with = "optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_entity_status() -> String {
    "pending".to_string()
}

impl Entity {
    /// Create a minimal entity with the default status.
    pub fn new(id: impl Into<EntityId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            status: default_entity_status(),
            category: None,
            priority: None,
            created_at: None,
        }
    }
}

/// Fields submitted to the create API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntity {
    /// Short title (required by the backend).
    pub title: String,
    /// Optional long description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional category label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Optional priority label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl NewEntity {
    /// Create with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

// =============================================================================
// CLUSTER B: SAGA LOG
// =============================================================================

/// Correlation id grouping the log entries of one distributed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Create a transaction id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the textual form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Status of a single SAGA step.
///
/// The label set is open-ended. Labels this crate does not know are kept
/// verbatim in `Unknown` instead of failing the parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SagaStatus {
    /// The SAGA began.
    Started,
    /// The local create step committed.
    TaskCreated,
    /// A generic intermediate step committed.
    StepCompleted,
    /// Every step committed.
    Completed,
    /// A compensating action undid earlier steps.
    Compensated,
    /// The SAGA aborted with an error.
    Failed,
    /// The compensating action itself failed.
    CompensationFailed,
    /// A label outside the known set.
    Unknown(String),
}

impl SagaStatus {
    /// Parse a wire label. Never fails.
    #[must_use]
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "STARTED" => Self::Started,
            "TASK_CREATED" => Self::TaskCreated,
            "STEP_COMPLETED" => Self::StepCompleted,
            "COMPLETED" => Self::Completed,
            "COMPENSATED" => Self::Compensated,
            "FAILED" => Self::Failed,
            "COMPENSATION_FAILED" => Self::CompensationFailed,
            _ => Self::Unknown(label.to_string()),
        }
    }

    /// Wire label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Started => "STARTED",
            Self::TaskCreated => "TASK_CREATED",
            Self::StepCompleted => "STEP_COMPLETED",
            Self::Completed => "COMPLETED",
            Self::Compensated => "COMPENSATED",
            Self::Failed => "FAILED",
            Self::CompensationFailed => "COMPENSATION_FAILED",
            Self::Unknown(label) => label,
        }
    }

    /// Whether this status ends a SAGA in a rolled-back state.
    #[must_use]
    pub fn is_rollback(&self) -> bool {
        matches!(self, Self::Compensated | Self::CompensationFailed)
    }

    /// Whether the label was recognized.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for SagaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for SagaStatus {
    fn from(label: &str) -> Self {
        Self::parse(label)
    }
}

impl Serialize for SagaStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SagaStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::parse(&label))
    }
}

/// One step of a distributed transaction as recorded by the log source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLogEntry {
    /// Correlation id of the owning transaction.
    #[serde(alias = "saga_id")]
    pub transaction_id: TransactionId,
    /// Step status.
    pub status: SagaStatus,
    /// When the step happened.
    #[serde(with = "flexible_timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Free-text description.
    #[serde(default)]
    pub details: String,
}

impl TransactionLogEntry {
    /// Create a log entry.
    pub fn new(
        transaction_id: impl Into<TransactionId>,
        status: impl Into<SagaStatus>,
        timestamp: DateTime<Utc>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            status: status.into(),
            timestamp,
            details: details.into(),
        }
    }
}

/// Parse a log timestamp.
///
/// Accepts RFC 3339 as well as naive ISO-8601 (no offset), which is read
/// as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

mod flexible_timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}

mod optional_timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(
        ts: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.serialize_some(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}"))),
            None => Ok(None),
        }
    }
}

// =============================================================================
// CLUSTER C: QUERIES
// =============================================================================

/// Server-side filter parameters (`name -> value`).
///
/// Ordered so two equal parameter sets render identically.
pub type QueryParameters = BTreeMap<String, String>;

// =============================================================================
// CLUSTER D: BROKER MONITORING
// =============================================================================

/// Counters for one broker exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeStats {
    /// Exchange name (e.g. "task_events").
    pub name: String,
    /// Messages published.
    pub published: u64,
    /// Messages consumed.
    pub consumed: u64,
}

impl ExchangeStats {
    /// Published but not yet consumed.
    #[must_use]
    pub fn backlog(&self) -> u64 {
        self.published.saturating_sub(self.consumed)
    }
}

/// Snapshot of broker counters for the informational panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerStats {
    /// Per-exchange counters.
    pub exchanges: Vec<ExchangeStats>,
    /// Messages waiting in queues.
    pub pending_messages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entity_id_accepts_numbers_and_strings() {
        let numeric: EntityId = serde_json::from_str("42").unwrap();
        let textual: EntityId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(numeric, textual);
        assert_eq!(numeric.as_str(), "42");
    }

    #[test]
    fn test_entity_defaults() {
        let entity: Entity = serde_json::from_str(r#"{"id": 7, "title": "write docs"}"#).unwrap();
        assert_eq!(entity.id, EntityId::from(7u64));
        assert_eq!(entity.status, "pending");
        assert!(entity.description.is_none());
        assert!(entity.created_at.is_none());
    }

    #[test]
    fn test_entity_naive_created_at() {
        let entity: Entity = serde_json::from_str(
            r#"{"id": "9", "title": "t", "created_at": "2024-05-02T09:30:00.123456"}"#,
        )
        .unwrap();
        let created = entity.created_at.unwrap();
        assert_eq!(created.to_rfc3339(), "2024-05-02T09:30:00.123456+00:00");
    }

    #[test]
    fn test_status_parse_known_labels() {
        assert_eq!(SagaStatus::parse("STARTED"), SagaStatus::Started);
        assert_eq!(SagaStatus::parse("compensated"), SagaStatus::Compensated);
        assert_eq!(
            SagaStatus::parse("COMPENSATION_FAILED"),
            SagaStatus::CompensationFailed
        );
    }

    #[test]
    fn test_status_parse_unknown_label() {
        let status = SagaStatus::parse("RETRYING");
        assert_eq!(status, SagaStatus::Unknown("RETRYING".to_string()));
        assert_eq!(status.as_str(), "RETRYING");
        assert!(!status.is_known());
    }

    #[test]
    fn test_rollback_statuses() {
        assert!(SagaStatus::Compensated.is_rollback());
        assert!(SagaStatus::CompensationFailed.is_rollback());
        assert!(!SagaStatus::Failed.is_rollback());
        assert!(!SagaStatus::Completed.is_rollback());
    }

    #[test]
    fn test_log_entry_wire_format() {
        let json = r#"{
            "saga_id": "task_creation_1700000000.5",
            "status": "TASK_CREATED",
            "timestamp": "2024-03-01T10:15:30.250000",
            "details": "Task 12 created"
        }"#;
        let entry: TransactionLogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.transaction_id.as_str(), "task_creation_1700000000.5");
        assert_eq!(entry.status, SagaStatus::TaskCreated);
        assert_eq!(
            entry.timestamp,
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 30).unwrap()
                + chrono::Duration::milliseconds(250)
        );
    }

    #[test]
    fn test_log_entry_unknown_status_does_not_fail() {
        let json = r#"{"transaction_id": "t1", "status": "WEIRD", "timestamp": "2024-03-01T10:15:30Z"}"#;
        let entry: TransactionLogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.status, SagaStatus::Unknown("WEIRD".to_string()));
        assert!(entry.details.is_empty());
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2024-03-01 10:15:30").is_some());
    }

    #[test]
    fn test_exchange_backlog_saturates() {
        let stats = ExchangeStats {
            name: "task_events".into(),
            published: 3,
            consumed: 5,
        };
        assert_eq!(stats.backlog(), 0);
    }
}
