//! # Domain Entities
//!
//! `SagaTimeline` (one transaction) and `AggregatedLog` (all of them, in
//! first-appearance order).

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared_types::{SagaStatus, TransactionId, TransactionLogEntry};
use std::collections::HashMap;

use super::invariants::{check_progression, TransitionViolation};
use super::value_objects::Outcome;

/// Ordered steps of one distributed transaction plus its derived outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SagaTimeline {
    transaction_id: TransactionId,
    entries: Vec<TransactionLogEntry>,
    outcome: Outcome,
}

impl SagaTimeline {
    /// Start a timeline from its first entry.
    pub(crate) fn open(first: TransactionLogEntry) -> Self {
        let outcome = Outcome::from_last_status(&first.status);
        Self {
            transaction_id: first.transaction_id.clone(),
            entries: vec![first],
            outcome,
        }
    }

    /// Append in arrival order and re-derive the outcome.
    pub(crate) fn push(&mut self, entry: TransactionLogEntry) {
        self.outcome = Outcome::from_last_status(&entry.status);
        self.entries.push(entry);
    }

    /// Correlation id.
    #[must_use]
    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    /// Steps in arrival order. Never empty.
    #[must_use]
    pub fn entries(&self) -> &[TransactionLogEntry] {
        &self.entries
    }

    /// Outcome derived from the last entry.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Final status.
    #[must_use]
    pub fn last_status(&self) -> &SagaStatus {
        // A timeline is only ever created with one entry.
        &self.entries[self.entries.len() - 1].status
    }

    /// Timestamp of the first entry.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.entries[0].timestamp
    }

    /// Latest timestamp among the entries.
    #[must_use]
    pub fn latest_at(&self) -> DateTime<Utc> {
        self.entries
            .iter()
            .map(|e| e.timestamp)
            .max()
            .unwrap_or_else(|| self.started_at())
    }

    /// Whether arrival order agrees with timestamp order.
    #[must_use]
    pub fn is_time_ordered(&self) -> bool {
        self.entries
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp)
    }

    /// Status transitions that are not a legal SAGA progression.
    ///
    /// Diagnostic only; the outcome is never changed by this check.
    #[must_use]
    pub fn transition_violations(&self) -> Vec<TransitionViolation> {
        let statuses: Vec<&SagaStatus> = self.entries.iter().map(|e| &e.status).collect();
        check_progression(&statuses)
    }

    /// Number of entries with an unrecognized status.
    #[must_use]
    pub fn unknown_status_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.status.is_known()).count()
    }
}

/// Per-transaction timelines, iterated in order of first appearance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AggregatedLog {
    timelines: Vec<SagaTimeline>,
    index: HashMap<TransactionId, usize>,
}

impl AggregatedLog {
    /// Route an entry to its timeline, opening one if needed.
    pub(crate) fn ingest(&mut self, entry: TransactionLogEntry) {
        match self.index.get(&entry.transaction_id) {
            Some(&position) => self.timelines[position].push(entry),
            None => {
                self.index
                    .insert(entry.transaction_id.clone(), self.timelines.len());
                self.timelines.push(SagaTimeline::open(entry));
            }
        }
    }

    /// Number of transactions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    /// No transactions at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }

    /// Total entries across all timelines.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.timelines.iter().map(|t| t.entries.len()).sum()
    }

    /// Timeline for a transaction.
    #[must_use]
    pub fn get(&self, transaction_id: &TransactionId) -> Option<&SagaTimeline> {
        self.index.get(transaction_id).map(|&i| &self.timelines[i])
    }

    /// Timelines in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = &SagaTimeline> {
        self.timelines.iter()
    }

    /// Transaction ids in first-appearance order.
    pub fn transaction_ids(&self) -> impl Iterator<Item = &TransactionId> {
        self.timelines.iter().map(|t| &t.transaction_id)
    }

    /// Up to `limit` timelines with the latest activity, newest first.
    ///
    /// Ties keep first-appearance order. Only selects for display; the
    /// aggregation itself is untouched.
    #[must_use]
    pub fn most_recent(&self, limit: usize) -> Vec<&SagaTimeline> {
        let mut ranked: Vec<(usize, &SagaTimeline)> = self.timelines.iter().enumerate().collect();
        ranked.sort_by(|(ia, a), (ib, b)| b.latest_at().cmp(&a.latest_at()).then(ia.cmp(ib)));
        ranked.into_iter().take(limit).map(|(_, t)| t).collect()
    }

    /// `(successful, rolled_back)` counts.
    #[must_use]
    pub fn outcome_counts(&self) -> (usize, usize) {
        let rolled_back = self
            .timelines
            .iter()
            .filter(|t| t.outcome == Outcome::RolledBack)
            .count();
        (self.timelines.len() - rolled_back, rolled_back)
    }

    /// Consume into timelines.
    #[must_use]
    pub fn into_timelines(self) -> Vec<SagaTimeline> {
        self.timelines
    }
}

impl<'a> IntoIterator for &'a AggregatedLog {
    type Item = &'a SagaTimeline;
    type IntoIter = std::slice::Iter<'a, SagaTimeline>;

    fn into_iter(self) -> Self::IntoIter {
        self.timelines.iter()
    }
}
