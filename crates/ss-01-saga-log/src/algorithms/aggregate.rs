//! # Log Aggregation
//!
//! Groups a flat SAGA log into per-transaction timelines.
//!
//! Grouping is stable: transactions iterate in order of first appearance and
//! entries keep arrival order inside their timeline. No sorting, no clock,
//! no I/O, so the same input always yields the same output.

use shared_types::TransactionLogEntry;

use crate::domain::AggregatedLog;

/// Aggregate log entries into per-transaction timelines.
pub fn aggregate<I>(entries: I) -> AggregatedLog
where
    I: IntoIterator<Item = TransactionLogEntry>,
{
    let mut log = AggregatedLog::default();
    for entry in entries {
        log.ingest(entry);
    }
    log
}
