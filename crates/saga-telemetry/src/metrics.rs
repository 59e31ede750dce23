//! Prometheus metrics for the reconciliation runtime.
//!
//! All metrics follow the naming convention: `ss_<component>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., entities_confirmed_total)
//! - **Gauge**: Value that can go up or down (e.g., pending_entities)

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // PENDING TRACKER METRICS (Component 2)
    // =========================================================================

    /// Entities currently awaiting a verdict
    pub static ref PENDING_ENTITIES: Gauge = Gauge::new(
        "ss_tracker_pending_entities",
        "Number of optimistically-created entities still pending"
    ).expect("metric creation failed");

    /// Entities confirmed by the authoritative source
    pub static ref ENTITIES_CONFIRMED: Counter = Counter::new(
        "ss_tracker_entities_confirmed_total",
        "Total pending entities confirmed"
    ).expect("metric creation failed");

    /// Entities rolled back by a compensated transaction
    pub static ref ENTITIES_COMPENSATED: Counter = Counter::new(
        "ss_tracker_entities_compensated_total",
        "Total pending entities compensated"
    ).expect("metric creation failed");

    /// Entities dropped without a verdict
    pub static ref ENTITIES_TIMED_OUT: Counter = Counter::new(
        "ss_tracker_entities_timed_out_total",
        "Total pending entities dropped after the cycle budget"
    ).expect("metric creation failed");

    /// Failed authoritative fetches
    pub static ref RECONCILE_FAILURES: CounterVec = CounterVec::new(
        Opts::new("ss_tracker_reconcile_failures_total", "Failed reconciliation fetches"),
        &["source", "retryable"]
    ).expect("metric creation failed");

    // =========================================================================
    // QUERY COORDINATOR METRICS (Component 4)
    // =========================================================================

    /// Listing fetches published to the display
    pub static ref LISTING_FETCHES: Counter = Counter::new(
        "ss_listing_fetches_total",
        "Total listing refreshes published"
    ).expect("metric creation failed");

    // =========================================================================
    // BROKER MONITOR METRICS
    // =========================================================================

    /// Unconsumed messages per exchange
    pub static ref BROKER_BACKLOG: GaugeVec = GaugeVec::new(
        Opts::new("ss_broker_exchange_backlog", "Published but unconsumed messages"),
        &["exchange"]
    ).expect("metric creation failed");

    // =========================================================================
    // EVENT BUS METRICS
    // =========================================================================

    /// Events observed on the bus
    pub static ref BUS_EVENTS: CounterVec = CounterVec::new(
        Opts::new("ss_eventbus_events_total", "Events observed on the reconciliation bus"),
        &["topic"]
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; later calls are no-ops.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Tracker
        Box::new(PENDING_ENTITIES.clone()),
        Box::new(ENTITIES_CONFIRMED.clone()),
        Box::new(ENTITIES_COMPENSATED.clone()),
        Box::new(ENTITIES_TIMED_OUT.clone()),
        Box::new(RECONCILE_FAILURES.clone()),
        // Coordinator
        Box::new(LISTING_FETCHES.clone()),
        // Broker
        Box::new(BROKER_BACKLOG.clone()),
        // Event Bus
        Box::new(BUS_EVENTS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
