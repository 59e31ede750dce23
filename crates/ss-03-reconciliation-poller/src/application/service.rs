//! # Reconciliation Poller Service
//!
//! Drives the tracker's periodic reconciliation on a fixed interval.
//!
//! The loop runs on its own task and holds only the shared core, so
//! dropping the [`ReconciliationPoller`] (or calling `stop`) ends it.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::PollerConfig;
use crate::domain::{PollerError, PollerStats, TickOutcome};
use crate::ports::{PendingTrackerApi, ReconciliationPollerApi};

/// Marks a fetch as in flight for as long as it lives.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Default)]
struct Counters {
    ticks: AtomicU64,
    idle: AtomicU64,
    skipped: AtomicU64,
    reconciled: AtomicU64,
    failed: AtomicU64,
}

/// State shared between the poller handle and its loop task.
struct PollerCore {
    tracker: Arc<dyn PendingTrackerApi>,
    in_flight: AtomicBool,
    counters: Counters,
}

impl PollerCore {
    async fn tick(&self) -> TickOutcome {
        self.counters.ticks.fetch_add(1, Ordering::Relaxed);

        if self.tracker.pending_count() == 0 {
            self.counters.idle.fetch_add(1, Ordering::Relaxed);
            return TickOutcome::Idle;
        }

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            self.counters.skipped.fetch_add(1, Ordering::Relaxed);
            debug!("Reconciliation fetch still in flight, skipping tick");
            return TickOutcome::Skipped;
        };

        match self.tracker.reconcile_fetch().await {
            Ok(report) => {
                self.counters.reconciled.fetch_add(1, Ordering::Relaxed);
                TickOutcome::Reconciled(report)
            }
            Err(err) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                TickOutcome::Failed(err.to_string())
            }
        }
    }

    fn stats(&self) -> PollerStats {
        PollerStats {
            ticks: self.counters.ticks.load(Ordering::Relaxed),
            idle: self.counters.idle.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
            reconciled: self.counters.reconciled.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }
}

async fn run_poll_loop(
    core: Arc<PollerCore>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut timer = tokio::time::interval(interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; consume it so the first fetch
    // happens one interval after start.
    timer.tick().await;

    loop {
        tokio::select! {
            _ = timer.tick() => {}
            _ = shutdown.changed() => break,
        }
        if *shutdown.borrow() || core.tracker.is_disposed() {
            break;
        }

        let outcome = tokio::select! {
            outcome = core.tick() => outcome,
            _ = shutdown.changed() => break,
        };
        match outcome {
            TickOutcome::Reconciled(report) if !report.is_quiet() => info!(
                confirmed = report.confirmed.len(),
                compensated = report.compensated.len(),
                timed_out = report.timed_out.len(),
                still_pending = report.still_pending,
                "Reconciliation poll concluded entities"
            ),
            TickOutcome::Failed(error) => {
                warn!(error = %error, "Reconciliation poll failed, retrying next interval");
            }
            _ => {}
        }
    }
    debug!("Reconciliation poll loop exited");
}

/// Reconciliation Poller - periodic, non-overlapping reconciliation.
pub struct ReconciliationPoller {
    config: PollerConfig,
    core: Arc<PollerCore>,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ReconciliationPoller {
    /// Create a stopped poller over `tracker`.
    pub fn new(tracker: Arc<dyn PendingTrackerApi>, config: PollerConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            core: Arc::new(PollerCore {
                tracker,
                in_flight: AtomicBool::new(false),
                counters: Counters::default(),
            }),
            shutdown,
            task: Mutex::new(None),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Whether a fetch is in flight right now.
    pub fn is_fetching(&self) -> bool {
        self.core.in_flight.load(Ordering::Acquire)
    }
}

#[async_trait]
impl ReconciliationPollerApi for ReconciliationPoller {
    fn start(&self) -> Result<(), PollerError> {
        if *self.shutdown.borrow() {
            return Err(PollerError::Stopped);
        }
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return Err(PollerError::AlreadyRunning);
        }

        let interval = self.config.interval();
        info!(interval_ms = interval.as_millis() as u64, "Starting reconciliation poller");
        *task = Some(tokio::spawn(run_poll_loop(
            Arc::clone(&self.core),
            interval,
            self.shutdown.subscribe(),
        )));
        Ok(())
    }

    async fn tick(&self) -> TickOutcome {
        self.core.tick().await
    }

    fn stop(&self) {
        if self.shutdown.send_replace(true) {
            return;
        }
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
        info!("Reconciliation poller stopped");
    }

    fn is_running(&self) -> bool {
        self.task.lock().as_ref().is_some_and(|t| !t.is_finished())
    }

    fn stats(&self) -> PollerStats {
        self.core.stats()
    }
}

impl Drop for ReconciliationPoller {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}
