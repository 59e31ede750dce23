//! # Query Coordinator Service
//!
//! Holds the filter criteria, turns filter changes into listing fetches and
//! publishes the listing on a watch channel.
//!
//! A single worker task receives triggers over an unbounded channel:
//!
//! ```text
//! set_search ──Debounced──┐
//!                         ├──► worker ── deadline elapsed / immediate ──► fetch
//! set_status ──Immediate──┘
//! ```
//!
//! Each debounced trigger pushes the deadline out; an immediate trigger
//! fetches at once and clears any pending deadline.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_bus::{InMemoryEventBus, ReconciliationEvent};
use shared_types::{Entity, EntityListApi, ParameterSource, QueryParameters};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::CoordinatorConfig;
use crate::domain::{CoordinatorError, FilterCriteria, FilterField, Listing};
use crate::ports::QueryCoordinatorApi;

/// What a filter change asks the worker to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Trigger {
    Debounced,
    Immediate,
}

/// State shared between the coordinator handle and its worker.
struct CoordinatorCore {
    source: Arc<dyn EntityListApi>,
    bus: Arc<InMemoryEventBus>,
    criteria: RwLock<FilterCriteria>,
    listing: watch::Sender<Listing>,
    /// Sequence number handed to each fetch.
    next_fetch: AtomicU64,
    /// Sequence number of the fetch whose result is on display.
    shown_fetch: Mutex<u64>,
}

impl CoordinatorCore {
    fn parameters(&self) -> QueryParameters {
        self.criteria.read().to_parameters()
    }

    /// Fetch with the current parameters and publish the result, unless a
    /// later fetch has already been published.
    async fn fetch(&self) -> Result<Vec<Entity>, CoordinatorError> {
        let seq = self.next_fetch.fetch_add(1, Ordering::AcqRel) + 1;
        let parameters = self.parameters();
        debug!(seq, parameters = ?parameters, "Fetching listing");

        let result = self.source.list(&parameters).await;

        let listing = match &result {
            Ok(entities) => Listing::Loaded {
                entities: entities.clone(),
                parameters: parameters.clone(),
            },
            Err(err) => Listing::Failed {
                message: err.user_message(),
                retryable: err.is_retryable(),
                parameters: parameters.clone(),
            },
        };

        let published = {
            let mut shown = self.shown_fetch.lock();
            if seq > *shown {
                *shown = seq;
                self.listing.send_replace(listing);
                true
            } else {
                false
            }
        };

        match result {
            Ok(entities) => {
                if published {
                    self.bus.publish_now(ReconciliationEvent::ListingRefreshed {
                        count: entities.len(),
                        parameters,
                    });
                } else {
                    debug!(seq, "Discarding stale listing response");
                }
                Ok(entities)
            }
            Err(err) => {
                warn!(seq, error = %err, retryable = err.is_retryable(), "Listing fetch failed");
                Err(err.into())
            }
        }
    }
}

async fn run_worker(
    core: Arc<CoordinatorCore>,
    debounce: Duration,
    fetch_on_start: bool,
    mut triggers: mpsc::UnboundedReceiver<Trigger>,
    mut shutdown: watch::Receiver<bool>,
) {
    if fetch_on_start {
        tokio::select! {
            _ = core.fetch() => {}
            _ = shutdown.changed() => return,
        }
    }

    let mut deadline: Option<Instant> = None;
    loop {
        let fire = tokio::select! {
            _ = shutdown.changed() => break,
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => true,
            trigger = triggers.recv() => match trigger {
                Some(Trigger::Debounced) => {
                    deadline = Some(Instant::now() + debounce);
                    false
                }
                Some(Trigger::Immediate) => true,
                None => break,
            },
        };
        if !fire {
            continue;
        }

        deadline = None;
        tokio::select! {
            _ = core.fetch() => {}
            _ = shutdown.changed() => break,
        }
    }
    debug!("Query coordinator worker exited");
}

/// Filtered Query Coordinator.
///
/// Also the [`ParameterSource`] for the tracker, so reconciliation fetches
/// use the same parameters as the display listing.
pub struct QueryCoordinator {
    config: CoordinatorConfig,
    core: Arc<CoordinatorCore>,
    triggers: mpsc::UnboundedSender<Trigger>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<Trigger>>>,
    shutdown: watch::Sender<bool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl QueryCoordinator {
    /// Create a coordinator with no filters. Call [`start`](Self::start)
    /// to begin processing filter changes.
    pub fn new(
        source: Arc<dyn EntityListApi>,
        bus: Arc<InMemoryEventBus>,
        config: CoordinatorConfig,
    ) -> Self {
        let (triggers, receiver) = mpsc::unbounded_channel();
        let (listing, _) = watch::channel(Listing::NotLoaded);
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            core: Arc::new(CoordinatorCore {
                source,
                bus,
                criteria: RwLock::new(FilterCriteria::unfiltered()),
                listing,
                next_fetch: AtomicU64::new(0),
                shown_fetch: Mutex::new(0),
            }),
            triggers,
            receiver: Mutex::new(Some(receiver)),
            shutdown,
            worker: Mutex::new(None),
        }
    }

    /// Spawn the worker. Filter changes made before this are queued.
    pub fn start(&self) -> Result<(), CoordinatorError> {
        if *self.shutdown.borrow() {
            return Err(CoordinatorError::Disposed);
        }
        let Some(receiver) = self.receiver.lock().take() else {
            return Err(CoordinatorError::AlreadyRunning);
        };

        info!(
            debounce_ms = self.config.search_debounce_ms,
            fetch_on_start = self.config.fetch_on_start,
            "Starting query coordinator"
        );
        *self.worker.lock() = Some(tokio::spawn(run_worker(
            Arc::clone(&self.core),
            self.config.search_debounce(),
            self.config.fetch_on_start,
            receiver,
            self.shutdown.subscribe(),
        )));
        Ok(())
    }

    /// Active configuration.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    fn ensure_live(&self) -> Result<(), CoordinatorError> {
        if *self.shutdown.borrow() {
            Err(CoordinatorError::Disposed)
        } else {
            Ok(())
        }
    }

    fn update(&self, field: FilterField, value: Option<&str>) -> Result<bool, CoordinatorError> {
        self.ensure_live()?;
        let changed = self.core.criteria.write().set(field, value);
        if changed {
            debug!(field = field.param_name(), value = ?value, "Filter changed");
            let trigger = if field.is_debounced() {
                Trigger::Debounced
            } else {
                Trigger::Immediate
            };
            // The receiver only goes away on dispose.
            let _ = self.triggers.send(trigger);
        }
        Ok(changed)
    }
}

impl ParameterSource for QueryCoordinator {
    fn current_parameters(&self) -> QueryParameters {
        self.core.parameters()
    }

    fn is_filtered(&self) -> bool {
        !self.core.criteria.read().is_empty()
    }
}

#[async_trait]
impl QueryCoordinatorApi for QueryCoordinator {
    fn set_search(&self, value: Option<&str>) -> Result<bool, CoordinatorError> {
        self.update(FilterField::Search, value)
    }

    fn set_status(&self, value: Option<&str>) -> Result<bool, CoordinatorError> {
        self.update(FilterField::Status, value)
    }

    fn set_category(&self, value: Option<&str>) -> Result<bool, CoordinatorError> {
        self.update(FilterField::Category, value)
    }

    fn set_priority(&self, value: Option<&str>) -> Result<bool, CoordinatorError> {
        self.update(FilterField::Priority, value)
    }

    fn clear_all(&self) -> Result<bool, CoordinatorError> {
        self.ensure_live()?;
        let changed = self.core.criteria.write().clear();
        if changed {
            debug!("Filters cleared");
            let _ = self.triggers.send(Trigger::Immediate);
        }
        Ok(changed)
    }

    fn criteria(&self) -> FilterCriteria {
        self.core.criteria.read().clone()
    }

    async fn refresh(&self) -> Result<Vec<Entity>, CoordinatorError> {
        self.ensure_live()?;
        self.core.fetch().await
    }

    fn listing(&self) -> Listing {
        self.core.listing.borrow().clone()
    }

    fn subscribe_listing(&self) -> watch::Receiver<Listing> {
        self.core.listing.subscribe()
    }

    fn dispose(&self) {
        if self.shutdown.send_replace(true) {
            return;
        }
        if let Some(worker) = self.worker.lock().take() {
            worker.abort();
        }
        self.receiver.lock().take();
        info!("Query coordinator disposed");
    }
}

impl Drop for QueryCoordinator {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.get_mut().take() {
            worker.abort();
        }
    }
}
