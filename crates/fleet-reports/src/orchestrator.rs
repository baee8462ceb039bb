//! Report orchestrator
//!
//! Owns the filter and the published snapshot. Every filter change starts a
//! new fetch cycle tagged with a sequence number; all five metric fetchers
//! run concurrently and the joined results are published only if no newer
//! cycle was started in the meantime. Stale results are dropped at the join
//! point, in-flight requests are not cancelled. Each cycle runs on its own
//! task, so dropping the future returned by a filter update does not abandon
//! the cycle.

use chrono::NaiveDate;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::ReportSource;
use crate::constants;
use crate::error::{FetchError, ReportError};
use crate::fetchers;
use crate::filter::{Driver, Filter};
use crate::snapshot::{CycleResults, ReportSnapshot};

/// Orchestrator tuning
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Upper bound on each individual metric fetch
    pub fetch_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(constants::DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    /// Holds the latest snapshot (or none yet)
    Idle,
    /// The latest cycle is still waiting on its fetchers
    Refreshing { cycle: u64 },
}

/// How a cycle ended
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    Published(Arc<ReportSnapshot>),
    /// A newer cycle started before this one finished; its results were dropped
    Superseded { cycle: u64 },
}

impl CycleOutcome {
    pub fn snapshot(&self) -> Option<&Arc<ReportSnapshot>> {
        match self {
            CycleOutcome::Published(snapshot) => Some(snapshot),
            CycleOutcome::Superseded { .. } => None,
        }
    }
}

struct Inner {
    filter: Filter,
    /// Sequence number of the most recently started cycle
    dispatched: u64,
    /// Sequence number of the most recently published cycle
    published: u64,
}

/// State shared between the orchestrator handle and its cycle tasks
struct Shared<S> {
    source: S,
    config: OrchestratorConfig,
    inner: Mutex<Inner>,
    snapshot_tx: watch::Sender<Option<Arc<ReportSnapshot>>>,
}

pub struct ReportOrchestrator<S> {
    shared: Arc<Shared<S>>,
}

impl<S: ReportSource + 'static> ReportOrchestrator<S> {
    pub fn new(source: S, filter: Filter, config: OrchestratorConfig) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                source,
                config,
                inner: Mutex::new(Inner {
                    filter,
                    dispatched: 0,
                    published: 0,
                }),
                snapshot_tx,
            }),
        }
    }

    pub fn source(&self) -> &S {
        &self.shared.source
    }

    pub fn filter(&self) -> Filter {
        self.shared.lock().filter.clone()
    }

    pub fn state(&self) -> OrchestratorState {
        let inner = self.shared.lock();
        if inner.dispatched > inner.published {
            OrchestratorState::Refreshing {
                cycle: inner.dispatched,
            }
        } else {
            OrchestratorState::Idle
        }
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Option<Arc<ReportSnapshot>> {
        self.shared.snapshot_tx.borrow().clone()
    }

    /// Receiver notified whenever a new snapshot is published
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<ReportSnapshot>>> {
        self.shared.snapshot_tx.subscribe()
    }

    /// Select a driver (or clear the selection) and refresh
    pub async fn set_driver(&self, driver: Option<Driver>) -> CycleOutcome {
        let (cycle, filter) = {
            let mut inner = self.shared.lock();
            inner.filter.set_driver(driver);
            Shared::<S>::dispatch(&mut inner)
        };
        self.run_cycle(cycle, filter).await
    }

    /// Change the date range and refresh.
    ///
    /// An inverted range is rejected before any fetch: the current filter is
    /// kept and no cycle starts.
    pub async fn set_date_range(&self, from: NaiveDate, to: NaiveDate) -> Result<CycleOutcome, ReportError> {
        let (cycle, filter) = {
            let mut inner = self.shared.lock();
            if let Err(e) = inner.filter.set_date_range(from, to) {
                warn!(%from, %to, "Rejected date range, keeping current filter");
                return Err(e.into());
            }
            Shared::<S>::dispatch(&mut inner)
        };
        Ok(self.run_cycle(cycle, filter).await)
    }

    /// Re-run the current filter
    pub async fn refresh(&self) -> CycleOutcome {
        let (cycle, filter) = {
            let mut inner = self.shared.lock();
            Shared::<S>::dispatch(&mut inner)
        };
        self.run_cycle(cycle, filter).await
    }

    /// Driver list for the filter controls
    pub async fn drivers(&self) -> Result<Vec<Driver>, FetchError> {
        fetchers::fetch_drivers(&self.shared.source, self.shared.config.fetch_timeout).await
    }

    /// Run the cycle on its own task so it completes (and leaves
    /// `Refreshing`) even if the caller stops awaiting it
    async fn run_cycle(&self, cycle: u64, filter: Filter) -> CycleOutcome {
        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(async move { shared.run_cycle(cycle, filter).await });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                // Only happens while the runtime is shutting down
                warn!(cycle, error = %e, "Report cycle task cancelled");
                CycleOutcome::Superseded { cycle }
            }
        }
    }
}

impl<S: ReportSource> Shared<S> {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Inner holds plain values, a panic mid-update cannot leave it torn
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn dispatch(inner: &mut Inner) -> (u64, Filter) {
        inner.dispatched += 1;
        (inner.dispatched, inner.filter.clone())
    }

    async fn run_cycle(&self, cycle: u64, filter: Filter) -> CycleOutcome {
        debug!(cycle, driver = ?filter.driver().map(|d| d.name.as_str()), "Starting report cycle");
        let timeout = self.config.fetch_timeout;
        let source = &self.source;

        let (revenue_over_time, revenue_per_mile, total_miles, load_count, expenses) = futures::join!(
            fetchers::fetch_revenue_over_time(source, &filter, timeout),
            fetchers::fetch_revenue_per_mile(source, &filter, timeout),
            fetchers::fetch_total_miles(source, &filter, timeout),
            fetchers::fetch_load_count(source, &filter, timeout),
            fetchers::fetch_expenses(source, &filter, timeout),
        );

        let results = CycleResults {
            revenue_over_time,
            revenue_per_mile,
            total_miles,
            load_count,
            expenses,
        };
        self.publish(cycle, filter, results)
    }

    fn publish(&self, cycle: u64, filter: Filter, results: CycleResults) -> CycleOutcome {
        let mut inner = self.lock();
        if cycle != inner.dispatched {
            info!(cycle, latest = inner.dispatched, "Discarding results of superseded cycle");
            return CycleOutcome::Superseded { cycle };
        }

        let snapshot = Arc::new(ReportSnapshot::assemble(cycle, filter, results));
        inner.published = cycle;
        self.snapshot_tx.send_replace(Some(snapshot.clone()));

        info!(
            cycle,
            unavailable = snapshot.unavailable_count(),
            "Published report snapshot"
        );
        CycleOutcome::Published(snapshot)
    }
}
