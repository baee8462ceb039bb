//! Orchestrator integration tests against a scripted in-memory report source.

use chrono::NaiveDate;
use fleet_reports::api::{ReportSource, SeriesMetric};
use fleet_reports::{
    CycleOutcome, DateRange, Driver, ExpenseAmount, FetchError, Filter, MetricSeries, MetricState,
    OrchestratorConfig, OrchestratorState, ReportError, ReportOrchestrator, TimeSeriesPoint,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Scripted source
// ---------------------------------------------------------------------------

/// Answers every request from canned data, optionally delayed per driver id
/// and failing for selected metrics.
#[derive(Default)]
struct ScriptedSource {
    delays: HashMap<Option<String>, Duration>,
    failing: HashSet<SeriesMetric>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn delay(mut self, driver_id: Option<&str>, delay: Duration) -> Self {
        self.delays.insert(driver_id.map(str::to_string), delay);
        self
    }

    fn failing(mut self, metric: SeriesMetric) -> Self {
        self.failing.insert(metric);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn wait(&self, filter: &Filter) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = filter.driver().map(|d| d.id.clone());
        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }
    }
}

fn point(date: &str, values: &[(&str, f64)]) -> TimeSeriesPoint {
    TimeSeriesPoint::new(date, values.iter().map(|(k, v)| (k.to_string(), *v)))
}

impl ReportSource for ScriptedSource {
    async fn fetch_series(&self, metric: SeriesMetric, filter: &Filter) -> Result<MetricSeries, FetchError> {
        self.wait(filter).await;
        if self.failing.contains(&metric) {
            return Err(FetchError::Status {
                endpoint: metric.path(),
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            });
        }

        let label = filter.driver().map_or("Cumulative".to_string(), |d| d.name.clone());
        let points = match metric {
            SeriesMetric::RevenueOverTime => vec![
                point("2024-01-01", &[(label.as_str(), 1000.0)]),
                point("2024-01-02", &[(label.as_str(), 1500.0)]),
            ],
            SeriesMetric::RevenuePerMile => vec![
                point("2024-01-01", &[("Revenue per mile", 2.0), ("revenue", 100.0), ("miles", 50.0)]),
                point("2024-01-02", &[("Revenue per mile", 3.0), ("revenue", 300.0), ("miles", 100.0)]),
            ],
            SeriesMetric::Miles => vec![
                point("2024-01-01", &[("Miles", 50.0)]),
                point("2024-01-02", &[("Miles", 100.0)]),
            ],
            SeriesMetric::LoadCount => Vec::new(),
        };
        Ok(MetricSeries::new(points))
    }

    async fn fetch_expenses(&self, filter: &Filter) -> Result<Vec<ExpenseAmount>, FetchError> {
        self.wait(filter).await;
        Ok(vec![
            ExpenseAmount::new("Fuel", 300.0),
            ExpenseAmount::new("Repairs", 100.0),
        ])
    }

    async fn fetch_drivers(&self) -> Result<Vec<Driver>, FetchError> {
        Ok(vec![Driver::new("d-1", "Alice"), Driver::new("d-2", "Bob")])
    }
}

fn january() -> Filter {
    let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    Filter::new(None, DateRange::new(from, to).unwrap())
}

fn orchestrator(source: ScriptedSource) -> ReportOrchestrator<ScriptedSource> {
    ReportOrchestrator::new(source, january(), OrchestratorConfig::default())
}

fn alice() -> Driver {
    Driver::new("d-1", "Alice")
}

// ---------------------------------------------------------------------------
// Cycles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn refresh_publishes_full_snapshot() {
    let reports = orchestrator(ScriptedSource::default());
    assert!(reports.snapshot().is_none());
    assert_eq!(reports.state(), OrchestratorState::Idle);

    let outcome = reports.refresh().await;
    let snapshot = outcome.snapshot().expect("cycle should publish");

    assert_eq!(snapshot.cycle, 1);
    assert_eq!(reports.state(), OrchestratorState::Idle);
    assert_eq!(reports.source().calls(), 5);

    let revenue = snapshot.revenue_over_time.ready().unwrap();
    assert_eq!(revenue.categories, ["Cumulative"]);
    assert_eq!(revenue.column("Cumulative"), [Some(1000.0), Some(1500.0)]);

    let per_mile = snapshot.revenue_per_mile.ready().unwrap();
    assert_eq!(per_mile.summary.aggregate_value, 2.67);

    let miles = snapshot.total_miles.ready().unwrap();
    assert_eq!(miles.summary.aggregate_value, 150.0);
    assert_eq!(miles.summary.change_percent, 50);

    assert_eq!(snapshot.load_count, MetricState::NoData);

    let expenses = snapshot.expenses.ready().unwrap();
    assert_eq!(expenses[0].share, 75.0);
    assert_eq!(expenses[1].share, 25.0);

    let current = reports.snapshot().unwrap();
    assert_eq!(current.cycle, 1);
}

#[tokio::test]
async fn driver_selection_switches_categories() {
    let reports = orchestrator(ScriptedSource::default());

    let outcome = reports.set_driver(Some(alice())).await;
    let revenue = outcome.snapshot().unwrap().revenue_over_time.ready().unwrap().clone();
    assert_eq!(revenue.categories, ["Alice"]);

    let outcome = reports.set_driver(None).await;
    let revenue = outcome.snapshot().unwrap().revenue_over_time.ready().unwrap().clone();
    assert_eq!(revenue.categories, ["Cumulative"]);
}

#[tokio::test]
async fn failed_metric_does_not_block_siblings() {
    let source = ScriptedSource::default().failing(SeriesMetric::RevenuePerMile);
    let reports = orchestrator(source);

    let outcome = reports.refresh().await;
    let snapshot = outcome.snapshot().unwrap();

    match &snapshot.revenue_per_mile {
        MetricState::Unavailable(reason) => assert!(reason.contains("/reports/revenue-per-mile")),
        other => panic!("expected unavailable, got {:?}", other),
    }
    assert!(snapshot.revenue_over_time.ready().is_some());
    assert!(snapshot.total_miles.ready().is_some());
    assert!(snapshot.expenses.ready().is_some());
    assert_eq!(snapshot.unavailable_count(), 1);
}

#[tokio::test]
async fn slow_fetchers_time_out() {
    let source = ScriptedSource::default().delay(None, Duration::from_millis(500));
    let config = OrchestratorConfig {
        fetch_timeout: Duration::from_millis(20),
    };
    let reports = ReportOrchestrator::new(source, january(), config);

    let outcome = reports.refresh().await;
    let snapshot = outcome.snapshot().unwrap();

    assert_eq!(snapshot.unavailable_count(), 5);
    assert_eq!(reports.state(), OrchestratorState::Idle);
}

#[tokio::test]
async fn state_is_refreshing_while_cycle_in_flight() {
    let source = ScriptedSource::default().delay(None, Duration::from_millis(100));
    let reports = orchestrator(source);

    let probe = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        reports.state()
    };
    let (outcome, during) = tokio::join!(reports.refresh(), probe);

    assert_eq!(during, OrchestratorState::Refreshing { cycle: 1 });
    assert!(outcome.snapshot().is_some());
    assert_eq!(reports.state(), OrchestratorState::Idle);
}

#[tokio::test]
async fn abandoned_cycle_still_completes() {
    let source = ScriptedSource::default().delay(None, Duration::from_millis(200));
    let reports = orchestrator(source);

    // Caller gives up long before the fetchers answer
    let abandoned = tokio::time::timeout(Duration::from_millis(20), reports.refresh()).await;
    assert!(abandoned.is_err());
    assert_eq!(reports.state(), OrchestratorState::Refreshing { cycle: 1 });

    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(reports.state(), OrchestratorState::Idle);
    let snapshot = reports.snapshot().expect("cycle should publish after its caller left");
    assert_eq!(snapshot.cycle, 1);
    assert_eq!(reports.source().calls(), 5);
}

#[tokio::test]
async fn abandoned_cycle_superseded_by_newer_one() {
    let source = ScriptedSource::default()
        .delay(None, Duration::from_millis(200))
        .delay(Some("d-1"), Duration::from_millis(5));
    let reports = orchestrator(source);

    let abandoned = tokio::time::timeout(Duration::from_millis(20), reports.refresh()).await;
    assert!(abandoned.is_err());

    let outcome = reports.set_driver(Some(alice())).await;
    assert_eq!(outcome.snapshot().unwrap().cycle, 2);

    // The abandoned cycle finishes later and must not overwrite cycle 2
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(reports.state(), OrchestratorState::Idle);
    assert_eq!(reports.snapshot().unwrap().cycle, 2);
}

// ---------------------------------------------------------------------------
// Stale cycles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn older_cycle_resolving_last_is_discarded() {
    // Cycle A (no driver) is slow, cycle B (Alice) is fast
    let source = ScriptedSource::default()
        .delay(None, Duration::from_millis(150))
        .delay(Some("d-1"), Duration::from_millis(5));
    let reports = orchestrator(source);

    let (a, b) = tokio::join!(reports.set_driver(None), reports.set_driver(Some(alice())));

    assert!(matches!(a, CycleOutcome::Superseded { cycle: 1 }));
    assert_eq!(b.snapshot().unwrap().cycle, 2);

    let published = reports.snapshot().unwrap();
    assert_eq!(published.cycle, 2);
    assert_eq!(published.filter.driver(), Some(&alice()));
    assert_eq!(published.revenue_over_time.ready().unwrap().categories, ["Alice"]);
    assert_eq!(reports.state(), OrchestratorState::Idle);
}

#[tokio::test]
async fn older_cycle_resolving_first_is_discarded() {
    let source = ScriptedSource::default()
        .delay(None, Duration::from_millis(5))
        .delay(Some("d-1"), Duration::from_millis(100));
    let reports = orchestrator(source);
    let mut updates = reports.subscribe();

    let (a, b) = tokio::join!(reports.set_driver(None), reports.set_driver(Some(alice())));

    assert!(matches!(a, CycleOutcome::Superseded { cycle: 1 }));
    assert_eq!(b.snapshot().unwrap().cycle, 2);

    // Only cycle B ever reached subscribers
    assert!(updates.has_changed().unwrap());
    let seen = updates.borrow_and_update().clone().unwrap();
    assert_eq!(seen.cycle, 2);
}

// ---------------------------------------------------------------------------
// Filter validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn inverted_range_is_rejected_without_fetching() {
    let reports = orchestrator(ScriptedSource::default());
    let before = reports.filter();

    let from = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
    let to = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    let result = reports.set_date_range(from, to).await;

    assert!(matches!(result, Err(ReportError::Validation(_))));
    assert_eq!(reports.filter(), before);
    assert_eq!(reports.source().calls(), 0);
    assert_eq!(reports.state(), OrchestratorState::Idle);
    assert!(reports.snapshot().is_none());
}

#[tokio::test]
async fn valid_range_triggers_cycle() {
    let reports = orchestrator(ScriptedSource::default());

    let from = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let outcome = reports.set_date_range(from, to).await.unwrap();

    let snapshot = outcome.snapshot().unwrap();
    assert_eq!(snapshot.filter.date_range().from(), from);
    assert_eq!(reports.filter().date_range().to(), to);
    assert_eq!(reports.source().calls(), 5);
}

#[tokio::test]
async fn drivers_are_listed() {
    let reports = orchestrator(ScriptedSource::default());
    let names: Vec<_> = reports.drivers().await.unwrap().into_iter().map(|d| d.name).collect();
    assert_eq!(names, ["Alice", "Bob"]);
}
