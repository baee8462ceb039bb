//! Fleet reporting and KPI aggregation engine.
//!
//! Turns the raw report rows served by the fleet backend (revenue, miles,
//! load counts, expenses) into chart-ready series, KPI cards with trend
//! deltas, and expense shares for the dashboard's Reports view.
//!
//! # Quick start
//!
//! ```no_run
//! use fleet_reports::{Filter, HttpReportSource, OrchestratorConfig, ReportOrchestrator};
//!
//! # async fn example() -> fleet_reports::Result<()> {
//! let source = HttpReportSource::new("http://localhost:3000")?;
//! let reports = ReportOrchestrator::new(source, Filter::default(), OrchestratorConfig::default());
//!
//! let outcome = reports.refresh().await;
//! if let Some(snapshot) = outcome.snapshot() {
//!     for (name, state) in snapshot.kpis() {
//!         if let Some(panel) = state.ready() {
//!             println!("{}: {} ({})", name, panel.summary.value_label(), panel.summary.change_label());
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod chart;
pub mod constants;
pub mod error;
pub mod expenses;
pub mod fetchers;
pub mod filter;
pub mod format;
pub mod kpi;
pub mod orchestrator;
pub mod series;
pub mod snapshot;

pub use api::{HttpReportSource, ReportSource, SeriesMetric};
pub use chart::{ChartData, ChartRecord};
pub use error::{FetchError, ReportError, Result, ValidationError};
pub use expenses::{ExpenseAmount, ExpenseCategory};
pub use filter::{DateRange, Driver, Filter};
pub use kpi::{ChangeDirection, KpiSummary};
pub use orchestrator::{CycleOutcome, OrchestratorConfig, OrchestratorState, ReportOrchestrator};
pub use series::{MetricSeries, TimeSeriesPoint};
pub use snapshot::{KpiPanel, MetricState, ReportSnapshot};
