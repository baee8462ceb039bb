//! Immutable report snapshot handed to the presentation layer

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::chart::{self, ChartData};
use crate::constants;
use crate::error::FetchError;
use crate::expenses::{self, ExpenseAmount, ExpenseCategory};
use crate::filter::Filter;
use crate::kpi::{self, KpiDefinition, KpiSummary};
use crate::series::MetricSeries;

/// Per-metric slot of a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum MetricState<T> {
    Ready(T),
    /// The backend returned no rows for the range
    NoData,
    /// The fetch failed; the view shows an "unavailable" indicator
    Unavailable(String),
}

impl<T> MetricState<T> {
    /// Fold a fetch result into a state. `derive` returns None for "no data".
    fn from_fetch<U>(name: &str, result: Result<U, FetchError>, derive: impl FnOnce(U) -> Option<T>) -> Self {
        match result {
            Ok(value) => match derive(value) {
                Some(ready) => MetricState::Ready(ready),
                None => MetricState::NoData,
            },
            Err(e) => {
                warn!(metric = name, error = %e, "Metric unavailable");
                MetricState::Unavailable(e.to_string())
            }
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            MetricState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, MetricState::Unavailable(_))
    }
}

/// KPI card plus the spark chart drawn beneath it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiPanel {
    pub summary: KpiSummary,
    pub chart: ChartData,
}

fn kpi_panel(series: MetricSeries, definition: &KpiDefinition) -> Option<KpiPanel> {
    let summary = kpi::summarize(&series, definition)?;
    Some(KpiPanel {
        summary,
        chart: chart::spark_chart(&series, definition.value_key),
    })
}

/// Raw results of one fetch cycle, in dispatch order
pub struct CycleResults {
    pub revenue_over_time: Result<MetricSeries, FetchError>,
    pub revenue_per_mile: Result<MetricSeries, FetchError>,
    pub total_miles: Result<MetricSeries, FetchError>,
    pub load_count: Result<MetricSeries, FetchError>,
    pub expenses: Result<Vec<ExpenseAmount>, FetchError>,
}

/// Everything the Reports view renders for one filter value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSnapshot {
    /// Sequence number of the cycle that produced this snapshot
    pub cycle: u64,
    pub filter: Filter,
    pub generated_at: DateTime<Utc>,
    pub revenue_over_time: MetricState<ChartData>,
    pub revenue_per_mile: MetricState<KpiPanel>,
    pub total_miles: MetricState<KpiPanel>,
    pub load_count: MetricState<KpiPanel>,
    pub expenses: MetricState<Vec<ExpenseCategory>>,
}

impl ReportSnapshot {
    /// Derive charts, KPIs and expense shares from a cycle's raw results
    pub fn assemble(cycle: u64, filter: Filter, results: CycleResults) -> Self {
        let revenue_over_time = MetricState::from_fetch(
            constants::REVENUE_OVER_TIME_PATH,
            results.revenue_over_time,
            |series| (!series.is_empty()).then(|| chart::revenue_chart(&filter, &series)),
        );
        let revenue_per_mile = MetricState::from_fetch(
            constants::REVENUE_PER_MILE_PATH,
            results.revenue_per_mile,
            |series| kpi_panel(series, &kpi::REVENUE_PER_MILE),
        );
        let total_miles = MetricState::from_fetch(constants::MILES_PATH, results.total_miles, |series| {
            kpi_panel(series, &kpi::TOTAL_MILES)
        });
        let load_count = MetricState::from_fetch(constants::LOAD_COUNT_PATH, results.load_count, |series| {
            kpi_panel(series, &kpi::TOTAL_LOADS)
        });
        let expenses = MetricState::from_fetch(constants::EXPENSES_PATH, results.expenses, |rows| {
            (!rows.is_empty()).then(|| expenses::categorize(&rows))
        });

        Self {
            cycle,
            filter,
            generated_at: Utc::now(),
            revenue_over_time,
            revenue_per_mile,
            total_miles,
            load_count,
            expenses,
        }
    }

    /// KPI panels in dashboard order
    pub fn kpis(&self) -> [(&'static str, &MetricState<KpiPanel>); 3] {
        [
            (kpi::REVENUE_PER_MILE.name, &self.revenue_per_mile),
            (kpi::TOTAL_MILES.name, &self.total_miles),
            (kpi::TOTAL_LOADS.name, &self.load_count),
        ]
    }

    /// Number of metrics whose fetch failed in this cycle
    pub fn unavailable_count(&self) -> usize {
        let kpis = self.kpis().iter().filter(|(_, s)| s.is_unavailable()).count();
        kpis + usize::from(self.revenue_over_time.is_unavailable()) + usize::from(self.expenses.is_unavailable())
    }
}
