//! Metric fetchers
//!
//! One function per dashboard metric. Each issues a single request through a
//! [`ReportSource`], bounded by a timeout, and returns the result to the
//! caller untouched. Errors are returned, never swallowed.

use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::api::{ReportSource, SeriesMetric};
use crate::constants;
use crate::error::FetchError;
use crate::expenses::ExpenseAmount;
use crate::filter::{Driver, Filter};
use crate::series::MetricSeries;

/// Await `fetch`, failing with `FetchError::Timeout` after `timeout`
async fn with_timeout<T>(
    endpoint: &'static str,
    timeout: Duration,
    fetch: impl Future<Output = Result<T, FetchError>>,
) -> Result<T, FetchError> {
    match tokio::time::timeout(timeout, fetch).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout { endpoint, timeout }),
    }
}

async fn fetch_series<S: ReportSource>(
    source: &S,
    metric: SeriesMetric,
    filter: &Filter,
    timeout: Duration,
) -> Result<MetricSeries, FetchError> {
    let series = with_timeout(metric.path(), timeout, source.fetch_series(metric, filter)).await?;
    debug!(metric = %metric, points = series.len(), "Metric fetched");
    Ok(series)
}

pub async fn fetch_revenue_over_time<S: ReportSource>(
    source: &S,
    filter: &Filter,
    timeout: Duration,
) -> Result<MetricSeries, FetchError> {
    fetch_series(source, SeriesMetric::RevenueOverTime, filter, timeout).await
}

pub async fn fetch_revenue_per_mile<S: ReportSource>(
    source: &S,
    filter: &Filter,
    timeout: Duration,
) -> Result<MetricSeries, FetchError> {
    fetch_series(source, SeriesMetric::RevenuePerMile, filter, timeout).await
}

pub async fn fetch_total_miles<S: ReportSource>(
    source: &S,
    filter: &Filter,
    timeout: Duration,
) -> Result<MetricSeries, FetchError> {
    fetch_series(source, SeriesMetric::Miles, filter, timeout).await
}

pub async fn fetch_load_count<S: ReportSource>(
    source: &S,
    filter: &Filter,
    timeout: Duration,
) -> Result<MetricSeries, FetchError> {
    fetch_series(source, SeriesMetric::LoadCount, filter, timeout).await
}

pub async fn fetch_expenses<S: ReportSource>(
    source: &S,
    filter: &Filter,
    timeout: Duration,
) -> Result<Vec<ExpenseAmount>, FetchError> {
    let rows = with_timeout(constants::EXPENSES_PATH, timeout, source.fetch_expenses(filter)).await?;
    debug!(categories = rows.len(), "Expenses fetched");
    Ok(rows)
}

/// Driver list for the filter controls (not part of a report cycle)
pub async fn fetch_drivers<S: ReportSource>(source: &S, timeout: Duration) -> Result<Vec<Driver>, FetchError> {
    with_timeout(constants::DRIVERS_PATH, timeout, source.fetch_drivers()).await
}
