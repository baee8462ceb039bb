//! Reports backend access
//!
//! `ReportSource` is the seam between the engine and the REST API. The
//! orchestrator only ever talks to a source; `HttpReportSource` is the
//! reqwest-backed implementation used in production.

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::debug;

use crate::constants;
use crate::error::{FetchError, ReportError};
use crate::expenses::ExpenseAmount;
use crate::filter::{Driver, Filter};
use crate::series::{MetricSeries, TimeSeriesPoint};

/// The four time-series report endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesMetric {
    RevenueOverTime,
    RevenuePerMile,
    Miles,
    LoadCount,
}

impl SeriesMetric {
    pub const ALL: [SeriesMetric; 4] = [
        SeriesMetric::RevenueOverTime,
        SeriesMetric::RevenuePerMile,
        SeriesMetric::Miles,
        SeriesMetric::LoadCount,
    ];

    pub fn path(self) -> &'static str {
        match self {
            SeriesMetric::RevenueOverTime => constants::REVENUE_OVER_TIME_PATH,
            SeriesMetric::RevenuePerMile => constants::REVENUE_PER_MILE_PATH,
            SeriesMetric::Miles => constants::MILES_PATH,
            SeriesMetric::LoadCount => constants::LOAD_COUNT_PATH,
        }
    }
}

impl std::fmt::Display for SeriesMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesMetric::RevenueOverTime => write!(f, "Revenue over time"),
            SeriesMetric::RevenuePerMile => write!(f, "Revenue per mile"),
            SeriesMetric::Miles => write!(f, "Total miles"),
            SeriesMetric::LoadCount => write!(f, "Total loads"),
        }
    }
}

/// Source of raw report data.
///
/// Implementations perform exactly one remote call per method and must not
/// touch shared state; results are handed back to the caller.
pub trait ReportSource: Send + Sync {
    fn fetch_series(
        &self,
        metric: SeriesMetric,
        filter: &Filter,
    ) -> impl Future<Output = Result<MetricSeries, FetchError>> + Send;

    fn fetch_expenses(&self, filter: &Filter) -> impl Future<Output = Result<Vec<ExpenseAmount>, FetchError>> + Send;

    fn fetch_drivers(&self) -> impl Future<Output = Result<Vec<Driver>, FetchError>> + Send;
}

/// Reports API client
pub struct HttpReportSource {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpReportSource {
    /// Create a client for the API rooted at `base_url`
    /// (e.g. "http://localhost:3000" or "https://fleet.example.com/api")
    pub fn new(base_url: &str) -> Result<Self, ReportError> {
        let base_url = Url::parse(base_url).map_err(|e| ReportError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ReportError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL for `endpoint` with the given query parameters
    pub fn endpoint_url(&self, endpoint: &str, params: &[(&'static str, String)]) -> Url {
        let mut url = self.base_url.clone();
        let path = format!("{}{}", self.base_url.path().trim_end_matches('/'), endpoint);
        url.set_path(&path);
        url.set_query(None);
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        url
    }

    /// GET a JSON array of rows
    async fn get_rows<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        params: &[(&'static str, String)],
    ) -> Result<Vec<T>, FetchError> {
        let url = self.endpoint_url(endpoint, params);
        debug!(%url, "Fetching report rows");

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| FetchError::Request { endpoint, source })?;

        check_status(endpoint, response.status())?;

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Request { endpoint, source })?;
        parse_rows(endpoint, &body)
    }
}

/// Map a non-2xx response to `FetchError::Status`
fn check_status(endpoint: &'static str, status: StatusCode) -> Result<(), FetchError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(FetchError::Status { endpoint, status })
    }
}

/// Decode a JSON array body. A blank or `null` body is treated as no rows.
fn parse_rows<T: DeserializeOwned>(endpoint: &'static str, body: &str) -> Result<Vec<T>, FetchError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let rows: Option<Vec<T>> =
        serde_json::from_str(body).map_err(|source| FetchError::Decode { endpoint, source })?;
    Ok(rows.unwrap_or_default())
}

impl ReportSource for HttpReportSource {
    async fn fetch_series(&self, metric: SeriesMetric, filter: &Filter) -> Result<MetricSeries, FetchError> {
        let rows: Vec<TimeSeriesPoint> = self.get_rows(metric.path(), &filter.query_params()).await?;
        debug!(metric = %metric, points = rows.len(), "Fetched series");
        Ok(MetricSeries::new(rows))
    }

    async fn fetch_expenses(&self, filter: &Filter) -> Result<Vec<ExpenseAmount>, FetchError> {
        self.get_rows(constants::EXPENSES_PATH, &filter.query_params()).await
    }

    async fn fetch_drivers(&self) -> Result<Vec<Driver>, FetchError> {
        self.get_rows(constants::DRIVERS_PATH, &[]).await
    }
}
