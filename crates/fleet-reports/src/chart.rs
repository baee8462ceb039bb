//! Chart-ready reshaping of metric series
//!
//! The charting layer takes a flat list of `{date, <category>: value}`
//! records plus the list of categories to draw. Records keep series order
//! because charts assume a monotonic x-axis.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::constants;
use crate::filter::Filter;
use crate::series::MetricSeries;

/// One x-axis position keyed by category label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRecord {
    pub date: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

/// Records plus the categories the chart should draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub categories: Vec<String>,
    pub records: Vec<ChartRecord>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Value of `category` at each record, in order (gaps as None)
    pub fn column(&self, category: &str) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.values.get(category).copied()).collect()
    }
}

/// Categories for the revenue chart: the aggregate line when no driver is
/// selected, otherwise a single line named after the driver
pub fn active_categories(filter: &Filter) -> Vec<String> {
    match filter.driver() {
        Some(driver) => vec![driver.name.clone()],
        None => vec![constants::CUMULATIVE_CATEGORY.to_string()],
    }
}

/// Reshape `series` into records keyed by `categories`.
///
/// For a single-category chart a point that carries exactly one value under
/// a different key (e.g. keyed by driver id) is mapped onto that category.
pub fn normalize(series: &MetricSeries, categories: Vec<String>) -> ChartData {
    let records = series
        .points()
        .iter()
        .map(|point| {
            let mut values: BTreeMap<String, f64> = categories
                .iter()
                .filter_map(|c| point.value(c).map(|v| (c.clone(), v)))
                .collect();

            if values.is_empty() && categories.len() == 1 && point.values.len() == 1 {
                if let Some(v) = point.values.values().next() {
                    values.insert(categories[0].clone(), *v);
                }
            }

            ChartRecord {
                date: point.date.clone(),
                values,
            }
        })
        .collect();

    ChartData { categories, records }
}

/// Revenue-over-time chart for the current filter
pub fn revenue_chart(filter: &Filter, series: &MetricSeries) -> ChartData {
    normalize(series, active_categories(filter))
}

/// Spark chart with a single fixed category
pub fn spark_chart(series: &MetricSeries, category: &str) -> ChartData {
    normalize(series, vec![category.to_string()])
}
