//! Time series returned by the report endpoints

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants;

/// One date bucket of a metric series.
///
/// Backend rows look like `{"date": "2024-01-03", "Miles": 412.5}`; every
/// numeric field besides `date` becomes a category value and anything
/// non-numeric is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPoint")]
pub struct TimeSeriesPoint {
    pub date: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

#[derive(Deserialize)]
struct RawPoint {
    date: String,
    #[serde(flatten)]
    fields: BTreeMap<String, serde_json::Value>,
}

impl From<RawPoint> for TimeSeriesPoint {
    fn from(raw: RawPoint) -> Self {
        let values = raw
            .fields
            .into_iter()
            .filter_map(|(key, value)| value.as_f64().map(|v| (key, v)))
            .collect();
        Self { date: raw.date, values }
    }
}

impl TimeSeriesPoint {
    pub fn new<K: Into<String>>(date: impl Into<String>, values: impl IntoIterator<Item = (K, f64)>) -> Self {
        Self {
            date: date.into(),
            values: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn value(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    fn iso_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, constants::DATE_FORMAT).ok()
    }
}

/// Date-ascending sequence of points for one metric.
///
/// An empty series is the "no data in range" state, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricSeries {
    points: Vec<TimeSeriesPoint>,
}

impl MetricSeries {
    /// Build a series, sorting by date when every label is an ISO date.
    /// Other label formats ("Jan 23", "W04") keep backend order.
    pub fn new(mut points: Vec<TimeSeriesPoint>) -> Self {
        let dates: Option<Vec<NaiveDate>> = points.iter().map(TimeSeriesPoint::iso_date).collect();
        if let Some(dates) = dates {
            let mut keyed: Vec<_> = dates.into_iter().zip(points).collect();
            keyed.sort_by_key(|(date, _)| *date);
            points = keyed.into_iter().map(|(_, point)| point).collect();
        }
        Self { points }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    pub fn first(&self) -> Option<&TimeSeriesPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TimeSeriesPoint> {
        self.points.last()
    }

    /// Sum of `key` over all points (missing values count as zero)
    pub fn sum(&self, key: &str) -> f64 {
        self.points.iter().filter_map(|p| p.value(key)).sum()
    }
}

impl From<Vec<TimeSeriesPoint>> for MetricSeries {
    fn from(points: Vec<TimeSeriesPoint>) -> Self {
        Self::new(points)
    }
}
