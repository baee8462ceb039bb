//! KPI trend summaries
//!
//! A KPI card shows an aggregate over the whole range plus the change between
//! the first and last date bucket. The change is normalized against the
//! *last* value, matching the numbers the dashboard has always shown.

use serde::Serialize;

use crate::constants;
use crate::format::{format_change, format_currency, format_number};
use crate::series::MetricSeries;

/// Sign of a KPI's period change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    Positive,
    Negative,
    Flat,
}

impl ChangeDirection {
    pub fn from_percent(percent: i64) -> Self {
        match percent {
            p if p > 0 => ChangeDirection::Positive,
            p if p < 0 => ChangeDirection::Negative,
            _ => ChangeDirection::Flat,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChangeDirection::Positive => "positive",
            ChangeDirection::Negative => "negative",
            ChangeDirection::Flat => "flat",
        }
    }
}

/// How a KPI's headline value is derived from its series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    /// Sum of the value key over every point
    Sum,
    /// `sum(numerator) / sum(denominator)`, a true ratio rather than an
    /// average of per-bucket ratios
    Ratio {
        numerator: &'static str,
        denominator: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueUnit {
    Currency,
    Plain,
}

/// Static description of one KPI card
#[derive(Debug, Clone, Copy)]
pub struct KpiDefinition {
    pub name: &'static str,
    /// Key whose first/last values drive the change percentage
    pub value_key: &'static str,
    pub aggregate: Aggregate,
    /// Decimal places kept on the aggregate (None = unrounded)
    pub precision: Option<u32>,
    pub unit: ValueUnit,
}

pub const REVENUE_PER_MILE: KpiDefinition = KpiDefinition {
    name: "Revenue per mile",
    value_key: constants::REVENUE_PER_MILE_KEY,
    aggregate: Aggregate::Ratio {
        numerator: constants::REVENUE_KEY,
        denominator: constants::MILES_COLUMN_KEY,
    },
    precision: Some(2),
    unit: ValueUnit::Currency,
};

pub const TOTAL_MILES: KpiDefinition = KpiDefinition {
    name: "Total miles",
    value_key: constants::MILES_KEY,
    aggregate: Aggregate::Sum,
    precision: Some(1),
    unit: ValueUnit::Plain,
};

pub const TOTAL_LOADS: KpiDefinition = KpiDefinition {
    name: "Total loads",
    value_key: constants::LOADS_KEY,
    aggregate: Aggregate::Sum,
    precision: None,
    unit: ValueUnit::Plain,
};

/// Summary shown on a KPI card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub name: String,
    pub aggregate_value: f64,
    pub change_percent: i64,
    pub change_direction: ChangeDirection,
    pub unit: ValueUnit,
}

impl KpiSummary {
    pub fn value_label(&self) -> String {
        match self.unit {
            ValueUnit::Currency => format_currency(self.aggregate_value),
            ValueUnit::Plain => format_number(self.aggregate_value),
        }
    }

    pub fn change_label(&self) -> String {
        format_change(self.change_percent)
    }
}

/// Round half toward positive infinity (2.5 -> 3, -2.5 -> -2)
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round to `decimals` places, nudged by epsilon so 1.005 rounds up
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    round_half_up((value + f64::EPSILON) * factor) / factor
}

/// Percentage change between two endpoint values, relative to `last`.
///
/// `last == 0` is reported as no change rather than dividing by zero.
pub fn change_percent(first: f64, last: f64) -> i64 {
    if last == 0.0 {
        return 0;
    }
    let change = round_half_up((last - first) / last * 100.0);
    if change.is_finite() { change as i64 } else { 0 }
}

/// Change between the first and last point of `series` for `key`.
/// Returns None for an empty series; a missing key reads as zero.
pub fn endpoint_change(series: &MetricSeries, key: &str) -> Option<i64> {
    let first = series.first()?.value(key).unwrap_or(0.0);
    let last = series.last()?.value(key).unwrap_or(0.0);
    Some(change_percent(first, last))
}

/// Headline value of `series` under `aggregate`
pub fn aggregate_value(series: &MetricSeries, value_key: &str, aggregate: Aggregate) -> f64 {
    match aggregate {
        Aggregate::Sum => series.sum(value_key),
        Aggregate::Ratio { numerator, denominator } => {
            let denominator = series.sum(denominator);
            if denominator == 0.0 {
                0.0
            } else {
                series.sum(numerator) / denominator
            }
        }
    }
}

/// Compute a KPI card, or None when the series has no data
pub fn summarize(series: &MetricSeries, definition: &KpiDefinition) -> Option<KpiSummary> {
    let change_percent = endpoint_change(series, definition.value_key)?;
    let raw = aggregate_value(series, definition.value_key, definition.aggregate);
    let aggregate_value = match definition.precision {
        Some(decimals) => round_to(raw, decimals),
        None => raw,
    };

    Some(KpiSummary {
        name: definition.name.to_string(),
        aggregate_value,
        change_percent,
        change_direction: ChangeDirection::from_percent(change_percent),
        unit: definition.unit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::TimeSeriesPoint;

    fn miles(values: &[f64]) -> MetricSeries {
        MetricSeries::new(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| TimeSeriesPoint::new(format!("2024-01-{:02}", i + 1), [("Miles", *v)]))
                .collect(),
        )
    }

    #[test]
    fn test_change_percent_against_last() {
        // (200 - 100) / 200
        assert_eq!(change_percent(100.0, 200.0), 50);
        // (100 - 200) / 100
        assert_eq!(change_percent(200.0, 100.0), -100);
    }

    #[test]
    fn test_change_percent_last_zero_is_flat() {
        assert_eq!(change_percent(50.0, 0.0), 0);
        let summary = summarize(&miles(&[50.0, 0.0]), &TOTAL_MILES).unwrap();
        assert_eq!(summary.change_percent, 0);
        assert_eq!(summary.change_direction, ChangeDirection::Flat);
    }

    #[test]
    fn test_change_percent_rounds_half_up() {
        // (8 - 7) / 8 * 100 = 12.5
        assert_eq!(change_percent(7.0, 8.0), 13);
        // (8 - 9) / 8 * 100 = -12.5
        assert_eq!(change_percent(9.0, 8.0), -12);
    }

    #[test]
    fn test_direction_matches_sign() {
        let cases = [
            vec![1.0, 2.0],
            vec![2.0, 1.0],
            vec![5.0, 5.0],
            vec![0.0, 3.0],
            vec![-4.0, 2.0],
            vec![10.0, 10.04],
            vec![7.0, 0.0],
        ];
        for values in cases {
            let summary = summarize(&miles(&values), &TOTAL_MILES).unwrap();
            let expected = match summary.change_percent {
                p if p > 0 => ChangeDirection::Positive,
                p if p < 0 => ChangeDirection::Negative,
                _ => ChangeDirection::Flat,
            };
            assert_eq!(summary.change_direction, expected, "values {:?}", values);
        }
    }

    #[test]
    fn test_single_point_is_flat() {
        let summary = summarize(&miles(&[412.0]), &TOTAL_MILES).unwrap();
        assert_eq!(summary.change_percent, 0);
        assert_eq!(summary.change_direction, ChangeDirection::Flat);
        assert_eq!(summary.aggregate_value, 412.0);
    }

    #[test]
    fn test_empty_series_has_no_summary() {
        assert!(summarize(&MetricSeries::empty(), &TOTAL_LOADS).is_none());
        assert!(endpoint_change(&MetricSeries::empty(), "Loads").is_none());
    }

    #[test]
    fn test_revenue_per_mile_is_ratio_of_sums() {
        let series = MetricSeries::new(vec![
            TimeSeriesPoint::new(
                "2024-01-01",
                [("Revenue per mile", 2.0), ("revenue", 100.0), ("miles", 50.0)],
            ),
            TimeSeriesPoint::new(
                "2024-01-02",
                [("Revenue per mile", 3.0), ("revenue", 300.0), ("miles", 100.0)],
            ),
        ]);
        let summary = summarize(&series, &REVENUE_PER_MILE).unwrap();

        // Average of ratios would be 2.5
        assert_eq!(summary.aggregate_value, 2.67);
        assert_eq!(summary.change_percent, 33);
        assert_eq!(summary.change_direction, ChangeDirection::Positive);
        assert_eq!(summary.value_label(), "$ 2.67");
        assert_eq!(summary.change_label(), "+33%");
    }

    #[test]
    fn test_ratio_with_zero_miles() {
        let series = MetricSeries::new(vec![TimeSeriesPoint::new(
            "2024-01-01",
            [("Revenue per mile", 0.0), ("revenue", 120.0), ("miles", 0.0)],
        )]);
        let summary = summarize(&series, &REVENUE_PER_MILE).unwrap();
        assert_eq!(summary.aggregate_value, 0.0);
    }

    #[test]
    fn test_total_miles_rounds_to_one_decimal() {
        let summary = summarize(&miles(&[100.04, 200.03]), &TOTAL_MILES).unwrap();
        assert_eq!(summary.aggregate_value, 300.1);
    }

    #[test]
    fn test_total_loads_sum() {
        let series = MetricSeries::new(vec![
            TimeSeriesPoint::new("2024-01-01", [("Loads", 4.0)]),
            TimeSeriesPoint::new("2024-01-02", [("Loads", 6.0)]),
            TimeSeriesPoint::new("2024-01-03", [("Loads", 8.0)]),
        ]);
        let summary = summarize(&series, &TOTAL_LOADS).unwrap();
        assert_eq!(summary.aggregate_value, 18.0);
        assert_eq!(summary.change_percent, 50);
        assert_eq!(summary.value_label(), "18");
    }
}
