//! Report filter state: selected driver and inclusive date range
//!
//! The filter is a plain value. The orchestrator owns the live copy and swaps
//! it atomically; a rejected update leaves the previous value untouched.

use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::ValidationError;

/// Driver record as returned by `GET /drivers`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
}

impl Driver {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Inclusive date range with `from <= to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, ValidationError> {
        if from > to {
            return Err(ValidationError::InvertedRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// The `days`-wide range ending on `end` (inclusive)
    pub fn ending_on(end: NaiveDate, days: i64) -> Self {
        let from = end - Duration::days(days.max(0));
        Self { from, to: end }
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Current report filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    driver: Option<Driver>,
    date_range: DateRange,
}

impl Default for Filter {
    /// No driver, last 30 days ending today
    fn default() -> Self {
        Self::new(
            None,
            DateRange::ending_on(Local::now().date_naive(), constants::DEFAULT_RANGE_DAYS),
        )
    }
}

impl Filter {
    pub fn new(driver: Option<Driver>, date_range: DateRange) -> Self {
        Self { driver, date_range }
    }

    pub fn driver(&self) -> Option<&Driver> {
        self.driver.as_ref()
    }

    pub fn date_range(&self) -> DateRange {
        self.date_range
    }

    pub fn set_driver(&mut self, driver: Option<Driver>) {
        self.driver = driver;
    }

    /// Replace the date range. An inverted range is rejected and the current
    /// range is kept.
    pub fn set_date_range(&mut self, from: NaiveDate, to: NaiveDate) -> Result<(), ValidationError> {
        self.date_range = DateRange::new(from, to)?;
        Ok(())
    }

    /// Query parameters shared by every report endpoint
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(3);
        if let Some(driver) = &self.driver {
            params.push(("driver", driver.id.clone()));
        }
        params.push(("from", self.date_range.from.format(constants::DATE_FORMAT).to_string()));
        params.push(("to", self.date_range.to.format(constants::DATE_FORMAT).to_string()));
        params
    }
}
