//! Configuration for the fleet reports CLI

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use fleet_reports::constants;
use fleet_reports::{DateRange, OrchestratorConfig};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

// =============================================================================
// File-based Configuration (config.toml)
// =============================================================================

/// Configuration loaded from config.toml. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub report: ReportSection,
}

/// Reports backend section
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the fleet REST API
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_API_BASE.to_string(),
            timeout_secs: constants::DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

/// Report defaults section
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    /// Width of the default date range, ending today
    pub default_range_days: i64,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            default_range_days: constants::DEFAULT_RANGE_DAYS,
        }
    }
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| {
            "Failed to parse config.toml. Check for:\n\
             - Invalid TOML syntax (missing quotes, brackets, etc.)\n\
             - Incorrect data types (timeout_secs and default_range_days are integers)\n\n\
             See config.toml.example for the expected format."
        })
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Command line values that take precedence over config.toml
#[derive(Debug, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Resolved settings for one CLI run
#[derive(Debug)]
pub struct Config {
    pub base_url: String,
    pub fetch_timeout: Duration,
    pub date_range: DateRange,
}

impl Config {
    /// Merge file config and command line overrides, resolving the date range
    /// against `today`
    pub fn resolve(file_config: &FileConfig, overrides: Overrides, today: NaiveDate) -> Result<Self> {
        if file_config.report.default_range_days < 0 {
            anyhow::bail!(
                "report.default_range_days must not be negative (got {})",
                file_config.report.default_range_days
            );
        }

        let to = overrides.to.unwrap_or(today);
        let date_range = match overrides.from {
            Some(from) => DateRange::new(from, to).context("Invalid --from/--to range")?,
            None => DateRange::ending_on(to, file_config.report.default_range_days),
        };

        Ok(Self {
            base_url: overrides
                .base_url
                .unwrap_or_else(|| file_config.api.base_url.clone()),
            fetch_timeout: Duration::from_secs(file_config.api.timeout_secs.max(1)),
            date_range,
        })
    }

    /// Resolve against the local calendar date
    pub fn resolve_today(file_config: &FileConfig, overrides: Overrides) -> Result<Self> {
        Self::resolve(file_config, overrides, Local::now().date_naive())
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            fetch_timeout: self.fetch_timeout,
        }
    }
}
