//! Fleet Reports CLI
//!
//! Fetches the reports view from the fleet backend (revenue over time, KPI
//! cards, expense breakdown) for a driver and date range, and prints it,
//! exports it to CSV, or dumps it as JSON.

mod config;
mod display;
mod export;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config::{Config, FileConfig, Overrides};
use fleet_reports::{CycleOutcome, Driver, Filter, HttpReportSource, ReportOrchestrator, ReportSnapshot};

/// Default config file path
const CONFIG_FILE: &str = "config.toml";

#[derive(Parser, Debug)]
#[command(name = "fleet-reports")]
#[command(about = "Revenue, mileage, load and expense reports for the fleet")]
struct Args {
    /// Path to config.toml (optional, defaults apply when missing)
    #[arg(short, long, default_value = CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Restrict the report to one driver (id or name)
    #[arg(short, long, global = true)]
    driver: Option<String>,

    /// First day of the range (YYYY-MM-DD)
    #[arg(long, global = true)]
    from: Option<NaiveDate>,

    /// Last day of the range (YYYY-MM-DD, default: today)
    #[arg(long, global = true)]
    to: Option<NaiveDate>,

    /// Reports API base URL (overrides config.toml)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the report to the console (default)
    Report,

    /// Write the report tables as CSV files
    Export {
        /// Output directory for generated CSV files
        #[arg(short, long, default_value = "./output")]
        output_dir: PathBuf,
    },

    /// Print the report snapshot as JSON
    Json,

    /// List the drivers available for --driver
    Drivers,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let file_config = FileConfig::load_or_default(&args.config)?;
    let overrides = Overrides {
        base_url: args.base_url,
        from: args.from,
        to: args.to,
    };
    let config = Config::resolve_today(&file_config, overrides)?;
    debug!(base_url = %config.base_url, range = ?config.date_range, "Resolved configuration");

    let source = HttpReportSource::new(&config.base_url)?;
    let reports = ReportOrchestrator::new(
        source,
        Filter::new(None, config.date_range),
        config.orchestrator_config(),
    );

    let driver = args.driver.as_deref();
    match args.command.unwrap_or(Command::Report) {
        Command::Report => {
            let snapshot = run_report(&reports, driver).await?;
            display::print_snapshot(&snapshot);
        }
        Command::Export { output_dir } => {
            let snapshot = run_report(&reports, driver).await?;
            println!("Exporting report to {}...\n", output_dir.display());
            export::export_snapshot(&output_dir, &snapshot)?;
        }
        Command::Json => {
            let snapshot = run_report(&reports, driver).await?;
            println!("{}", serde_json::to_string_pretty(snapshot.as_ref())?);
        }
        Command::Drivers => {
            let drivers = reports.drivers().await.context("Failed to fetch driver list")?;
            display::print_drivers(&drivers);
        }
    }

    Ok(())
}

/// Run one report cycle, selecting `driver` first when given
async fn run_report(
    reports: &ReportOrchestrator<HttpReportSource>,
    driver: Option<&str>,
) -> Result<Arc<ReportSnapshot>> {
    let outcome = match driver {
        Some(query) => {
            let drivers = reports.drivers().await.context("Failed to fetch driver list")?;
            let driver = find_driver(&drivers, query)
                .with_context(|| format!("Unknown driver '{}'. Run 'fleet-reports drivers' to list them.", query))?;
            reports.set_driver(Some(driver.clone())).await
        }
        None => reports.refresh().await,
    };

    match outcome {
        CycleOutcome::Published(snapshot) => Ok(snapshot),
        CycleOutcome::Superseded { cycle } => anyhow::bail!("Report cycle {} was superseded", cycle),
    }
}

/// Match a driver by exact id, then by case-insensitive name
fn find_driver<'a>(drivers: &'a [Driver], query: &str) -> Option<&'a Driver> {
    drivers
        .iter()
        .find(|d| d.id == query)
        .or_else(|| drivers.iter().find(|d| d.name.eq_ignore_ascii_case(query)))
}
