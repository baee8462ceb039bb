//! CSV export of a report snapshot

use anyhow::{Context, Result};
use csv::Writer;
use fleet_reports::{MetricState, ReportSnapshot};
use std::path::{Path, PathBuf};

pub const REVENUE_FILENAME: &str = "revenue_over_time.csv";
pub const KPI_FILENAME: &str = "kpis.csv";
pub const EXPENSES_FILENAME: &str = "expenses.csv";

fn status<T>(state: &MetricState<T>) -> &'static str {
    match state {
        MetricState::Ready(_) => "ok",
        MetricState::NoData => "no_data",
        MetricState::Unavailable(_) => "unavailable",
    }
}

/// Write every available table of `snapshot` into `output_dir`.
/// Returns the paths written.
pub fn export_snapshot(output_dir: &Path, snapshot: &ReportSnapshot) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let mut written = vec![write_kpis(output_dir, snapshot)?];

    match write_revenue(output_dir, snapshot)? {
        Some(path) => written.push(path),
        None => eprintln!(
            "  ⚠️  Skipped {}: revenue {}",
            REVENUE_FILENAME,
            status(&snapshot.revenue_over_time)
        ),
    }
    match write_expenses(output_dir, snapshot)? {
        Some(path) => written.push(path),
        None => eprintln!("  ⚠️  Skipped {}: expenses {}", EXPENSES_FILENAME, status(&snapshot.expenses)),
    }

    for path in &written {
        println!("  Generated: {}", path.display());
    }
    Ok(written)
}

/// Generate kpis.csv (one row per KPI, including unavailable ones)
fn write_kpis(output_dir: &Path, snapshot: &ReportSnapshot) -> Result<PathBuf> {
    let path = output_dir.join(KPI_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record(["KPI", "Value", "Change_Percent", "Direction", "Status"])?;
    for (name, state) in snapshot.kpis() {
        match state.ready() {
            Some(panel) => {
                wtr.write_record([
                    name,
                    &panel.summary.aggregate_value.to_string(),
                    &panel.summary.change_percent.to_string(),
                    panel.summary.change_direction.as_str(),
                    status(state),
                ])?;
            }
            None => wtr.write_record([name, "", "", "", status(state)])?,
        }
    }

    wtr.flush()?;
    Ok(path)
}

/// Generate revenue_over_time.csv (Date plus one column per category)
fn write_revenue(output_dir: &Path, snapshot: &ReportSnapshot) -> Result<Option<PathBuf>> {
    let Some(chart) = snapshot.revenue_over_time.ready() else {
        return Ok(None);
    };

    let path = output_dir.join(REVENUE_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    let mut header = vec!["Date".to_string()];
    header.extend(chart.categories.iter().cloned());
    wtr.write_record(&header)?;

    for record in &chart.records {
        let mut row = vec![record.date.clone()];
        row.extend(
            chart
                .categories
                .iter()
                .map(|c| record.values.get(c).map(|v| format!("{:.2}", v)).unwrap_or_default()),
        );
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(Some(path))
}

/// Generate expenses.csv
fn write_expenses(output_dir: &Path, snapshot: &ReportSnapshot) -> Result<Option<PathBuf>> {
    let Some(categories) = snapshot.expenses.ready() else {
        return Ok(None);
    };

    let path = output_dir.join(EXPENSES_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record(["Category", "Amount_USD", "Share_Percent", "Color"])?;
    for category in categories {
        wtr.write_record([
            category.name.as_str(),
            &format!("{:.2}", category.amount),
            &format!("{:.2}", category.share),
            category.color_token.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(Some(path))
}
