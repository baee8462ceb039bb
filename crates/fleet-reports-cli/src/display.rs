//! Console rendering of report snapshots

use fleet_reports::format::{format_currency, format_number};
use fleet_reports::{ChangeDirection, Driver, MetricState, ReportSnapshot};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct KpiRow {
    #[tabled(rename = "KPI")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Change")]
    change: String,
    #[tabled(rename = "Trend")]
    trend: String,
}

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "Category")]
    name: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Share")]
    share: String,
}

#[derive(Tabled)]
struct DriverRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

fn trend_arrow(direction: ChangeDirection) -> &'static str {
    match direction {
        ChangeDirection::Positive => "▲",
        ChangeDirection::Negative => "▼",
        ChangeDirection::Flat => "─",
    }
}

/// Placeholder text for a metric without data
fn placeholder<T>(state: &MetricState<T>) -> String {
    match state {
        MetricState::Ready(_) => String::new(),
        MetricState::NoData => "no data".to_string(),
        MetricState::Unavailable(reason) => format!("unavailable ({})", reason),
    }
}

fn kpi_rows(snapshot: &ReportSnapshot) -> Vec<KpiRow> {
    snapshot
        .kpis()
        .into_iter()
        .map(|(name, state)| match state.ready() {
            Some(panel) => KpiRow {
                name: name.to_string(),
                value: panel.summary.value_label(),
                change: panel.summary.change_label(),
                trend: trend_arrow(panel.summary.change_direction).to_string(),
            },
            None => KpiRow {
                name: name.to_string(),
                value: placeholder(state),
                change: "-".to_string(),
                trend: String::new(),
            },
        })
        .collect()
}

/// Render the revenue series as "date  value" lines, one column per category
fn revenue_lines(snapshot: &ReportSnapshot) -> Vec<String> {
    let Some(chart) = snapshot.revenue_over_time.ready() else {
        return vec![format!("  {}", placeholder(&snapshot.revenue_over_time))];
    };

    let mut lines = vec![format!("  {:<12} {}", "Date", chart.categories.join("  "))];
    for record in &chart.records {
        let values: Vec<String> = chart
            .categories
            .iter()
            .map(|c| {
                record
                    .values
                    .get(c)
                    .map(|v| format!("{:>14}", format_currency(*v)))
                    .unwrap_or_else(|| format!("{:>14}", "-"))
            })
            .collect();
        lines.push(format!("  {:<12} {}", record.date, values.join("  ")));
    }
    lines
}

/// Print a full snapshot to the console
pub fn print_snapshot(snapshot: &ReportSnapshot) {
    let range = snapshot.filter.date_range();
    let driver = snapshot
        .filter
        .driver()
        .map(|d| d.name.as_str())
        .unwrap_or("All drivers");

    println!("\n============================================================");
    println!("                      FLEET REPORT");
    println!("  {} · {} to {}", driver, range.from(), range.to());
    println!("============================================================\n");

    println!("KPIs:");
    println!("{}", Table::new(kpi_rows(snapshot)).with(Style::rounded()));

    println!("\nREVENUE OVER TIME:");
    for line in revenue_lines(snapshot) {
        println!("{}", line);
    }

    println!("\nEXPENSES BY CATEGORY:");
    match snapshot.expenses.ready() {
        Some(categories) => {
            let rows: Vec<ExpenseRow> = categories
                .iter()
                .map(|c| ExpenseRow {
                    name: c.name.clone(),
                    amount: format_currency(c.amount),
                    share: c.share_label(),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
            let total: f64 = categories.iter().map(|c| c.amount).sum();
            println!("  Total: {}", format_currency(total));
        }
        None => println!("  {}", placeholder(&snapshot.expenses)),
    }

    let unavailable = snapshot.unavailable_count();
    if unavailable > 0 {
        println!("\n⚠️  {} metric(s) unavailable; see log output for details", unavailable);
    }
    println!("============================================================");
}

/// Print the driver list used by `--driver`
pub fn print_drivers(drivers: &[Driver]) {
    if drivers.is_empty() {
        println!("No drivers found.");
        return;
    }

    let rows: Vec<DriverRow> = drivers
        .iter()
        .map(|d| DriverRow {
            id: d.id.clone(),
            name: d.name.clone(),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));
    println!("\n{} driver(s)", format_number(drivers.len() as f64));
}
