//! Expense totals by category and their share of the overall spend

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::format::format_share;

/// Expense row as returned by `GET /reports/expenses`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseAmount {
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub color: Option<String>,
}

impl ExpenseAmount {
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount,
            color: None,
        }
    }
}

/// Expense category with its derived share (percent of total)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseCategory {
    pub name: String,
    pub amount: f64,
    pub color_token: String,
    pub share: f64,
}

impl ExpenseCategory {
    pub fn share_label(&self) -> String {
        format_share(self.share)
    }
}

/// Total spend across all rows
pub fn total_amount(rows: &[ExpenseAmount]) -> f64 {
    rows.iter().map(|r| r.amount).sum()
}

/// Attach shares to expense rows, preserving input order (legend order).
///
/// A zero total gives every category a zero share.
pub fn categorize(rows: &[ExpenseAmount]) -> Vec<ExpenseCategory> {
    let total = total_amount(rows);
    let palette = constants::DEFAULT_EXPENSE_PALETTE;

    rows.iter()
        .enumerate()
        .map(|(i, row)| ExpenseCategory {
            name: row.name.clone(),
            amount: row.amount,
            color_token: row
                .color
                .clone()
                .unwrap_or_else(|| palette[i % palette.len()].to_string()),
            share: if total == 0.0 { 0.0 } else { row.amount * 100.0 / total },
        })
        .collect()
}
