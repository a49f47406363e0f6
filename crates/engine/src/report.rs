#![allow(clippy::format_push_string)]

//! Per-run report of evaluations, placements, and failures.

use contra_core::types::OrderResult;
use rust_decimal::Decimal;
use serde::Serialize;

/// One evaluated open position.
#[derive(Debug, Clone, Serialize)]
pub struct PositionRow {
    pub symbol: String,
    pub roe: Decimal,
    pub unrealized_profit: Decimal,
}

/// A per-symbol failure that did not abort the run.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolFailure {
    pub symbol: String,
    pub error: String,
}

/// Outcome of one orchestration pass.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    /// ROE and unrealized PnL for every open position in the snapshot.
    pub rows: Vec<PositionRow>,

    /// Orders placed to open missing watchlist symbols.
    pub opened: Vec<OrderResult>,

    /// Orders placed to reverse losing positions.
    pub reversals: Vec<OrderResult>,

    /// Per-symbol failures from either phase.
    pub failures: Vec<SymbolFailure>,
}

pub struct ReportFormatter;

impl ReportFormatter {
    #[must_use]
    pub fn format(report: &RunReport) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════\n");
        output.push_str("                 POSITION REPORT                   \n");
        output.push_str("═══════════════════════════════════════════════════\n");
        output.push_str(&format!(
            "{:<14} {:>12} {:>18}\n",
            "Symbol", "ROE %", "Unrealized PnL"
        ));
        output.push_str("───────────────────────────────────────────────────\n");

        if report.rows.is_empty() {
            output.push_str("(no open positions)\n");
        }
        for row in &report.rows {
            output.push_str(&format!(
                "{:<14} {:>12} {:>18}\n",
                row.symbol, row.roe, row.unrealized_profit
            ));
        }

        if !report.opened.is_empty() {
            output.push('\n');
            output.push_str("Opened\n");
            output.push_str("───────────────────────────────────────────────────\n");
            for order in &report.opened {
                output.push_str(&Self::format_order(order));
            }
        }

        if !report.reversals.is_empty() {
            output.push('\n');
            output.push_str("Reversals\n");
            output.push_str("───────────────────────────────────────────────────\n");
            for order in &report.reversals {
                output.push_str(&Self::format_order(order));
            }
        }

        if !report.failures.is_empty() {
            output.push('\n');
            output.push_str("Failures\n");
            output.push_str("───────────────────────────────────────────────────\n");
            for failure in &report.failures {
                output.push_str(&format!("{:<14} {}\n", failure.symbol, failure.error));
            }
        }

        output.push_str("═══════════════════════════════════════════════════\n");
        output
    }

    fn format_order(order: &OrderResult) -> String {
        let tag = if order.simulated { " [SIMULATION]" } else { "" };
        format!(
            "{:<14} {:>4} {:>14}{tag}\n",
            order.symbol,
            order.side.as_api_str(),
            order.quantity
        )
    }
}
