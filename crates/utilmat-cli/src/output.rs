// crates/utilmat-cli/src/output.rs
//
// Output formatting utilities for the utilmat CLI.
// Supports table, JSON, and CSV output modes.

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::{Table, Tabled};
use utilmat_build::BuildReport;
use utilmat_core::{UtilityMatrix, UtilmatError};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
    /// Wide CSV: one row per user, one column per item.
    Csv,
}

/// A row in the build summary table.
#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data)
        .unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// Render the build report as a two-column table.
pub fn format_report(report: &BuildReport, matrix: &UtilityMatrix) -> String {
    let rows = vec![
        SummaryRow {
            metric: "Build",
            value: report.build_id.to_string(),
        },
        SummaryRow {
            metric: "Path",
            value: report.path.to_string(),
        },
        SummaryRow {
            metric: "Chunks",
            value: report.chunks.to_string(),
        },
        SummaryRow {
            metric: "Events seen",
            value: report.events_seen.to_string(),
        },
        SummaryRow {
            metric: "Events resolved",
            value: report.events_resolved.to_string(),
        },
        SummaryRow {
            metric: "Unknown-item events",
            value: report.unknown_item_events.to_string(),
        },
        SummaryRow {
            metric: "Intra-batch duplicates",
            value: report.intra_batch_duplicates.to_string(),
        },
        SummaryRow {
            metric: "Rows before merge",
            value: report.physical_rows.to_string(),
        },
        SummaryRow {
            metric: "Duplicated users",
            value: report.reconcile.duplicated_users.to_string(),
        },
        SummaryRow {
            metric: "Conflicting cells",
            value: report.reconcile.conflicting_cells.to_string(),
        },
        SummaryRow {
            metric: "Users",
            value: matrix.len().to_string(),
        },
        SummaryRow {
            metric: "Items",
            value: matrix.width().to_string(),
        },
        SummaryRow {
            metric: "Density",
            value: format!("{:.6}", matrix.density()),
        },
    ];
    format_table(&rows)
}

/// Render up to `limit` rows of the matrix as a table.
pub fn format_matrix(matrix: &UtilityMatrix, limit: usize) -> String {
    let mut builder = Builder::default();
    builder.push_record(header(matrix));
    for (user, cells) in matrix.rows().take(limit) {
        builder.push_record(record(user, cells));
    }
    builder.build().to_string()
}

/// Write the whole matrix as wide CSV. Missing ratings are empty fields.
pub fn write_matrix_csv<W: Write>(matrix: &UtilityMatrix, writer: W) -> Result<(), UtilmatError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(header(matrix))
        .map_err(|e| UtilmatError::Serialization(e.to_string()))?;
    for (user, cells) in matrix.rows() {
        out.write_record(record(user, cells))
            .map_err(|e| UtilmatError::Serialization(e.to_string()))?;
    }
    out.flush()?;
    Ok(())
}

fn header(matrix: &UtilityMatrix) -> Vec<String> {
    std::iter::once("user".to_string())
        .chain(matrix.columns().names().iter().cloned())
        .collect()
}

fn record(user: &str, cells: &[Option<f64>]) -> Vec<String> {
    std::iter::once(user.to_string())
        .chain(cells.iter().map(|c| c.map(|v| v.to_string()).unwrap_or_default()))
        .collect()
}
