//! Rendering of extraction results.

use chrono::NaiveDate;
use console::style;
use serde_json::json;

use shipx_core::models::shipment::DueDate;
use shipx_core::{BatchReport, BatchStatus, ShipmentRow};

const COL_ORDER: usize = 15;
const COL_TRACKING: usize = 20;
const COL_DUE_DATE: usize = 20;

/// Fixed-width table of rows.
///
/// With `today`, due dates that parse to an earlier day are marked overdue.
pub fn format_table(rows: &[ShipmentRow], today: Option<NaiveDate>) -> String {
    let mut output = format!(
        "{:<COL_ORDER$} {:<COL_TRACKING$} {:<COL_DUE_DATE$} {}\n",
        "Order Number", "Tracking Number", "Due Date", "Trade-In Devices"
    );
    output.push_str(&"-".repeat(70));
    output.push('\n');

    if rows.is_empty() {
        output.push_str("No tracking numbers found.\n");
        return output;
    }

    for row in rows {
        let mut due_date = row.due_date.clone().unwrap_or_default();
        if let (Some(today), Some(date)) = (today, row.due_date.as_deref().and_then(|d| DueDate::from(d).as_date())) {
            if date < today {
                due_date.push_str(" (overdue)");
            }
        }

        output.push_str(&format!(
            "{:<COL_ORDER$} {:<COL_TRACKING$} {:<COL_DUE_DATE$} {}\n",
            row.order_id,
            row.tracking_id,
            due_date,
            row.trade_in.as_deref().unwrap_or("")
        ));
    }

    output
}

/// Report as JSON: status, orders in insertion order and skipped documents.
pub fn format_json(report: &BatchReport) -> anyhow::Result<String> {
    let skipped: Vec<_> = report
        .diagnostics
        .iter()
        .map(|d| json!({ "document": d.document, "error": d.error.to_string() }))
        .collect();

    let value = json!({
        "status": report.status,
        "orders": report.aggregate,
        "skipped": skipped,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Print the run summary and skipped documents to stderr.
pub fn print_summary(report: &BatchReport) {
    match report.status {
        BatchStatus::NoDocumentsFound => {
            eprintln!("{} No documents found", style("ℹ").blue());
            return;
        }
        BatchStatus::Cancelled => {
            eprintln!(
                "{} Cancelled, showing results for the documents processed so far",
                style("!").yellow()
            );
        }
        BatchStatus::Completed => {}
    }

    eprintln!(
        "{} {} orders, {} tracking numbers from {} of {} documents",
        style("✓").green(),
        report.aggregate.len(),
        report.aggregate.tracking_count(),
        style(report.processed()).green(),
        report.documents_seen,
    );

    if !report.diagnostics.is_empty() {
        eprintln!();
        eprintln!("{}", style(format!("Skipped {} documents:", report.skipped())).red());
        for diagnostic in &report.diagnostics {
            eprintln!("  - {}: {}", diagnostic.document, diagnostic.error);
        }
    }
}
