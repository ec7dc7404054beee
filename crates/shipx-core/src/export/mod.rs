//! Flat rows for display and export.

mod delimited;

pub use delimited::{HEADERS, export_csv, read_rows, to_csv_string, write_rows};

use serde::{Deserialize, Serialize};

use crate::models::shipment::Aggregate;

/// One tracking identifier with its order and shipment fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentRow {
    #[serde(rename = "Order Number")]
    pub order_id: String,

    #[serde(rename = "Tracking Number")]
    pub tracking_id: String,

    #[serde(rename = "Due Date")]
    pub due_date: Option<String>,

    #[serde(rename = "Trade-In Devices")]
    pub trade_in: Option<String>,
}

/// Flatten an aggregate into one row per tracking identifier.
///
/// Orders come in insertion order, entries in processing order and tracking
/// identifiers in the order they were found. Rows from the same entry share
/// its due date and trade-in description.
pub fn project(aggregate: &Aggregate) -> Vec<ShipmentRow> {
    let mut rows = Vec::with_capacity(aggregate.tracking_count());

    for record in aggregate {
        for entry in &record.entries {
            for tracking_id in &entry.tracking_ids {
                rows.push(ShipmentRow {
                    order_id: record.order_id.to_string(),
                    tracking_id: tracking_id.to_string(),
                    due_date: entry.due_date.as_ref().map(|d| d.to_string()),
                    trade_in: entry.trade_in.as_ref().map(|t| t.to_string()),
                });
            }
        }
    }

    rows
}
