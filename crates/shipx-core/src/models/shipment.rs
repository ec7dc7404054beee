//! Shipment data extracted from labels and the order-keyed aggregate.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! text_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

text_newtype!(
    /// Order identifier, `SA` followed by nine digits.
    OrderId
);

text_newtype!(
    /// Tracking identifier, twelve digits.
    TrackingId
);

text_newtype!(
    /// Ship-by deadline exactly as printed on the label.
    DueDate
);

text_newtype!(
    /// Trade-in device description exactly as printed on the label.
    TradeInDescription
);

/// Date layouts seen in ship-by sentences.
const DUE_DATE_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%b %d, %Y",
    "%A, %B %d, %Y",
    "%a, %b %d, %Y",
    "%m/%d/%Y",
    "%Y-%m-%d",
];

impl DueDate {
    /// Interpret the captured text as a calendar date.
    ///
    /// Only the leading date is read, so trailing words or punctuation
    /// (`October 25, 2024.`, `Oct 25, 2024 to avoid cancellation`) are fine.
    pub fn as_date(&self) -> Option<NaiveDate> {
        let text = self.0.trim();
        DUE_DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_and_remainder(text, fmt).ok())
            .map(|(date, _)| date)
    }
}

/// Fields extracted from one label document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentEntry {
    /// Tracking identifiers in the order they appear. Never empty.
    pub tracking_ids: Vec<TrackingId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DueDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_in: Option<TradeInDescription>,
}

impl ShipmentEntry {
    pub fn new(tracking_ids: Vec<TrackingId>) -> Self {
        Self {
            tracking_ids,
            due_date: None,
            trade_in: None,
        }
    }

    pub fn with_due_date(mut self, due_date: impl Into<DueDate>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn with_trade_in(mut self, trade_in: impl Into<TradeInDescription>) -> Self {
        self.trade_in = Some(trade_in.into());
        self
    }
}

/// All entries recorded for one order, in document-processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRecord {
    pub order_id: OrderId,
    pub entries: Vec<ShipmentEntry>,
}

impl OrderRecord {
    /// Tracking identifiers across every entry.
    pub fn tracking_ids(&self) -> impl Iterator<Item = &TrackingId> {
        self.entries.iter().flat_map(|e| e.tracking_ids.iter())
    }
}

/// Order records keyed by order identifier, kept in first-seen order.
///
/// Built fresh for every extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    records: Vec<OrderRecord>,
    index: HashMap<OrderId, usize>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry` to the record for `order_id`, creating it if absent.
    pub fn insert(&mut self, order_id: OrderId, entry: ShipmentEntry) {
        match self.index.get(&order_id) {
            Some(&slot) => self.records[slot].entries.push(entry),
            None => {
                self.index.insert(order_id.clone(), self.records.len());
                self.records.push(OrderRecord {
                    order_id,
                    entries: vec![entry],
                });
            }
        }
    }

    pub fn get(&self, order_id: &str) -> Option<&OrderRecord> {
        self.index
            .get(&OrderId::from(order_id))
            .map(|&slot| &self.records[slot])
    }

    pub fn contains(&self, order_id: &str) -> bool {
        self.get(order_id).is_some()
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OrderRecord> {
        self.records.iter()
    }

    pub fn order_ids(&self) -> impl Iterator<Item = &OrderId> {
        self.records.iter().map(|r| &r.order_id)
    }

    /// Number of distinct orders.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of shipment entries across all orders.
    pub fn entry_count(&self) -> usize {
        self.records.iter().map(|r| r.entries.len()).sum()
    }

    /// Number of tracking identifiers across all orders.
    pub fn tracking_count(&self) -> usize {
        self.records.iter().map(|r| r.tracking_ids().count()).sum()
    }
}

impl<'a> IntoIterator for &'a Aggregate {
    type Item = &'a OrderRecord;
    type IntoIter = std::slice::Iter<'a, OrderRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl Serialize for Aggregate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.records)
    }
}
