//! Shipping label field extraction module.

mod parser;
pub mod rules;

pub use parser::{RuleLabelParser, ShippingLabel};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for turning label text into a shipment entry.
pub trait LabelExtractor: Send + Sync {
    /// Extract the order identifier and shipment fields from plain text.
    fn parse(&self, text: &str) -> Result<ShippingLabel>;
}
