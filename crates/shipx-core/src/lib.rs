//! Core library for shipping label extraction.
//!
//! This crate provides:
//! - PDF text decoding behind the [`TextSource`] trait
//! - A configurable rule table for label fields (order, tracking, due date, trade-in)
//! - Single-document and directory extraction into an order-keyed [`Aggregate`]
//! - Projection into flat rows and delimited export

pub mod batch;
pub mod error;
pub mod export;
pub mod label;
pub mod models;
pub mod pdf;

pub use batch::{BatchAggregator, BatchReport, BatchStatus, CancelToken, Diagnostic, Input, Mode};
pub use error::{DecodeError, DocumentError, ExtractionError, Result, ShipxError};
pub use export::{ShipmentRow, project};
pub use label::rules::{Cardinality, Field, FieldRule};
pub use label::{LabelExtractor, RuleLabelParser, ShippingLabel};
pub use models::config::ShipxConfig;
pub use models::shipment::{Aggregate, OrderId, OrderRecord, ShipmentEntry, TrackingId};
pub use pdf::{PdfTextSource, TextSource};

/// Build an aggregator for PDF files from configuration.
pub fn pdf_aggregator(config: &ShipxConfig) -> Result<BatchAggregator<PdfTextSource, RuleLabelParser>> {
    let parser = RuleLabelParser::from_rules(&config.extraction.rules)?;
    Ok(BatchAggregator::new(PdfTextSource::new(), parser)
        .with_extension(config.batch.extension.clone())
        .with_jobs(config.batch.jobs))
}

/// Extract shipments from a PDF file or a directory of PDF files.
///
/// A file is processed fail-closed, a directory fail-open per document.
pub fn extract(path: impl AsRef<std::path::Path>, config: &ShipxConfig) -> Result<BatchReport> {
    let input = Input::from_path(path)?;
    pdf_aggregator(config)?.run(&input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let report = extract(dir.path(), &ShipxConfig::default()).unwrap();
        assert_eq!(report.status, BatchStatus::NoDocumentsFound);
        assert!(project(&report.aggregate).is_empty());
    }

    #[test]
    fn test_extract_rejects_unusable_rules() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ShipxConfig::default();
        config.extraction.rules.retain(|r| r.field != Field::TrackingId);

        assert!(matches!(
            extract(dir.path(), &config),
            Err(ShipxError::Extraction(ExtractionError::InvalidRule { field: Field::TrackingId, .. }))
        ));
    }

    #[test]
    fn test_extract_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            extract(dir.path().join("missing.pdf"), &ShipxConfig::default()),
            Err(ShipxError::PathInvalid(_))
        ));
    }
}
