//! Error types for the shipx-core library.

use std::path::PathBuf;

use thiserror::Error;

use crate::label::rules::Field;

/// Main error type for the shipx library.
#[derive(Error, Debug)]
pub enum ShipxError {
    /// The selected path is neither an existing document nor a directory.
    #[error("invalid path: '{}' is neither a file nor a directory", .0.display())]
    PathInvalid(PathBuf),

    /// A single document could not be decoded or lacked a required field.
    #[error("{document}: {source}")]
    Document {
        document: String,
        #[source]
        source: DocumentError,
    },

    /// Rule table could not be compiled.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Directory listing pattern error.
    #[error("invalid listing pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Worker pool for parallel decoding could not start.
    #[error("failed to start workers: {0}")]
    Workers(#[from] rayon::ThreadPoolBuildError),

    /// Export error.
    #[error("export error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ShipxError {
    /// Wrap a per-document failure with the document's identity.
    pub fn document(document: impl Into<String>, source: impl Into<DocumentError>) -> Self {
        Self::Document {
            document: document.into(),
            source: source.into(),
        }
    }

    /// The missing field, if this error is a required field that did not match.
    pub fn missing_field(&self) -> Option<Field> {
        match self {
            Self::Document { source, .. } => source.missing_field(),
            Self::Extraction(ExtractionError::FieldNotFound { field }) => Some(*field),
            _ => None,
        }
    }
}

/// Why one document contributed nothing to the aggregate.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The text source failed on the document.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A required field did not match.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl DocumentError {
    pub fn missing_field(&self) -> Option<Field> {
        match self {
            Self::Extraction(ExtractionError::FieldNotFound { field }) => Some(*field),
            _ => None,
        }
    }
}

/// Errors raised while turning a document into plain text.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The document decoded to whitespace only.
    #[error("no text extracted")]
    Empty,

    /// I/O error while reading the document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to label field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A required field's pattern matched nothing.
    #[error("{field} not found")]
    FieldNotFound { field: Field },

    /// A rule in the table cannot be used.
    #[error("invalid rule for {field}: {reason}")]
    InvalidRule { field: Field, reason: String },
}

/// Result type for the shipx library.
pub type Result<T> = std::result::Result<T, ShipxError>;
