//! Document decoding.
//!
//! The aggregator never reads document bytes itself; it asks a [`TextSource`]
//! for each document's plain text.

mod extractor;

pub use extractor::{PdfDocument, PdfTextSource};

use std::path::Path;

use crate::error::DecodeError;

/// Result type for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Something that turns a document reference into plain text.
///
/// Implementations must be shareable across worker threads; batch decoding
/// may call `decode` for several documents at once.
pub trait TextSource: Send + Sync {
    /// Decode the whole document into text.
    fn decode(&self, document: &Path) -> Result<String>;
}

impl<T: TextSource + ?Sized> TextSource for &T {
    fn decode(&self, document: &Path) -> Result<String> {
        (**self).decode(document)
    }
}

impl<T: TextSource + ?Sized> TextSource for Box<T> {
    fn decode(&self, document: &Path) -> Result<String> {
        (**self).decode(document)
    }
}
