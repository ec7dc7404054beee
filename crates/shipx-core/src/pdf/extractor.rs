//! PDF text extraction using lopdf and pdf-extract.

use std::panic;
use std::path::Path;

use lopdf::Document;
use tracing::{debug, trace};

use super::{Result, TextSource};
use crate::error::DecodeError;

/// A loaded PDF, decrypted if it was protected with an empty password.
pub struct PdfDocument {
    document: Document,
    raw_data: Vec<u8>,
}

impl PdfDocument {
    /// Load a PDF from bytes.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut document =
            Document::load_mem(data).map_err(|e| DecodeError::Parse(e.to_string()))?;

        // pdf-extract reads raw bytes, so keep a decrypted copy for it.
        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(DecodeError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| DecodeError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        if document.get_pages().is_empty() {
            return Err(DecodeError::NoPages);
        }

        Ok(Self { document, raw_data })
    }

    /// Get the number of pages in the PDF.
    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Text of every page, concatenated in page order.
    pub fn extract_text(&self) -> Result<String> {
        // pdf-extract panics on some malformed content streams.
        let data = self.raw_data.as_slice();
        let extracted = panic::catch_unwind(move || pdf_extract::extract_text_from_mem(data))
            .map_err(|_| DecodeError::TextExtraction("text extractor panicked".to_string()))?;

        extracted.map_err(|e| DecodeError::TextExtraction(e.to_string()))
    }
}

/// [`TextSource`] reading PDF files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextSource;

impl PdfTextSource {
    pub fn new() -> Self {
        Self
    }
}

impl TextSource for PdfTextSource {
    fn decode(&self, document: &Path) -> Result<String> {
        let data = std::fs::read(document)?;
        let pdf = PdfDocument::load(&data)?;
        let text = pdf.extract_text()?;

        if text.trim().is_empty() {
            return Err(DecodeError::Empty);
        }

        debug!(
            "Decoded {}: {} pages, {} chars",
            document.display(),
            pdf.page_count(),
            text.len()
        );
        trace!("{}: {:?}", document.display(), text);
        Ok(text)
    }
}
