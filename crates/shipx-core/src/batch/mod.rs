//! Single-document and directory extraction into an order-keyed aggregate.
//!
//! Single-document mode fails closed: a decode error or a missing required
//! field aborts the run. Batch mode fails open per document: the failure is
//! recorded as a [`Diagnostic`] and the next document is processed.
//!
//! With more than one job, documents are decoded and parsed on a worker pool,
//! but results are merged by one writer in sorted document order, so the
//! aggregate is identical to a sequential run.

mod discover;

pub use discover::{document_name, list_documents};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{DocumentError, Result, ShipxError};
use crate::label::{LabelExtractor, ShippingLabel};
use crate::models::shipment::Aggregate;
use crate::pdf::TextSource;

/// What the caller selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// One document, processed fail-closed.
    Document(PathBuf),
    /// A directory of documents, processed fail-open per document.
    Directory(PathBuf),
}

impl Input {
    /// Classify a path as a document or a directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_file() {
            Ok(Self::Document(path.to_path_buf()))
        } else if path.is_dir() {
            Ok(Self::Directory(path.to_path_buf()))
        } else {
            Err(ShipxError::PathInvalid(path.to_path_buf()))
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Document(path) | Self::Directory(path) => path,
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Self::Document(_) => Mode::Single,
            Self::Directory(_) => Mode::Batch,
        }
    }
}

/// Failure policy of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Single,
    Batch,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Every document was visited.
    Completed,
    /// The directory held no documents of interest. Not an error.
    NoDocumentsFound,
    /// The caller cancelled; documents after the cancellation point were not merged.
    Cancelled,
}

/// A document skipped in batch mode.
#[derive(Debug)]
pub struct Diagnostic {
    pub document: String,
    pub error: DocumentError,
}

/// Outcome of one extraction run.
#[derive(Debug)]
pub struct BatchReport {
    pub aggregate: Aggregate,
    pub diagnostics: Vec<Diagnostic>,
    pub status: BatchStatus,
    /// Documents selected for processing.
    pub documents_seen: usize,
    /// Documents that contributed an entry.
    pub documents_merged: usize,
}

impl BatchReport {
    fn new(documents_seen: usize) -> Self {
        Self {
            aggregate: Aggregate::new(),
            diagnostics: Vec::new(),
            status: BatchStatus::Completed,
            documents_seen,
            documents_merged: 0,
        }
    }

    /// Documents that were decoded and parsed successfully.
    pub fn processed(&self) -> usize {
        self.documents_merged
    }

    /// Documents recorded as skipped.
    pub fn skipped(&self) -> usize {
        self.diagnostics.len()
    }
}

/// Cooperative cancellation, checked between documents.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of visiting one document.
enum Step {
    Extracted(ShippingLabel),
    Failed(DocumentError),
    Cancelled,
}

/// Drives a [`TextSource`] and a [`LabelExtractor`] over the selected documents.
pub struct BatchAggregator<S, P> {
    source: S,
    parser: P,
    extension: String,
    jobs: usize,
    cancel: CancelToken,
}

impl<S: TextSource, P: LabelExtractor> BatchAggregator<S, P> {
    pub fn new(source: S, parser: P) -> Self {
        Self {
            source,
            parser,
            extension: "pdf".to_string(),
            jobs: 1,
            cancel: CancelToken::new(),
        }
    }

    /// Extension of documents of interest in directory mode.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Number of documents decoded at once. Values below 2 run sequentially.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run the mode the input calls for.
    pub fn run(&self, input: &Input) -> Result<BatchReport> {
        match input {
            Input::Document(path) => self.extract_document(path),
            Input::Directory(dir) => self.extract_directory(dir),
        }
    }

    /// Single-document mode: any failure is returned to the caller.
    pub fn extract_document(&self, path: &Path) -> Result<BatchReport> {
        let mut report = BatchReport::new(1);
        if self.cancel.is_cancelled() {
            report.status = BatchStatus::Cancelled;
            return Ok(report);
        }

        info!("Extracting {}", path.display());
        let label = self
            .process(path)
            .map_err(|e| ShipxError::document(path.display().to_string(), e))?;

        report.aggregate.insert(label.order_id, label.entry);
        report.documents_merged = 1;
        Ok(report)
    }

    /// Batch mode over the documents of interest in `dir`.
    pub fn extract_directory(&self, dir: &Path) -> Result<BatchReport> {
        if !dir.is_dir() {
            return Err(ShipxError::PathInvalid(dir.to_path_buf()));
        }

        let documents = list_documents(dir, &self.extension)?;
        if documents.is_empty() {
            info!("No {} files found in {}", self.extension, dir.display());
        }

        self.extract_documents(&documents)
    }

    /// Batch mode over an explicit listing, processed in the given order.
    pub fn extract_documents(&self, documents: &[PathBuf]) -> Result<BatchReport> {
        if documents.is_empty() {
            let mut report = BatchReport::new(0);
            report.status = BatchStatus::NoDocumentsFound;
            return Ok(report);
        }

        info!("Processing {} documents with {} job(s)", documents.len(), self.jobs);

        let report = if self.jobs > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.jobs)
                .build()?;
            // Indexed collect keeps document order regardless of completion order.
            let steps: Vec<Step> = pool.install(|| {
                documents
                    .par_iter()
                    .map(|path| self.step(path))
                    .collect()
            });
            self.merge(documents, steps)
        } else {
            self.merge(documents, documents.iter().map(|path| self.step(path)))
        };

        info!(
            "Batch {:?}: {} merged, {} skipped, {} orders",
            report.status,
            report.documents_merged,
            report.skipped(),
            report.aggregate.len()
        );
        Ok(report)
    }

    fn step(&self, path: &Path) -> Step {
        if self.cancel.is_cancelled() {
            return Step::Cancelled;
        }
        match self.process(path) {
            Ok(label) => Step::Extracted(label),
            Err(e) => Step::Failed(e),
        }
    }

    /// Single writer: fold per-document steps into the report in listing order.
    fn merge(&self, documents: &[PathBuf], steps: impl IntoIterator<Item = Step>) -> BatchReport {
        let mut report = BatchReport::new(documents.len());

        for (path, step) in documents.iter().zip(steps) {
            match step {
                Step::Extracted(label) => {
                    report.aggregate.insert(label.order_id, label.entry);
                    report.documents_merged += 1;
                }
                Step::Failed(error) => {
                    let document = document_name(path);
                    warn!("Skipping {}: {}", document, error);
                    report.diagnostics.push(Diagnostic { document, error });
                }
                Step::Cancelled => {
                    info!("Cancelled before {}", document_name(path));
                    report.status = BatchStatus::Cancelled;
                    break;
                }
            }
        }

        report
    }

    fn process(&self, path: &Path) -> std::result::Result<ShippingLabel, DocumentError> {
        let text = self.source.decode(path)?;
        debug!("Decoded {} ({} chars)", path.display(), text.len());
        Ok(self.parser.parse(&text)?)
    }
}
