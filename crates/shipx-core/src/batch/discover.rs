//! Document discovery in a directory.

use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::debug;

use crate::error::Result;

/// Documents in `dir` with the given extension, sorted by file name.
///
/// Only `dir` itself is read: the pattern is matched against file names, never
/// against the directory path. The extension match ignores case. Sorting makes
/// the processing order independent of the platform's listing order.
pub fn list_documents(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let pattern = Pattern::new(&format!(
        "*.{}",
        Pattern::escape(extension.trim_start_matches('.'))
    ))?;
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };

    let mut documents = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| pattern.matches_with(name, options));
        if matches && path.is_file() {
            documents.push(path);
        }
    }

    documents.sort_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.cmp(b)));

    debug!(
        "Found {} documents matching {} in {}",
        documents.len(),
        pattern,
        dir.display()
    );
    Ok(documents)
}

/// Name used to identify a document in diagnostics.
pub fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
