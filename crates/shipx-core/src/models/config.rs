//! Configuration structures for the extraction pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShipxError};
use crate::label::rules::FieldRule;

/// Main configuration for shipx.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipxConfig {
    /// Field extraction rules.
    pub extraction: ExtractionConfig,

    /// Directory processing.
    pub batch: BatchConfig,

    /// Export target.
    pub export: ExportConfig,
}

/// Label field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Rule table applied to every document.
    pub rules: Vec<FieldRule>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            rules: FieldRule::defaults(),
        }
    }
}

/// Directory processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// File extension of documents of interest, without the dot.
    pub extension: String,

    /// Documents decoded at once (1 = sequential).
    pub jobs: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            extension: "pdf".to_string(),
            jobs: 1,
        }
    }
}

/// Delimited export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output file.
    pub output: PathBuf,

    /// Field delimiter.
    pub delimiter: char,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("output.csv"),
            delimiter: ',',
        }
    }
}

impl ExportConfig {
    /// The delimiter as a single byte.
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(|b| b.is_ascii() && *b != b'"' && *b != b'\n' && *b != b'\r')
            .ok_or_else(|| {
                ShipxError::Config(format!(
                    "delimiter must be a single ASCII character other than a quote or newline, got {:?}",
                    self.delimiter
                ))
            })
    }
}

impl ShipxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| ShipxError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ShipxError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
