//! Message contracts carried between pipeline stages

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::route::Route;

/// One parsed line of a links manifest: `bibcode<TAB>source_path<TAB>provider`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub bibcode: String,
    pub source_path: PathBuf,
    pub provider: String,
}

/// Bounded batch of link records published as one ingress message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkPacket {
    pub records: Vec<LinkRecord>,
    /// Bypass the update check for every record in this packet.
    #[serde(default)]
    pub force_extract: bool,
}

/// Source file format, derived from the path extension.
///
/// Everything except `Pdf` rides the standard extractor queue. `Ocr`
/// sources are plain text with OCR provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Txt,
    Html,
    Xml,
    Ocr,
    Pdf,
}

impl FileFormat {
    /// Classify a source path by extension.
    ///
    /// Unknown extensions fall back to `Txt`; a path without an extension
    /// is unclassifiable and returns `None`.
    pub fn classify(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Some(match ext.to_ascii_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "html" | "htm" => Self::Html,
            "xml" => Self::Xml,
            "ocr" => Self::Ocr,
            _ => Self::Txt,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Html => "html",
            Self::Xml => "xml",
            Self::Ocr => "ocr",
            Self::Pdf => "pdf",
        }
    }

    /// Extractor queue for this format.
    pub fn route(self) -> Route {
        match self {
            Self::Pdf => Route::PdfExtractor,
            Self::Txt | Self::Html | Self::Xml | Self::Ocr => Route::StandardExtractor,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why (or whether) a document needs (re-)extraction.
///
/// `NoUpdateNeeded` terminates the task at the update checker; everything
/// else flows onward (`NoContent` to the error handler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateStatus {
    NotExtractedBefore,
    NeedsReextracting,
    NoContent,
    NoUpdateNeeded,
}

impl UpdateStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::NoUpdateNeeded)
    }
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotExtractedBefore => "NOT_EXTRACTED_BEFORE",
            Self::NeedsReextracting => "NEEDS_REEXTRACTING",
            Self::NoContent => "NO_CONTENT",
            Self::NoUpdateNeeded => "NO_UPDATE_NEEDED",
        };
        f.write_str(s)
    }
}

/// The evolving payload carried stage to stage.
///
/// Fields are accumulated as the task moves through the pipeline; unset
/// fields are omitted from the wire form so stages can add fields without
/// breaking older consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionTask {
    pub bibcode: String,
    pub provider: String,
    /// Path to the original source file.
    pub ft_source: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_format: Option<FileFormat>,
    #[serde(rename = "UPDATE", skip_serializing_if = "Option::is_none")]
    pub update: Option<UpdateStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub force_extract: bool,
}

impl ExtractionTask {
    /// Build the ingress-stage task for one link record.
    pub fn from_link(record: LinkRecord, force_extract: bool) -> Self {
        Self {
            bibcode: record.bibcode,
            provider: record.provider,
            ft_source: record.source_path,
            file_format: None,
            update: None,
            meta_path: None,
            index_date: None,
            body: None,
            metadata: BTreeMap::new(),
            force_extract,
        }
    }
}

/// Pipeline stage that produced an error record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Checker,
    Extractor,
    MetaWriter,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Checker => "checker",
            Self::Extractor => "extractor",
            Self::MetaWriter => "meta_writer",
        };
        f.write_str(s)
    }
}

/// Structured failure report routed to the error sink instead of aborting
/// the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub task: ExtractionTask,
    pub stage: Stage,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorRecord {
    pub fn new(task: ExtractionTask, stage: Stage, reason: impl Into<String>) -> Self {
        Self {
            task,
            stage,
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }
}
