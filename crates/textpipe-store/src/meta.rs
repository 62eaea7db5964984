//! The meta.json document persisted next to each fulltext.txt

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use textpipe_core::{FileFormat, UpdateStatus};

use crate::atomic::write_atomic;

pub const META_FILENAME: &str = "meta.json";
pub const FULLTEXT_FILENAME: &str = "fulltext.txt";

/// Persisted extraction record for one bibcode.
///
/// Rewritten in full on every (re-)extraction; extractor-provided metadata
/// (title and format-specific fields) is flattened into the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub bibcode: String,
    pub provider: String,
    pub file_format: FileFormat,
    pub ft_source: PathBuf,
    #[serde(rename = "UPDATE")]
    pub update: UpdateStatus,
    pub index_date: DateTime<Utc>,
    /// Blake3 hex of the source file at extraction time. Absent for
    /// records written before fingerprinting existed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_fingerprint: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl DocumentMeta {
    /// Read `dir/meta.json`.
    pub fn read_from(dir: &Path) -> Result<Self> {
        let path = dir.join(META_FILENAME);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Atomically write `dir/meta.json`.
    pub fn write_to(&self, dir: &Path) -> Result<()> {
        let path = dir.join(META_FILENAME);
        let json = serde_json::to_string_pretty(self).context("failed to serialize meta.json")?;
        write_atomic(&path, json.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DocumentMeta {
        let mut extra = BTreeMap::new();
        extra.insert("title".to_string(), "A Title".to_string());
        DocumentMeta {
            bibcode: "2025MNRAS.500.1A".into(),
            provider: "MNRAS".into(),
            file_format: FileFormat::Txt,
            ft_source: PathBuf::from("/data/a.txt"),
            update: UpdateStatus::NotExtractedBefore,
            index_date: Utc::now(),
            source_fingerprint: Some("abc123".into()),
            extra,
        }
    }

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let meta = sample();
        meta.write_to(dir.path()).unwrap();

        let back = DocumentMeta::read_from(dir.path()).unwrap();
        assert_eq!(back.bibcode, meta.bibcode);
        assert_eq!(back.file_format, FileFormat::Txt);
        assert_eq!(back.update, UpdateStatus::NotExtractedBefore);
        assert_eq!(back.source_fingerprint.as_deref(), Some("abc123"));
        assert_eq!(back.extra["title"], "A Title");
    }

    #[test]
    fn update_key_is_uppercase_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        sample().write_to(dir.path()).unwrap();
        let raw = std::fs::read_to_string(dir.path().join(META_FILENAME)).unwrap();
        assert!(raw.contains("\"UPDATE\": \"NOT_EXTRACTED_BEFORE\""));
        assert!(raw.contains("\"title\": \"A Title\""));
    }

    #[test]
    fn overwrite_leaves_no_stale_fields() {
        let dir = tempfile::tempdir().unwrap();
        sample().write_to(dir.path()).unwrap();

        let mut second = sample();
        second.extra.clear();
        second.update = UpdateStatus::NeedsReextracting;
        second.write_to(dir.path()).unwrap();

        let back = DocumentMeta::read_from(dir.path()).unwrap();
        assert_eq!(back.update, UpdateStatus::NeedsReextracting);
        assert!(back.extra.is_empty());
    }

    #[test]
    fn missing_fingerprint_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let raw = r#"{
            "bibcode": "fta",
            "provider": "MNRAS",
            "file_format": "txt",
            "ft_source": "/data/a.txt",
            "UPDATE": "NOT_EXTRACTED_BEFORE",
            "index_date": "2015-06-30T22:45:47Z"
        }"#;
        std::fs::write(dir.path().join(META_FILENAME), raw).unwrap();
        let meta = DocumentMeta::read_from(dir.path()).unwrap();
        assert!(meta.source_fingerprint.is_none());
        assert!(meta.extra.is_empty());
    }

    #[test]
    fn read_missing_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DocumentMeta::read_from(dir.path()).is_err());
    }

    #[test]
    fn read_corrupt_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(META_FILENAME), b"{ truncated").unwrap();
        assert!(DocumentMeta::read_from(dir.path()).is_err());
    }
}
