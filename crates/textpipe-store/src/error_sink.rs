//! Append-only JSONL sink for pipeline error records

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use textpipe_core::ErrorRecord;

pub const ERROR_SINK_FILENAME: &str = "errors.jsonl";

/// Durable, inspectable sink under the extraction root.
///
/// One JSON line per error record, append-only. Consumers (alerting,
/// `textpipe errors`, `textpipe replay`) read it back; nothing in the
/// pipeline retries automatically.
#[derive(Debug, Clone)]
pub struct ErrorSink {
    path: PathBuf,
}

impl ErrorSink {
    pub fn new(root: &Path) -> Self {
        Self {
            path: root.join(ERROR_SINK_FILENAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record.
    pub fn append(&self, record: &ErrorRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let line = serde_json::to_string(record).context("failed to serialize error record")?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        writeln!(file, "{line}")
            .with_context(|| format!("failed to append to {}", self.path.display()))?;
        Ok(())
    }

    /// Read all records. A missing sink is an empty sink; unparseable
    /// lines are skipped with a warning so one bad line never hides the rest.
    pub fn read_all(&self) -> Result<Vec<ErrorRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;

        let mut records = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ErrorRecord>(line) {
                Ok(rec) => records.push(rec),
                Err(e) => log::warn!(
                    "{}:{}: skipping unparseable error record: {e}",
                    self.path.display(),
                    lineno + 1
                ),
            }
        }
        Ok(records)
    }

    /// Truncate the sink (used by `replay --drain`).
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }
}
