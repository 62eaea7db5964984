//! Update checker: the central decision point of the pipeline
//!
//! Classifies the source format, derives the output path, decides whether
//! extraction is needed, and routes the task to the matching extractor
//! queue. Redelivery of the same task is safe: the decision is a pure
//! function of the task and the current on-disk state.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use textpipe_core::{
    ErrorRecord, ExtractionTask, FileFormat, PipelineError, Route, Stage, UpdateStatus,
};
use textpipe_store::meta::{FULLTEXT_FILENAME, META_FILENAME};
use textpipe_store::{DocumentMeta, fingerprint, meta_path};

/// Outcome of checking one task.
#[derive(Debug)]
pub enum CheckOutcome {
    /// Needs extraction; publish to the format-specific queue.
    Forward { route: Route, task: ExtractionTask },
    /// Terminal: prior extraction is current, nothing is forwarded.
    Skip(ExtractionTask),
    /// Cannot proceed; goes to the error handler.
    Error(ErrorRecord),
}

pub struct UpdateChecker {
    root: PathBuf,
}

impl UpdateChecker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Run the full check for one task: classification, path derivation,
    /// update decision, routing.
    pub fn process(&self, mut task: ExtractionTask) -> CheckOutcome {
        let format = match FileFormat::classify(&task.ft_source) {
            Some(format) => format,
            None => {
                let reason = PipelineError::UnknownFormat(task.ft_source.clone()).to_string();
                return CheckOutcome::Error(ErrorRecord::new(task, Stage::Checker, reason));
            }
        };

        let dir = meta_path(&self.root, &task.bibcode);
        let status = self.decide(&task, &dir);

        task.file_format = Some(format);
        task.meta_path = Some(dir);
        task.update = Some(status);

        match status {
            UpdateStatus::NoUpdateNeeded => CheckOutcome::Skip(task),
            UpdateStatus::NoContent => CheckOutcome::Error(ErrorRecord::new(
                task,
                Stage::Checker,
                "source has no extractable content",
            )),
            UpdateStatus::NotExtractedBefore | UpdateStatus::NeedsReextracting => {
                task.index_date = Some(Utc::now());
                CheckOutcome::Forward {
                    route: format.route(),
                    task,
                }
            }
        }
    }

    /// The idempotency decision: inspect the existing record (if any) and
    /// the current source file.
    fn decide(&self, task: &ExtractionTask, dir: &Path) -> UpdateStatus {
        if task.force_extract {
            return UpdateStatus::NotExtractedBefore;
        }
        if !dir.join(META_FILENAME).exists() {
            return UpdateStatus::NotExtractedBefore;
        }

        let existing = match DocumentMeta::read_from(dir) {
            Ok(meta) => meta,
            Err(e) => {
                log::warn!("{}: corrupt meta.json, re-extracting: {e:#}", task.bibcode);
                return UpdateStatus::NeedsReextracting;
            }
        };

        if existing.ft_source != task.ft_source {
            return UpdateStatus::NeedsReextracting;
        }

        match fingerprint(&task.ft_source) {
            Ok(current) => match &existing.source_fingerprint {
                Some(recorded) if *recorded != current => UpdateStatus::NeedsReextracting,
                Some(_) => UpdateStatus::NoUpdateNeeded,
                // Legacy record without a fingerprint: fall back to mtime
                None => {
                    if source_newer_than(&task.ft_source, existing.index_date) {
                        UpdateStatus::NeedsReextracting
                    } else {
                        UpdateStatus::NoUpdateNeeded
                    }
                }
            },
            Err(_) => {
                if dir.join(FULLTEXT_FILENAME).exists() {
                    // Source gone but prior content stands
                    UpdateStatus::NoUpdateNeeded
                } else {
                    UpdateStatus::NoContent
                }
            }
        }
    }
}

fn source_newer_than(source: &Path, index_date: DateTime<Utc>) -> bool {
    std::fs::metadata(source)
        .and_then(|m| m.modified())
        .map(|mtime| DateTime::<Utc>::from(mtime) > index_date)
        .unwrap_or(false)
}
