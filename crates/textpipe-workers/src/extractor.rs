//! Format extractor workers and the external-collaborator seam
//!
//! The actual text-extraction algorithms live behind [`TextExtractor`];
//! the worker only enriches the task with the collaborator's output and
//! forwards or errors. The PDF and standard workers are the same code with
//! a different collaborator and queue.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use textpipe_core::{ErrorRecord, ExtractionTask, FileFormat, PipelineError, Stage};

/// Output of the external extraction collaborator.
#[derive(Debug, Clone)]
pub struct Extracted {
    pub body: String,
    pub metadata: BTreeMap<String, String>,
}

/// External extraction collaborator: source path + format in, body +
/// structural metadata out. Synchronous and blocking per task.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, source: &Path, format: FileFormat) -> Result<Extracted, PipelineError>;
}

/// Reads the source file as UTF-8 text (lossy). Serves the standard
/// formats, where the source is already textual.
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, source: &Path, _format: FileFormat) -> Result<Extracted, PipelineError> {
        let bytes = std::fs::read(source).map_err(|e| PipelineError::SourceUnreadable {
            path: source.to_path_buf(),
            source: e,
        })?;
        let body = String::from_utf8_lossy(&bytes).into_owned();
        if body.trim().is_empty() {
            return Err(PipelineError::EmptyExtraction(source.to_path_buf()));
        }
        Ok(Extracted {
            body,
            metadata: BTreeMap::new(),
        })
    }
}

/// Spawns an external command with the source path as its argument and
/// captures stdout as the body. The binding point for an out-of-process
/// PDF extraction tool (e.g. `pdftotext`-style programs writing to stdout).
pub struct CommandExtractor {
    program: String,
}

impl CommandExtractor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl TextExtractor for CommandExtractor {
    fn extract(&self, source: &Path, _format: FileFormat) -> Result<Extracted, PipelineError> {
        if !source.exists() {
            return Err(PipelineError::SourceUnreadable {
                path: source.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            });
        }
        let output = Command::new(&self.program)
            .arg(source)
            .output()
            .map_err(|e| PipelineError::Extractor(format!("{}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::Extractor(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let body = String::from_utf8_lossy(&output.stdout).into_owned();
        if body.trim().is_empty() {
            return Err(PipelineError::EmptyExtraction(source.to_path_buf()));
        }
        Ok(Extracted {
            body,
            metadata: BTreeMap::new(),
        })
    }
}

/// Placeholder collaborator for a queue whose extractor is not configured;
/// every task fails with the given reason instead of being misextracted.
pub struct UnavailableExtractor {
    reason: String,
}

impl UnavailableExtractor {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl TextExtractor for UnavailableExtractor {
    fn extract(&self, _source: &Path, _format: FileFormat) -> Result<Extracted, PipelineError> {
        Err(PipelineError::Extractor(self.reason.clone()))
    }
}

/// Stage worker for one task: invoke the collaborator and enrich the task.
///
/// `bibcode`, `provider`, and `meta_path` pass through untouched.
pub fn extract_task(
    mut task: ExtractionTask,
    extractor: &dyn TextExtractor,
) -> Result<ExtractionTask, Box<ErrorRecord>> {
    let Some(format) = task.file_format else {
        return Err(Box::new(ErrorRecord::new(
            task,
            Stage::Extractor,
            "task reached extractor without a file format",
        )));
    };

    match extractor.extract(&task.ft_source, format) {
        Ok(extracted) => {
            task.body = Some(extracted.body);
            task.metadata.extend(extracted.metadata);
            Ok(task)
        }
        Err(e) => Err(Box::new(ErrorRecord::new(
            task,
            Stage::Extractor,
            e.to_string(),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use textpipe_core::LinkRecord;

    fn task_for(source: &Path, format: Option<FileFormat>) -> ExtractionTask {
        let mut task = ExtractionTask::from_link(
            LinkRecord {
                bibcode: "fta".into(),
                source_path: source.to_path_buf(),
                provider: "MNRAS".into(),
            },
            false,
        );
        task.file_format = format;
        task.meta_path = Some("/ft/f/fta".into());
        task
    }

    #[test]
    fn plain_text_reads_body() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.txt");
        fs::write(&source, "full text body\n").unwrap();

        let extracted = PlainTextExtractor
            .extract(&source, FileFormat::Txt)
            .unwrap();
        assert_eq!(extracted.body, "full text body\n");
        assert!(extracted.metadata.is_empty());
    }

    #[test]
    fn plain_text_rejects_empty_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("empty.txt");
        fs::write(&source, "  \n").unwrap();

        let err = PlainTextExtractor
            .extract(&source, FileFormat::Txt)
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyExtraction(_)));
    }

    #[test]
    fn plain_text_missing_source() {
        let err = PlainTextExtractor
            .extract(Path::new("/no/such.txt"), FileFormat::Txt)
            .unwrap_err();
        assert!(matches!(err, PipelineError::SourceUnreadable { .. }));
    }

    #[test]
    fn command_extractor_captures_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.pdf");
        fs::write(&source, "pdf body\n").unwrap();

        let extracted = CommandExtractor::new("cat")
            .extract(&source, FileFormat::Pdf)
            .unwrap();
        assert_eq!(extracted.body, "pdf body\n");
    }

    #[test]
    fn command_extractor_missing_source() {
        let err = CommandExtractor::new("cat")
            .extract(Path::new("/no/such.pdf"), FileFormat::Pdf)
            .unwrap_err();
        assert!(matches!(err, PipelineError::SourceUnreadable { .. }));
    }

    #[test]
    fn command_extractor_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.pdf");
        fs::write(&source, "data").unwrap();

        let err = CommandExtractor::new("false")
            .extract(&source, FileFormat::Pdf)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Extractor(_)));
    }

    #[test]
    fn unavailable_extractor_always_fails() {
        let err = UnavailableExtractor::new("no PDF extractor configured")
            .extract(Path::new("/a.pdf"), FileFormat::Pdf)
            .unwrap_err();
        assert!(format!("{err}").contains("no PDF extractor configured"));
    }

    #[test]
    fn extract_task_enriches_without_mutating_identity() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.txt");
        fs::write(&source, "body").unwrap();

        let task = task_for(&source, Some(FileFormat::Txt));
        let enriched = extract_task(task, &PlainTextExtractor).unwrap();
        assert_eq!(enriched.bibcode, "fta");
        assert_eq!(enriched.provider, "MNRAS");
        assert_eq!(enriched.meta_path.as_deref(), Some(Path::new("/ft/f/fta")));
        assert_eq!(enriched.body.as_deref(), Some("body"));
    }

    #[test]
    fn extract_task_failure_becomes_error_record() {
        let task = task_for(Path::new("/no/such.txt"), Some(FileFormat::Txt));
        let rec = extract_task(task, &PlainTextExtractor).unwrap_err();
        assert_eq!(rec.stage, Stage::Extractor);
        assert!(rec.reason.contains("source unreadable"));
        assert_eq!(rec.task.bibcode, "fta");
    }

    #[test]
    fn extract_task_requires_format() {
        let rec = extract_task(task_for(Path::new("/a.txt"), None), &PlainTextExtractor)
            .unwrap_err();
        assert_eq!(rec.stage, Stage::Extractor);
    }
}
