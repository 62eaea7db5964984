//! Common error type for per-task pipeline failures

use std::path::PathBuf;

/// Error from processing a single extraction task.
///
/// Every variant is converted to an [`ErrorRecord`](crate::task::ErrorRecord)
/// at the stage boundary; none aborts the pipeline.
#[derive(Debug)]
pub enum PipelineError {
    /// Source path has no classifiable extension.
    UnknownFormat(PathBuf),
    /// Source file could not be opened or read.
    SourceUnreadable { path: PathBuf, source: std::io::Error },
    /// The extraction collaborator produced an empty body.
    EmptyExtraction(PathBuf),
    /// The extraction collaborator failed.
    Extractor(String),
    Io(std::io::Error),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownFormat(path) => {
                write!(f, "unclassifiable source format: {}", path.display())
            }
            Self::SourceUnreadable { path, source } => {
                write!(f, "source unreadable {}: {source}", path.display())
            }
            Self::EmptyExtraction(path) => {
                write!(f, "extraction produced no content for {}", path.display())
            }
            Self::Extractor(reason) => write!(f, "extractor failed: {reason}"),
            Self::Io(e) => write!(f, "IO: {e}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SourceUnreadable { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn display_unknown_format() {
        let err = PipelineError::UnknownFormat(PathBuf::from("/data/doc"));
        assert!(format!("{err}").contains("unclassifiable"));
    }

    #[test]
    fn display_source_unreadable_includes_cause() {
        let err = PipelineError::SourceUnreadable {
            path: PathBuf::from("/gone.txt"),
            source: std::io::Error::new(ErrorKind::NotFound, "not found"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("/gone.txt"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn io_error_converts() {
        let err: PipelineError = std::io::Error::new(ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, PipelineError::Io(_)));
        assert!(format!("{err}").contains("IO:"));
    }
}
