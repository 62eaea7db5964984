//! Routing topology: the fixed set of queues the pipeline publishes to

use std::fmt;

use serde::{Deserialize, Serialize};

/// Destination queue for a pipeline message.
///
/// The topology is fixed and small: ingress, the two format-specific
/// extractor queues, the writer queue, and the error sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    CheckIfExtract,
    StandardExtractor,
    PdfExtractor,
    MetaWriter,
    ErrorHandler,
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::CheckIfExtract,
        Route::StandardExtractor,
        Route::PdfExtractor,
        Route::MetaWriter,
        Route::ErrorHandler,
    ];

    /// Wire-level queue name, matching the broker topology.
    pub fn queue_name(self) -> &'static str {
        match self {
            Self::CheckIfExtract => "CheckIfExtractRoute",
            Self::StandardExtractor => "StandardFileExtractorQueue",
            Self::PdfExtractor => "PDFFileExtractorQueue",
            Self::MetaWriter => "WriteMetaFileQueue",
            Self::ErrorHandler => "ErrorHandlerQueue",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.queue_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_names_match_topology() {
        assert_eq!(Route::CheckIfExtract.queue_name(), "CheckIfExtractRoute");
        assert_eq!(
            Route::StandardExtractor.queue_name(),
            "StandardFileExtractorQueue"
        );
        assert_eq!(Route::PdfExtractor.queue_name(), "PDFFileExtractorQueue");
        assert_eq!(Route::ErrorHandler.queue_name(), "ErrorHandlerQueue");
    }

    #[test]
    fn all_routes_distinct() {
        let names: std::collections::HashSet<_> =
            Route::ALL.iter().map(|r| r.queue_name()).collect();
        assert_eq!(names.len(), Route::ALL.len());
    }

    #[test]
    fn display_uses_queue_name() {
        assert_eq!(Route::MetaWriter.to_string(), "WriteMetaFileQueue");
    }
}
