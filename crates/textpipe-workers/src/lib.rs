//! textpipe-workers: the pipeline stage workers
//!
//! Update checker, format extractors, meta writer, and error handler, plus
//! the runner that drives one full pass over the broker queues. Stages are
//! stateless between tasks; all cross-stage communication goes through
//! message payloads, and any stage that cannot complete a task emits an
//! error record instead of raising past its boundary.

pub mod checker;
pub mod error_handler;
pub mod extractor;
pub mod runner;
pub mod writer;

pub use checker::{CheckOutcome, UpdateChecker};
pub use error_handler::drain_errors;
pub use extractor::{
    CommandExtractor, Extracted, PlainTextExtractor, TextExtractor, UnavailableExtractor,
    extract_task,
};
pub use runner::{IngestStats, PipelineConfig, Summary, ingest_links, run_pipeline};
pub use writer::write_record;
