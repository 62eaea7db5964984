//! Textpipe Core - Common infrastructure for the full-text extraction pipeline
//!
//! This crate provides the message contracts carried between pipeline
//! stages, the routing topology, and the broker abstraction the stages
//! publish to and consume from.

pub mod broker;
pub mod error;
pub mod logging;
pub mod route;
pub mod shutdown;
pub mod task;

// Re-exports for convenience
pub use broker::{Broker, MemoryBroker, consume_json, publish_json};
pub use error::PipelineError;
pub use logging::init_logging;
pub use route::Route;
pub use shutdown::{is_shutdown_requested, shutdown_flag};
pub use task::{
    ErrorRecord, ExtractionTask, FileFormat, LinkRecord, Stage, UpdateStatus, WorkPacket,
};
