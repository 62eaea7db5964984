//! textpipe-links: links-manifest reading and ingress batching
//!
//! Parses the tab-separated `bibcode<TAB>source_path<TAB>provider` manifest
//! and publishes bounded work packets to the pipeline ingress.

pub mod batcher;
pub mod reader;

pub use batcher::{make_packets, publish_packets};
pub use reader::{Links, read_links};
