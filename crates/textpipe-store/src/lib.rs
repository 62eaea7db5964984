//! textpipe-store: On-disk persistence for extracted full text
//!
//! One directory per bibcode under a letter-partitioned root, holding the
//! extracted `fulltext.txt` and a `meta.json` document. Writes are atomic
//! (same-directory tmp then rename) so a reader never observes a partially
//! written artifact, and re-extraction fully overwrites both files.

pub mod atomic;
pub mod error_sink;
pub mod hash;
pub mod meta;
pub mod meta_path;

pub use atomic::{cleanup_tmp_files, write_atomic};
pub use error_sink::ErrorSink;
pub use hash::{fingerprint, hash_bytes, hash_file};
pub use meta::{DocumentMeta, FULLTEXT_FILENAME, META_FILENAME};
pub use meta_path::meta_path;
