//! Deterministic partitioned output path for one bibcode

use std::path::{Path, PathBuf};

/// Output directory for a bibcode's extracted artifacts:
/// `root/<first-char-lowercased>/<bibcode>/`.
///
/// Pure function of the bibcode — recomputing always yields the same path.
/// Many bibcodes share a partition directory; the leaf is keyed by the full
/// bibcode so partitions never collide records.
pub fn meta_path(root: &Path, bibcode: &str) -> PathBuf {
    let partition = bibcode
        .chars()
        .next()
        .map(|c| c.to_ascii_lowercase().to_string())
        // Empty bibcodes are rejected upstream; keep the function total
        .unwrap_or_else(|| "_".to_string());
    root.join(partition).join(bibcode)
}
