//! Meta writer: durable persistence of one extracted task

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use textpipe_core::ExtractionTask;
use textpipe_store::meta::{DocumentMeta, FULLTEXT_FILENAME};
use textpipe_store::{cleanup_tmp_files, fingerprint, write_atomic};

/// Persist an enriched task under its `meta_path`.
///
/// Writes `fulltext.txt` first, `meta.json` last — a meta.json on disk
/// always describes a fulltext that is already in place. Both writes are
/// atomic replaces, so re-running for the same bibcode fully overwrites
/// the previous record and concurrent writers degrade to last-writer-wins.
pub fn write_record(task: &ExtractionTask) -> Result<PathBuf> {
    let dir = task
        .meta_path
        .clone()
        .context("task reached meta writer without a meta_path")?;
    let body = task
        .body
        .as_deref()
        .context("task reached meta writer without a body")?;
    let file_format = task
        .file_format
        .context("task reached meta writer without a file format")?;
    let update = task
        .update
        .context("task reached meta writer without an UPDATE status")?;
    let index_date = task
        .index_date
        .context("task reached meta writer without an index date")?;

    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    // An interrupted writer may have left tmp files behind
    cleanup_tmp_files(&dir).with_context(|| format!("failed to clean {}", dir.display()))?;

    write_atomic(&dir.join(FULLTEXT_FILENAME), body.as_bytes())
        .with_context(|| format!("failed to write fulltext for {}", task.bibcode))?;

    let meta = DocumentMeta {
        bibcode: task.bibcode.clone(),
        provider: task.provider.clone(),
        file_format,
        ft_source: task.ft_source.clone(),
        update,
        index_date,
        // Source may already be gone again; the checker then falls back
        // to the mtime comparison next run
        source_fingerprint: fingerprint(&task.ft_source).ok(),
        extra: task.metadata.clone(),
    };
    meta.write_to(&dir)?;

    log::debug!("{}: wrote {}", task.bibcode, dir.display());
    Ok(dir)
}
