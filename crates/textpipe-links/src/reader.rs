//! Links manifest parsing

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use textpipe_core::LinkRecord;

/// Parsed manifest: the records in file order plus a count of the
/// blank/malformed lines that were skipped.
#[derive(Debug)]
pub struct Links {
    pub records: Vec<LinkRecord>,
    pub skipped: usize,
}

/// Read a links manifest.
///
/// Blank or malformed lines are skipped and counted, never fatal; only an
/// unopenable manifest errors.
pub fn read_links(path: &Path) -> Result<Links> {
    let file =
        File::open(path).with_context(|| format!("failed to open links file {}", path.display()))?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read {}", path.display()))?;
        match parse_line(&line) {
            Some(record) => records.push(record),
            None => {
                if !line.trim().is_empty() {
                    log::debug!("{}:{}: skipping malformed line", path.display(), lineno + 1);
                }
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        log::info!(
            "{}: {} records, {} lines skipped",
            path.display(),
            records.len(),
            skipped
        );
    }
    Ok(Links { records, skipped })
}

/// Parse one `bibcode<TAB>source_path<TAB>provider` line.
fn parse_line(line: &str) -> Option<LinkRecord> {
    let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
    if fields.len() != 3 || fields.iter().any(|f| f.is_empty()) {
        return None;
    }
    Some(LinkRecord {
        bibcode: fields[0].to_string(),
        source_path: PathBuf::from(fields[1]),
        provider: fields[2].to_string(),
    })
}
