//! `textpipe inspect` - show the stored record for one bibcode

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use textpipe_store::meta::{DocumentMeta, FULLTEXT_FILENAME};
use textpipe_store::meta_path;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Bibcode to look up
    pub bibcode: String,

    /// Extraction output root (overrides config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the full extracted text instead of its size
    #[arg(long)]
    pub body: bool,
}

pub fn run(args: InspectArgs, config: &Config) -> Result<()> {
    let root = args.output.unwrap_or_else(|| config.extract.root.clone());
    let dir = meta_path(&root, &args.bibcode);

    let meta = DocumentMeta::read_from(&dir)
        .with_context(|| format!("no stored record for {} at {}", args.bibcode, dir.display()))?;

    if args.body {
        let body = fs::read_to_string(dir.join(FULLTEXT_FILENAME))
            .with_context(|| format!("failed to read fulltext for {}", args.bibcode))?;
        println!("{body}");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Field").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    table.add_row(vec!["Bibcode", &meta.bibcode]);
    table.add_row(vec!["Provider", &meta.provider]);
    table.add_row(vec!["Format", meta.file_format.as_str()]);
    table.add_row(vec!["Source", &meta.ft_source.display().to_string()]);
    table.add_row(vec!["UPDATE", &meta.update.to_string()]);
    table.add_row(vec![
        "Indexed",
        &meta.index_date.format("%Y-%m-%d %H:%M:%S").to_string(),
    ]);
    table.add_row(vec![
        "Fingerprint",
        meta.source_fingerprint.as_deref().unwrap_or("not recorded"),
    ]);
    let fulltext = dir.join(FULLTEXT_FILENAME);
    let size = fs::metadata(&fulltext)
        .map(|m| format!("{} bytes", m.len()))
        .unwrap_or_else(|_| "missing".to_string());
    table.add_row(vec!["Fulltext", &size]);
    for (key, value) in &meta.extra {
        table.add_row(vec![key.as_str(), value.as_str()]);
    }
    table.add_row(vec!["Path", &dir.display().to_string()]);

    eprintln!("\n{table}");
    Ok(())
}
