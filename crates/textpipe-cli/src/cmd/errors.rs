//! `textpipe errors` - list records in the durable error sink

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use textpipe_store::ErrorSink;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ErrorsArgs {
    /// Extraction output root (overrides config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only show errors for this bibcode
    #[arg(long)]
    pub bibcode: Option<String>,
}

pub fn run(args: ErrorsArgs, config: &Config) -> Result<()> {
    let root = args.output.unwrap_or_else(|| config.extract.root.clone());
    let mut records = ErrorSink::new(&root).read_all()?;
    if let Some(bibcode) = &args.bibcode {
        records.retain(|r| r.task.bibcode == *bibcode);
    }

    if records.is_empty() {
        eprintln!("No error records.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Bibcode").fg(Color::Cyan),
            Cell::new("Stage").fg(Color::Cyan),
            Cell::new("When").fg(Color::Cyan),
            Cell::new("Reason").fg(Color::Cyan),
        ]);

    for record in &records {
        table.add_row(vec![
            Cell::new(&record.task.bibcode),
            Cell::new(record.stage),
            Cell::new(record.timestamp.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(&record.reason),
        ]);
    }

    eprintln!("\n{table}");
    eprintln!("{} error records", records.len());
    Ok(())
}
