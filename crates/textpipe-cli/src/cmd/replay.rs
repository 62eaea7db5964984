//! `textpipe replay` - re-queue failed documents from the error sink

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use indicatif::ProgressBar;

use textpipe_core::{LinkRecord, MemoryBroker};
use textpipe_links::{make_packets, publish_packets};
use textpipe_store::ErrorSink;
use textpipe_workers::{
    CommandExtractor, PipelineConfig, PlainTextExtractor, TextExtractor, UnavailableExtractor,
    run_pipeline,
};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Extraction output root (overrides config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Bypass the update check when replaying
    #[arg(long)]
    pub force: bool,

    /// Clear the error sink before replaying; new failures re-append
    #[arg(long)]
    pub drain: bool,
}

pub fn run(args: ReplayArgs, config: &Config) -> Result<()> {
    let root = args.output.unwrap_or_else(|| config.extract.root.clone());
    let sink = ErrorSink::new(&root);
    let failed = sink.read_all()?;

    if failed.is_empty() {
        eprintln!("No error records to replay.");
        return Ok(());
    }

    // One attempt per bibcode, keeping the most recent failure's source
    let mut records: Vec<LinkRecord> = Vec::new();
    for rec in failed.iter().rev() {
        if records.iter().any(|r| r.bibcode == rec.task.bibcode) {
            continue;
        }
        records.push(LinkRecord {
            bibcode: rec.task.bibcode.clone(),
            source_path: rec.task.ft_source.clone(),
            provider: rec.task.provider.clone(),
        });
    }
    log::info!(
        "Replaying {} documents ({} error records)",
        records.len(),
        failed.len()
    );

    if args.drain {
        sink.clear()?;
    }

    let broker = MemoryBroker::new();
    let packets = make_packets(&records, config.pipeline.packet_size, args.force)?;
    publish_packets(&broker, &packets)?;

    let pdf: Box<dyn TextExtractor> = match &config.extract.pdf_command {
        Some(program) => Box::new(CommandExtractor::new(program.clone())),
        None => Box::new(UnavailableExtractor::new(
            "no PDF extractor configured (set extract.pdf_command)",
        )),
    };

    let summary = run_pipeline(
        &broker,
        &PipelineConfig {
            extract_root: root,
            workers: config.workers.default,
        },
        &PlainTextExtractor,
        pdf.as_ref(),
        &ProgressBar::hidden(),
    )?;

    if summary.errors > 0 {
        log::warn!("{} documents failed again", summary.errors);
    }
    Ok(())
}
