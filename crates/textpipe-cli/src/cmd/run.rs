//! `textpipe run` - drive the full pipeline over a links manifest

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use textpipe_core::MemoryBroker;
use textpipe_workers::{
    CommandExtractor, PipelineConfig, PlainTextExtractor, TextExtractor, UnavailableExtractor,
    ingest_links, run_pipeline,
};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Links manifest (bibcode<TAB>source_path<TAB>provider per line)
    pub links: PathBuf,

    /// Extraction output root (overrides config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Re-extract every record regardless of prior state
    #[arg(long)]
    pub force: bool,

    /// Records per ingress packet (overrides config)
    #[arg(long)]
    pub packet_size: Option<usize>,

    /// Extraction worker threads (overrides config)
    #[arg(short, long)]
    pub workers: Option<usize>,
}

pub fn run(args: RunArgs, config: &Config) -> Result<()> {
    let root = args.output.unwrap_or_else(|| config.extract.root.clone());
    let packet_size = args.packet_size.unwrap_or(config.pipeline.packet_size);
    let workers = args
        .workers
        .unwrap_or(config.workers.default)
        .min(config.workers.max);

    let broker = MemoryBroker::new();
    let stats = ingest_links(&broker, &args.links, packet_size, args.force)?;
    log::info!(
        "Ingested {} records in {} packets from {} ({} lines skipped)",
        stats.records,
        stats.packets,
        args.links.display(),
        stats.skipped
    );

    let pdf: Box<dyn TextExtractor> = match &config.extract.pdf_command {
        Some(program) => Box::new(CommandExtractor::new(program.clone())),
        None => Box::new(UnavailableExtractor::new(
            "no PDF extractor configured (set extract.pdf_command)",
        )),
    };

    let pb = document_bar(stats.records as u64);
    let summary = run_pipeline(
        &broker,
        &PipelineConfig {
            extract_root: root,
            workers,
        },
        &PlainTextExtractor,
        pdf.as_ref(),
        &pb,
    )?;
    pb.finish_and_clear();

    if summary.errors > 0 {
        log::warn!(
            "{} documents failed; see `textpipe errors` for details",
            summary.errors
        );
    }
    Ok(())
}

fn document_bar(total: u64) -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:30.green/dim} {pos:>6}/{len:6} {eta:>4} {wide_msg:.dim}")
            .expect("invalid template")
            .progress_chars("--"),
    );
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
