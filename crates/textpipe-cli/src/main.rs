//! textpipe - CLI for the full-text extraction pipeline
//!
//! Ingests links manifests, checks which documents need (re-)extraction,
//! extracts their full text, and persists meta.json + fulltext.txt under
//! a partitioned output tree.

use std::sync::atomic::Ordering;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "textpipe")]
#[command(about = "Full-text extraction pipeline for scholarly documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./textpipe.toml or ~/.config/textpipe/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline over a links manifest
    Run(cmd::run::RunArgs),
    /// List records in the error sink
    Errors(cmd::errors::ErrorsArgs),
    /// Re-queue failed documents from the error sink
    Replay(cmd::replay::ReplayArgs),
    /// Show the stored record for one bibcode
    Inspect(cmd::inspect::InspectArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    textpipe_core::init_logging(false, cli.debug);

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };
    config.validate()?;

    match cli.command {
        Command::Run(args) => {
            setup_signal_handler();
            cmd::run::run(args, &config)
        }
        Command::Errors(args) => cmd::errors::run(args, &config),
        Command::Replay(args) => {
            setup_signal_handler();
            cmd::replay::run(args, &config)
        }
        Command::Inspect(args) => cmd::inspect::run(args, &config),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec![
                "Extraction root",
                &config.extract.root.display().to_string(),
            ]);
            table.add_row(vec![
                "PDF extractor",
                config.extract.pdf_command.as_deref().unwrap_or("not set"),
            ]);
            table.add_row(vec![
                "Packet size",
                &config.pipeline.packet_size.to_string(),
            ]);
            table.add_row(vec![
                "Workers",
                &format!("{} (max: {})", config.workers.default, config.workers.max),
            ]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}

fn setup_signal_handler() {
    // First signal: set graceful shutdown flag
    // Second signal: force exit (default SIGINT behavior restored)
    // SAFETY: AtomicBool::store and process::exit are async-signal-safe
    unsafe {
        signal_hook::low_level::register(signal_hook::consts::SIGTERM, || {
            if textpipe_core::shutdown_flag().swap(true, Ordering::Relaxed) {
                std::process::exit(130);
            }
        })
        .expect("Failed to register SIGTERM handler");
        signal_hook::low_level::register(signal_hook::consts::SIGINT, || {
            if textpipe_core::shutdown_flag().swap(true, Ordering::Relaxed) {
                std::process::exit(130);
            }
        })
        .expect("Failed to register SIGINT handler");
    }
}
