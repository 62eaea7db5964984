//! Pipeline runner: drives one full pass over the broker queues
//!
//! Ingress packets are checked, routed tasks are extracted by a parallel
//! worker pool, results are persisted, and the error queue is drained
//! last. Every queue is empty when the pass completes: each non-terminal
//! task has either reached the meta writer or the error sink.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::Result;
use indicatif::ProgressBar;

use textpipe_core::{
    Broker, ErrorRecord, ExtractionTask, Route, Stage, WorkPacket, consume_json,
    is_shutdown_requested, publish_json,
};
use textpipe_links::{make_packets, publish_packets, read_links};
use textpipe_store::ErrorSink;

use crate::checker::{CheckOutcome, UpdateChecker};
use crate::extractor::{TextExtractor, extract_task};
use crate::writer::write_record;

/// Configuration a runner receives at construction; nothing is read from
/// ambient global state.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root of the partitioned extraction tree.
    pub extract_root: PathBuf,
    /// Extractor pool size.
    pub workers: usize,
}

/// Result of publishing one links manifest to the ingress route.
#[derive(Debug)]
pub struct IngestStats {
    pub records: usize,
    pub skipped: usize,
    pub packets: usize,
}

/// Read a links manifest, batch it, and publish the packets.
pub fn ingest_links(
    broker: &dyn Broker,
    links_path: &Path,
    packet_size: usize,
    force_extract: bool,
) -> Result<IngestStats> {
    let links = read_links(links_path)?;
    let packets = make_packets(&links.records, packet_size, force_extract)?;
    publish_packets(broker, &packets)?;
    Ok(IngestStats {
        records: links.records.len(),
        skipped: links.skipped,
        packets: packets.len(),
    })
}

/// Pipeline pass summary.
#[derive(Debug, Default)]
pub struct Summary {
    pub packets: usize,
    pub records: usize,
    pub standard: usize,
    pub pdf: usize,
    pub no_update: usize,
    pub extracted: usize,
    pub written: usize,
    pub errors: usize,
    pub elapsed: std::time::Duration,
}

impl Summary {
    pub fn log(&self) {
        log::info!("=== Full-text Pipeline Summary ===");
        log::info!("Packets: {} ({} records)", self.packets, self.records);
        log::info!(
            "Routed: {} standard, {} pdf, {} up to date",
            self.standard,
            self.pdf,
            self.no_update
        );
        log::info!("Written: {} ({} errors)", self.written, self.errors);
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
        if self.written > 0 && self.elapsed.as_secs_f64() > 0.0 {
            let rate = self.written as f64 / self.elapsed.as_secs_f64();
            log::info!("Throughput: {rate:.0} documents/sec");
        }
    }
}

/// Run all stages until the queues are drained.
///
/// `standard` and `pdf` are the extraction collaborators for the two
/// format queues. Pass [`ProgressBar::hidden()`] when no terminal progress
/// is wanted.
pub fn run_pipeline(
    broker: &dyn Broker,
    config: &PipelineConfig,
    standard: &dyn TextExtractor,
    pdf: &dyn TextExtractor,
    pb: &ProgressBar,
) -> Result<Summary> {
    let start = Instant::now();
    let mut summary = Summary::default();

    run_checker(broker, config, &mut summary)?;
    summary.extracted = run_extractor_pool(broker, config.workers, standard, pdf, pb);
    run_writer(broker, &mut summary, pb)?;
    summary.errors = crate::error_handler::drain_errors(broker, &ErrorSink::new(&config.extract_root));

    summary.elapsed = start.elapsed();
    summary.log();
    Ok(summary)
}

/// Stage 1: consume ingress packets and route each record.
fn run_checker(broker: &dyn Broker, config: &PipelineConfig, summary: &mut Summary) -> Result<()> {
    let checker = UpdateChecker::new(&config.extract_root);

    loop {
        if is_shutdown_requested() {
            break;
        }
        let packet = match consume_json::<WorkPacket>(broker, Route::CheckIfExtract) {
            Ok(Some(packet)) => packet,
            Ok(None) => break,
            Err(e) => {
                log::error!("dropping undecodable ingress packet: {e:#}");
                continue;
            }
        };
        summary.packets += 1;
        let force_extract = packet.force_extract;

        for record in packet.records {
            summary.records += 1;
            let task = ExtractionTask::from_link(record, force_extract);
            match checker.process(task) {
                CheckOutcome::Forward { route, task } => {
                    match route {
                        Route::PdfExtractor => summary.pdf += 1,
                        _ => summary.standard += 1,
                    }
                    publish_json(broker, route, &task)?;
                }
                CheckOutcome::Skip(task) => {
                    log::debug!("{}: no update needed", task.bibcode);
                    summary.no_update += 1;
                }
                CheckOutcome::Error(record) => {
                    publish_json(broker, Route::ErrorHandler, &record)?;
                }
            }
        }
    }
    Ok(())
}

/// Stage 2: parallel extraction over both format queues.
fn run_extractor_pool(
    broker: &dyn Broker,
    workers: usize,
    standard: &dyn TextExtractor,
    pdf: &dyn TextExtractor,
    pb: &ProgressBar,
) -> usize {
    let extracted = AtomicUsize::new(0);

    rayon::scope(|s| {
        for _ in 0..workers.max(1) {
            s.spawn(|_| {
                loop {
                    if is_shutdown_requested() {
                        break;
                    }
                    // Claim from either format queue; workers are
                    // interchangeable, only the collaborator differs
                    let claimed = [
                        (Route::StandardExtractor, standard),
                        (Route::PdfExtractor, pdf),
                    ]
                    .into_iter()
                    .find_map(|(route, collaborator)| {
                        match consume_json::<ExtractionTask>(broker, route) {
                            Ok(Some(task)) => Some(Some((task, collaborator))),
                            Ok(None) => None,
                            Err(e) => {
                                log::error!("dropping undecodable task payload: {e:#}");
                                Some(None)
                            }
                        }
                    });

                    let (task, collaborator) = match claimed {
                        Some(Some(pair)) => pair,
                        Some(None) => continue,
                        None => break,
                    };

                    pb.set_message(task.bibcode.clone());
                    match extract_task(task, collaborator) {
                        Ok(enriched) => {
                            if let Err(e) = publish_json(broker, Route::MetaWriter, &enriched) {
                                log::error!(
                                    "{}: failed to forward to meta writer: {e:#}",
                                    enriched.bibcode
                                );
                            } else {
                                extracted.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                        Err(record) => {
                            if let Err(e) = publish_json(broker, Route::ErrorHandler, &*record) {
                                log::error!(
                                    "{}: failed to report extraction error: {e:#}",
                                    record.task.bibcode
                                );
                            }
                        }
                    }
                }
            });
        }
    });

    extracted.load(Ordering::Relaxed)
}

/// Stage 3: persist enriched tasks.
fn run_writer(broker: &dyn Broker, summary: &mut Summary, pb: &ProgressBar) -> Result<()> {
    loop {
        if is_shutdown_requested() {
            break;
        }
        let task = match consume_json::<ExtractionTask>(broker, Route::MetaWriter) {
            Ok(Some(task)) => task,
            Ok(None) => break,
            Err(e) => {
                log::error!("dropping undecodable writer payload: {e:#}");
                continue;
            }
        };
        match write_record(&task) {
            Ok(_) => {
                summary.written += 1;
                pb.inc(1);
            }
            Err(e) => {
                let reason = format!("{e:#}");
                publish_json(
                    broker,
                    Route::ErrorHandler,
                    &ErrorRecord::new(task, Stage::MetaWriter, reason),
                )?;
            }
        }
    }
    Ok(())
}
