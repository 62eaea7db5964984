//! Error handler: terminal sink for failed tasks

use textpipe_core::{Broker, ErrorRecord, Route, consume_json};
use textpipe_store::ErrorSink;

/// Drain the error queue into the durable sink.
///
/// Accepting a record never fails from the pipeline's point of view: a
/// sink write failure is logged and the drain continues, so the error
/// channel is always a safe terminal state.
pub fn drain_errors(broker: &dyn Broker, sink: &ErrorSink) -> usize {
    let mut drained = 0usize;
    loop {
        match consume_json::<ErrorRecord>(broker, Route::ErrorHandler) {
            Ok(Some(record)) => {
                log::warn!(
                    "{} [{}]: {}",
                    record.task.bibcode,
                    record.stage,
                    record.reason
                );
                if let Err(e) = sink.append(&record) {
                    log::error!(
                        "failed to persist error record for {}: {e:#}",
                        record.task.bibcode
                    );
                }
                drained += 1;
            }
            Ok(None) => break,
            Err(e) => {
                log::error!("dropping undecodable error payload: {e:#}");
                drained += 1;
            }
        }
    }
    drained
}

#[cfg(test)]
mod tests {
    use super::*;
    use textpipe_core::{ExtractionTask, LinkRecord, MemoryBroker, Stage, publish_json};

    fn record(bibcode: &str) -> ErrorRecord {
        let task = ExtractionTask::from_link(
            LinkRecord {
                bibcode: bibcode.into(),
                source_path: "/gone.txt".into(),
                provider: "MNRAS".into(),
            },
            false,
        );
        ErrorRecord::new(task, Stage::MetaWriter, "disk full")
    }

    #[test]
    fn drains_queue_into_sink() {
        let dir = tempfile::tempdir().unwrap();
        let broker = MemoryBroker::new();
        let sink = ErrorSink::new(dir.path());

        publish_json(&broker, Route::ErrorHandler, &record("fta")).unwrap();
        publish_json(&broker, Route::ErrorHandler, &record("ftb")).unwrap();

        let drained = drain_errors(&broker, &sink);
        assert_eq!(drained, 2);
        assert_eq!(broker.depth(Route::ErrorHandler), 0);

        let persisted = sink.read_all().unwrap();
        assert_eq!(persisted.len(), 2);
        assert_eq!(persisted[0].task.bibcode, "fta");
        assert_eq!(persisted[0].stage, Stage::MetaWriter);
    }

    #[test]
    fn empty_queue_drains_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let broker = MemoryBroker::new();
        assert_eq!(drain_errors(&broker, &ErrorSink::new(dir.path())), 0);
    }

    #[test]
    fn garbage_payload_does_not_stall_the_drain() {
        let dir = tempfile::tempdir().unwrap();
        let broker = MemoryBroker::new();
        let sink = ErrorSink::new(dir.path());

        broker.publish(Route::ErrorHandler, b"not json").unwrap();
        publish_json(&broker, Route::ErrorHandler, &record("fta")).unwrap();

        let drained = drain_errors(&broker, &sink);
        assert_eq!(drained, 2);
        assert_eq!(sink.read_all().unwrap().len(), 1);
    }
}
