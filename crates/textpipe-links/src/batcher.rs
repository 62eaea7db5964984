//! Packet batching: bounded work packets published to the ingress route

use anyhow::{Result, ensure};

use textpipe_core::{Broker, LinkRecord, Route, WorkPacket, publish_json};

/// Group records into packets of at most `packet_size`, preserving input
/// order. For N records this yields exactly ceil(N/P) packets, each record
/// appearing in exactly one.
pub fn make_packets(
    records: &[LinkRecord],
    packet_size: usize,
    force_extract: bool,
) -> Result<Vec<WorkPacket>> {
    ensure!(packet_size > 0, "packet_size must be a positive integer");
    Ok(records
        .chunks(packet_size)
        .map(|chunk| WorkPacket {
            records: chunk.to_vec(),
            force_extract,
        })
        .collect())
}

/// Publish each packet as one ingress message. No state is retained after
/// publishing; the broker owns delivery from here.
pub fn publish_packets(broker: &dyn Broker, packets: &[WorkPacket]) -> Result<usize> {
    for packet in packets {
        publish_json(broker, Route::CheckIfExtract, packet)?;
    }
    log::info!("published {} packets to {}", packets.len(), Route::CheckIfExtract);
    Ok(packets.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use textpipe_core::{MemoryBroker, consume_json};

    fn records(n: usize) -> Vec<LinkRecord> {
        (0..n)
            .map(|i| LinkRecord {
                bibcode: format!("ft{i:03}"),
                source_path: format!("/data/{i}.txt").into(),
                provider: "MNRAS".into(),
            })
            .collect()
    }

    #[test]
    fn ceil_packet_count() {
        let recs = records(20);
        assert_eq!(make_packets(&recs, 10, false).unwrap().len(), 2);
        assert_eq!(make_packets(&recs, 7, false).unwrap().len(), 3);
        assert_eq!(make_packets(&recs, 20, false).unwrap().len(), 1);
        assert_eq!(make_packets(&recs, 100, false).unwrap().len(), 1);
    }

    #[test]
    fn every_record_exactly_once_in_order() {
        let recs = records(23);
        let packets = make_packets(&recs, 5, false).unwrap();

        let flattened: Vec<_> = packets
            .iter()
            .flat_map(|p| p.records.iter().cloned())
            .collect();
        assert_eq!(flattened, recs);
    }

    #[test]
    fn last_packet_holds_remainder() {
        let recs = records(23);
        let packets = make_packets(&recs, 5, false).unwrap();
        assert_eq!(packets.last().unwrap().records.len(), 3);
        assert!(packets[..packets.len() - 1].iter().all(|p| p.records.len() == 5));
    }

    #[test]
    fn empty_input_yields_no_packets() {
        assert!(make_packets(&[], 10, false).unwrap().is_empty());
    }

    #[test]
    fn zero_packet_size_rejected() {
        assert!(make_packets(&records(3), 0, false).is_err());
    }

    #[test]
    fn force_flag_carried_on_every_packet() {
        let packets = make_packets(&records(12), 5, true).unwrap();
        assert!(packets.iter().all(|p| p.force_extract));
    }

    #[test]
    fn publish_one_message_per_packet() {
        let broker = MemoryBroker::new();
        let packets = make_packets(&records(20), 10, false).unwrap();
        let published = publish_packets(&broker, &packets).unwrap();

        assert_eq!(published, 2);
        assert_eq!(broker.depth(Route::CheckIfExtract), 2);

        let first: WorkPacket = consume_json(&broker, Route::CheckIfExtract)
            .unwrap()
            .unwrap();
        assert_eq!(first.records.len(), 10);
        assert_eq!(first.records[0].bibcode, "ft000");
    }
}
