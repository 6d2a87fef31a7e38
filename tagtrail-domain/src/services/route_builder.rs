use uuid::Uuid;

use crate::entities::{RawEvent, Route, Waypoint};
use crate::error::DomainError;
use crate::ports::Topology;
use crate::utils::{hours_between, round_to_decimals};
use crate::value_objects::ReaderClass;

/// Turns one segment into a route.
///
/// `folded_duplicates` is the number of raw reads consolidation collapsed
/// into this segment's reads; they count towards `event_count`.
pub fn build_route(
    account_id: Uuid,
    tag_id: &str,
    reads: &[RawEvent],
    folded_duplicates: usize,
    topology: &dyn Topology,
) -> Result<Route, DomainError> {
    let (first, last) = match reads {
        [first, .., last] => (first, last),
        _ => {
            return Err(DomainError::SegmentTooShort {
                tag_id: tag_id.to_string(),
                reads: reads.len(),
            })
        }
    };
    if let Some(foreign) = reads.iter().find(|read| read.tag_id != tag_id) {
        return Err(DomainError::ForeignEvent {
            tag_id: tag_id.to_string(),
            event_id: foreign.id,
            found: foreign.tag_id.clone(),
        });
    }

    let waypoints = reads
        .iter()
        .map(|read| Waypoint {
            reader_id: read.reader_id.clone(),
            read_at: read.read_time,
            event_id: read.id,
        })
        .collect();

    let mut reader_sequence: Vec<String> = Vec::new();
    for read in reads {
        if reader_sequence.last() != Some(&read.reader_id) {
            reader_sequence.push(read.reader_id.clone());
        }
    }

    Ok(Route {
        account_id,
        tag_id: tag_id.to_string(),
        origin_reader_id: first.reader_id.clone(),
        destination_reader_id: last.reader_id.clone(),
        started_at: first.read_time,
        ended_at: last.read_time,
        total_duration_hours: round_to_decimals(hours_between(first.read_time, last.read_time), 2),
        waypoints,
        reader_sequence,
        event_count: i32::try_from(reads.len() + folded_duplicates).unwrap_or(i32::MAX),
        is_complete: topology.reader_class(&last.reader_id) == ReaderClass::Destination,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ReaderProfile, TopologyDocument};
    use crate::services::NetworkTopology;
    use chrono::{TimeZone, Utc};

    fn read(id: i64, reader: &str, hour: u32) -> RawEvent {
        RawEvent {
            id,
            event_id: format!("evt-{id}"),
            tag_id: "TAG".to_string(),
            reader_id: reader.to_string(),
            read_time: Utc.with_ymd_and_hms(2024, 3, 4, hour, 0, 0).unwrap(),
            account_id: Uuid::nil(),
            ingested_at: None,
            processed_at: None,
        }
    }

    fn topology() -> NetworkTopology {
        NetworkTopology::from_document(TopologyDocument {
            readers: vec![ReaderProfile {
                reader_id: "C".to_string(),
                node_id: "N-C".to_string(),
                class: ReaderClass::Destination,
            }],
            links: Vec::new(),
        })
    }

    #[test]
    fn builds_route_from_segment() {
        let reads = vec![read(1, "A", 9), read(2, "B", 11), read(3, "B", 12), read(4, "C", 14)];
        let route = build_route(Uuid::nil(), "TAG", &reads, 2, &topology()).unwrap();
        assert_eq!(route.origin_reader_id, "A");
        assert_eq!(route.destination_reader_id, "C");
        assert_eq!(route.started_at, reads[0].read_time);
        assert_eq!(route.ended_at, reads[3].read_time);
        assert_eq!(route.total_duration_hours, 5.0);
        assert_eq!(route.waypoints.len(), 4);
        assert_eq!(route.reader_sequence, vec!["A", "B", "C"]);
        assert_eq!(route.event_count, 6);
        assert!(route.is_complete);
        assert_eq!(route.waypoint_event_ids().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn route_ending_off_a_destination_is_incomplete() {
        let reads = vec![read(1, "A", 9), read(2, "B", 11)];
        let route = build_route(Uuid::nil(), "TAG", &reads, 0, &topology()).unwrap();
        assert!(!route.is_complete);
    }

    #[test]
    fn rejects_short_segments() {
        let err = build_route(Uuid::nil(), "TAG", &[read(1, "A", 9)], 0, &topology()).unwrap_err();
        assert!(matches!(err, DomainError::SegmentTooShort { reads: 1, .. }));
        assert!(build_route(Uuid::nil(), "TAG", &[], 0, &topology()).is_err());
    }

    #[test]
    fn rejects_reads_of_another_tag() {
        let mut stray = read(2, "B", 10);
        stray.tag_id = "OTHER".to_string();
        let err = build_route(Uuid::nil(), "TAG", &[read(1, "A", 9), stray], 0, &topology()).unwrap_err();
        assert!(matches!(err, DomainError::ForeignEvent { event_id: 2, .. }));
    }
}
