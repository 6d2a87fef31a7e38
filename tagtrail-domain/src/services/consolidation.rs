use chrono::Duration;
use serde_json::json;

use crate::entities::{Anomaly, RawEvent};
use crate::utils::{minutes_between, round_to_decimals};
use crate::value_objects::{AnomalyKind, RawEventId, Severity};

/// A read collapsed into an earlier read at the same reader.
#[derive(Debug, Clone)]
pub struct DuplicateRead {
    pub dropped: RawEvent,
    /// Store id of the kept read that absorbed this one.
    pub kept_event_id: RawEventId,
    /// Route-less until the owner of `kept_event_id` is known.
    pub anomaly: Anomaly,
}

#[derive(Debug, Clone, Default)]
pub struct Consolidation {
    pub cleaned: Vec<RawEvent>,
    pub duplicates: Vec<DuplicateRead>,
}

impl Consolidation {
    pub fn dropped_event_ids(&self) -> impl Iterator<Item = RawEventId> + '_ {
        self.duplicates.iter().map(|duplicate| duplicate.dropped.id)
    }

    pub fn duplicates_of(&self, kept_event_id: RawEventId) -> impl Iterator<Item = &DuplicateRead> + '_ {
        self.duplicates
            .iter()
            .filter(move |duplicate| duplicate.kept_event_id == kept_event_id)
    }
}

/// Collapses same-reader repeats of one tag's time-ordered reads.
///
/// A read is a duplicate when it hits the same reader as the last kept read
/// less than `window` later. Reads at different readers are always kept.
pub fn consolidate(reads: Vec<RawEvent>, window: Duration) -> Consolidation {
    let mut result = Consolidation::default();

    for read in reads {
        let Some(last_kept) = result.cleaned.last() else {
            result.cleaned.push(read);
            continue;
        };

        let same_reader = last_kept.reader_id == read.reader_id;
        let gap = read.read_time - last_kept.read_time;
        if !same_reader || gap >= window {
            result.cleaned.push(read);
            continue;
        }

        let diff_minutes = round_to_decimals(minutes_between(last_kept.read_time, read.read_time), 2);
        let anomaly = Anomaly::new(
            read.account_id,
            &read.tag_id,
            AnomalyKind::DuplicateRead,
            Severity::Low,
            format!(
                "Duplicate read at {} within {:.1} minutes",
                read.reader_id, diff_minutes
            ),
            read.read_time,
        )
        .at_reader(&read.reader_id)
        .with_details(json!({
            "original_event_id": last_kept.event_id,
            "duplicate_event_id": read.event_id,
            "original_id": last_kept.id,
            "duplicate_id": read.id,
            "time_diff_minutes": diff_minutes,
        }));

        result.duplicates.push(DuplicateRead {
            kept_event_id: last_kept.id,
            dropped: read,
            anomaly,
        });
    }

    result
}
