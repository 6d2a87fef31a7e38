use chrono::{DateTime, Duration, Utc};

use crate::entities::RawEvent;
use crate::ports::Topology;
use crate::value_objects::ReaderClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitReason {
    IdleGap,
    OriginReentry,
}

/// What a run can know about reads it has not fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadHorizon {
    /// No unseen read of the tag is older than this.
    pub not_before: DateTime<Utc>,
    /// The fetch stopped at its limit, so a trailing journey may go on in
    /// reads that were left behind.
    pub truncated: bool,
}

impl ReadHorizon {
    /// Everything up to `now` was fetched.
    pub fn complete(now: DateTime<Utc>) -> Self {
        Self {
            not_before: now,
            truncated: false,
        }
    }

    /// The fetch was cut at its limit; `next_read_at` is the first read left out.
    pub fn truncated_at(next_read_at: DateTime<Utc>) -> Self {
        Self {
            not_before: next_read_at,
            truncated: true,
        }
    }

    /// True while a later read could still join a journey ending at `last`.
    pub fn may_continue(&self, last: &RawEvent, max_in_transit: Duration) -> bool {
        self.not_before - last.read_time <= max_in_transit
    }
}

/// One tag's cleaned reads partitioned into journeys.
///
/// `segments`, `isolated` and `pending` together hold every input read
/// exactly once.
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    /// Route candidates, each with at least two reads.
    pub segments: Vec<Vec<RawEvent>>,
    /// Lone reads that can never gain a successor, so they are consumed
    /// without a route.
    pub isolated: Vec<RawEvent>,
    /// Trailing reads a later read may still extend. Left for the next run.
    pub pending: Vec<RawEvent>,
}

impl Segmentation {
    pub fn consumed_len(&self) -> usize {
        self.segments.iter().map(Vec::len).sum::<usize>() + self.isolated.len()
    }
}

/// Decides whether `next` opens a new journey after the reads of `current`.
pub fn split_reason(
    current: &[RawEvent],
    next: &RawEvent,
    topology: &dyn Topology,
    max_in_transit: Duration,
) -> Option<SplitReason> {
    let last = current.last()?;
    if next.read_time - last.read_time > max_in_transit {
        return Some(SplitReason::IdleGap);
    }

    if topology.reader_class(&next.reader_id) != ReaderClass::Origin {
        return None;
    }
    let last_visit = current
        .iter()
        .rposition(|read| read.reader_id == next.reader_id)?;
    let left_since = current[last_visit + 1..]
        .iter()
        .any(|read| read.reader_id != next.reader_id);
    left_since.then_some(SplitReason::OriginReentry)
}

/// Splits one tag's consolidated, time-ordered reads into journeys.
///
/// Only the last journey can be open. A lone trailing read waits while
/// `horizon` allows a successor and is isolated once it cannot get one. A
/// longer trailing journey waits only when the fetch was truncated and it
/// may continue past the cut.
pub fn split_routes(
    cleaned: Vec<RawEvent>,
    topology: &dyn Topology,
    max_in_transit: Duration,
    horizon: ReadHorizon,
) -> Segmentation {
    let mut groups: Vec<Vec<RawEvent>> = Vec::new();
    let mut current: Vec<RawEvent> = Vec::new();

    for read in cleaned {
        if split_reason(&current, &read, topology, max_in_transit).is_some() {
            groups.push(std::mem::take(&mut current));
        }
        current.push(read);
    }

    let mut result = Segmentation::default();
    for mut group in groups {
        if group.len() >= 2 {
            result.segments.push(group);
        } else if let Some(read) = group.pop() {
            result.isolated.push(read);
        }
    }

    let Some(last) = current.last() else {
        return result;
    };
    let open = horizon.may_continue(last, max_in_transit);
    match current.len() {
        1 if open => result.pending = current,
        1 => result.isolated.extend(current),
        _ if open && horizon.truncated => result.pending = current,
        _ => result.segments.push(current),
    }
    result
}
