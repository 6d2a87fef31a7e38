use std::collections::BTreeMap;

use crate::entities::RawEvent;

/// Splits a fetched batch into one read sequence per tag, each sorted by read
/// time. Reads sharing a timestamp keep their fetch order.
pub fn group_by_tag(events: Vec<RawEvent>) -> BTreeMap<String, Vec<RawEvent>> {
    let mut groups: BTreeMap<String, Vec<RawEvent>> = BTreeMap::new();
    for event in events {
        groups.entry(event.tag_id.clone()).or_default().push(event);
    }
    for reads in groups.values_mut() {
        // sort_by_key is stable
        reads.sort_by_key(|event| event.read_time);
    }
    groups
}
