// Turns one tag's unprocessed reads into a write unit for the route store

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::json;
use tagtrail_domain::{
    build_route, calculate_time_metrics, consolidate, detect_anomalies, split_routes, Anomaly,
    AnomalyKind, Consolidation, DomainError, PipelineSettings, RawEvent, RawEventId, ReadHorizon,
    ReferenceData, RouteRecord, Severity, TagCommit,
};
use uuid::Uuid;

/// A tag's commit plus what stays behind for a later run.
#[derive(Debug, Clone)]
pub struct TagPlan {
    pub commit: TagCommit,
    /// Events left unmarked: the open trailing reads and the duplicates
    /// folded into them.
    pub pending_event_ids: Vec<RawEventId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    Route(usize),
    Unrouted,
    Pending,
}

/// Runs consolidation, segmentation, building, measuring and detection over
/// one tag's time-ordered reads. `horizon` decides whether the trailing
/// reads are final.
pub fn plan_tag(
    account_id: Uuid,
    tag_id: &str,
    reads: Vec<RawEvent>,
    reference: &ReferenceData,
    settings: &PipelineSettings,
    horizon: ReadHorizon,
    processed_at: DateTime<Utc>,
) -> Result<TagPlan, DomainError> {
    let Consolidation { cleaned, duplicates } = consolidate(reads, settings.duplicate_window);
    let segmentation = split_routes(
        cleaned,
        reference.topology.as_ref(),
        settings.max_in_transit,
        horizon,
    );

    let mut owners: HashMap<RawEventId, Owner> = HashMap::new();
    for (index, segment) in segmentation.segments.iter().enumerate() {
        owners.extend(segment.iter().map(|read| (read.id, Owner::Route(index))));
    }
    owners.extend(segmentation.isolated.iter().map(|read| (read.id, Owner::Unrouted)));
    owners.extend(segmentation.pending.iter().map(|read| (read.id, Owner::Pending)));

    let mut route_duplicates: Vec<Vec<Anomaly>> = vec![Vec::new(); segmentation.segments.len()];
    let mut unrouted_anomalies = Vec::new();
    let mut consumed_event_ids = Vec::new();
    let mut pending_event_ids: Vec<RawEventId> = segmentation.pending.iter().map(|read| read.id).collect();

    for duplicate in duplicates {
        match owners.get(&duplicate.kept_event_id).copied() {
            Some(Owner::Route(index)) => {
                consumed_event_ids.push(duplicate.dropped.id);
                route_duplicates[index].push(duplicate.anomaly);
            }
            Some(Owner::Unrouted) => {
                consumed_event_ids.push(duplicate.dropped.id);
                unrouted_anomalies.push(duplicate.anomaly);
            }
            // re-detected once the pending read is routed
            Some(Owner::Pending) | None => pending_event_ids.push(duplicate.dropped.id),
        }
    }

    for read in &segmentation.isolated {
        consumed_event_ids.push(read.id);
        unrouted_anomalies.push(isolated_read_anomaly(account_id, read));
    }

    let mut routes = Vec::with_capacity(segmentation.segments.len());
    for (segment, mut anomalies) in segmentation.segments.iter().zip(route_duplicates) {
        consumed_event_ids.extend(segment.iter().map(|read| read.id));
        let route = build_route(account_id, tag_id, segment, anomalies.len(), reference.topology.as_ref())?;
        let metrics = calculate_time_metrics(&route, reference, settings);
        anomalies.extend(detect_anomalies(&route, &metrics, reference, settings));
        routes.push(RouteRecord {
            route,
            metrics,
            anomalies,
        });
    }

    consumed_event_ids.sort_unstable();
    pending_event_ids.sort_unstable();

    Ok(TagPlan {
        commit: TagCommit {
            account_id,
            tag_id: tag_id.to_string(),
            routes,
            unrouted_anomalies,
            consumed_event_ids,
            processed_at,
        },
        pending_event_ids,
    })
}

fn isolated_read_anomaly(account_id: Uuid, read: &RawEvent) -> Anomaly {
    Anomaly::new(
        account_id,
        &read.tag_id,
        AnomalyKind::IsolatedRead,
        Severity::High,
        format!("Single read at {} with no journey around it", read.reader_id),
        read.read_time,
    )
    .at_reader(&read.reader_id)
    .with_details(json!({
        "event_id": read.event_id,
        "id": read.id,
    }))
}
