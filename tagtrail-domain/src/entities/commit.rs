// Write units handed to the route store

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::{Anomaly, Route, TimeMetric};
use crate::value_objects::RawEventId;

/// A route together with everything computed for it. Anomalies carry no
/// route id yet; the store links them when the route row exists.
#[derive(Debug, Clone, Serialize)]
pub struct RouteRecord {
    pub route: Route,
    pub metrics: Vec<TimeMetric>,
    pub anomalies: Vec<Anomaly>,
}

/// Everything one tag produced in one run. Written in a single transaction
/// together with the processed mark of `consumed_event_ids`.
#[derive(Debug, Clone, Serialize)]
pub struct TagCommit {
    pub account_id: Uuid,
    pub tag_id: String,
    pub routes: Vec<RouteRecord>,
    pub unrouted_anomalies: Vec<Anomaly>,
    pub consumed_event_ids: Vec<RawEventId>,
    pub processed_at: DateTime<Utc>,
}

impl TagCommit {
    pub fn anomaly_count(&self) -> usize {
        self.routes
            .iter()
            .map(|record| record.anomalies.len())
            .sum::<usize>()
            + self.unrouted_anomalies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumed_event_ids.is_empty()
    }
}
