// Route entity
// One reconstructed shipment journey of a tag

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::RawEventId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub reader_id: String,
    pub read_at: DateTime<Utc>,
    pub event_id: RawEventId,
}

/// A route as produced by the builder. The store assigns its id on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub account_id: Uuid,
    pub tag_id: String,
    pub origin_reader_id: String,
    pub destination_reader_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub total_duration_hours: f64,
    pub waypoints: Vec<Waypoint>,
    pub reader_sequence: Vec<String>,
    pub event_count: i32,
    pub is_complete: bool,
}

impl Route {
    pub fn waypoint_event_ids(&self) -> impl Iterator<Item = RawEventId> + '_ {
        self.waypoints.iter().map(|waypoint| waypoint.event_id)
    }
}
