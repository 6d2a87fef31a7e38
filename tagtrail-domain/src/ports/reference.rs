// Read-only reference collaborators consumed by the pure pipeline stages

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::value_objects::ReaderClass;

/// Reader placement and the expected flow between network nodes.
pub trait Topology: Send + Sync {
    fn reader_class(&self, reader_id: &str) -> ReaderClass;
    fn node_of(&self, reader_id: &str) -> Option<&str>;
    /// Nodes from `from_node` to `to_node` inclusive, or `None` if unreachable.
    fn expected_path(&self, from_node: &str, to_node: &str) -> Option<Vec<String>>;
    fn expected_leg_hours(&self, from_node: &str, to_node: &str) -> Option<f64>;
}

pub trait BusinessCalendar: Send + Sync {
    fn is_business_moment(&self, at: DateTime<Utc>) -> bool;
    /// Portion of `[from, to)` made of business moments. Zero when `to <= from`.
    fn business_duration(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Duration;
}

pub trait DeliveryStandards: Send + Sync {
    /// Allowed transit in business hours between two nodes.
    fn allowed_business_hours(&self, origin_node: Option<&str>, destination_node: Option<&str>) -> Option<f64>;
}

/// Snapshot of the reference collaborators a batch runs against.
#[derive(Clone)]
pub struct ReferenceData {
    pub topology: Arc<dyn Topology>,
    pub calendar: Arc<dyn BusinessCalendar>,
    pub standards: Arc<dyn DeliveryStandards>,
}
