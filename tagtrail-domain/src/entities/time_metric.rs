// Time metric entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::secs_to_hours;

/// Leg index carried by the whole-route row.
pub const AGGREGATE_LEG_INDEX: i32 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeMetric {
    pub account_id: Uuid,
    pub tag_id: String,
    pub leg_index: i32,
    pub from_reader_id: String,
    pub to_reader_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub elapsed_total_secs: i64,
    pub elapsed_business_secs: i64,
    pub expected_hours: Option<f64>,
    pub is_delayed: bool,
    pub delay_hours: Option<f64>,
}

impl TimeMetric {
    pub fn is_aggregate(&self) -> bool {
        self.leg_index == AGGREGATE_LEG_INDEX
    }

    pub fn elapsed_total_hours(&self) -> f64 {
        secs_to_hours(self.elapsed_total_secs)
    }

    pub fn elapsed_business_hours(&self) -> f64 {
        secs_to_hours(self.elapsed_business_secs)
    }
}
