// Anomaly entity
// Represents one detected deviation on a tag or route

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::value_objects::{AnomalyKind, RouteId, Severity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub account_id: Uuid,
    pub route_id: Option<RouteId>,
    pub tag_id: String,
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub description: String,
    pub reader_id: Option<String>,
    pub detected_at: DateTime<Utc>,
    pub details: Value,
}

impl Anomaly {
    pub fn new(
        account_id: Uuid,
        tag_id: &str,
        kind: AnomalyKind,
        severity: Severity,
        description: impl Into<String>,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            account_id,
            route_id: None,
            tag_id: tag_id.to_string(),
            kind,
            severity,
            description: description.into(),
            reader_id: None,
            detected_at,
            details: Value::Null,
        }
    }

    pub fn at_reader(mut self, reader_id: &str) -> Self {
        self.reader_id = Some(reader_id.to_string());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}
