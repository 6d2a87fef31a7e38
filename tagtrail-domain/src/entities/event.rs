// Raw read entity
// One antenna read of one tag, as written by the ingestion side

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::RawEventId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RawEvent {
    pub id: RawEventId,
    pub event_id: String,
    pub tag_id: String,
    pub reader_id: String,
    pub read_time: DateTime<Utc>,
    pub account_id: Uuid,
    pub ingested_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl RawEvent {
    pub fn is_processed(&self) -> bool {
        self.processed_at.is_some()
    }
}
