use thiserror::Error;

use crate::value_objects::RawEventId;

/// Contract violations inside the functional core. None of these are
/// retryable: they point at a bug upstream of the failing component.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("segment for tag {tag_id} has {reads} read(s), a route needs at least 2")]
    SegmentTooShort { tag_id: String, reads: usize },
    #[error("tag {tag_id} received event {event_id} belonging to tag {found}")]
    ForeignEvent {
        tag_id: String,
        event_id: RawEventId,
        found: String,
    },
    #[error("unknown anomaly kind '{0}'")]
    UnknownAnomalyKind(String),
    #[error("expected to mark {expected} event(s) processed, store updated {updated}")]
    AlreadyProcessed { expected: usize, updated: u64 },
}
