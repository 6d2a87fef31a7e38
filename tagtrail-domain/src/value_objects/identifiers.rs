// Identifier value objects

use serde::{Deserialize, Serialize};

/// Surrogate key of a persisted route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteId(pub i64);

/// Surrogate key of a raw read in the event store.
pub type RawEventId = i64;
