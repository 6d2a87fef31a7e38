// Batch request and outcome

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    pub account_id: Uuid,
    #[serde(default)]
    pub batch_size: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Raw events marked processed.
    pub processed: usize,
    pub routes: usize,
    pub anomalies: usize,
    /// Tags that failed and will be retried verbatim.
    pub errors: usize,
    /// Events left unprocessed because they await a successor read.
    pub pending: usize,
    /// Events of tags never dispatched because of cancellation or deadline.
    pub skipped: usize,
}

impl ProcessingStats {
    pub fn summary(&self) -> String {
        format!(
            "Processed {} events, generated {} routes, detected {} anomalies",
            self.processed, self.routes, self.anomalies
        )
    }
}
