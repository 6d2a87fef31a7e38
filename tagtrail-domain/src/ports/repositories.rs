use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::{RawEvent, TagCommit};
use crate::value_objects::RouteId;

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Unprocessed reads of one account, oldest first, at most `limit` rows.
    async fn fetch_unprocessed(&self, account_id: Uuid, limit: usize) -> anyhow::Result<Vec<RawEvent>>;
    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait RouteRepository: Send + Sync {
    async fn ensure_schema(&self) -> anyhow::Result<()>;
    /// Persists every route, metric and anomaly of the commit and marks
    /// `consumed_event_ids` processed, all or nothing. Returns the new route
    /// ids in the order of `commit.routes`.
    ///
    /// Fails with [`crate::DomainError::AlreadyProcessed`] when any consumed
    /// event was already marked by another run.
    async fn commit_tag(&self, commit: &TagCommit) -> anyhow::Result<Vec<RouteId>>;
}
