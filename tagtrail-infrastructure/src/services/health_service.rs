use std::sync::Arc;

use async_trait::async_trait;
use tagtrail_domain::ports::{EventRepository, HealthCheckService};
use tagtrail_domain::RuntimeConfig;

use crate::repositories::{load_standards_document, load_topology_document};

pub struct DefaultHealthService {
    event_repo: Arc<dyn EventRepository>,
    config: RuntimeConfig,
}

impl DefaultHealthService {
    pub fn new(event_repo: Arc<dyn EventRepository>, config: RuntimeConfig) -> Self {
        Self { event_repo, config }
    }
}

#[async_trait]
impl HealthCheckService for DefaultHealthService {
    async fn check_database(&self) -> anyhow::Result<bool> {
        self.event_repo.ping().await.map(|_| true)
    }

    /// The reference files on disk still parse.
    async fn check_reference_data(&self) -> anyhow::Result<bool> {
        load_topology_document(&self.config.topology_path).await?;
        load_standards_document(&self.config.standards_path).await?;
        Ok(true)
    }
}
