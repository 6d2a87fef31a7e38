use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait HealthCheckService: Send + Sync {
    async fn check_database(&self) -> anyhow::Result<bool>;
    async fn check_reference_data(&self) -> anyhow::Result<bool>;
}

/// Wall clock of a run. Stamps processed rows and bounds how long a lone
/// read may wait for its successor.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
