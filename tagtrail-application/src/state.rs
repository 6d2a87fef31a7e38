use std::sync::Arc;

use tagtrail_domain::ports::{Clock, EventRepository, HealthCheckService, ReferenceData, RouteRepository};
use tagtrail_domain::RuntimeConfig;
use tokio_util::sync::CancellationToken;

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub event_repo: Arc<dyn EventRepository>,
    pub route_repo: Arc<dyn RouteRepository>,
    pub health: Arc<dyn HealthCheckService>,
    pub reference: ReferenceData,
    pub clock: Arc<dyn Clock>,
    pub metrics: Arc<Metrics>,
    /// Cancelled on shutdown; running batches stop dispatching new tags.
    pub shutdown: CancellationToken,
}
