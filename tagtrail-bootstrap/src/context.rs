use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use tagtrail_application::{AppState, Metrics};
use tagtrail_domain::RouteRepository;
use tagtrail_infrastructure::{
    load_reference_data, AppConfig, DefaultHealthService, PostgresStore, SystemClock,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => AppConfig::load_from(path).await?,
            None => AppConfig::load().await?,
        };
        let runtime_config = config.to_runtime_config()?;
        let db_config = config.to_db_config();

        let store = Arc::new(PostgresStore::connect(&db_config).await?);
        store.ensure_schema().await?;

        let reference = load_reference_data(&runtime_config).await?;
        let health = Arc::new(DefaultHealthService::new(store.clone(), runtime_config.clone()));

        let state = AppState {
            config: runtime_config,
            event_repo: store.clone(),
            route_repo: store,
            health,
            reference,
            clock: Arc::new(SystemClock),
            metrics: Arc::new(Metrics::default()),
            shutdown: CancellationToken::new(),
        };

        Ok(Self { state })
    }
}
