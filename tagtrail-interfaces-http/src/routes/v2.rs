use axum::Router;

use tagtrail_application::AppState;

use crate::handlers::{ops_handlers, pipeline_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/v2/pipeline/batches",
            axum::routing::post(pipeline_handlers::process_batch),
        )
        .route(
            "/v2/ops/health/live",
            axum::routing::get(ops_handlers::health_live),
        )
        .route(
            "/v2/ops/health/ready",
            axum::routing::get(ops_handlers::health_ready),
        )
        .route(
            "/v2/ops/metrics/prometheus",
            axum::routing::get(ops_handlers::metrics_prometheus),
        )
        .fallback(|| async { crate::error::HttpError::NotFound })
        .with_state(state)
}
