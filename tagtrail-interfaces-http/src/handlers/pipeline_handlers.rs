use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use tagtrail_application::commands::process_commands;
use tagtrail_application::AppState;
use tagtrail_domain::{BatchRequest, ProcessingStats};

use crate::error::HttpError;

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub message: String,
    pub stats: ProcessingStats,
}

pub async fn process_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>, HttpError> {
    let Json(request) = payload.map_err(|err| {
        warn!("rejected batch request: {}", err.body_text());
        HttpError::BadRequest(err.body_text())
    })?;

    let stats = process_commands::process_next_batch(&state, request)
        .await
        .map_err(|err| {
            error!("batch processing failed: {}", err);
            HttpError::from(err)
        })?;
    Ok(Json(BatchResponse {
        message: stats.summary(),
        stats,
    }))
}
