use std::time::Duration;

use tracing::{debug, error, info};

use tagtrail_application::commands::process_commands::process_next_batch;
use tagtrail_application::AppState;
use tagtrail_domain::BatchRequest;

/// Runs one batch per configured account every interval until shutdown.
pub async fn schedule_batches(state: AppState) {
    if !state.config.schedule_enabled || state.config.scheduled_accounts.is_empty() {
        debug!("batch schedule disabled");
        return;
    }
    let interval = Duration::from_secs(state.config.schedule_interval_seconds.max(1));
    info!(
        accounts = state.config.scheduled_accounts.len(),
        interval_seconds = interval.as_secs(),
        "batch schedule started"
    );

    loop {
        run_scheduled_round(&state).await;
        tokio::select! {
            _ = state.shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
    info!("batch schedule stopped");
}

pub async fn run_scheduled_round(state: &AppState) {
    for account_id in &state.config.scheduled_accounts {
        if state.shutdown.is_cancelled() {
            return;
        }
        let request = BatchRequest {
            account_id: *account_id,
            batch_size: None,
        };
        if let Err(err) = process_next_batch(state, request).await {
            error!(%account_id, "scheduled batch failed: {}", err);
        }
    }
}
