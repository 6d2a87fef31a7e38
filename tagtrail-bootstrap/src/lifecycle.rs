use std::path::Path;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use tagtrail_application::commands::process_commands::process_next_batch;
use tagtrail_application::AppState;
use tagtrail_domain::BatchRequest;
use tagtrail_infrastructure::schedule_batches;
use tagtrail_interfaces_http::build_router;

use crate::context::AppContext;

fn build_router_with_layers(state: AppState) -> Router {
    build_router(state.clone())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(
            usize::try_from(state.config.max_body_bytes).unwrap_or(usize::MAX),
        ))
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(
            state.config.request_timeout_seconds,
        )))
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(config_path: Option<&Path>) -> Result<()> {
    let context = AppContext::new(config_path).await?;
    let state = context.state;
    cancel_on_signal(state.shutdown.clone());

    let scheduler = tokio::spawn(schedule_batches(state.clone()));

    let app = build_router_with_layers(state.clone());
    let addr: std::net::SocketAddr = state.config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("listening on {}", addr);

    let shutdown = state.shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    if let Err(err) = scheduler.await {
        error!("batch schedule task failed: {}", err);
    }
    info!("server stopped");
    Ok(())
}

pub async fn run_once(config_path: Option<&Path>, account_id: Uuid, batch_size: Option<usize>) -> Result<()> {
    let context = AppContext::new(config_path).await?;
    let state = context.state;
    cancel_on_signal(state.shutdown.clone());

    let stats = process_next_batch(
        &state,
        BatchRequest {
            account_id,
            batch_size,
        },
    )
    .await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn cancel_on_signal(token: CancellationToken) {
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("shutdown requested, finishing in-flight tags");
        token.cancel();
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("sigterm handler unavailable: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
