// Server module - axum router and listener setup

pub mod handlers;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::metrics::Metrics;
use crate::pipeline::Pipeline;
use crate::storage::DestinationSink;

/// Room for multipart boundaries and the small form fields next to the file
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub sink: Arc<dyn DestinationSink>,
    pub metrics: Arc<Metrics>,
    pub server: Arc<ServerConfig>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(pipeline: Pipeline, sink: Arc<dyn DestinationSink>, server: ServerConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            sink,
            metrics: Arc::new(Metrics::new()),
            server: Arc::new(server),
            start_time: Instant::now(),
        }
    }
}

/// Create the axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state
        .server
        .max_upload_size
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/upload",
            post(handlers::upload).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
}

/// Serve on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Upload server listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Upload server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
