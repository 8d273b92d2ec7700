//! HTTP server for the Prometheus metrics endpoint.
//!
//! Every scrape runs a fresh collection on the blocking thread pool; nothing
//! is cached between requests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use hostprobe_core::{Collector, CONTENT_TYPE};
use tracing::{debug, error, info};

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    collector: Arc<Collector>,
}

/// Create the HTTP router.
pub fn create_router(collector: Arc<Collector>, metrics_path: &str) -> Router {
    let state = AppState { collector };

    Router::new()
        .route(metrics_path, get(metrics_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

/// Handler for the metrics endpoint.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    let collector = state.collector.clone();

    // Collection blocks (CPU sampling, external tools)
    match tokio::task::spawn_blocking(move || collector.collect().render()).await {
        Ok(body) => {
            debug!(bytes = body.len(), "serving metrics");
            let length = body.len().to_string();
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, CONTENT_TYPE.to_string()),
                    (header::CONTENT_LENGTH, length),
                ],
                body,
            )
                .into_response()
        }
        Err(e) => {
            error!("metrics collection task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Collection failed").into_response()
        }
    }
}

async fn not_found_handler() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

/// HTTP server configuration.
pub struct MetricsServer {
    collector: Arc<Collector>,
    listen_addr: SocketAddr,
    metrics_path: String,
}

impl MetricsServer {
    /// Create a new HTTP server.
    pub fn new(collector: Arc<Collector>, listen_addr: SocketAddr, metrics_path: String) -> Self {
        Self {
            collector,
            listen_addr,
            metrics_path,
        }
    }

    /// Run the HTTP server until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = create_router(self.collector, &self.metrics_path);

        let listener = tokio::net::TcpListener::bind(self.listen_addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.listen_addr, e))?;

        info!(
            addr = %self.listen_addr,
            path = %self.metrics_path,
            "Serving metrics on http://{}{}",
            self.listen_addr,
            self.metrics_path
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("HTTP server shutting down");
            })
            .await
            .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

        info!("HTTP server stopped");
        Ok(())
    }
}
