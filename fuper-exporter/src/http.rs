//! HTTP server for the snapshot and metrics endpoints.

use std::net::SocketAddr;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info};

use crate::cache::SharedCache;
use crate::metrics::{self, SharedMetrics};

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    cache: SharedCache,
    metrics: SharedMetrics,
}

/// Create the HTTP router.
fn create_router(cache: SharedCache, metrics: SharedMetrics, metrics_path: &str) -> Router {
    let state = AppState { cache, metrics };

    Router::new()
        .route("/", get(snapshot_handler))
        .route(metrics_path, get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler for `/`: the cached snapshot, whatever its age.
async fn snapshot_handler(State(state): State<AppState>) -> Response {
    let cached = state.cache.load();
    debug!(generation = cached.generation, "Snapshot requested");

    (
        StatusCode::OK,
        [(CONTENT_TYPE, "application/json")],
        cached.body.clone(),
    )
        .into_response()
}

/// Handler for the metrics endpoint.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => {
            debug!(bytes = body.len(), "Metrics scraped");
            (StatusCode::OK, [(CONTENT_TYPE, metrics::CONTENT_TYPE)], body).into_response()
        }
        Err(e) => {
            error!(error = %e, "Metrics rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics\n").into_response()
        }
    }
}

/// Handler for the /health endpoint.
async fn health_handler() -> Response {
    (StatusCode::OK, "healthy\n").into_response()
}

/// Handler for the /ready endpoint.
async fn ready_handler(State(state): State<AppState>) -> Response {
    if state.cache.has_snapshot() {
        (StatusCode::OK, "ready\n").into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "not ready - status page not fetched yet\n",
        )
            .into_response()
    }
}

/// HTTP server configuration.
pub struct HttpServer {
    cache: SharedCache,
    metrics: SharedMetrics,
    listen_addr: SocketAddr,
    metrics_path: String,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(
        cache: SharedCache,
        metrics: SharedMetrics,
        listen_addr: SocketAddr,
        metrics_path: String,
    ) -> Self {
        Self {
            cache,
            metrics,
            listen_addr,
            metrics_path,
        }
    }

    /// Bind the listening socket.
    ///
    /// Split from [`HttpServer::serve`] so bind failures surface before the
    /// server task is spawned.
    pub async fn bind(&self) -> anyhow::Result<tokio::net::TcpListener> {
        tokio::net::TcpListener::bind(self.listen_addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.listen_addr, e))
    }

    /// Serve requests on `listener` until the task is dropped.
    pub async fn serve(self, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
        let router = create_router(self.cache, self.metrics, &self.metrics_path);

        info!(
            addr = %listener.local_addr()?,
            metrics_path = %self.metrics_path,
            "HTTP server listening"
        );

        axum::serve(listener, router)
            .await
            .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))
    }
}
