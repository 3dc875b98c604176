//! HTTP exporter for the Prometheus metrics endpoint.

use crate::metrics::MetricsRegistry;
use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};

/// Errors raised while serving metrics.
#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("could not bind metrics listener: {0}")]
    Bind(#[from] std::io::Error),

    #[error("exporter terminated: {0}")]
    Serve(String),
}

/// Bind settings for the exporter.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Socket address the exporter listens on.
    pub bind_addr: SocketAddr,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self::with_port(9090)
    }
}

impl ExporterConfig {
    /// Listens on all interfaces at the given port.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
        }
    }
}

/// Serves the shared registry over HTTP.
///
/// Scrapers hit `/metrics`; `/health` answers liveness probes. The
/// registry updates through `&self`, so the analysis context keeps
/// writing to the same `Arc` the handlers read from.
pub struct MetricsExporter {
    config: ExporterConfig,
    registry: Arc<MetricsRegistry>,
}

impl MetricsExporter {
    /// Creates an exporter over a shared registry.
    pub fn new(config: ExporterConfig, registry: Arc<MetricsRegistry>) -> Self {
        Self { config, registry }
    }

    /// Binds and serves until the process exits.
    pub async fn run(self) -> Result<(), ExporterError> {
        // Cross-origin reads are GET only.
        let cors = CorsLayer::new()
            .allow_methods([Method::GET])
            .allow_origin(Any);

        let app = Router::new()
            .route("/metrics", get(serve_metrics))
            .route("/health", get(serve_health))
            .layer(cors)
            .with_state(self.registry);

        let addr = self.config.bind_addr;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(%addr, "luminance metrics exporter listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| ExporterError::Serve(e.to_string()))
    }
}

async fn serve_metrics(State(registry): State<Arc<MetricsRegistry>>) -> impl IntoResponse {
    match registry.encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        ),
        Err(e) => {
            tracing::error!(error = %e, "metrics encoding failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                e.to_string(),
            )
        }
    }
}

async fn serve_health() -> &'static str {
    "ok"
}
