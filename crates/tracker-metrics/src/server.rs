use axum::{extract::State, http::StatusCode, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

use crate::config::MetricsConfig;
use crate::{MetricsError, Result};

/// Readiness flag shared between the tracker and the `/ready` probe.
///
/// Cleared until the first directory load succeeds.
#[derive(Debug, Clone, Default)]
pub struct Readiness(Arc<AtomicBool>);

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ready(&self, ready: bool) {
        self.0.store(ready, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Clone)]
struct AppState {
    handle: PrometheusHandle,
    readiness: Readiness,
}

/// Serves `/metrics`, `/health` and `/ready`
pub struct MetricsServer {
    config: MetricsConfig,
    state: AppState,
}

impl MetricsServer {
    pub fn new(config: MetricsConfig, handle: PrometheusHandle, readiness: Readiness) -> Self {
        Self {
            config,
            state: AppState { handle, readiness },
        }
    }

    pub async fn run(self) -> Result<()> {
        let addr = self.config.socket_addr()?;

        let app = Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            .route("/ready", get(ready_handler))
            .with_state(self.state);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(MetricsError::Bind)?;
        info!(address = %addr, "Metrics server listening");

        axum::serve(listener, app).await.map_err(MetricsError::Serve)
    }
}

async fn metrics_handler(State(state): State<AppState>) -> String {
    state.handle.render()
}

async fn health_handler() -> &'static str {
    "OK"
}

async fn ready_handler(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.readiness.is_ready() {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "LOADING")
    }
}
