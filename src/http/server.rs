//! Query server setup.
//!
//! # Responsibilities
//! - Create Axum Router with the query handlers
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve until the shutdown future resolves

use std::future::Future;
use std::time::Duration;

use axum::{routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::MonitorConfig;
use crate::health::ResultsStore;
use crate::http::handlers::{get_latest_health, get_metrics, get_service_health, get_status};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};

/// Application state injected into handlers.
///
/// Holds only a read handle on the results; tracker state is never exposed.
#[derive(Clone)]
pub struct AppState {
    pub store: ResultsStore,
    pub metrics: Option<PrometheusHandle>,
}

/// HTTP server for the query API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &MonitorConfig, store: ResultsStore, metrics: Option<PrometheusHandle>) -> Self {
        let state = AppState { store, metrics };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &MonitorConfig, state: AppState) -> Router {
        Router::new()
            .route("/status", get(get_status))
            .route("/metrics", get(get_metrics))
            .route("/api/v1/health", get(get_latest_health))
            .route("/api/v1/health/{service}", get(get_service_health))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Query server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Query server stopped");
        Ok(())
    }
}
