//! Health probes.
//!
//! # Responsibilities
//! - Execute one check against one service descriptor
//! - Map every transport outcome (timeout, refused, error status) to a result
//! - Reserve `ProbeError` for faults in the probe itself
//!
//! # Design Decisions
//! - Probers are injected into the monitor as `Arc<dyn Prober>`
//! - Every HTTP probe is bounded by a timeout
//! - A refused connection reports 503, a timeout reports 504

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderName, Request, Response};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use rand::Rng;
use thiserror::Error;
use tokio::time;

use crate::config::{ProbeConfig, ProbeMode, ServiceDescriptor};
use crate::health::result::HealthResult;

/// Status reported when the service could not be reached.
pub const STATUS_UNREACHABLE: u16 = 503;
/// Status reported when the probe hit its timeout.
pub const STATUS_TIMEOUT: u16 = 504;

const MAX_BODY_BYTES: usize = 64 * 1024;

/// A fault in the probing mechanism, as opposed to an unhealthy service.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("unsupported scheme '{0}' (only http is probed)")]
    UnsupportedScheme(String),

    #[error("failed to build probe request: {0}")]
    Request(#[from] axum::http::Error),
}

/// Executes a single health check.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, service: &ServiceDescriptor) -> Result<HealthResult, ProbeError>;
}

/// Build the prober selected by the configuration.
pub fn from_config(config: &ProbeConfig) -> Arc<dyn Prober> {
    match config.mode {
        ProbeMode::Http => Arc::new(HttpProber::new(
            Duration::from_secs(config.timeout_secs),
            &config.version_header,
        )),
        ProbeMode::Simulated => Arc::new(SimulatedProber::new(
            config.success_rate,
            config.drift_rate,
        )),
    }
}

/// Probes services with an HTTP GET.
pub struct HttpProber {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
    version_header: Option<HeaderName>,
}

impl HttpProber {
    pub fn new(timeout: Duration, version_header: &str) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let version_header = match HeaderName::from_bytes(version_header.as_bytes()) {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::warn!(header = %version_header, error = %e, "Ignoring invalid version header name");
                None
            }
        };

        Self {
            client,
            timeout,
            version_header,
        }
    }

    fn build_request(&self, service: &ServiceDescriptor) -> Result<Request<Body>, ProbeError> {
        let url = service.target_url().map_err(|e| ProbeError::InvalidAddress {
            address: service.address.clone(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "http" {
            return Err(ProbeError::UnsupportedScheme(url.scheme().to_string()));
        }

        Ok(Request::builder()
            .method("GET")
            .uri(url.as_str())
            .header("user-agent", "service-monitor-probe")
            .body(Body::empty())?)
    }

    /// Read the reported version from the header, else from a JSON `version` field.
    async fn version_of(&self, response: Response<hyper::body::Incoming>) -> Option<String> {
        if let Some(name) = &self.version_header {
            if let Some(value) = response.headers().get(name).and_then(|v| v.to_str().ok()) {
                return Some(value.to_string());
            }
        }

        let body = axum::body::to_bytes(Body::new(response.into_body()), MAX_BODY_BYTES)
            .await
            .ok()?;
        let json: serde_json::Value = serde_json::from_slice(&body).ok()?;
        json.get("version")?.as_str().map(str::to_string)
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, service: &ServiceDescriptor) -> Result<HealthResult, ProbeError> {
        let request = self.build_request(service)?;
        let start = Instant::now();

        let (status_code, version_found) = match time::timeout(self.timeout, async {
            let response = self.client.request(request).await?;
            let status = response.status().as_u16();
            let version = self.version_of(response).await;
            Ok::<_, hyper_util::client::legacy::Error>((status, version))
        })
        .await
        {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                tracing::debug!(service = %service.name, error = %e, "Probe connection error");
                (STATUS_UNREACHABLE, None)
            }
            Err(_) => {
                tracing::debug!(service = %service.name, timeout = ?self.timeout, "Probe timed out");
                (STATUS_TIMEOUT, None)
            }
        };

        let latency_ms = round2(start.elapsed().as_secs_f64() * 1000.0);
        Ok(HealthResult::new(service, status_code, latency_ms, version_found))
    }
}

/// Produces randomized outcomes without touching the network.
pub struct SimulatedProber {
    success_rate: f64,
    drift_rate: f64,
}

impl SimulatedProber {
    pub fn new(success_rate: f64, drift_rate: f64) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
            drift_rate: drift_rate.clamp(0.0, 1.0),
        }
    }
}

#[async_trait]
impl Prober for SimulatedProber {
    async fn probe(&self, service: &ServiceDescriptor) -> Result<HealthResult, ProbeError> {
        let (status_code, latency_ms, version_found) = {
            let mut rng = rand::thread_rng();
            let latency_ms = round2(rng.gen_range(50.0..500.0));
            let status_code = if rng.gen_bool(self.success_rate) { 200 } else { STATUS_UNREACHABLE };
            let version_found = service.expected_version.as_ref().map(|expected| {
                if rng.gen_bool(self.drift_rate) {
                    format!("{}.drift", expected)
                } else {
                    expected.clone()
                }
            });
            (status_code, latency_ms, version_found)
        };

        Ok(HealthResult::new(service, status_code, latency_ms, version_found))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
