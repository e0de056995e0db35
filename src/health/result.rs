//! Health check outcomes.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::config::ServiceDescriptor;

/// One probe outcome for one service.
///
/// `is_available` and `version_match` are derived at construction and the
/// fields are private, so a result can never disagree with its own status code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResult {
    service_name: String,
    /// Seconds since the Unix epoch.
    timestamp: f64,
    status_code: u16,
    latency_ms: f64,
    version_found: Option<String>,
    is_available: bool,
    version_match: bool,
}

impl HealthResult {
    /// Build a result for `service`, stamped with the current time.
    pub fn new(
        service: &ServiceDescriptor,
        status_code: u16,
        latency_ms: f64,
        version_found: Option<String>,
    ) -> Self {
        Self::at(service, now_secs(), status_code, latency_ms, version_found)
    }

    /// Build a result with an explicit timestamp.
    pub fn at(
        service: &ServiceDescriptor,
        timestamp: f64,
        status_code: u16,
        latency_ms: f64,
        version_found: Option<String>,
    ) -> Self {
        let version_match = match &service.expected_version {
            Some(expected) => version_found.as_deref() == Some(expected.as_str()),
            None => true,
        };

        Self {
            service_name: service.name.clone(),
            timestamp,
            status_code,
            latency_ms: latency_ms.max(0.0),
            version_found,
            is_available: status_code < 400,
            version_match,
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn latency_ms(&self) -> f64 {
        self.latency_ms
    }

    pub fn version_found(&self) -> Option<&str> {
        self.version_found.as_deref()
    }

    pub fn is_available(&self) -> bool {
        self.is_available
    }

    pub fn version_match(&self) -> bool {
        self.version_match
    }
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
