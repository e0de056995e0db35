//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the monitor.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use url::Url;

/// Root configuration for the service monitor.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Query server listener (bind address).
    pub listener: ListenerConfig,

    /// Sweep scheduling and alerting.
    pub monitor: MonitorSettings,

    /// How each service is probed.
    pub probe: ProbeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Services declared inline in the config file.
    pub services: Vec<ServiceDescriptor>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Request timeout for query handlers in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Sweep scheduling and alert escalation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Pause between two full sweeps in seconds.
    pub interval_secs: u64,

    /// Consecutive failures that open an incident.
    pub alert_threshold: u32,

    /// Optional JSON file holding an array of service descriptors.
    pub services_file: Option<String>,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval_secs: 2,
            alert_threshold: 3,
            services_file: None,
        }
    }
}

/// Which prober implementation runs the checks.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMode {
    /// Real HTTP GET against the service address.
    #[default]
    Http,
    /// Randomized outcomes, no network traffic.
    Simulated,
}

/// Probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub mode: ProbeMode,

    /// Upper bound on a single probe in seconds.
    pub timeout_secs: u64,

    /// Response header carrying the deployed version.
    pub version_header: String,

    /// Probability of a 200 in simulated mode.
    pub success_rate: f64,

    /// Probability of a drifted version in simulated mode.
    pub drift_rate: f64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            mode: ProbeMode::Http,
            timeout_secs: 5,
            version_header: "x-service-version".to_string(),
            success_rate: 0.4,
            drift_rate: 0.2,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines instead of the human format.
    pub json_logs: bool,

    /// Install the Prometheus recorder and serve `/metrics`.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: true,
        }
    }
}

/// A single monitored service.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Unique service identifier.
    pub name: String,

    /// Check target (URL or host:port).
    #[serde(alias = "url")]
    pub address: String,

    /// Version the service is expected to report.
    #[serde(default)]
    pub expected_version: Option<String>,

    /// Free-form grouping label.
    #[serde(default)]
    pub group: String,
}

impl ServiceDescriptor {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            expected_version: None,
            group: String::new(),
        }
    }

    pub fn with_expected_version(mut self, version: impl Into<String>) -> Self {
        self.expected_version = Some(version.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Resolve the address into a URL. A bare `host:port` means `http://host:port/`.
    pub fn target_url(&self) -> Result<Url, url::ParseError> {
        let address = self.address.trim();
        if address.contains("://") {
            Url::parse(address)
        } else {
            Url::parse(&format!("http://{}", address))
        }
    }
}
