use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// One service's latest check, as served by `/api/v1/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub service_name: String,
    pub timestamp: f64,
    pub status_code: u16,
    pub latency_ms: f64,
    pub version_found: Option<String>,
    pub is_available: bool,
    pub version_match: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MonitorStatus {
    pub version: String,
    pub status: String,
    pub services_reporting: usize,
}

pub struct MonitorClient {
    client: Client,
    base_url: String,
}

impl MonitorClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Latest result for every service, or `None` while no check has completed.
    pub async fn latest_health(&self) -> Result<Option<Vec<ServiceHealth>>, Box<dyn std::error::Error>> {
        self.get_optional("/api/v1/health").await
    }

    /// Latest result for one service, or `None` if it has not reported.
    pub async fn service_health(&self, name: &str) -> Result<Option<ServiceHealth>, Box<dyn std::error::Error>> {
        self.get_optional(&format!("/api/v1/health/{}", name)).await
    }

    pub async fn status(&self) -> Result<MonitorStatus, Box<dyn std::error::Error>> {
        self.get_optional("/status")
            .await?
            .ok_or_else(|| "monitor status endpoint not found".into())
    }

    async fn get_optional<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
    ) -> Result<Option<T>, Box<dyn std::error::Error>> {
        let resp = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let text = resp.text().await?;
        if !status.is_success() {
            return Err(format!("Monitor returned error status {}: {}", status, text).into());
        }

        Ok(Some(serde_json::from_str(&text)?))
    }
}
