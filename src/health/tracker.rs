//! Consecutive-failure tracking and incident alerting.
//!
//! # States
//! - Healthy: no failures since the last success
//! - Degrading: some failures, still below the threshold
//! - Alerting: an incident is open
//!
//! # State Transitions
//! ```text
//! Healthy/Degrading → Alerting: failures reach threshold   (Critical, once)
//! Alerting → Alerting: further failures                    (Continuing)
//! Alerting → Healthy: first success                        (Recovery, once)
//! Degrading → Healthy: first success                       (silent)
//! ```

use std::collections::HashMap;

use serde::Serialize;

use crate::health::result::HealthResult;

pub const DEFAULT_ALERT_THRESHOLD: u32 = 3;

/// Where a service sits in the failure state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakState {
    Healthy,
    Degrading,
    Alerting,
}

/// Incident notification produced by a tracker transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertEvent {
    /// The streak just reached the threshold. Fires once per incident.
    Critical {
        service: String,
        failures: u32,
        status_code: u16,
    },
    /// The incident is still open.
    Continuing { service: String, failures: u32 },
    /// First success after an incident; `failures` is the streak that ended.
    Recovery { service: String, failures: u32 },
}

impl AlertEvent {
    pub fn service(&self) -> &str {
        match self {
            AlertEvent::Critical { service, .. }
            | AlertEvent::Continuing { service, .. }
            | AlertEvent::Recovery { service, .. } => service,
        }
    }

    /// Metric label for the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AlertEvent::Critical { .. } => "critical",
            AlertEvent::Continuing { .. } => "continuing",
            AlertEvent::Recovery { .. } => "recovery",
        }
    }
}

/// Per-service consecutive failure counters.
///
/// Owned by the monitor loop; updates for a service are applied in probe order.
#[derive(Debug)]
pub struct FailureTracker {
    threshold: u32,
    streaks: HashMap<String, u32>,
}

impl FailureTracker {
    /// Create a tracker. A zero threshold is raised to 1.
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            streaks: HashMap::new(),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Feed the latest result for a service and return the alert it triggers, if any.
    pub fn observe(&mut self, result: &HealthResult) -> Option<AlertEvent> {
        let threshold = self.threshold;
        let service = result.service_name();
        let streak = self.streaks.entry(service.to_string()).or_insert(0);

        if result.is_available() {
            let ended = std::mem::take(streak);
            return (ended >= threshold).then(|| AlertEvent::Recovery {
                service: service.to_string(),
                failures: ended,
            });
        }

        *streak += 1;
        let failures = *streak;

        if failures == threshold {
            Some(AlertEvent::Critical {
                service: service.to_string(),
                failures,
                status_code: result.status_code(),
            })
        } else if failures > threshold {
            Some(AlertEvent::Continuing {
                service: service.to_string(),
                failures,
            })
        } else {
            tracing::debug!(
                service = %service,
                failures,
                threshold,
                status = result.status_code(),
                "Service degrading"
            );
            None
        }
    }

    /// Current streak for a service; unknown services have none.
    pub fn consecutive_failures(&self, service: &str) -> u32 {
        self.streaks.get(service).copied().unwrap_or(0)
    }

    pub fn state(&self, service: &str) -> StreakState {
        match self.consecutive_failures(service) {
            0 => StreakState::Healthy,
            n if n < self.threshold => StreakState::Degrading,
            _ => StreakState::Alerting,
        }
    }
}

impl Default for FailureTracker {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_THRESHOLD)
    }
}
