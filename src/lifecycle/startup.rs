//! Startup orchestration.
//!
//! # Responsibilities
//! - Assemble the service set from the config file and the services file
//! - Build the monitor from validated configuration
//!
//! # Design Decisions
//! - An unreadable services file is logged and treated as empty, the monitor
//!   still starts with the inline services
//! - Inline services win over file entries with the same name

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{load_services, MonitorConfig, ServiceDescriptor};
use crate::health::{prober, HealthMonitor, Prober, ResultsStore};

/// Inline services followed by the services file entries, if any.
pub fn resolve_services(
    config: &MonitorConfig,
    services_file: Option<&Path>,
) -> Vec<ServiceDescriptor> {
    let mut services = config.services.clone();

    let Some(path) = services_file else {
        return services;
    };

    match load_services(path) {
        Ok(loaded) => {
            for service in loaded {
                if services.iter().any(|s| s.name == service.name) {
                    tracing::warn!(
                        service = %service.name,
                        path = %path.display(),
                        "Ignoring duplicate service from services file"
                    );
                    continue;
                }
                services.push(service);
            }
        }
        Err(e) => {
            tracing::error!(
                path = %path.display(),
                error = %e,
                "Failed to load services file"
            );
        }
    }

    services
}

/// Build the monitor with the prober selected by `config.probe`.
pub fn build_monitor(
    config: &MonitorConfig,
    services: Vec<ServiceDescriptor>,
    store: ResultsStore,
) -> HealthMonitor {
    build_monitor_with(config, services, store, prober::from_config(&config.probe))
}

pub fn build_monitor_with(
    config: &MonitorConfig,
    services: Vec<ServiceDescriptor>,
    store: ResultsStore,
    prober: Arc<dyn Prober>,
) -> HealthMonitor {
    HealthMonitor::new(
        services,
        prober,
        store,
        Duration::from_secs(config.monitor.interval_secs),
        config.monitor.alert_threshold,
    )
}
