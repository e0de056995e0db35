//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Service names are non-empty and unique
//! - Service addresses resolve to a URL
//! - Value ranges (interval > 0, threshold > 0, rates within [0, 1])
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MonitorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::{MonitorConfig, ServiceDescriptor};

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("service #{index} has an empty name")]
    EmptyServiceName { index: usize },

    #[error("duplicate service name '{0}'")]
    DuplicateServiceName(String),

    #[error("service '{name}' has an invalid address '{address}'")]
    InvalidAddress { name: String, address: String },

    #[error("monitor.interval_secs must be greater than zero")]
    ZeroInterval,

    #[error("monitor.alert_threshold must be greater than zero")]
    ZeroThreshold,

    #[error("probe.timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("probe.{field} must be within [0, 1], got {value}")]
    RateOutOfRange { field: &'static str, value: f64 },
}

/// Validate the whole configuration, services included.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.monitor.interval_secs == 0 {
        errors.push(ValidationError::ZeroInterval);
    }
    if config.monitor.alert_threshold == 0 {
        errors.push(ValidationError::ZeroThreshold);
    }
    if config.probe.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    for (field, value) in [
        ("success_rate", config.probe.success_rate),
        ("drift_rate", config.probe.drift_rate),
    ] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ValidationError::RateOutOfRange { field, value });
        }
    }

    if let Err(mut service_errors) = validate_services(&config.services) {
        errors.append(&mut service_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a descriptor set on its own.
pub fn validate_services(services: &[ServiceDescriptor]) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, service) in services.iter().enumerate() {
        if service.name.trim().is_empty() {
            errors.push(ValidationError::EmptyServiceName { index });
            continue;
        }
        if !seen.insert(service.name.as_str()) {
            errors.push(ValidationError::DuplicateServiceName(service.name.clone()));
        }
        if service.address.trim().is_empty() || service.target_url().is_err() {
            errors.push(ValidationError::InvalidAddress {
                name: service.name.clone(),
                address: service.address.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
