//! Client for the service monitor query API.

pub mod client;

pub use client::{MonitorClient, MonitorStatus, ServiceHealth};
