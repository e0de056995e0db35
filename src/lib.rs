//! Service health monitor library.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::MonitorConfig;
pub use health::{HealthMonitor, HealthResult, ResultsStore};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
