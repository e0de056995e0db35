//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! health monitor produces:
//!     → logging.rs (one record per check, alerts at error/warn)
//!     → metrics.rs (checks, latency, streaks, alerts, faults)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON lines)
//!     → Metrics endpoint (Prometheus scrape of /metrics)
//! ```

pub mod logging;
pub mod metrics;
