//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! monitor.rs (fixed-interval sweep)
//!     → prober.rs (one check per service → HealthResult)
//!     → tracker.rs (consecutive failures → AlertEvent)
//!     → store.rs (latest result per service)
//!     → query API reads store.rs
//! ```
//!
//! # Design Decisions
//! - The monitor owns the tracker; only the store is shared
//! - A probe never reports an unhealthy service as an error
//! - Alerts fire on transitions, not on every failed check

pub mod monitor;
pub mod prober;
pub mod result;
pub mod store;
pub mod tracker;

pub use monitor::{HealthMonitor, SweepReport};
pub use prober::{HttpProber, ProbeError, Prober, SimulatedProber};
pub use result::HealthResult;
pub use store::ResultsStore;
pub use tracker::{AlertEvent, FailureTracker, StreakState, DEFAULT_ALERT_THRESHOLD};
