//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! monitor.toml (optional)           services.json (optional)
//!     → loader.rs (parse)               → loader.rs (parse)
//!     → validation.rs (semantic checks) → validation.rs (names, addresses)
//!     → MonitorConfig (validated, immutable)
//!     → shared by value with the monitor loop and the query server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the descriptor set never changes at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_services, ConfigError};
pub use schema::{
    ListenerConfig, MonitorConfig, MonitorSettings, ObservabilityConfig, ProbeConfig, ProbeMode,
    ServiceDescriptor,
};
pub use validation::ValidationError;
