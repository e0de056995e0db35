//! Query interface.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → request.rs (assign / propagate x-request-id)
//!     → server.rs (router, tracing, timeout)
//!     → handlers.rs (read ResultsStore snapshot)
//!     → response.rs (ApiError → 404 JSON)
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{AppState, HttpServer};
