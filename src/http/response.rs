//! Query API error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Conditions the query API reports instead of data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No check has completed yet.
    #[error("No health check results available yet.")]
    NoResults,

    #[error("No health check result for service '{0}'.")]
    UnknownService(String),
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoResults | ApiError::UnknownService(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
