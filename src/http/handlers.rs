use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::health::HealthResult;
use crate::http::response::ApiError;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub services_reporting: usize,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        services_reporting: state.store.len(),
    })
}

/// Latest result for every monitored service.
pub async fn get_latest_health(
    State(state): State<AppState>,
) -> Result<Json<Vec<HealthResult>>, ApiError> {
    let results = state.store.get_all();
    if results.is_empty() {
        return Err(ApiError::NoResults);
    }
    Ok(Json(results))
}

pub async fn get_service_health(
    State(state): State<AppState>,
    Path(service): Path<String>,
) -> Result<Json<HealthResult>, ApiError> {
    state
        .store
        .get(&service)
        .map(Json)
        .ok_or(ApiError::UnknownService(service))
}

pub async fn get_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}
