//! HTTP API endpoint handlers (health).

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    infrastructure::dto::http::{HealthDetailsResponse, HealthResponse},
    ui::state::AppState,
};
use yoriai_shared::time::timestamp_to_rfc3339;

const SERVICE_NAME: &str = "yoriai-server";

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let report = state.get_health_usecase.execute().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: timestamp_to_rfc3339(report.timestamp.value()),
        service: SERVICE_NAME.to_string(),
    })
}

/// Detailed health endpoint with connection and room gauges
pub async fn health_details(State(state): State<Arc<AppState>>) -> Json<HealthDetailsResponse> {
    let report = state.get_health_usecase.execute().await;
    Json(HealthDetailsResponse {
        status: "ok".to_string(),
        timestamp: timestamp_to_rfc3339(report.timestamp.value()),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: report.uptime_display(),
        uptime_seconds: report.uptime_seconds,
        active_connections: report.active_connections,
        total_connections: report.total_connections,
        active_rooms: report.active_rooms,
    })
}
