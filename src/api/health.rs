use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: chrono::DateTime<chrono::Utc>,
    weather_source: &'static str,
    predictor: &'static str,
}

/// GET /healthz - Liveness plus the active backends
pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now(),
        weather_source: state.engine.weather_source(),
        predictor: state.engine.predictor_name(),
    })
}
