use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;

use super::{error::ApiError, AppState};
use crate::domain::{PredictRequest, PredictionResult, PredictionSummary};

/// Predictions together with their totals
#[derive(Debug, Serialize)]
pub struct PredictionReport {
    pub predictions: Vec<PredictionResult>,
    pub summary: PredictionSummary,
    /// Production covers predicted consumption over the whole batch
    pub surplus: bool,
}

/// POST /api/predict - Predict daily consumption for a batch of targets
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<Vec<PredictionResult>>, ApiError> {
    let Json(request) = payload?;
    let results = state.engine.predict(&request).await?;
    Ok(Json(results))
}

/// POST /api/predict/summary - Same as `/api/predict`, plus batch totals
pub async fn predict_summary(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictionReport>, ApiError> {
    let Json(request) = payload?;
    let predictions = state.engine.predict(&request).await?;
    let summary = PredictionSummary::from_results(&predictions);
    let surplus = summary.is_surplus();
    Ok(Json(PredictionReport {
        predictions,
        summary,
        surplus,
    }))
}
