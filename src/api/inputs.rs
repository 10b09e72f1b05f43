use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use validator::Validate;

use super::{error::ApiError, AppState};
use crate::domain::{
    apply_pattern, initial_inputs, DailyInput, EditRequest, InputEdit, InputPattern, MAX_FORECAST_DAYS,
};

const DEFAULT_DAYS: usize = 7;

#[derive(Debug, Deserialize)]
pub struct TemplateQuery {
    pub days: Option<usize>,
    pub pattern: Option<InputPattern>,
    /// Day before the first input; defaults to today in the forecast timezone
    pub from: Option<NaiveDate>,
}

/// GET /api/inputs/template - Blank or pre-filled inputs for the coming days
pub async fn get_template(
    State(state): State<AppState>,
    query: Result<Query<TemplateQuery>, QueryRejection>,
) -> Result<Json<Vec<DailyInput>>, ApiError> {
    let Query(q) = query?;
    let days = q.days.unwrap_or(DEFAULT_DAYS);
    if days == 0 || days > MAX_FORECAST_DAYS {
        return Err(ApiError::BadRequest(format!(
            "days must be between 1 and {MAX_FORECAST_DAYS}"
        )));
    }

    let today = q
        .from
        .unwrap_or_else(|| Utc::now().with_timezone(&state.timezone).date_naive());
    let inputs = initial_inputs(today, days).ok_or_else(|| {
        ApiError::BadRequest(format!("{days} days after {today} is past the supported date range"))
    })?;
    let inputs = match q.pattern {
        Some(pattern) => apply_pattern(&inputs, pattern),
        None => inputs,
    };
    Ok(Json(inputs))
}

/// POST /api/inputs/edit - Apply a pattern, bulk value or single-day adjustment
pub async fn edit_inputs(
    payload: Result<Json<EditRequest>, JsonRejection>,
) -> Result<Json<Vec<DailyInput>>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    if let InputEdit::Adjust { index, delta } = &request.edit {
        if *index >= request.inputs.len() {
            return Err(ApiError::BadRequest(format!(
                "index {index} is out of range for {} inputs",
                request.inputs.len()
            )));
        }
        if !delta.is_finite() {
            return Err(ApiError::BadRequest("delta must be a finite number".to_string()));
        }
    }

    Ok(Json(request.edit.apply(&request.inputs)))
}
