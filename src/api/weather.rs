//! Weather forecast API endpoints

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use super::{error::ApiError, AppState};
use crate::domain::{DailyWeather, DateRange};

/// Date range and optional location for a daily forecast
#[derive(Debug, Deserialize, Validate)]
pub struct WeatherQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

/// GET /api/weather - Daily aggregated weather for a date range
pub async fn get_daily_weather(
    State(state): State<AppState>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Json<Vec<DailyWeather>>, ApiError> {
    let Query(q) = query?;
    q.validate()?;
    let range = DateRange::new(q.start, q.end)
        .ok_or_else(|| ApiError::BadRequest("start must not be after end".to_string()))?;

    let location = state.engine.resolve_location(q.latitude, q.longitude);
    let daily = state.engine.daily_weather(range, location).await?;
    Ok(Json(daily))
}
