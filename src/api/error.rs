use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::forecast::ForecastError;

/// API error types that can be returned from handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Upstream error: {0}")]
    UpstreamError(String),

    #[error("Predictor error: {0}")]
    PredictorError(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Error response that gets serialized to JSON
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ApiError {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::UpstreamError(_) => StatusCode::BAD_GATEWAY,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::PredictorError(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the error type string
    fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::ValidationError(_) => "ValidationError",
            ApiError::UpstreamError(_) => "UpstreamError",
            ApiError::PredictorError(_) => "PredictorError",
            ApiError::Timeout => "RequestTimeout",
            ApiError::InternalError(_) => "InternalServerError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_type = self.error_type();

        let message = match &self {
            ApiError::InternalError(_) => {
                tracing::error!(error = %self, "API error occurred");
                "An internal error occurred".to_string()
            }
            ApiError::UpstreamError(msg) => {
                tracing::warn!(error = %self, "Weather source failed");
                msg.clone()
            }
            ApiError::PredictorError(msg) => {
                // diagnostics from the predictor are passed through verbatim
                tracing::error!(error = %self, "Predictor failed");
                msg.clone()
            }
            ApiError::Timeout => {
                tracing::warn!("Request exceeded the configured timeout");
                "request did not complete in time".to_string()
            }
            ApiError::BadRequest(msg) | ApiError::ValidationError(msg) => {
                tracing::debug!(error = %self, "Client error");
                msg.clone()
            }
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(error_response)).into_response()
    }
}

// Conversion from common error types

impl From<ForecastError> for ApiError {
    fn from(error: ForecastError) -> Self {
        match error {
            ForecastError::InputValidation(msg) => ApiError::ValidationError(msg),
            ForecastError::WeatherFetch(msg) => ApiError::UpstreamError(msg),
            ForecastError::ExternalPredictor(msg) => ApiError::PredictorError(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::InternalError(error.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors.to_string())
    }
}
