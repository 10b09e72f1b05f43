use thiserror::Error;

use crate::domain::InputError;

/// Failure of a prediction request. No partial results accompany any variant.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Invalid input: {0}")]
    InputValidation(String),

    #[error("Weather fetch failed: {0}")]
    WeatherFetch(String),

    #[error("External predictor failed: {0}")]
    ExternalPredictor(String),
}

impl From<InputError> for ForecastError {
    fn from(error: InputError) -> Self {
        ForecastError::InputValidation(error.to_string())
    }
}

impl From<validator::ValidationErrors> for ForecastError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ForecastError::InputValidation(errors.to_string())
    }
}
