use anyhow::{Context, Result};
use std::collections::HashMap;
use std::time::Duration;
use tracing::info;
use validator::Validate;

use super::{
    ConsumptionPredictor, ExternalProcessPredictor, FeatureRow, ForecastError, HeuristicPredictor,
    Jitter, OpenMeteoClient, SyntheticWeather, WeatherProvider,
};
use crate::config::{Config, PredictorBackend, WeatherSource};
use crate::domain::{
    efficiency_percent, parse_targets, DailyWeather, DateRange, GeoLocation, PredictRequest,
    PredictionResult, MAX_FORECAST_DAYS,
};

/// Validates a batch, gathers weather for it and runs the predictor.
///
/// Holds no per-request state, so one engine is shared by every handler.
pub struct PredictionEngine {
    weather: Box<dyn WeatherProvider>,
    predictor: Box<dyn ConsumptionPredictor>,
    default_location: GeoLocation,
}

impl PredictionEngine {
    pub fn new(
        weather: Box<dyn WeatherProvider>,
        predictor: Box<dyn ConsumptionPredictor>,
        default_location: GeoLocation,
    ) -> Self {
        Self {
            weather,
            predictor,
            default_location,
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let weather: Box<dyn WeatherProvider> = match cfg.weather.source {
            WeatherSource::OpenMeteo => Box::new(OpenMeteoClient::new(
                cfg.weather.base_url.clone(),
                cfg.weather.timezone.clone(),
                Duration::from_secs(cfg.weather.http_timeout_secs),
            )?),
            WeatherSource::Synthetic => Box::new(SyntheticWeather::new(cfg.weather.seed)),
        };

        let predictor: Box<dyn ConsumptionPredictor> = match cfg.predictor.backend {
            PredictorBackend::Heuristic => Box::new(HeuristicPredictor::new(Jitter::from_settings(
                cfg.predictor.jitter,
                cfg.predictor.seed,
            ))),
            PredictorBackend::External => {
                let ext = cfg
                    .predictor
                    .external
                    .as_ref()
                    .context("predictor.backend is \"external\" but [predictor.external] is missing")?;
                let mut predictor = ExternalProcessPredictor::new(ext.program.clone(), ext.args.clone())
                    .with_features(ext.features.clone());
                if let Some(dir) = &ext.working_dir {
                    predictor = predictor.with_working_dir(dir);
                }
                Box::new(predictor)
            }
        };

        Ok(Self::new(
            weather,
            predictor,
            GeoLocation::new(cfg.weather.default_latitude, cfg.weather.default_longitude),
        ))
    }

    pub fn weather_source(&self) -> &'static str {
        self.weather.name()
    }

    pub fn predictor_name(&self) -> &'static str {
        self.predictor.name()
    }

    /// Request coordinates, falling back to the configured location per axis.
    pub fn resolve_location(&self, latitude: Option<f64>, longitude: Option<f64>) -> GeoLocation {
        GeoLocation::new(
            latitude.unwrap_or(self.default_location.latitude),
            longitude.unwrap_or(self.default_location.longitude),
        )
    }

    /// Daily weather for an arbitrary range, capped at the forecast horizon.
    pub async fn daily_weather(
        &self,
        range: DateRange,
        location: GeoLocation,
    ) -> Result<Vec<DailyWeather>, ForecastError> {
        if range.num_days() > MAX_FORECAST_DAYS {
            return Err(ForecastError::InputValidation(format!(
                "date range spans {} days, at most {MAX_FORECAST_DAYS} are supported",
                range.num_days()
            )));
        }
        self.weather.daily_forecast(range, location).await
    }

    /// Predict every day of the request, or fail without partial results.
    pub async fn predict(&self, request: &PredictRequest) -> Result<Vec<PredictionResult>, ForecastError> {
        request.validate()?;
        let targets = parse_targets(&request.inputs)?;
        let range = request
            .date_range()
            .ok_or_else(|| ForecastError::InputValidation("no inputs given".to_string()))?;

        let location = self.resolve_location(request.latitude, request.longitude);
        let weather = self.daily_weather(range, location).await?;
        let by_date: HashMap<_, _> = weather.iter().map(|w| (w.date, w)).collect();

        let days = request
            .inputs
            .iter()
            .map(|input| {
                by_date.get(&input.date).copied().ok_or_else(|| {
                    ForecastError::WeatherFetch(format!("forecast does not cover {}", input.date))
                })
            })
            .collect::<Result<Vec<&DailyWeather>, _>>()?;

        let rows: Vec<FeatureRow> = targets
            .iter()
            .zip(&days)
            .map(|(target, weather)| FeatureRow::new(*target, weather))
            .collect();

        let predictions = self.predictor.predict(&rows).await?;
        if predictions.len() != rows.len() {
            return Err(ForecastError::ExternalPredictor(format!(
                "expected {} predictions, got {}",
                rows.len(),
                predictions.len()
            )));
        }

        let results: Vec<PredictionResult> = request
            .inputs
            .iter()
            .zip(targets)
            .zip(days)
            .zip(predictions)
            .map(|(((input, target), weather), predicted)| PredictionResult {
                date: input.date,
                day: input.day.clone(),
                target_production: target,
                predicted_consumption: predicted,
                weather: weather.clone(),
                efficiency: efficiency_percent(target, predicted),
            })
            .collect();

        info!(
            days = results.len(),
            predictor = self.predictor.name(),
            weather = self.weather.name(),
            "predicted daily consumption"
        );
        Ok(results)
    }
}
