//! Weather forecast sources (Open-Meteo and a synthetic generator)
//!
//! Both sources produce one [`DailyWeather`] per calendar day of the
//! requested range. Open-Meteo hourly data is reduced with
//! [`aggregate_daily`]; the synthetic source draws each day directly.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

use super::{aggregate_daily, request_rng, ForecastError, RandomSource};
use crate::domain::{day_label, round_half_up, DailyWeather, DateRange, GeoLocation, HourlyObservation};

pub const DEFAULT_OPEN_METEO_URL: &str = "https://api.open-meteo.com";
pub const DEFAULT_TIMEZONE: &str = "Asia/Seoul";

const HOURLY_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m,cloud_cover";

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn daily_forecast(
        &self,
        range: DateRange,
        location: GeoLocation,
    ) -> Result<Vec<DailyWeather>, ForecastError>;
}

// ============================================================================
// Open-Meteo
// ============================================================================

/// Open-Meteo forecast API client
#[derive(Clone)]
pub struct OpenMeteoClient {
    client: reqwest::Client,
    base_url: String,
    timezone: String,
}

impl OpenMeteoClient {
    pub fn new(base_url: impl Into<String>, timezone: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("energy-forecaster/", env!("CARGO_PKG_VERSION"))),
        );
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            timezone: timezone.into(),
        })
    }

    fn forecast_url(&self) -> String {
        format!("{}/v1/forecast", self.base_url.trim_end_matches('/'))
    }

    /// Fetch raw hourly samples for the range, local to the configured timezone.
    pub async fn fetch_hourly(
        &self,
        range: DateRange,
        location: GeoLocation,
    ) -> Result<Vec<HourlyObservation>, ForecastError> {
        let url = self.forecast_url();
        let start = range.start.format("%Y-%m-%d").to_string();
        let end = range.end.format("%Y-%m-%d").to_string();

        debug!(%url, %start, %end, latitude = location.latitude, longitude = location.longitude,
            "fetching weather forecast from Open-Meteo");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("start_date", start),
                ("end_date", end),
                ("timezone", self.timezone.clone()),
                ("wind_speed_unit", "ms".to_string()),
            ])
            .send()
            .await
            .map_err(|e| ForecastError::WeatherFetch(format!("request to Open-Meteo failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ForecastError::WeatherFetch(format!("reading Open-Meteo response failed: {e}")))?;
        if !status.is_success() {
            error!(%status, "Open-Meteo returned error status");
            return Err(ForecastError::WeatherFetch(format!("Open-Meteo API error: HTTP {status}")));
        }

        let parsed: OpenMeteoResponse = serde_json::from_str(&body)
            .map_err(|e| ForecastError::WeatherFetch(format!("malformed Open-Meteo response: {e}")))?;

        let observations = parsed.hourly.into_observations()?;
        Ok(observations
            .into_iter()
            .filter(|o| range.contains(o.time.date()))
            .collect())
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    fn name(&self) -> &'static str {
        "open_meteo"
    }

    async fn daily_forecast(
        &self,
        range: DateRange,
        location: GeoLocation,
    ) -> Result<Vec<DailyWeather>, ForecastError> {
        let hourly = self.fetch_hourly(range, location).await?;
        let daily = aggregate_daily(&hourly)?;
        info!(
            days = daily.len(),
            hours = hourly.len(),
            "fetched weather forecast for ({}, {})",
            location.latitude,
            location.longitude
        );
        Ok(daily)
    }
}

// Open-Meteo response structures
#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    hourly: OpenMeteoHourly,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoHourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    relative_humidity_2m: Vec<Option<f64>>,
    wind_speed_10m: Vec<Option<f64>>,
    cloud_cover: Vec<Option<f64>>,
}

impl OpenMeteoHourly {
    fn into_observations(self) -> Result<Vec<HourlyObservation>, ForecastError> {
        let n = self.time.len();
        let lengths = [
            self.temperature_2m.len(),
            self.relative_humidity_2m.len(),
            self.wind_speed_10m.len(),
            self.cloud_cover.len(),
        ];
        if lengths.iter().any(|&len| len != n) {
            return Err(ForecastError::WeatherFetch(format!(
                "hourly arrays differ in length: time={n}, values={lengths:?}"
            )));
        }

        self.time
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                Ok(HourlyObservation {
                    time: parse_local_time(raw)?,
                    temperature: self.temperature_2m[i],
                    humidity: self.relative_humidity_2m[i],
                    wind_speed: self.wind_speed_10m[i],
                    cloud_cover: self.cloud_cover[i],
                })
            })
            .collect()
    }
}

/// Open-Meteo emits `2024-05-07T13:00`; accept seconds as well.
fn parse_local_time(raw: &str) -> Result<NaiveDateTime, ForecastError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| raw.parse::<NaiveDateTime>())
        .map_err(|_| ForecastError::WeatherFetch(format!("invalid hourly timestamp {raw:?}")))
}

// ============================================================================
// Synthetic
// ============================================================================

/// Random but plausible weather, for running without a forecast source.
#[derive(Debug, Clone, Default)]
pub struct SyntheticWeather {
    seed: Option<u64>,
}

impl SyntheticWeather {
    pub const TEMPERATURE: (f64, f64) = (15.0, 30.0);
    pub const HUMIDITY: (f64, f64) = (40.0, 80.0);
    pub const WIND_SPEED: (f64, f64) = (5.0, 20.0);
    pub const CLOUD_COVER: (f64, f64) = (0.0, 100.0);

    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }

    /// Generate one record per day of `range` from `source`.
    pub fn generate(range: DateRange, source: &mut dyn RandomSource) -> Vec<DailyWeather> {
        let mut draw = |(lo, hi): (f64, f64)| round_half_up(lo + source.next_float() * (hi - lo)) as i32;
        range
            .days()
            .enumerate()
            .map(|(i, date)| DailyWeather {
                date,
                day: day_label(i),
                temperature: draw(Self::TEMPERATURE),
                humidity: draw(Self::HUMIDITY),
                wind_speed: draw(Self::WIND_SPEED),
                cloud_cover: draw(Self::CLOUD_COVER),
            })
            .collect()
    }
}

#[async_trait]
impl WeatherProvider for SyntheticWeather {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn daily_forecast(
        &self,
        range: DateRange,
        _location: GeoLocation,
    ) -> Result<Vec<DailyWeather>, ForecastError> {
        let mut rng = request_rng(self.seed);
        Ok(Self::generate(range, &mut rng))
    }
}
