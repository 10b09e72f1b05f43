use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};

use super::{request_rng, FeatureRow, ForecastError, RandomSource};
use crate::domain::round_half_up;

/// Turns feature rows into predicted consumption, one value per row, in row order.
#[async_trait]
pub trait ConsumptionPredictor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, ForecastError>;
}

const BASE_RATIO: f64 = 0.85;

const JITTER_MIN: f64 = 0.90;
const JITTER_SPAN: f64 = 0.20;

/// Running value after the temperature adjustment.
///
/// Both thresholds are checked independently against the running value.
pub fn apply_temperature_factor(consumption: f64, temperature: f64) -> f64 {
    let mut value = consumption;
    if temperature < 18.0 || temperature > 25.0 {
        value *= 1.20;
    }
    if (20.0..=23.0).contains(&temperature) {
        value *= 0.95;
    }
    value
}

pub fn apply_humidity_factor(consumption: f64, humidity: f64) -> f64 {
    let mut value = consumption;
    if humidity > 70.0 {
        value *= 1.15;
    }
    if humidity < 50.0 {
        value *= 0.98;
    }
    value
}

pub fn apply_wind_factor(consumption: f64, wind_speed: f64) -> f64 {
    let mut value = consumption;
    if wind_speed > 12.0 {
        value *= 0.92;
    }
    if wind_speed < 5.0 {
        value *= 1.03;
    }
    value
}

pub fn apply_cloud_factor(consumption: f64, cloud_cover: f64) -> f64 {
    let mut value = consumption;
    if cloud_cover > 70.0 {
        value *= 1.08;
    }
    if cloud_cover < 30.0 {
        value *= 0.95;
    }
    value
}

/// 0.75 on weekends, 1.10 on Monday and Friday, 1.0 otherwise.
pub fn weekday_multiplier(date: NaiveDate) -> f64 {
    match date.weekday() {
        Weekday::Sat | Weekday::Sun => 0.75,
        Weekday::Mon | Weekday::Fri => 1.10,
        _ => 1.0,
    }
}

/// Map a uniform draw in `[0, 1)` onto the `[0.90, 1.10)` jitter band.
pub fn jitter_factor(u: f64) -> f64 {
    JITTER_MIN + u * JITTER_SPAN
}

/// Weather- and weekday-adjusted consumption before jitter and rounding.
pub fn adjusted_consumption(row: &FeatureRow) -> f64 {
    let mut consumption = row.target_production * BASE_RATIO;
    consumption = apply_temperature_factor(consumption, row.temperature);
    consumption = apply_humidity_factor(consumption, row.humidity);
    consumption = apply_wind_factor(consumption, row.wind_speed);
    consumption = apply_cloud_factor(consumption, row.cloud_cover);
    consumption * weekday_multiplier(row.date)
}

/// Final prediction for one row: adjusted consumption times `jitter`, rounded.
pub fn predict_consumption(row: &FeatureRow, jitter: f64) -> f64 {
    round_half_up(adjusted_consumption(row) * jitter)
}

/// How the heuristic perturbs its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jitter {
    Disabled,
    /// Fresh entropy for every request
    Random,
    /// Same sequence for every request
    Seeded(u64),
}

impl Jitter {
    pub fn from_settings(enabled: bool, seed: Option<u64>) -> Self {
        match (enabled, seed) {
            (false, _) => Jitter::Disabled,
            (true, Some(seed)) => Jitter::Seeded(seed),
            (true, None) => Jitter::Random,
        }
    }
}

/// Built-in multiplicative heuristic.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicPredictor {
    jitter: Jitter,
}

impl HeuristicPredictor {
    pub fn new(jitter: Jitter) -> Self {
        Self { jitter }
    }

    /// Predict with an explicit random source. `None` disables jitter.
    pub fn predict_with(&self, rows: &[FeatureRow], mut source: Option<&mut dyn RandomSource>) -> Vec<f64> {
        rows.iter()
            .map(|row| {
                let jitter = match source.as_mut() {
                    Some(s) => jitter_factor(s.next_float()),
                    None => 1.0,
                };
                predict_consumption(row, jitter)
            })
            .collect()
    }
}

#[async_trait]
impl ConsumptionPredictor for HeuristicPredictor {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, ForecastError> {
        let predictions = match self.jitter {
            Jitter::Disabled => self.predict_with(rows, None),
            Jitter::Random => self.predict_with(rows, Some(&mut request_rng(None))),
            Jitter::Seeded(seed) => self.predict_with(rows, Some(&mut request_rng(Some(seed)))),
        };
        Ok(predictions)
    }
}
