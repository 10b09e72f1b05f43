//! Feature rows handed to consumption predictors
//!
//! One row per input day: the parsed target production joined with the
//! aggregated weather for the same date. External models receive the row as
//! an ordered numeric vector whose layout is configurable.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::DailyWeather;

/// Named numeric fields a feature vector can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum FeatureName {
    TargetProduction,
    Temperature,
    Humidity,
    WindSpeed,
    CloudCover,
}

/// Default layout expected by the bundled regression script.
pub const DEFAULT_FEATURES: [FeatureName; 3] = [
    FeatureName::TargetProduction,
    FeatureName::Temperature,
    FeatureName::Humidity,
];

/// Inputs to a prediction for a single day.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub target_production: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub cloud_cover: f64,
}

impl FeatureRow {
    pub fn new(target_production: f64, weather: &DailyWeather) -> Self {
        Self {
            date: weather.date,
            target_production,
            temperature: f64::from(weather.temperature),
            humidity: f64::from(weather.humidity),
            wind_speed: f64::from(weather.wind_speed),
            cloud_cover: f64::from(weather.cloud_cover),
        }
    }

    pub fn get(&self, feature: FeatureName) -> f64 {
        match feature {
            FeatureName::TargetProduction => self.target_production,
            FeatureName::Temperature => self.temperature,
            FeatureName::Humidity => self.humidity,
            FeatureName::WindSpeed => self.wind_speed,
            FeatureName::CloudCover => self.cloud_cover,
        }
    }

    /// Values in the order given by `layout`.
    pub fn to_vector(&self, layout: &[FeatureName]) -> Vec<f64> {
        layout.iter().map(|f| self.get(*f)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> FeatureRow {
        FeatureRow::new(
            1000.0,
            &DailyWeather {
                date: NaiveDate::from_ymd_opt(2024, 5, 7).unwrap(),
                day: "day 1".to_string(),
                temperature: 22,
                humidity: 60,
                wind_speed: 8,
                cloud_cover: 50,
            },
        )
    }

    #[test]
    fn test_default_layout() {
        assert_eq!(row().to_vector(&DEFAULT_FEATURES), vec![1000.0, 22.0, 60.0]);
    }

    #[test]
    fn test_custom_layout() {
        let layout = [
            FeatureName::Temperature,
            FeatureName::WindSpeed,
            FeatureName::Humidity,
            FeatureName::CloudCover,
            FeatureName::TargetProduction,
        ];
        assert_eq!(row().to_vector(&layout), vec![22.0, 8.0, 60.0, 50.0, 1000.0]);
    }

    #[test]
    fn test_feature_names_are_camel_case() {
        assert_eq!(FeatureName::WindSpeed.to_string(), "windSpeed");
        let parsed: Vec<FeatureName> =
            serde_json::from_str(r#"["targetProduction", "cloudCover"]"#).unwrap();
        assert_eq!(parsed, vec![FeatureName::TargetProduction, FeatureName::CloudCover]);
    }
}
