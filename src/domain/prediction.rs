use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::round_half_up;
use super::weather::DailyWeather;

/// Predicted consumption for one input day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub date: NaiveDate,
    pub day: String,
    pub target_production: f64,
    pub predicted_consumption: f64,
    pub weather: DailyWeather,
    /// Target production as a percentage of predicted consumption
    pub efficiency: f64,
}

/// `round(target / predicted * 100)`, or `0` when nothing is predicted.
pub fn efficiency_percent(target_production: f64, predicted_consumption: f64) -> f64 {
    if predicted_consumption <= 0.0 {
        return 0.0;
    }
    round_half_up(target_production / predicted_consumption * 100.0)
}

/// Totals shown alongside a batch of predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionSummary {
    pub days: usize,
    pub total_target_production: f64,
    pub total_predicted_consumption: f64,
    /// Mean of the daily efficiencies, rounded
    pub average_efficiency: f64,
    /// Sum of `target - predicted`; negative when consumption outruns production
    pub balance: f64,
}

impl PredictionSummary {
    pub fn from_results(results: &[PredictionResult]) -> Self {
        let days = results.len();
        let total_target_production: f64 = results.iter().map(|r| r.target_production).sum();
        let total_predicted_consumption: f64 =
            results.iter().map(|r| r.predicted_consumption).sum();
        let average_efficiency = if days == 0 {
            0.0
        } else {
            round_half_up(results.iter().map(|r| r.efficiency).sum::<f64>() / days as f64)
        };

        Self {
            days,
            total_target_production,
            total_predicted_consumption,
            average_efficiency,
            balance: total_target_production - total_predicted_consumption,
        }
    }

    pub fn is_surplus(&self) -> bool {
        self.balance >= 0.0
    }
}
