use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use super::types::{day_label, is_weekend, DateRange, MAX_FORECAST_DAYS};

/// Target production entered for one day.
///
/// `target_production` is kept as the text the user typed; it is only
/// parsed when a prediction is requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyInput {
    pub date: NaiveDate,
    pub day: String,
    #[serde(default)]
    pub target_production: String,
}

/// Rejected target production value
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("target production for {date} is empty")]
    Empty { date: NaiveDate },
    #[error("target production for {date} is not a number: {value:?}")]
    NotANumber { date: NaiveDate, value: String },
    #[error("target production for {date} must be a finite non-negative number, got {value}")]
    OutOfRange { date: NaiveDate, value: f64 },
}

impl DailyInput {
    pub fn new(date: NaiveDate, day: impl Into<String>, target_production: impl Into<String>) -> Self {
        Self {
            date,
            day: day.into(),
            target_production: target_production.into(),
        }
    }

    /// Parse the target production as a finite, non-negative number.
    pub fn target(&self) -> Result<f64, InputError> {
        let raw = self.target_production.trim();
        if raw.is_empty() {
            return Err(InputError::Empty { date: self.date });
        }
        let value: f64 = raw.parse().map_err(|_| InputError::NotANumber {
            date: self.date,
            value: raw.to_string(),
        })?;
        if !value.is_finite() || value < 0.0 {
            return Err(InputError::OutOfRange {
                date: self.date,
                value,
            });
        }
        Ok(value)
    }
}

/// Parse every target of a batch, stopping at the first invalid entry.
pub fn parse_targets(inputs: &[DailyInput]) -> Result<Vec<f64>, InputError> {
    inputs.iter().map(DailyInput::target).collect()
}

/// Body of a prediction request.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    #[validate(length(min = 1, max = 16, message = "between 1 and 16 days are required"))]
    pub inputs: Vec<DailyInput>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

impl PredictRequest {
    pub fn new(inputs: Vec<DailyInput>) -> Self {
        Self {
            inputs,
            latitude: None,
            longitude: None,
        }
    }

    /// Date range spanned by the inputs, `None` for an empty batch.
    pub fn date_range(&self) -> Option<DateRange> {
        DateRange::covering(self.inputs.iter().map(|i| i.date))
    }
}

// ============================================================================
// Input helpers
// ============================================================================

/// Preset shapes for filling a week of targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum InputPattern {
    /// 800 on weekends, 1200 on weekdays
    WeekdayWeekend,
    /// 1000, 1100, 1200, ...
    Increasing,
    /// 1600, 1500, 1400, ...
    Decreasing,
}

const PATTERN_BASE: f64 = 1000.0;
const PATTERN_STEP: f64 = 100.0;
const WEEKEND_TARGET: &str = "800";
const WEEKDAY_TARGET: &str = "1200";

/// Empty inputs for the `days` days following `today`.
///
/// `None` when the last day would fall past the end of the calendar.
pub fn initial_inputs(today: NaiveDate, days: usize) -> Option<Vec<DailyInput>> {
    let days = days.min(MAX_FORECAST_DAYS);
    (0..days)
        .map(|i| {
            let date = today.checked_add_days(Days::new(i as u64 + 1))?;
            Some(DailyInput::new(date, day_label(i), ""))
        })
        .collect()
}

/// Overwrite every target according to `pattern`.
pub fn apply_pattern(inputs: &[DailyInput], pattern: InputPattern) -> Vec<DailyInput> {
    inputs
        .iter()
        .enumerate()
        .map(|(i, input)| {
            let target = match pattern {
                InputPattern::WeekdayWeekend => {
                    if is_weekend(input.date) {
                        WEEKEND_TARGET.to_string()
                    } else {
                        WEEKDAY_TARGET.to_string()
                    }
                }
                InputPattern::Increasing => format_target(PATTERN_BASE + i as f64 * PATTERN_STEP),
                InputPattern::Decreasing => {
                    format_target(PATTERN_BASE + 6.0 * PATTERN_STEP - i as f64 * PATTERN_STEP)
                }
            };
            DailyInput {
                target_production: target,
                ..input.clone()
            }
        })
        .collect()
}

/// Set the same target on every day. A blank value leaves inputs untouched.
pub fn apply_bulk_value(inputs: &[DailyInput], value: &str) -> Vec<DailyInput> {
    if value.trim().is_empty() {
        return inputs.to_vec();
    }
    inputs
        .iter()
        .map(|input| DailyInput {
            target_production: value.to_string(),
            ..input.clone()
        })
        .collect()
}

/// Nudge one day's target by `delta`, clamping at zero.
///
/// A blank or non-numeric target counts as zero.
pub fn adjust_value(inputs: &[DailyInput], index: usize, delta: f64) -> Vec<DailyInput> {
    inputs
        .iter()
        .enumerate()
        .map(|(i, input)| {
            if i != index {
                return input.clone();
            }
            let current = input.target_production.trim().parse::<f64>().unwrap_or(0.0);
            let current = if current.is_finite() { current } else { 0.0 };
            DailyInput {
                target_production: format_target((current + delta).max(0.0)),
                ..input.clone()
            }
        })
        .collect()
}

/// One edit to a batch of inputs, as sent by the input form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum InputEdit {
    Pattern { pattern: InputPattern },
    Bulk { value: String },
    Adjust { index: usize, delta: f64 },
}

impl InputEdit {
    pub fn apply(&self, inputs: &[DailyInput]) -> Vec<DailyInput> {
        match self {
            InputEdit::Pattern { pattern } => apply_pattern(inputs, *pattern),
            InputEdit::Bulk { value } => apply_bulk_value(inputs, value),
            InputEdit::Adjust { index, delta } => adjust_value(inputs, *index, *delta),
        }
    }
}

/// Body of an input edit request.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct EditRequest {
    #[validate(length(min = 1, max = 16, message = "between 1 and 16 days are required"))]
    pub inputs: Vec<DailyInput>,
    pub edit: InputEdit,
}

fn format_target(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
