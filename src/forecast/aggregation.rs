//! Hourly-to-daily weather reduction.

use chrono::NaiveDate;
use std::collections::HashMap;

use super::ForecastError;
use crate::domain::{day_label, round_half_up, DailyWeather, HourlyObservation};

#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn rounded(&self) -> Option<i32> {
        (self.count > 0).then(|| round_half_up(self.sum / self.count as f64) as i32)
    }
}

#[derive(Debug, Clone, Copy)]
struct DayAccumulator {
    date: NaiveDate,
    temperature: Mean,
    humidity: Mean,
    wind_speed: Mean,
    cloud_cover: Mean,
}

impl DayAccumulator {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            temperature: Mean::default(),
            humidity: Mean::default(),
            wind_speed: Mean::default(),
            cloud_cover: Mean::default(),
        }
    }

    fn push(&mut self, obs: &HourlyObservation) {
        self.temperature.push(obs.temperature);
        self.humidity.push(obs.humidity);
        self.wind_speed.push(obs.wind_speed);
        self.cloud_cover.push(obs.cloud_cover);
    }

    fn finish(self, index: usize) -> Result<DailyWeather, ForecastError> {
        let missing = |quantity: &str| {
            ForecastError::WeatherFetch(format!("no {quantity} samples for {}", self.date))
        };
        Ok(DailyWeather {
            date: self.date,
            day: day_label(index),
            temperature: self.temperature.rounded().ok_or_else(|| missing("temperature"))?,
            humidity: self.humidity.rounded().ok_or_else(|| missing("humidity"))?,
            wind_speed: self.wind_speed.rounded().ok_or_else(|| missing("wind speed"))?,
            cloud_cover: self.cloud_cover.rounded().ok_or_else(|| missing("cloud cover"))?,
        })
    }
}

/// Average hourly observations into one record per calendar date.
///
/// Dates come from the timestamps as given (already local to the forecast
/// timezone). Records are ordered by first appearance and labelled
/// `day 1`, `day 2`, ... in that order. Missing samples are skipped; a date
/// left without any sample of some quantity is an error.
pub fn aggregate_daily(observations: &[HourlyObservation]) -> Result<Vec<DailyWeather>, ForecastError> {
    let mut order: Vec<DayAccumulator> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for obs in observations {
        let date = obs.time.date();
        let slot = *index.entry(date).or_insert_with(|| {
            order.push(DayAccumulator::new(date));
            order.len() - 1
        });
        order[slot].push(obs);
    }

    order
        .into_iter()
        .enumerate()
        .map(|(i, day)| day.finish(i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
    }

    fn obs(time: &str, t: f64, h: f64, w: f64, c: f64) -> HourlyObservation {
        HourlyObservation {
            time: at(time),
            temperature: Some(t),
            humidity: Some(h),
            wind_speed: Some(w),
            cloud_cover: Some(c),
        }
    }

    fn full_day(date: &str, t: f64) -> Vec<HourlyObservation> {
        (0..24)
            .map(|h| obs(&format!("{date}T{h:02}:00"), t, 60.0, 8.0, 50.0))
            .collect()
    }

    #[test]
    fn test_constant_day_aggregates_exactly() {
        let daily = aggregate_daily(&full_day("2024-05-07", 10.0)).unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].temperature, 10);
        assert_eq!(daily[0].humidity, 60);
        assert_eq!(daily[0].date, NaiveDate::from_ymd_opt(2024, 5, 7).unwrap());
        assert_eq!(daily[0].day, "day 1");
    }

    #[test]
    fn test_means_are_rounded_half_up() {
        let hours = vec![
            obs("2024-05-07T00:00", 10.0, 50.0, 3.0, 0.0),
            obs("2024-05-07T01:00", 11.0, 51.0, 4.0, 1.0),
            obs("2024-05-07T02:00", -3.0, 52.0, 5.0, 2.0),
            obs("2024-05-07T03:00", -4.0, 52.0, 5.2, 2.0),
        ];
        // temperature mean 3.5, humidity 51.25, wind 4.3, cloud 1.25
        let daily = aggregate_daily(&hours).unwrap();
        assert_eq!(daily[0].temperature, 4);
        assert_eq!(daily[0].humidity, 51);
        assert_eq!(daily[0].wind_speed, 4);
        assert_eq!(daily[0].cloud_cover, 1);
    }

    #[test]
    fn test_negative_half_rounds_toward_positive() {
        let hours = vec![
            obs("2024-01-07T00:00", -2.0, 50.0, 3.0, 0.0),
            obs("2024-01-07T01:00", -3.0, 50.0, 3.0, 0.0),
        ];
        assert_eq!(aggregate_daily(&hours).unwrap()[0].temperature, -2);
    }

    #[test]
    fn test_days_keep_first_appearance_order() {
        let mut hours = full_day("2024-05-08", 20.0);
        hours.extend(full_day("2024-05-07", 12.0));
        hours.push(obs("2024-05-08T23:30", 20.0, 60.0, 8.0, 50.0));

        let daily = aggregate_daily(&hours).unwrap();
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, NaiveDate::from_ymd_opt(2024, 5, 8).unwrap());
        assert_eq!(daily[0].day, "day 1");
        assert_eq!(daily[0].temperature, 20);
        assert_eq!(daily[1].day, "day 2");
        assert_eq!(daily[1].temperature, 12);
    }

    #[test]
    fn test_missing_samples_are_skipped() {
        let mut hours = full_day("2024-05-07", 10.0);
        hours[0].temperature = None;
        hours[1].temperature = None;
        assert_eq!(aggregate_daily(&hours).unwrap()[0].temperature, 10);
    }

    #[test]
    fn test_day_without_samples_is_an_error() {
        let mut hours = full_day("2024-05-07", 10.0);
        for h in hours.iter_mut() {
            h.cloud_cover = None;
        }
        let err = aggregate_daily(&hours).unwrap_err();
        assert!(matches!(err, ForecastError::WeatherFetch(msg) if msg.contains("cloud cover")));
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_daily(&[]).unwrap().is_empty());
    }
}
