use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Weather aggregated to one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyWeather {
    pub date: NaiveDate,
    pub day: String,
    /// Degrees Celsius
    pub temperature: i32,
    /// Relative humidity, percent
    pub humidity: i32,
    /// Metres per second
    pub wind_speed: i32,
    /// Percent of sky covered
    pub cloud_cover: i32,
}

/// One hourly sample as delivered by the forecast source.
///
/// The timestamp carries no offset: it is local to the timezone the
/// forecast was requested in. Missing measurements stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyObservation {
    pub time: NaiveDateTime,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub cloud_cover: Option<f64>,
}

/// Geographic location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_weather_serializes_camel_case() {
        let weather = DailyWeather {
            date: NaiveDate::from_ymd_opt(2024, 5, 7).unwrap(),
            day: "day 1".to_string(),
            temperature: 22,
            humidity: 60,
            wind_speed: 8,
            cloud_cover: 50,
        };

        let json = serde_json::to_value(&weather).unwrap();
        assert_eq!(json["date"], "2024-05-07");
        assert_eq!(json["windSpeed"], 8);
        assert_eq!(json["cloudCover"], 50);
    }
}
