//! Open-Meteo client against a local mock server

use chrono::NaiveDate;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use energy_forecaster::domain::{DateRange, GeoLocation};
use energy_forecaster::forecast::{ForecastError, OpenMeteoClient, WeatherProvider};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
}

fn seoul() -> GeoLocation {
    GeoLocation::new(37.5665, 126.978)
}

fn client(server: &MockServer) -> OpenMeteoClient {
    OpenMeteoClient::new(server.uri(), "Asia/Seoul", Duration::from_secs(5)).unwrap()
}

/// Hourly payload where every hour of a day carries the same values.
fn hourly_payload(days: &[(u32, f64, f64, f64, f64)]) -> Value {
    let mut time = Vec::new();
    let (mut temp, mut hum, mut wind, mut cloud) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
    for &(day, t, h, w, c) in days {
        for hour in 0..24 {
            time.push(format!("2024-05-{day:02}T{hour:02}:00"));
            temp.push(t);
            hum.push(h);
            wind.push(w);
            cloud.push(c);
        }
    }
    json!({
        "latitude": 37.55,
        "longitude": 127.0,
        "timezone": "Asia/Seoul",
        "hourly": {
            "time": time,
            "temperature_2m": temp,
            "relative_humidity_2m": hum,
            "wind_speed_10m": wind,
            "cloud_cover": cloud,
        }
    })
}

#[tokio::test]
async fn constant_day_aggregates_to_its_value() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(hourly_payload(&[(7, 10.0, 55.0, 3.2, 80.0)])),
        )
        .mount(&server)
        .await;

    let range = DateRange::new(date(7), date(7)).unwrap();
    let daily = client(&server).daily_forecast(range, seoul()).await.unwrap();

    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].date, date(7));
    assert_eq!(daily[0].day, "day 1");
    assert_eq!(daily[0].temperature, 10);
    assert_eq!(daily[0].humidity, 55);
    assert_eq!(daily[0].wind_speed, 3);
    assert_eq!(daily[0].cloud_cover, 80);
}

#[tokio::test]
async fn sends_range_timezone_and_units() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("start_date", "2024-05-07"))
        .and(query_param("end_date", "2024-05-08"))
        .and(query_param("timezone", "Asia/Seoul"))
        .and(query_param("wind_speed_unit", "ms"))
        .and(query_param(
            "hourly",
            "temperature_2m,relative_humidity_2m,wind_speed_10m,cloud_cover",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(hourly_payload(&[
            (7, 20.0, 60.0, 8.0, 50.0),
            (8, 26.0, 75.0, 13.0, 20.0),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let range = DateRange::new(date(7), date(8)).unwrap();
    let daily = client(&server).daily_forecast(range, seoul()).await.unwrap();

    assert_eq!(daily.len(), 2);
    assert_eq!(daily[1].day, "day 2");
    assert_eq!(daily[1].temperature, 26);
    assert_eq!(daily[1].wind_speed, 13);
}

#[tokio::test]
async fn hours_outside_the_range_are_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hourly_payload(&[
            (6, 0.0, 0.0, 0.0, 0.0),
            (7, 21.0, 65.0, 6.0, 40.0),
        ])))
        .mount(&server)
        .await;

    let range = DateRange::new(date(7), date(7)).unwrap();
    let daily = client(&server).daily_forecast(range, seoul()).await.unwrap();

    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].date, date(7));
    assert_eq!(daily[0].temperature, 21);
}

#[tokio::test]
async fn server_error_is_a_weather_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let range = DateRange::new(date(7), date(9)).unwrap();
    let err = client(&server).daily_forecast(range, seoul()).await.unwrap_err();
    assert!(matches!(err, ForecastError::WeatherFetch(ref m) if m.contains("500")));
}

#[tokio::test]
async fn malformed_body_is_a_weather_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hourly": { "time": [] } })))
        .mount(&server)
        .await;

    let range = DateRange::new(date(7), date(7)).unwrap();
    let err = client(&server).daily_forecast(range, seoul()).await.unwrap_err();
    assert!(matches!(err, ForecastError::WeatherFetch(_)));
}

#[tokio::test]
async fn mismatched_array_lengths_are_rejected() {
    let server = MockServer::start().await;
    let mut payload = hourly_payload(&[(7, 20.0, 60.0, 8.0, 50.0)]);
    payload["hourly"]["cloud_cover"] = json!([50.0]);
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .mount(&server)
        .await;

    let range = DateRange::new(date(7), date(7)).unwrap();
    let err = client(&server).daily_forecast(range, seoul()).await.unwrap_err();
    assert!(matches!(err, ForecastError::WeatherFetch(ref m) if m.contains("length")));
}

#[tokio::test]
async fn null_samples_are_skipped() {
    let server = MockServer::start().await;
    let mut payload = hourly_payload(&[(7, 20.0, 60.0, 8.0, 50.0)]);
    payload["hourly"]["temperature_2m"][0] = Value::Null;
    payload["hourly"]["temperature_2m"][1] = Value::Null;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .mount(&server)
        .await;

    let range = DateRange::new(date(7), date(7)).unwrap();
    let daily = client(&server).daily_forecast(range, seoul()).await.unwrap();
    assert_eq!(daily[0].temperature, 20);
}

#[tokio::test]
async fn unreachable_host_is_a_weather_fetch_error() {
    // nothing listens on the discard port
    let client =
        OpenMeteoClient::new("http://127.0.0.1:9", "Asia/Seoul", Duration::from_secs(2)).unwrap();
    let range = DateRange::new(date(7), date(7)).unwrap();
    let err = client.daily_forecast(range, seoul()).await.unwrap_err();
    assert!(matches!(err, ForecastError::WeatherFetch(_)));
}
