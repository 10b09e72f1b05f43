use anyhow::{bail, Result};
use chrono_tz::Tz;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::net::SocketAddr;

use crate::forecast::{FeatureName, DEFAULT_FEATURES, DEFAULT_OPEN_METEO_URL, DEFAULT_TIMEZONE};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub weather: WeatherConfig,
    pub predictor: PredictorConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub enable_cors: bool,
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            enable_cors: true,
            cors_origin: "http://localhost:3000".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WeatherSource {
    OpenMeteo,
    Synthetic,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub source: WeatherSource,
    pub base_url: String,
    /// IANA zone the forecast is requested in; daily grouping follows it
    pub timezone: String,
    pub http_timeout_secs: u64,
    pub default_latitude: f64,
    pub default_longitude: f64,
    /// Seed for the synthetic source
    pub seed: Option<u64>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            source: WeatherSource::OpenMeteo,
            base_url: DEFAULT_OPEN_METEO_URL.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            http_timeout_secs: 10,
            default_latitude: 37.5665,
            default_longitude: 126.9780,
            seed: None,
        }
    }
}

impl WeatherConfig {
    pub fn tz(&self) -> Result<Tz> {
        match self.timezone.parse::<Tz>() {
            Ok(tz) => Ok(tz),
            Err(e) => bail!("weather.timezone {:?} is not a valid IANA zone: {e}", self.timezone),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PredictorBackend {
    Heuristic,
    External,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    pub backend: PredictorBackend,
    pub jitter: bool,
    pub seed: Option<u64>,
    pub external: Option<ExternalPredictorConfig>,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            backend: PredictorBackend::Heuristic,
            jitter: true,
            seed: None,
            external: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalPredictorConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_features")]
    pub features: Vec<FeatureName>,
    pub working_dir: Option<String>,
}

fn default_features() -> Vec<FeatureName> {
    DEFAULT_FEATURES.to_vec()
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file("config/default.toml"))
                .merge(Env::prefixed("ENERGY__").split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        Ok(figment.extract()?)
    }

    /// Reject settings that would only fail once a request arrives.
    pub fn validate(&self) -> Result<()> {
        self.weather.tz()?;

        if !(-90.0..=90.0).contains(&self.weather.default_latitude) {
            bail!("weather.default_latitude must be within [-90, 90]");
        }
        if !(-180.0..=180.0).contains(&self.weather.default_longitude) {
            bail!("weather.default_longitude must be within [-180, 180]");
        }
        if self.server.request_timeout_secs == 0 {
            bail!("server.request_timeout_secs must be positive");
        }

        if self.predictor.backend == PredictorBackend::External {
            match &self.predictor.external {
                None => bail!("predictor.backend is \"external\" but [predictor.external] is missing"),
                Some(ext) if ext.program.trim().is_empty() => {
                    bail!("predictor.external.program must not be empty")
                }
                Some(ext) if ext.features.is_empty() => {
                    bail!("predictor.external.features must list at least one feature")
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
