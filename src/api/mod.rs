pub mod error;
pub mod health;
pub mod inputs;
pub mod predict;
pub mod weather;

use axum::{
    error_handling::HandleErrorLayer,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use chrono_tz::Tz;
use std::{sync::Arc, time::Duration};
use tower::{timeout::TimeoutLayer, BoxError, ServiceBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::{config::Config, forecast::PredictionEngine};
use error::ApiError;

/// State shared by all handlers. Cloning is cheap; nothing in it is mutable.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PredictionEngine>,
    /// Zone used to decide what "today" is
    pub timezone: Tz,
}

impl AppState {
    pub fn new(engine: PredictionEngine, timezone: Tz) -> Self {
        Self {
            engine: Arc::new(engine),
            timezone,
        }
    }
}

pub fn router(state: AppState, cfg: &Config) -> Router {
    let mut router = Router::new()
        .route("/api/predict", post(predict::predict))
        .route("/api/predict/summary", post(predict::predict_summary))
        .route("/api/weather", get(weather::get_daily_weather))
        .route("/api/inputs/template", get(inputs::get_template))
        .route("/api/inputs/edit", post(inputs::edit_inputs))
        .route("/healthz", get(health::healthz))
        .with_state(state);

    if cfg.server.enable_cors {
        match cfg.server.cors_origin.parse::<HeaderValue>() {
            Ok(origin) => {
                let cors = CorsLayer::new()
                    .allow_origin(origin)
                    .allow_methods([Method::GET, Method::POST])
                    .allow_headers([header::CONTENT_TYPE]);
                router = router.layer(cors);
            }
            Err(_) => warn!(origin = %cfg.server.cors_origin, "invalid CORS origin, CORS disabled"),
        }
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(axum::extract::DefaultBodyLimit::max(64 * 1024))
                .layer(HandleErrorLayer::new(handle_layer_error))
                .layer(TimeoutLayer::new(Duration::from_secs(cfg.server.request_timeout_secs))),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(crate::telemetry::request_span::<axum::body::Body>),
        )
}

async fn handle_layer_error(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::InternalError(err.to_string())
    }
}
