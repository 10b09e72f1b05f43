use anyhow::Result;
use energy_forecaster::{api, config, forecast::PredictionEngine, telemetry};
use config::Config;
use telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables win
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::load()?;
    cfg.validate()?;

    let engine = PredictionEngine::from_config(&cfg)?;
    let weather_source = engine.weather_source();
    let predictor = engine.predictor_name();
    let state = api::AppState::new(engine, cfg.weather.tz()?);

    let app = api::router(state, &cfg);

    let addr = cfg.server.socket_addr()?;

    if cfg.server.host == "0.0.0.0" {
        warn!(
            "Server binding to 0.0.0.0 - service will be accessible from network! \
            Bind to 127.0.0.1 unless behind a firewall/reverse proxy."
        );
    }

    info!(
        %addr,
        weather_source,
        predictor,
        timezone = %cfg.weather.timezone,
        "starting Energy Forecaster"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    warn!("shutdown complete");
    Ok(())
}
