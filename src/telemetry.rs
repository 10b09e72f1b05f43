use tokio::signal;
use tracing::{info, Span};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const SERVICE_NAME: &str = env!("CARGO_PKG_NAME");

const DEFAULT_LOG_FILTER: &str = "info,hyper=warn,reqwest=warn,tower_http=info";

/// `RUST_LOG` when set and parseable, the quiet default otherwise.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// JSON logs on stdout. Events inside a request carry that request's span fields.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(log_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false),
        )
        .init();

    info!(
        service = SERVICE_NAME,
        version = env!("CARGO_PKG_VERSION"),
        "tracing initialised"
    );
}

/// Root span for one HTTP request.
pub fn request_span<B>(request: &axum::http::Request<B>) -> Span {
    tracing::info_span!(
        "request",
        service = SERVICE_NAME,
        method = %request.method(),
        path = %request.uri().path(),
    )
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! { _ = ctrl_c => {}, _ = terminate => {}, }
    info!(service = SERVICE_NAME, "shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        let filter = EnvFilter::new(DEFAULT_LOG_FILTER);
        assert!(filter.to_string().contains("reqwest=warn"));
    }
}
