//! Logging bootstrap and per-request logging middleware.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, warn, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` overrides the default `info`
/// filter. A second call leaves the first subscriber in place.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    if installed.is_err() {
        warn!(event = "tracing_init", status = "skipped", reason = "subscriber already set");
    }
}

pub(crate) async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let route = request.uri().path().to_string();
    let started_at = Instant::now();

    let span = tracing::info_span!("http.request", method = %method, route = %route);
    let response = next.run(request).instrument(span).await;

    let status = response.status().as_u16();
    let latency_ms = started_at.elapsed().as_millis() as u64;
    if response.status().is_server_error() {
        warn!(event = "http_response", %method, %route, status, latency_ms);
    } else {
        info!(event = "http_response", %method, %route, status, latency_ms);
    }
    response
}
