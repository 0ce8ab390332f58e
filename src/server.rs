//! HTTP server setup and lifecycle.
//!
//! Configures the axum router with:
//! - `/hello`, `/sum` and `/subtract`, each wrapped in a request span
//! - A plain 404 for every other path (not counted, not traced)
//! - Access logging and graceful shutdown

use axum::http::StatusCode;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::ServerError;
use crate::handlers;
use crate::middleware::{traced, Instrumentation};

/// Build the application router.
pub fn router(instrumentation: &Instrumentation) -> Router {
    Router::new()
        .route("/hello", traced(instrumentation, "helloHandler", handlers::hello))
        .route("/sum", traced(instrumentation, "sumHandler", handlers::sum))
        .route(
            "/subtract",
            traced(instrumentation, "subtractHandler", handlers::subtract),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "404 page not found")
}

/// Bind the listen address from `config`.
pub async fn bind(config: &Config) -> Result<TcpListener, ServerError> {
    let raw = format!("{}:{}", config.host, config.port);
    let addr: SocketAddr = raw
        .parse()
        .map_err(|source| ServerError::InvalidAddress { addr: raw, source })?;

    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serve the router on `listener` until `shutdown_rx` fires.
///
/// In-flight requests are allowed to finish before this returns.
pub async fn run_server(
    listener: TcpListener,
    instrumentation: Instrumentation,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<(), ServerError> {
    let app = router(&instrumentation);

    if let Ok(addr) = listener.local_addr() {
        tracing::info!(address = %addr, "Server is listening");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            // Wait for shutdown signal
            let _ = shutdown_rx.changed().await;
            tracing::info!("Shutdown signal received, stopping server");
        })
        .await
        .map_err(ServerError::Serve)?;

    tracing::info!("Server stopped");
    Ok(())
}
