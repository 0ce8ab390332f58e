//! Arithmetic HTTP server with OpenTelemetry traces and metrics.
//!
//! # Usage
//!
//! ```bash
//! http-server --port 8080 --otel-endpoint http://localhost:4317
//! ```
//!
//! Environment variables can also be used:
//! - `HTTP_SERVER_PORT`: Port to listen on
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: Collector endpoint for traces and metrics
//! - `OTEL_SERVICE_NAME`: Service name attached to exported telemetry
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)

use otel_http_server::config::Config;
use otel_http_server::observability::logging::init_logging;
use otel_http_server::observability::Telemetry;
use otel_http_server::server::{bind, run_server};
use tokio::sync::watch;

/// Print startup banner with version and configuration.
fn print_banner(config: &Config) {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        r#"
  http-server v{}

  Configuration:
    Address:    {}:{}
    Collector:  {}
    Service:    {}
    Metrics:    every {}s
    Log Level:  {}

  Press Ctrl+C to shutdown gracefully.
"#,
        version,
        config.host,
        config.port,
        config.otel_endpoint,
        config.service_name,
        config.metrics_interval_secs,
        config.log_level
    );
}

/// Resolve once SIGINT or SIGTERM arrives.
async fn wait_for_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {
                        tracing::info!("Received SIGINT (Ctrl+C), initiating shutdown...");
                    }
                    _ = sigterm.recv() => {
                        tracing::info!("Received SIGTERM, initiating shutdown...");
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler, using Ctrl+C only");
                let _ = ctrl_c.await;
                tracing::info!("Received SIGINT (Ctrl+C), initiating shutdown...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = ctrl_c.await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            return;
        }
        tracing::info!("Received Ctrl+C, initiating shutdown...");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration from CLI arguments and environment
    let config = Config::parse_args();

    init_logging(&config.log_level, config.log_format);

    // Telemetry failures are fatal at startup
    let telemetry = Telemetry::init(&config.telemetry()).map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize telemetry");
        e
    })?;

    let listener = match bind(&config).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Could not start server");
            telemetry.shutdown(config.shutdown_timeout()).await;
            return Err(e.into());
        }
    };

    print_banner(&config);

    // Create shutdown signal channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let served = run_server(listener, telemetry.instrumentation(), shutdown_rx).await;
    if let Err(e) = &served {
        tracing::error!(error = %e, "Server terminated with an error");
    }

    // Flush whatever the batch processor and periodic reader still hold
    telemetry.shutdown(config.shutdown_timeout()).await;

    served?;
    tracing::info!("http-server shutdown complete");
    Ok(())
}
