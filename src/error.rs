//! Startup error types.
//!
//! Only construction and bind failures are errors here. Export failures
//! against the collector stay inside the OpenTelemetry SDK.

use opentelemetry::metrics::MetricsError;
use opentelemetry::trace::TraceError;
use thiserror::Error;

/// Failure to build one of the telemetry pipelines.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to initialize trace pipeline: {0}")]
    Trace(#[from] TraceError),

    #[error("failed to initialize metric pipeline: {0}")]
    Metrics(#[from] MetricsError),
}

/// Failure to start or run the HTTP listener.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid listen address {addr}: {source}")]
    InvalidAddress {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
