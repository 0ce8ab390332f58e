//! Configuration parsing for the HTTP server.
//!
//! Supports:
//! - CLI arguments via clap
//! - Environment variable overrides (including the standard `OTEL_*` ones)
//! - Defaults matching a local collector on `localhost:4317`

use clap::{Parser, ValueEnum};
use std::time::Duration;

use crate::observability::TelemetryConfig;

/// Output format for log lines.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable single-line output
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Arithmetic HTTP server with OpenTelemetry traces and metrics.
#[derive(Parser, Debug, Clone)]
#[command(name = "http-server")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Host address to bind to
    #[arg(long, env = "HTTP_SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "HTTP_SERVER_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "HTTP_SERVER_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OpenTelemetry collector endpoint for trace and metric export
    #[arg(
        long,
        env = "OTEL_EXPORTER_OTLP_ENDPOINT",
        default_value = "http://localhost:4317"
    )]
    pub otel_endpoint: String,

    /// Service name attached to every exported span and metric
    #[arg(long, env = "OTEL_SERVICE_NAME", default_value = "http-server")]
    pub service_name: String,

    /// Interval between metric exports, in seconds
    #[arg(long, env = "HTTP_SERVER_METRICS_INTERVAL_SECS", default_value_t = 10)]
    pub metrics_interval_secs: u64,

    /// Upper bound on the telemetry flush at shutdown, in seconds
    #[arg(long, env = "HTTP_SERVER_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,
}

impl Config {
    /// Parse configuration from CLI arguments and environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Telemetry pipeline settings derived from this configuration.
    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig {
            endpoint: self.otel_endpoint.clone(),
            service_name: self.service_name.clone(),
            metrics_interval: Duration::from_secs(self.metrics_interval_secs),
        }
    }

    /// Bound on how long shutdown waits for pending telemetry.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Create a default configuration for testing.
    pub fn test_config() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0, // Random port
            log_level: "debug".into(),
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            log_level: "info".into(),
            log_format: LogFormat::Text,
            otel_endpoint: "http://localhost:4317".into(),
            service_name: "http-server".into(),
            metrics_interval_secs: 10,
            shutdown_timeout_secs: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.otel_endpoint, "http://localhost:4317");
        assert_eq!(config.service_name, "http-server");
    }

    #[test]
    fn test_cli_defaults_match_default_impl() {
        let parsed = Config::try_parse_from(["http-server"]).expect("parse failed");
        let default = Config::default();
        assert_eq!(parsed.port, default.port);
        assert_eq!(parsed.metrics_interval_secs, default.metrics_interval_secs);
        assert_eq!(parsed.log_format, LogFormat::Text);
    }

    #[test]
    fn test_cli_overrides() {
        let parsed = Config::try_parse_from([
            "http-server",
            "--port",
            "9090",
            "--log-format",
            "json",
            "--metrics-interval-secs",
            "30",
        ])
        .expect("parse failed");
        assert_eq!(parsed.port, 9090);
        assert_eq!(parsed.log_format, LogFormat::Json);
        assert_eq!(parsed.telemetry().metrics_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_telemetry_config() {
        let telemetry = Config::default().telemetry();
        assert_eq!(telemetry.endpoint, "http://localhost:4317");
        assert_eq!(telemetry.service_name, "http-server");
        assert_eq!(telemetry.metrics_interval, Duration::from_secs(10));
    }
}
