//! OTLP metric pipeline.
//!
//! Key metrics:
//! - http_server_requests_total: Counter of requests routed to a handler

use opentelemetry::metrics::{Counter, Meter};
use opentelemetry_otlp::{Protocol, WithExportConfig};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::{runtime, Resource};

use super::TelemetryConfig;
use crate::error::TelemetryError;

/// Name of the request counter as seen by the collector.
pub const REQUESTS_TOTAL: &str = "http_server_requests_total";

/// Build the meter provider with a periodic OTLP reader.
///
/// Same failure semantics as the trace pipeline: construction errors are
/// returned, export errors are left to the SDK.
pub fn init_meter_provider(
    config: &TelemetryConfig,
    resource: Resource,
) -> Result<SdkMeterProvider, TelemetryError> {
    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(config.endpoint.as_str())
        .with_protocol(Protocol::Grpc);

    let provider = opentelemetry_otlp::new_pipeline()
        .metrics(runtime::Tokio)
        .with_exporter(exporter)
        .with_resource(resource)
        .with_period(config.metrics_interval)
        .build()?;

    tracing::debug!(
        endpoint = %config.endpoint,
        interval_secs = config.metrics_interval.as_secs(),
        "OTLP metrics exporter configured"
    );
    Ok(provider)
}

/// Instruments recorded by the HTTP layer.
#[derive(Debug, Clone)]
pub struct RequestMetrics {
    /// Total number of requests received by a routed handler.
    pub requests_total: Counter<u64>,
}

impl RequestMetrics {
    /// Create the instruments from a meter.
    pub fn new(meter: &Meter) -> Self {
        Self {
            requests_total: meter
                .u64_counter(REQUESTS_TOTAL)
                .with_description("Total number of HTTP requests received")
                .with_unit("1")
                .init(),
        }
    }

    /// Count one request.
    pub fn record_request(&self) {
        self.requests_total.add(1, &[]);
    }
}
