//! OTLP trace pipeline.
//!
//! Finished spans go through a batch span processor running on the Tokio
//! runtime and are pushed to the collector over gRPC.

use opentelemetry_otlp::{Protocol, WithExportConfig};
use opentelemetry_sdk::trace::{Config, TracerProvider};
use opentelemetry_sdk::{runtime, Resource};

use super::TelemetryConfig;
use crate::error::TelemetryError;

/// Build the tracer provider.
///
/// Fails only if the exporter cannot be constructed. The gRPC channel
/// connects lazily, so a collector that is down at startup is not detected
/// here; the batch processor reports failed exports through the SDK error
/// handler instead.
pub fn init_tracer_provider(
    config: &TelemetryConfig,
    resource: Resource,
) -> Result<TracerProvider, TelemetryError> {
    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(config.endpoint.as_str())
        .with_protocol(Protocol::Grpc);

    let provider = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(Config::default().with_resource(resource))
        .install_batch(runtime::Tokio)?;

    tracing::debug!(endpoint = %config.endpoint, "OTLP trace exporter configured");
    Ok(provider)
}
