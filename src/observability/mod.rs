//! OpenTelemetry observability infrastructure.
//!
//! Provides:
//! - Structured logging via `tracing-subscriber`
//! - An OTLP trace pipeline with batched span export
//! - An OTLP metric pipeline with a periodic reader
//! - [`Telemetry`], the process-lifetime handle owning both providers

pub mod logging;
pub mod metrics;
pub mod traces;

use std::fmt;
use std::time::Duration;

use opentelemetry::KeyValue;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::Resource;

use crate::error::TelemetryError;
use crate::middleware::Instrumentation;

/// Settings shared by the trace and metric pipelines.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Collector endpoint, e.g. `http://localhost:4317`.
    pub endpoint: String,
    /// Value of the `service.name` resource attribute.
    pub service_name: String,
    /// How often the periodic reader pushes metrics.
    pub metrics_interval: Duration,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:4317".into(),
            service_name: "http-server".into(),
            metrics_interval: Duration::from_secs(10),
        }
    }
}

/// Resource descriptor attached to every span and metric this process emits.
pub fn service_resource(service_name: &str) -> Resource {
    Resource::new(vec![KeyValue::new("service.name", service_name.to_string())])
}

/// Owns the trace and meter providers for the lifetime of the process.
///
/// Build it once at startup, hand [`Telemetry::instrumentation`] to the
/// router, and call [`Telemetry::shutdown`] before exiting so buffered spans
/// and the last metric reading get a chance to reach the collector.
pub struct Telemetry {
    tracer_provider: TracerProvider,
    meter_provider: SdkMeterProvider,
}

impl Telemetry {
    /// Build both OTLP pipelines.
    ///
    /// Must be called from within a Tokio runtime. An unreachable collector
    /// is not an error; the exporters connect lazily.
    pub fn init(config: &TelemetryConfig) -> Result<Self, TelemetryError> {
        let resource = service_resource(&config.service_name);

        let tracer_provider = traces::init_tracer_provider(config, resource.clone())?;
        let meter_provider = metrics::init_meter_provider(config, resource)?;

        tracing::info!(
            endpoint = %config.endpoint,
            service = %config.service_name,
            metrics_interval_secs = config.metrics_interval.as_secs(),
            "OTLP telemetry pipelines configured"
        );

        Ok(Self::from_providers(tracer_provider, meter_provider))
    }

    /// Wrap providers built elsewhere, e.g. with in-memory exporters.
    pub fn from_providers(tracer_provider: TracerProvider, meter_provider: SdkMeterProvider) -> Self {
        Self {
            tracer_provider,
            meter_provider,
        }
    }

    /// Tracer and request counter for the HTTP layer.
    pub fn instrumentation(&self) -> Instrumentation {
        Instrumentation::from_providers(&self.tracer_provider, &self.meter_provider)
    }

    /// Flush and shut down both pipelines, waiting at most `timeout`.
    ///
    /// Export errors are logged, never returned. Data still pending when the
    /// timeout expires is dropped.
    pub async fn shutdown(self, timeout: Duration) {
        let Self {
            tracer_provider,
            meter_provider,
        } = self;

        // Provider shutdown blocks on the exporter tasks.
        let flush = tokio::task::spawn_blocking(move || {
            if let Err(e) = tracer_provider.shutdown() {
                tracing::warn!(error = %e, "Trace pipeline shutdown failed");
            }
            if let Err(e) = meter_provider.shutdown() {
                tracing::warn!(error = %e, "Metric pipeline shutdown failed");
            }
        });

        match tokio::time::timeout(timeout, flush).await {
            Ok(Ok(())) => tracing::info!("Telemetry pipelines shut down"),
            Ok(Err(e)) => tracing::warn!(error = %e, "Telemetry shutdown task failed"),
            Err(_) => tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                "Telemetry flush timed out, pending data dropped"
            ),
        }
    }
}

impl fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Telemetry").finish_non_exhaustive()
    }
}
