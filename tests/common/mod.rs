//! Test utilities for the HTTP server tests.
//!
//! Provides:
//! - Telemetry providers backed by in-memory exporters
//! - In-process request helpers

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::metrics::data::{Aggregation as _, ResourceMetrics, Sum};
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::runtime;
use opentelemetry_sdk::testing::metrics::InMemoryMetricsExporter;
use opentelemetry_sdk::testing::trace::InMemorySpanExporter;
use opentelemetry_sdk::trace::{Config, TracerProvider};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tower::ServiceExt;

use otel_http_server::observability::metrics::REQUESTS_TOTAL;
use otel_http_server::observability::{service_resource, Telemetry};
use otel_http_server::server;

pub const SERVICE_NAME: &str = "http-server";

/// Trace and meter providers that export into memory.
///
/// Spans are exported as soon as they end. Metrics are only exported when
/// [`TestTelemetry::flush_metrics`] forces a flush. The periodic reader runs
/// on the Tokio runtime and blocks when flushed or dropped, so every test
/// using this fixture needs a multi-threaded runtime.
pub struct TestTelemetry {
    pub span_exporter: InMemorySpanExporter,
    pub metric_exporter: InMemoryMetricsExporter,
    tracer_provider: TracerProvider,
    meter_provider: SdkMeterProvider,
}

// Each test binary uses a different subset of the fixture.
#[allow(dead_code)]
impl TestTelemetry {
    /// Build providers with a simple (synchronous) span processor.
    pub fn new() -> Self {
        let span_exporter = InMemorySpanExporter::default();
        let tracer_provider = TracerProvider::builder()
            .with_simple_exporter(span_exporter.clone())
            .with_config(Config::default().with_resource(service_resource(SERVICE_NAME)))
            .build();
        Self::with_tracer_provider(span_exporter, tracer_provider)
    }

    /// Build providers with a batching span processor, as in production.
    pub fn batched() -> Self {
        let span_exporter = InMemorySpanExporter::default();
        let tracer_provider = TracerProvider::builder()
            .with_batch_exporter(KeepOnShutdown(span_exporter.clone()), runtime::Tokio)
            .with_config(Config::default().with_resource(service_resource(SERVICE_NAME)))
            .build();
        Self::with_tracer_provider(span_exporter, tracer_provider)
    }

    fn with_tracer_provider(
        span_exporter: InMemorySpanExporter,
        tracer_provider: TracerProvider,
    ) -> Self {
        let metric_exporter = InMemoryMetricsExporter::default();
        // Long interval: tests flush explicitly.
        let reader = PeriodicReader::builder(metric_exporter.clone(), runtime::Tokio)
            .with_interval(Duration::from_secs(3600))
            .build();
        let meter_provider = SdkMeterProvider::builder()
            .with_reader(reader)
            .with_resource(service_resource(SERVICE_NAME))
            .build();

        Self {
            span_exporter,
            metric_exporter,
            tracer_provider,
            meter_provider,
        }
    }

    /// A telemetry handle sharing these providers.
    pub fn telemetry(&self) -> Telemetry {
        Telemetry::from_providers(self.tracer_provider.clone(), self.meter_provider.clone())
    }

    /// The application router wired to these providers.
    pub fn router(&self) -> Router {
        server::router(&self.telemetry().instrumentation())
    }

    /// Spans exported so far.
    pub fn finished_spans(&self) -> Vec<SpanData> {
        self.span_exporter
            .get_finished_spans()
            .expect("failed to read exported spans")
    }

    /// Flush metrics and return everything exported so far.
    pub fn flush_metrics(&self) -> Vec<ResourceMetrics> {
        self.meter_provider
            .force_flush()
            .expect("failed to flush metrics");
        self.metric_exporter
            .get_finished_metrics()
            .expect("failed to read exported metrics")
    }

    /// Current cumulative value of `http_server_requests_total`.
    pub fn requests_total(&self) -> u64 {
        let exported = self.flush_metrics();
        exported
            .iter()
            .rev()
            .flat_map(|rm| rm.scope_metrics.iter())
            .flat_map(|sm| sm.metrics.iter())
            .find(|m| m.name == REQUESTS_TOTAL)
            .and_then(|m| m.data.as_any().downcast_ref::<Sum<u64>>())
            .map_or(0, |sum| sum.data_points.iter().map(|dp| dp.value).sum())
    }
}

impl Default for TestTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

/// Forwards to an in-memory exporter but keeps its spans on shutdown, so
/// tests can inspect what a provider shutdown flushed.
#[allow(dead_code)]
#[derive(Debug)]
struct KeepOnShutdown(InMemorySpanExporter);

impl SpanExporter for KeepOnShutdown {
    fn export(
        &mut self,
        batch: Vec<SpanData>,
    ) -> Pin<Box<dyn Future<Output = ExportResult> + Send + 'static>> {
        self.0.export(batch)
    }
}

/// Send a GET request through the router and return status and body.
#[allow(dead_code)]
pub async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

/// Send an arbitrary request through the router and return status and body.
#[allow(dead_code)]
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    (status, String::from_utf8(bytes.to_vec()).expect("body is not UTF-8"))
}
