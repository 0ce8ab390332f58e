//! Per-request span and counter wrapping.
//!
//! [`traced`] turns any axum handler into a route that, for every request:
//! - continues a W3C `traceparent` from the request headers, if present
//! - opens a server span named after the operation
//! - increments `http_server_requests_total` before the handler runs
//! - hands the span to the handler as a [`RequestSpan`] extension
//! - records the response status and ends the span
//!
//! If the handler future is dropped before completing, the span still ends
//! when its last context reference goes away.

use std::borrow::Cow;

use axum::extract::{MatchedPath, Request, State};
use axum::handler::Handler;
use axum::http::HeaderMap;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{any, MethodRouter};
use opentelemetry::metrics::MeterProvider as _;
use opentelemetry::propagation::{Extractor, TextMapPropagator};
use opentelemetry::trace::{FutureExt, SpanKind, TraceContextExt, Tracer as _, TracerProvider as _};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{Tracer, TracerProvider};

use crate::observability::metrics::RequestMetrics;

/// Instrumentation scope name for the tracer and meter.
pub const INSTRUMENTATION_SCOPE: &str = "http-server";

/// Tracer and instruments shared by every instrumented route.
#[derive(Clone)]
pub struct Instrumentation {
    tracer: Tracer,
    metrics: RequestMetrics,
}

impl Instrumentation {
    pub fn new(tracer: Tracer, metrics: RequestMetrics) -> Self {
        Self { tracer, metrics }
    }

    /// Build a tracer and meter under [`INSTRUMENTATION_SCOPE`].
    pub fn from_providers(tracer_provider: &TracerProvider, meter_provider: &SdkMeterProvider) -> Self {
        let tracer = tracer_provider.tracer(INSTRUMENTATION_SCOPE);
        let meter = meter_provider.meter(INSTRUMENTATION_SCOPE);
        Self::new(tracer, RequestMetrics::new(&meter))
    }
}

/// The span of the request being handled.
#[derive(Clone, Debug)]
pub struct RequestSpan(Context);

impl RequestSpan {
    /// Attach a named event to the request span.
    pub fn add_event(&self, name: impl Into<Cow<'static, str>>, attributes: Vec<KeyValue>) {
        self.0.span().add_event(name, attributes);
    }

    /// OpenTelemetry context carrying the request span.
    pub fn context(&self) -> &Context {
        &self.0
    }
}

#[derive(Clone)]
struct Operation {
    name: &'static str,
    instrumentation: Instrumentation,
}

/// Route `handler` for any method, wrapped in a span named `name`.
pub fn traced<H, T>(instrumentation: &Instrumentation, name: &'static str, handler: H) -> MethodRouter
where
    H: Handler<T, ()>,
    T: 'static,
{
    let operation = Operation {
        name,
        instrumentation: instrumentation.clone(),
    };
    any(handler).layer(middleware::from_fn_with_state(operation, track_request))
}

async fn track_request(
    State(operation): State<Operation>,
    mut request: Request,
    next: Next,
) -> Response {
    let Operation {
        name,
        instrumentation,
    } = operation;

    let parent = TraceContextPropagator::new().extract(&HeaderExtractor(request.headers()));
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path().to_owned(), |p| p.as_str().to_owned());

    let span = instrumentation
        .tracer
        .span_builder(name)
        .with_kind(SpanKind::Server)
        .with_attributes(vec![
            KeyValue::new("http.request.method", request.method().to_string()),
            KeyValue::new("http.route", route),
        ])
        .start_with_context(&instrumentation.tracer, &parent);
    let cx = parent.with_span(span);

    instrumentation.metrics.record_request();

    request.extensions_mut().insert(RequestSpan(cx.clone()));
    let response = next.run(request).with_context(cx.clone()).await;

    let span = cx.span();
    span.set_attribute(KeyValue::new(
        "http.response.status_code",
        i64::from(response.status().as_u16()),
    ));
    span.end();

    response
}

struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}
