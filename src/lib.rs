//! A minimal arithmetic HTTP server instrumented with OpenTelemetry.
//!
//! Every routed request gets a server span and bumps the
//! `http_server_requests_total` counter. Spans are batched and metrics are
//! read periodically, and both are pushed to an OTLP collector over gRPC.
//!
//! # Modules
//!
//! - [`config`]: CLI and environment configuration
//! - [`error`]: Startup error types
//! - [`handlers`]: `/hello`, `/sum` and `/subtract`
//! - [`middleware`]: Per-request span and counter wrapping
//! - [`observability`]: Logging, trace and metric pipelines
//! - [`server`]: Router and HTTP listener lifecycle

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions, // observability::metrics::RequestMetrics is fine
    clippy::must_use_candidate,      // Not all functions need #[must_use]
    clippy::missing_errors_doc,      // Error docs can be verbose
    clippy::missing_panics_doc       // Panic docs can be verbose
)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;
