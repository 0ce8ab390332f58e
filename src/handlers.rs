//! Request handlers for `/hello`, `/sum` and `/subtract`.
//!
//! Handlers only annotate successful requests: a `400 Invalid input` reply
//! is neither logged nor recorded as a span event.

use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use opentelemetry::KeyValue;

use crate::middleware::RequestSpan;

/// Body returned when an operand is missing or not an integer.
pub const INVALID_INPUT: &str = "Invalid input";

/// Raw `num1`/`num2` query parameters.
#[derive(Debug, Default)]
pub struct OperandParams {
    pub num1: Option<String>,
    pub num2: Option<String>,
}

impl OperandParams {
    /// Pick `num1` and `num2` out of decoded query pairs.
    ///
    /// When a key repeats, its first value wins. Other keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "num1" => &mut params.num1,
                "num2" => &mut params.num2,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }

    /// Both operands as integers, or `None` if either is absent or malformed.
    pub fn operands(&self) -> Option<(i64, i64)> {
        let num1 = self.num1.as_deref()?.parse().ok()?;
        let num2 = self.num2.as_deref()?.parse().ok()?;
        Some((num1, num2))
    }
}

/// Handle `/hello`.
pub async fn hello(Extension(span): Extension<RequestSpan>) -> &'static str {
    tracing::info!("Handled /hello request");
    span.add_event("Handled /hello request", Vec::new());
    "Hello, World!"
}

/// Handle `/sum?num1=..&num2=..`.
pub async fn sum(
    Extension(span): Extension<RequestSpan>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let Some((num1, num2)) = operands(params) else {
        return invalid_input();
    };

    let result = num1.wrapping_add(num2);
    let message = format!("Handled /sum request: {num1} + {num2} = {result}");
    tracing::info!(num1, num2, result, "{message}");
    span.add_event(message, operand_attributes(num1, num2, result));

    format!("Sum: {result}").into_response()
}

/// Handle `/subtract?num1=..&num2=..`.
pub async fn subtract(
    Extension(span): Extension<RequestSpan>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let Some((num1, num2)) = operands(params) else {
        return invalid_input();
    };

    let result = num1.wrapping_sub(num2);
    let message = format!("Handled /subtract request: {num1} - {num2} = {result}");
    tracing::info!(num1, num2, result, "{message}");
    span.add_event(message, operand_attributes(num1, num2, result));

    format!("Subtraction: {result}").into_response()
}

// A query string axum cannot decode is treated like a missing operand.
fn operands(params: Result<Query<Vec<(String, String)>>, QueryRejection>) -> Option<(i64, i64)> {
    let Query(pairs) = params.ok()?;
    OperandParams::from_pairs(pairs).operands()
}

fn invalid_input() -> Response {
    (StatusCode::BAD_REQUEST, INVALID_INPUT).into_response()
}

fn operand_attributes(num1: i64, num2: i64, result: i64) -> Vec<KeyValue> {
    vec![
        KeyValue::new("num1", num1),
        KeyValue::new("num2", num2),
        KeyValue::new("result", result),
    ]
}
