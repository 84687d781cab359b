//! Provider failure classification
//!
//! Providers report failures as loosely shaped JSON, sometimes wrapped one
//! level deep under `error`. Classification looks at the HTTP status code and
//! the message text, in a fixed order, and lands on one of four outcomes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Message the controller uses for its own start timeout
pub const TIMEOUT_SENTINEL: &str = "Connection timeout";

/// Marker the provider SDK puts in start failures
pub const START_METHOD_ERROR: &str = "start-method-error";

/// Used when a payload cannot be rendered at all
pub const UNKNOWN_ERROR: &str = "Unknown error";

const AUTH_MARKERS: [&str; 3] = ["Invalid Key", "Unauthorized", "401"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClassification {
    /// Credential rejected by the provider
    Auth,
    /// Start did not complete in time
    Timeout,
    /// Provider-reported start failure, e.g. connectivity
    Transient,
    Unknown,
}

/// A classified failure together with the message that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionFailure {
    pub classification: ErrorClassification,
    pub message: String,
    pub occurred_at: DateTime<Utc>,
}

/// `null`, `false`, `0` and `""` carry no nested error
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn unwrap_nested(raw: &Value) -> &Value {
    match raw.get("error") {
        Some(inner) if !is_blank(inner) => inner,
        _ => raw,
    }
}

fn stringify(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| UNKNOWN_ERROR.to_string())
}

/// Human-readable message for a raw provider error
pub fn error_message(raw: &Value) -> String {
    let inner = unwrap_nested(raw);
    match inner {
        Value::String(s) => s.clone(),
        Value::Object(_) => match inner.get("message") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(other) if !other.is_null() && !other.is_string() => stringify(other),
            _ => stringify(inner),
        },
        other => stringify(other),
    }
}

fn status_code(raw: &Value) -> Option<u64> {
    let inner = unwrap_nested(raw);
    inner
        .get("statusCode")
        .and_then(Value::as_u64)
        .or_else(|| raw.get("statusCode").and_then(Value::as_u64))
}

fn classify_parts(status: Option<u64>, message: &str) -> ErrorClassification {
    if status == Some(401) || AUTH_MARKERS.iter().any(|marker| message.contains(marker)) {
        ErrorClassification::Auth
    } else if message == TIMEOUT_SENTINEL {
        ErrorClassification::Timeout
    } else if message.contains(START_METHOD_ERROR) || message.contains(TIMEOUT_SENTINEL) {
        ErrorClassification::Transient
    } else {
        ErrorClassification::Unknown
    }
}

/// Classify and keep the normalized message alongside the outcome
pub fn analyze(raw: &Value) -> SessionFailure {
    let message = error_message(raw);
    SessionFailure {
        classification: classify_parts(status_code(raw), &message),
        message,
        occurred_at: Utc::now(),
    }
}

pub fn classify(raw: &Value) -> ErrorClassification {
    classify_parts(status_code(raw), &error_message(raw))
}
