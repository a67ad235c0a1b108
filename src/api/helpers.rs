//! Common helper functions for API handlers.
//!
//! Every response carries permissive CORS headers because the browser client
//! and the endpoint may live on different origins.

use serde_json::{Value, json};

use crate::errors::DigestError;

pub const MISSING_API_KEY: &str = "API key not configured on server";
pub const INVALID_CONFIGURATION: &str = "Server configuration is invalid";

// ============================================================================
// Response Builders
// ============================================================================

/// Headers attached to every response.
#[must_use]
pub fn cors_headers() -> Value {
    json!({
        "Access-Control-Allow-Origin": "*",
        "Access-Control-Allow-Methods": "POST, OPTIONS",
        "Access-Control-Allow-Headers": "Content-Type",
        "Content-Type": "application/json"
    })
}

/// Returns a 200 OK answer to a CORS preflight.
#[must_use]
pub fn preflight() -> Value {
    json!({ "statusCode": 200, "headers": cors_headers(), "body": "" })
}

/// Returns a 200 OK response with a JSON body.
#[must_use]
pub fn ok_json(body: &Value) -> Value {
    json!({
        "statusCode": 200,
        "headers": cors_headers(),
        "body": body.to_string()
    })
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, message: &str) -> Value {
    json!({
        "statusCode": status_code,
        "headers": cors_headers(),
        "body": json!({ "error": message }).to_string()
    })
}

/// Returns an error response tagged with a machine-readable kind.
#[must_use]
pub fn err_response_with_kind(status_code: u16, kind: &str, message: &str) -> Value {
    json!({
        "statusCode": status_code,
        "headers": cors_headers(),
        "body": json!({ "error": message, "kind": kind }).to_string()
    })
}

/// Maps a [`DigestError`] to its response. Only fixed text leaves the server.
#[must_use]
pub fn digest_error_response(error: &DigestError) -> Value {
    let message = match error {
        DigestError::ConfigError(_) => MISSING_API_KEY,
        DigestError::ParseError(_) => "Invalid request body",
        DigestError::HttpError(_) | DigestError::UpstreamError(_) => "AI service unavailable",
        DigestError::InvalidAiResponse(_) => "Invalid response from AI",
    };
    err_response_with_kind(error.status_code(), error.kind(), message)
}

/// Returns a 405 for anything but `POST` and `OPTIONS`.
#[must_use]
pub fn method_not_allowed() -> Value {
    let mut response = err_response(405, "Method not allowed");
    response["headers"]["Allow"] = Value::String("POST, OPTIONS".to_string());
    response
}
