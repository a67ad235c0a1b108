//! API Lambda handler - thin router for the summarization endpoint.
//!
//! This module handles:
//! - CORS preflight (`OPTIONS`) and method filtering (`405`)
//! - Credential check before any upstream call (`500` configuration error)
//! - `{textA, textB}` bodies: build prompt + schema, call Gemini, return the record
//! - Pre-built `generateContent` bodies: forward verbatim, return the envelope

use super::{helpers, parsing};
use crate::ai::{GeminiClient, SummaryPrompt};
use crate::core::config::AppConfig;
use crate::core::models::SummarizeRequest;
use crate::errors::DigestError;
use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

pub use self::function_handler as handler;

/// Lambda handler for the summarization endpoint.
///
/// # Errors
///
/// Never fails in practice; malformed settings are answered with a
/// configuration error response so browsers still get CORS headers.
#[tracing::instrument(level = "info", skip(event))]
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    Ok(respond(AppConfig::from_env(), &event.payload).await)
}

/// Answer one event given the outcome of loading the configuration.
pub async fn respond(config: Result<AppConfig, String>, payload: &Value) -> Value {
    match config {
        Ok(config) => route(&config, payload).await,
        Err(e) => {
            error!("Config error: {}", e);
            if parsing::http_method(payload).as_deref() == Some("OPTIONS") {
                return helpers::preflight();
            }
            helpers::err_response_with_kind(500, "configuration", helpers::INVALID_CONFIGURATION)
        }
    }
}

/// Answer one API Gateway event.
pub async fn route(config: &AppConfig, payload: &Value) -> Value {
    let request_id = Uuid::new_v4();
    let method = parsing::http_method(payload).unwrap_or_default();
    info!(%request_id, method = %method, "Summarization endpoint received request");

    // ========================================================================
    // Method filtering
    // ========================================================================

    match method.as_str() {
        "OPTIONS" => return helpers::preflight(),
        "POST" => {}
        _ => {
            warn!(%request_id, method = %method, "Rejected method");
            return helpers::method_not_allowed();
        }
    }

    // ========================================================================
    // Credential check (before touching the body or the provider)
    // ========================================================================

    let Some(api_key) = config.gemini_api_key.clone() else {
        error!(%request_id, "Gemini API key is not configured");
        return helpers::digest_error_response(&DigestError::ConfigError(
            helpers::MISSING_API_KEY.to_string(),
        ));
    };

    let body = match parsing::extract_body(payload)
        .and_then(|b| serde_json::from_str::<Value>(&b).map_err(DigestError::from))
    {
        Ok(body) => body,
        Err(e) => {
            warn!(%request_id, "Invalid request body: {}", e);
            return helpers::err_response(400, "Invalid request body");
        }
    };

    let client = match GeminiClient::new(
        api_key,
        config.gemini_model.clone(),
        config.gemini_api_base.clone(),
    ) {
        Ok(client) => client,
        Err(e) => {
            error!(%request_id, "Failed to build Gemini client: {}", e);
            return helpers::digest_error_response(&e);
        }
    };

    // ========================================================================
    // Route by body shape
    // ========================================================================

    if body.get("contents").is_some() {
        info!(%request_id, "Forwarding pre-built generateContent payload");
        return match client.generate_content(&body).await {
            Ok(envelope) => helpers::ok_json(&envelope),
            Err(e) => {
                error!(%request_id, "Upstream call failed: {}", e);
                helpers::digest_error_response(&e)
            }
        };
    }

    let request: SummarizeRequest = match serde_json::from_value(body) {
        Ok(r) => r,
        Err(e) => {
            warn!(%request_id, "Request is missing transcripts: {}", e);
            return helpers::err_response(400, "Both textA and textB are required");
        }
    };

    if request.text_a.trim().is_empty() || request.text_b.trim().is_empty() {
        return helpers::err_response(400, "Both textA and textB are required");
    }

    let prompt = SummaryPrompt::new(&request.text_a, &request.text_b, config.quote_max_words);

    match client.summarize(&prompt).await {
        Ok(record) => {
            info!(
                %request_id,
                section_a_points = record.section_a.points.len(),
                section_b_points = record.section_b.points.len(),
                "Summary generated"
            );
            match serde_json::to_value(&record) {
                Ok(value) => helpers::ok_json(&value),
                Err(e) => {
                    error!(%request_id, "Failed to serialize record: {}", e);
                    helpers::err_response(500, "Internal Server Error")
                }
            }
        }
        Err(e) => {
            error!(%request_id, "Summarization failed: {}", e);
            helpers::digest_error_response(&e)
        }
    }
}
