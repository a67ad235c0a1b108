//! Gemini `generateContent` client used by the summarization endpoint.
//!
//! One request per summarization, no retries. The model is bound to the
//! response schema, and its text output is parsed and validated as data.

use reqwest::Client;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{error, info, warn};

use super::prompt_builder::SummaryPrompt;
use super::schema;
use crate::core::models::SummaryRecord;
use crate::errors::DigestError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Rough token estimate used for logging request sizes.
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4 + 1
}

/// Client for the generative-AI provider.
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model_name: String,
    api_base: String,
}

impl GeminiClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: String, model_name: String, api_base: String) -> Result<Self, DigestError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DigestError::HttpError(format!("Failed to build Gemini HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            model_name,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base,
            urlencoding::encode(&self.model_name)
        )
    }

    /// Send a `generateContent` body and return the provider's raw envelope.
    ///
    /// # Errors
    ///
    /// Returns `HttpError` when the request cannot be sent and `UpstreamError`
    /// for a non-2xx status or a body that is not JSON.
    pub async fn generate_content(&self, body: &Value) -> Result<Value, DigestError> {
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| DigestError::HttpError(format!("Gemini API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            error!(status = %status, "Gemini API returned an error");
            return Err(DigestError::UpstreamError(format!(
                "Gemini API error (status {status}): {error_text}"
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| DigestError::UpstreamError(format!("Gemini response is not JSON: {e}")))
    }

    /// Summarize with a prepared prompt and parse the result into a record.
    ///
    /// # Errors
    ///
    /// Propagates transport and upstream failures; returns `InvalidAiResponse`
    /// when the generated text is missing, not JSON, or violates the schema.
    pub async fn summarize(&self, prompt: &SummaryPrompt) -> Result<SummaryRecord, DigestError> {
        #[cfg(feature = "debug-logs")]
        info!("Using Gemini prompt:\n{}", prompt.prompt);

        info!(
            model = %self.model_name,
            estimated_input_tokens = estimate_tokens(&prompt.prompt),
            "Requesting structured summary"
        );

        let envelope = self.generate_content(&prompt.to_generate_content_body()).await?;

        let Some(text) = extract_generated_text(&envelope) else {
            warn!(envelope = %envelope, "Gemini response carried no generated text");
            return Err(DigestError::InvalidAiResponse(
                "No generated text in response".to_string(),
            ));
        };

        parse_generated_record(&text, &prompt.schema).map_err(DigestError::InvalidAiResponse)
    }
}

/// Concatenated text parts of the first candidate, if any.
#[must_use]
pub fn extract_generated_text(envelope: &Value) -> Option<String> {
    let parts = envelope
        .get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();

    (!text.trim().is_empty()).then_some(text)
}

/// Parse generated JSON text, validate it against `schema`, and decode it.
///
/// # Errors
///
/// Returns a description of the first problem found.
pub fn parse_generated_record(text: &str, schema: &Value) -> Result<SummaryRecord, String> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| format!("Generated text is not JSON: {e}"))?;
    decode_record(value, schema)
}

fn rename_key(object: &mut Map<String, Value>, from: &str, to: &str) {
    if object.contains_key(to) {
        return;
    }
    if let Some(value) = object.remove(from) {
        object.insert(to.to_string(), value);
    }
}

/// Map the older record layout (`khutbah1`/`khutbah2` with `summary` points,
/// `overallSummary`, quotes as `bestQuote`/`quote` or top-level
/// `khutbah1Quote`/`khutbah2Quote`) onto the current field names. Values
/// already in the current layout pass through unchanged.
#[must_use]
pub fn normalize_legacy_record(mut value: Value) -> Value {
    let Some(record) = value.as_object_mut() else {
        return value;
    };

    rename_key(record, "overallSummary", "overall");

    for (legacy, section_key, quote_key) in [
        ("khutbah1", "sectionA", "khutbah1Quote"),
        ("khutbah2", "sectionB", "khutbah2Quote"),
    ] {
        rename_key(record, legacy, section_key);
        let top_level_quote = record.remove(quote_key);

        let Some(section) = record.get_mut(section_key).and_then(Value::as_object_mut) else {
            continue;
        };
        rename_key(section, "summary", "points");
        rename_key(section, "bestQuote", "highlightQuote");
        rename_key(section, "quote", "highlightQuote");
        if let Some(quote) = top_level_quote {
            section.entry("highlightQuote").or_insert(quote);
        }
    }

    value
}

/// Validate an already-parsed value and decode it into a record.
///
/// # Errors
///
/// Returns a description of the schema violation or broken invariant.
pub fn decode_record(value: Value, schema: &Value) -> Result<SummaryRecord, String> {
    let value = normalize_legacy_record(value);
    schema::validate(schema, &value).map_err(|v| format!("Schema violation at {v}"))?;
    let record: SummaryRecord =
        serde_json::from_value(value).map_err(|e| format!("Unexpected record shape: {e}"))?;
    record.check_invariants()?;
    Ok(record)
}
