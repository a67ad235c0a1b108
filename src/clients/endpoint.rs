//! Client for the summarization endpoint.
//!
//! Sends the two transcripts, awaits one response and turns it into a
//! [`SummaryRecord`] or a [`SummarizeError`] of a distinct category. The
//! endpoint may answer with the record itself or with a generator envelope
//! whose text part holds the record as a JSON string; both are accepted.

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::{Value, json};
use tracing::{info, warn};
use url::Url;

use crate::ai::client::{decode_record, extract_generated_text, parse_generated_record};
use crate::ai::prompt_builder::{SummaryPrompt, response_schema};
use crate::core::config::DEFAULT_QUOTE_MAX_WORDS;
use crate::core::models::SummaryRecord;
use crate::errors::SummarizeError;

/// What the client puts in the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// `{textA, textB}`; the server builds the prompt.
    Texts,
    /// A complete `generateContent` payload for proxy deployments.
    Prebuilt { quote_max_words: usize },
}

pub struct SummarizeClient {
    http: Client,
    endpoint: Url,
    mode: RequestMode,
}

impl SummarizeClient {
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self::with_mode(endpoint, RequestMode::Texts)
    }

    #[must_use]
    pub fn with_mode(endpoint: Url, mode: RequestMode) -> Self {
        Self {
            http: Client::new(),
            endpoint,
            mode,
        }
    }

    fn request_body(&self, text_a: &str, text_b: &str) -> Value {
        match self.mode {
            RequestMode::Texts => json!({ "textA": text_a, "textB": text_b }),
            RequestMode::Prebuilt { quote_max_words } => {
                SummaryPrompt::new(text_a, text_b, quote_max_words).to_generate_content_body()
            }
        }
    }

    /// One summarization round trip. Never retries.
    ///
    /// # Errors
    ///
    /// See [`SummarizeError`]; every failure comes back as a value.
    pub async fn summarize(
        &self,
        text_a: &str,
        text_b: &str,
    ) -> Result<SummaryRecord, SummarizeError> {
        info!(endpoint = %self.endpoint, mode = ?self.mode, "Sending transcripts for summarization");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&self.request_body(text_a, text_b))
            .send()
            .await
            .map_err(|e| {
                warn!("Summarization request failed: {}", e);
                SummarizeError::Connection(e.to_string())
            })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(|e| {
            warn!("Failed to read summarization response: {}", e);
            SummarizeError::Connection(e.to_string())
        })?;

        interpret_response(status, content_type.as_deref(), &body)
    }
}

fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| {
        let main = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        main == "application/json" || main.ends_with("+json")
    })
}

/// Classify one HTTP response from the summarization endpoint.
///
/// # Errors
///
/// - non-2xx: `Configuration` when the server says so, else `Server` with the
///   server's `error` text if the body carries one
/// - 2xx without a JSON content type or body: `InvalidServerResponse`
/// - 2xx JSON that is not a valid record (directly or inside the envelope):
///   `InvalidAiResponse`
pub fn interpret_response(
    status: u16,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<SummaryRecord, SummarizeError> {
    let json_body = if is_json_content_type(content_type) {
        serde_json::from_slice::<Value>(body).ok()
    } else {
        None
    };

    if !(200..300).contains(&status) {
        let message = json_body
            .as_ref()
            .and_then(|v| v.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let kind = json_body
            .as_ref()
            .and_then(|v| v.get("kind"))
            .and_then(Value::as_str);

        warn!(status, ?message, "Summarization endpoint returned an error");
        if kind == Some("configuration") {
            return Err(SummarizeError::Configuration(message.unwrap_or_default()));
        }
        return Err(SummarizeError::Server { status, message });
    }

    let Some(value) = json_body else {
        warn!(?content_type, "Summarization endpoint answered without JSON");
        return Err(SummarizeError::InvalidServerResponse(format!(
            "expected JSON, got {}",
            content_type.unwrap_or("no content type")
        )));
    };

    let schema = response_schema(DEFAULT_QUOTE_MAX_WORDS);

    let decoded = if value.get("candidates").is_some() {
        match extract_generated_text(&value) {
            Some(text) => parse_generated_record(&text, &schema),
            None => Err("Envelope carries no generated text".to_string()),
        }
    } else {
        decode_record(value, &schema)
    };

    decoded.map_err(|e| {
        warn!("Summarization response is not a valid record: {}", e);
        SummarizeError::InvalidAiResponse(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_content_type_detection() {
        assert!(is_json_content_type(Some("application/json; charset=utf-8")));
        assert!(is_json_content_type(Some("application/problem+json")));
        assert!(!is_json_content_type(Some("text/html")));
        assert!(!is_json_content_type(None));
    }

    #[test]
    fn non_json_error_body_yields_generic_server_error() {
        let err = interpret_response(502, Some("text/html"), b"<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, SummarizeError::Server { status: 502, message: None }));
    }

    #[test]
    fn configuration_kind_is_its_own_category() {
        let body = br#"{"error":"API key not configured on server","kind":"configuration"}"#;
        let err = interpret_response(500, Some("application/json"), body).unwrap_err();
        assert!(matches!(err, SummarizeError::Configuration(_)));
    }

    #[test]
    fn prebuilt_mode_sends_generate_content_body() {
        let client = SummarizeClient::with_mode(
            Url::parse("https://example.com/api/proxy").unwrap(),
            RequestMode::Prebuilt { quote_max_words: 15 },
        );
        let body = client.request_body("a", "b");
        assert!(body.get("contents").is_some());
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");

        let texts = SummarizeClient::new(Url::parse("https://example.com/api/summarize").unwrap());
        assert_eq!(texts.request_body("a", "b"), json!({ "textA": "a", "textB": "b" }));
    }
}
