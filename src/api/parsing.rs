//! Extraction helpers for API Gateway (REST v1 and HTTP v2) event payloads.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::errors::DigestError;

fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

/// Upper-cased HTTP method of the event, `None` when it carries none.
pub fn http_method(payload: &Value) -> Option<String> {
    v_str(payload, &["requestContext", "http", "method"])
        .or_else(|| v_str(payload, &["httpMethod"]))
        .map(str::to_ascii_uppercase)
}

/// Request body as text, decoding base64 when the gateway flagged it.
pub fn extract_body(payload: &Value) -> Result<String, DigestError> {
    let Some(body) = payload.get("body").and_then(Value::as_str) else {
        return Err(DigestError::ParseError("Missing body".to_string()));
    };

    let encoded = payload
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if !encoded {
        return Ok(body.to_string());
    }

    let bytes = STANDARD
        .decode(body)
        .map_err(|e| DigestError::ParseError(format!("Invalid base64 body: {e}")))?;
    String::from_utf8(bytes).map_err(|e| DigestError::ParseError(format!("Body is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn method_from_http_api_and_rest_api_events() {
        let v2 = json!({ "requestContext": { "http": { "method": "post" } } });
        let v1 = json!({ "httpMethod": "OPTIONS" });
        assert_eq!(http_method(&v2).as_deref(), Some("POST"));
        assert_eq!(http_method(&v1).as_deref(), Some("OPTIONS"));
        assert_eq!(http_method(&json!({})), None);
    }

    #[test]
    fn body_is_decoded_when_flagged() {
        let payload = json!({ "body": STANDARD.encode("{\"textA\":\"ا\"}"), "isBase64Encoded": true });
        assert_eq!(extract_body(&payload).unwrap(), "{\"textA\":\"ا\"}");

        let plain = json!({ "body": "{}", "isBase64Encoded": false });
        assert_eq!(extract_body(&plain).unwrap(), "{}");

        assert!(extract_body(&json!({})).is_err());
    }
}
