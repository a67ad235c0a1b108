use std::error::Error;

use sermon_digest::errors::{
    DigestError, ExportError, ImageLoadError, SessionError, SummarizeError, messages,
};

#[test]
fn test_errors_implement_error_trait() {
    fn assert_error<T: Error>(_: &T) {}

    assert_error(&DigestError::ParseError("test error".to_string()));
    assert_error(&SummarizeError::Connection("refused".to_string()));
    assert_error(&ExportError::MissingQuote);
    assert_error(&SessionError::Busy);
}

#[test]
fn test_digest_error_display() {
    let error = DigestError::UpstreamError("quota".to_string());
    assert_eq!(format!("{error}"), "Failed to access Gemini API: quota");

    let error = DigestError::HttpError("Connection error".to_string());
    assert_eq!(
        format!("{error}"),
        "Failed to send HTTP request: Connection error"
    );
}

#[test]
fn test_digest_error_status_and_kind() {
    let config = DigestError::ConfigError("missing key".to_string());
    assert_eq!(config.status_code(), 500);
    assert_eq!(config.kind(), "configuration");

    let upstream = DigestError::UpstreamError("boom".to_string());
    assert_eq!(upstream.status_code(), 502);
    assert_eq!(upstream.kind(), "upstream");

    let parse = DigestError::ParseError("bad".to_string());
    assert_eq!(parse.status_code(), 400);
}

#[test]
fn test_digest_error_from_serde() {
    let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let digest_err: DigestError = err.into();

    match digest_err {
        DigestError::ParseError(msg) => assert!(!msg.is_empty()),
        _ => panic!("Unexpected error type"),
    }
}

#[test]
fn test_summarize_messages_are_distinct() {
    // Each failure kind maps to its own fixed message
    let errors = [
        SummarizeError::Connection("x".to_string()),
        SummarizeError::Server { status: 500, message: None },
        SummarizeError::Configuration(String::new()),
        SummarizeError::InvalidServerResponse("x".to_string()),
        SummarizeError::InvalidAiResponse("x".to_string()),
    ];
    let texts: Vec<String> = errors.iter().map(SummarizeError::user_message).collect();

    for (i, a) in texts.iter().enumerate() {
        assert!(!a.is_empty());
        for b in &texts[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn test_server_message_is_appended() {
    let error = SummarizeError::Server {
        status: 500,
        message: Some("quota exceeded".to_string()),
    };
    let text = error.user_message();
    assert!(text.starts_with(messages::SERVER));
    assert!(text.contains("quota exceeded"));

    // Blank server text falls back to the bare message
    let error = SummarizeError::Server {
        status: 500,
        message: Some("  ".to_string()),
    };
    assert_eq!(error.user_message(), messages::SERVER);
}

#[test]
fn test_raw_details_never_reach_user() {
    let error = SummarizeError::Connection("tcp connect error: 127.0.0.1:1".to_string());
    assert!(!error.user_message().contains("127.0.0.1"));

    let error = ExportError::Rasterize("unsupported color function oklch".to_string());
    assert_eq!(error.user_message(), messages::PDF_FAILED);
}

#[test]
fn test_export_error_messages() {
    assert_eq!(
        ExportError::Document("zip".to_string()).user_message(),
        messages::WORD_FAILED
    );
    assert_eq!(
        ExportError::from(ImageLoadError::Status(404)).user_message(),
        messages::IMAGE_LOAD_FAILED
    );
    assert_eq!(ExportError::MissingQuote.user_message(), messages::NO_QUOTE);
    assert_eq!(
        ExportError::PosterState { expected: "loaded", actual: "created" }.user_message(),
        messages::IMAGE_EXPORT_FAILED
    );
}

#[test]
fn test_session_error_wraps_client_error() {
    let error: SessionError = SummarizeError::Configuration(String::new()).into();
    assert_eq!(error.user_message(), messages::CONFIGURATION);
    assert_eq!(SessionError::EmptyInput.user_message(), messages::EMPTY_INPUT);
}
