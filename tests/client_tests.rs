use httpmock::prelude::*;
use serde_json::json;
use url::Url;

use sermon_digest::clients::{RequestMode, SummarizeClient};
use sermon_digest::errors::{SessionError, SummarizeError, messages};
use sermon_digest::session::Session;

fn record_json() -> serde_json::Value {
    json!({
        "impactfulTitle": "تیتر",
        "sectionA": {
            "title": "اخلاق",
            "points": [{ "heading": "تقوا", "explanation": "سفارش به تقوا" }],
            "highlightQuote": "تقوا زاد راه است"
        },
        "sectionB": {
            "title": "سیاست",
            "points": [{ "heading": "اقتصاد", "explanation": "تولید" }]
        },
        "overall": { "title": "جمع‌بندی", "text": "خلاصه" }
    })
}

fn client_for(server: &MockServer) -> SummarizeClient {
    SummarizeClient::new(Url::parse(&server.url("/api/summarize")).unwrap())
}

#[tokio::test]
async fn test_summarize_posts_both_texts() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/summarize")
                .json_body(json!({ "textA": "اول", "textB": "دوم" }));
            then.status(200)
                .header("content-type", "application/json")
                .body(record_json().to_string());
        })
        .await;

    let record = client_for(&server).summarize("اول", "دوم").await.unwrap();
    mock.assert_async().await;
    assert_eq!(record.impactful_title, "تیتر");
    assert_eq!(record.section_a.highlight_quote.as_deref(), Some("تقوا زاد راه است"));
    assert!(record.section_b.highlight_quote.is_none());
}

#[tokio::test]
async fn test_prebuilt_mode_sends_generate_content_and_reads_envelope() {
    let server = MockServer::start_async().await;
    let envelope = json!({
        "candidates": [{ "content": { "parts": [{ "text": record_json().to_string() }] } }]
    });
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/summarize")
                .json_body_includes(r#"{"generationConfig":{"responseMimeType":"application/json"}}"#);
            then.status(200)
                .header("content-type", "application/json")
                .body(envelope.to_string());
        })
        .await;

    let client = SummarizeClient::with_mode(
        Url::parse(&server.url("/api/summarize")).unwrap(),
        RequestMode::Prebuilt { quote_max_words: 40 },
    );
    let record = client.summarize("اول", "دوم").await.unwrap();
    mock.assert_async().await;
    assert_eq!(record.overall.text, "خلاصه");
}

#[tokio::test]
async fn test_connection_refused() {
    // Nothing listens on port 1
    let client = SummarizeClient::new(Url::parse("http://127.0.0.1:1/api/summarize").unwrap());
    let err = client.summarize("a", "b").await.unwrap_err();
    assert!(matches!(err, SummarizeError::Connection(_)));
}

#[tokio::test]
async fn test_server_error_carries_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/summarize");
            then.status(500)
                .header("content-type", "application/json")
                .body(r#"{"error":"x"}"#);
        })
        .await;

    let err = client_for(&server).summarize("a", "b").await.unwrap_err();
    match err {
        SummarizeError::Server { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message.as_deref(), Some("x"));
        }
        other => panic!("Unexpected error type: {other:?}"),
    }
}

#[tokio::test]
async fn test_configuration_error_kind() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/summarize");
            then.status(500)
                .header("content-type", "application/json")
                .body(r#"{"error":"API key not configured on server","kind":"configuration"}"#);
        })
        .await;

    let err = client_for(&server).summarize("a", "b").await.unwrap_err();
    assert!(matches!(err, SummarizeError::Configuration(_)));
    assert_eq!(err.user_message(), messages::CONFIGURATION);
}

#[tokio::test]
async fn test_html_answer_is_invalid_server_response() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/summarize");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html><body>Gateway</body></html>");
        })
        .await;

    let err = client_for(&server).summarize("a", "b").await.unwrap_err();
    assert!(matches!(err, SummarizeError::InvalidServerResponse(_)));
}

#[tokio::test]
async fn test_bad_inner_json_is_invalid_ai_response() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/summarize");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "candidates": [{ "content": { "parts": [{ "text": "{not json" }] } }]
                }));
        })
        .await;

    let err = client_for(&server).summarize("a", "b").await.unwrap_err();
    assert!(matches!(err, SummarizeError::InvalidAiResponse(_)));
}

#[tokio::test]
async fn test_failures_leave_session_usable() {
    let server = MockServer::start_async().await;
    let mut failing = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/summarize");
            then.status(502)
                .header("content-type", "application/json")
                .body(r#"{"error":"AI service unavailable","kind":"upstream"}"#);
        })
        .await;

    let session = Session::new(client_for(&server));
    let err = session.run_summarize("a", "b").await.unwrap_err();
    assert!(matches!(err, SessionError::Summarize(SummarizeError::Server { .. })));
    assert!(session.is_enabled());
    assert!(session.record().is_none());

    // The next attempt succeeds and publishes the record
    failing.delete_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/summarize");
            then.status(200)
                .header("content-type", "application/json")
                .body(record_json().to_string());
        })
        .await;

    let record = session.run_summarize("a", "b").await.unwrap();
    assert!(session.is_enabled());
    assert_eq!(session.record().unwrap().impactful_title, record.impactful_title);
}

#[tokio::test]
async fn test_blank_input_never_reaches_server() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/summarize");
            then.status(200);
        })
        .await;

    let session = Session::new(client_for(&server));
    let err = session.run_summarize("  ", "متن").await.unwrap_err();
    assert!(matches!(err, SessionError::EmptyInput));
    mock.assert_hits_async(0).await;
}

#[test]
fn test_every_failure_has_distinct_message() {
    let errors = [
        SummarizeError::Connection("refused".to_string()),
        SummarizeError::Server { status: 500, message: Some("x".to_string()) },
        SummarizeError::InvalidServerResponse("html".to_string()),
        SummarizeError::InvalidAiResponse("bad".to_string()),
    ];
    let texts: Vec<String> = errors.iter().map(SummarizeError::user_message).collect();

    for (i, text) in texts.iter().enumerate() {
        assert!(!text.is_empty());
        assert!(texts.iter().skip(i + 1).all(|other| other != text));
    }
}

#[tokio::test]
async fn test_legacy_record_layout_is_accepted() {
    // Older backends answer with khutbah1/khutbah2, summary and top-level quotes
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/summarize");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "impactfulTitle": "تیتر",
                    "khutbah1": {
                        "title": "اخلاق",
                        "summary": [{ "heading": "تقوا", "explanation": "سفارش به تقوا" }]
                    },
                    "khutbah2": {
                        "title": "سیاست",
                        "summary": [
                            { "heading": "اقتصاد", "explanation": "تولید" },
                            { "heading": "وحدت", "explanation": "همدلی" }
                        ]
                    },
                    "overallSummary": { "title": "جمع‌بندی", "text": "خلاصه" },
                    "khutbah1Quote": "تقوا زاد راه است",
                    "khutbah2Quote": "وحدت رمز پیروزی است"
                }));
        })
        .await;

    let record = client_for(&server).summarize("اول", "دوم").await.unwrap();
    assert_eq!(record.section_a.title, "اخلاق");
    assert_eq!(record.section_b.points.len(), 2);
    assert_eq!(record.overall.text, "خلاصه");
    assert_eq!(record.section_a.highlight_quote.as_deref(), Some("تقوا زاد راه است"));
    assert_eq!(record.section_b.highlight_quote.as_deref(), Some("وحدت رمز پیروزی است"));
}

#[tokio::test]
async fn test_session_usable_after_connection_refused() {
    let session = Session::new(SummarizeClient::new(
        Url::parse("http://127.0.0.1:1/api/summarize").unwrap(),
    ));
    let err = session.run_summarize("a", "b").await.unwrap_err();
    assert!(matches!(err, SessionError::Summarize(SummarizeError::Connection(_))));
    assert!(session.is_enabled());
}

#[tokio::test]
async fn test_session_usable_after_html_answer() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/summarize");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html></html>");
        })
        .await;

    let session = Session::new(client_for(&server));
    let err = session.run_summarize("a", "b").await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Summarize(SummarizeError::InvalidServerResponse(_))
    ));
    assert!(session.is_enabled());
}

#[tokio::test]
async fn test_session_usable_after_bad_inner_json() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/summarize");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "candidates": [{ "content": { "parts": [{ "text": "{not json" }] } }]
                }));
        })
        .await;

    let session = Session::new(client_for(&server));
    let err = session.run_summarize("a", "b").await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Summarize(SummarizeError::InvalidAiResponse(_))
    ));
    assert!(session.is_enabled());
}
