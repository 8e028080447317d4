//! HTTP provider tests against a mock server.

#![cfg(feature = "http")]

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use huginn::providers::{GenerateProvider, HttpProvider, WireFormat};
use huginn::{
    GenerateOptions, GenerationRequest, HuginnError, Orchestrator, ProviderDescriptor, kinds,
};

fn options() -> GenerateOptions {
    GenerateOptions::new("test-model").max_output_tokens(256)
}

// ============================================================================
// OpenAI-compatible
// ============================================================================

#[tokio::test]
async fn openai_chat_returns_first_choice_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "max_tokens": 256,
            "messages": [{"role": "user", "content": "hello"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"a\": 1}"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider =
        HttpProvider::openai_compatible("openai", server.uri(), Some("sk-test".into())).unwrap();
    let text = provider.generate("hello", &options()).await.unwrap();

    assert_eq!(text, "{\"a\": 1}");
    assert_eq!(provider.name(), "openai");
    assert_eq!(provider.format(), WireFormat::OpenAiChat);
}

#[tokio::test]
async fn empty_choices_are_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let provider = HttpProvider::openai_compatible("openai", server.uri(), None).unwrap();
    let err = provider.generate("hello", &options()).await.unwrap_err();

    assert!(matches!(err, HuginnError::Rejected { status: 200, .. }));
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let provider = HttpProvider::openai_compatible("openai", server.uri(), None).unwrap();
    let err = provider.generate("hello", &options()).await.unwrap_err();

    assert!(matches!(err, HuginnError::Rejected { .. }));
}

// ============================================================================
// Gemini
// ============================================================================

#[tokio::test]
async fn gemini_joins_candidate_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/test-model:generateContent"))
        .and(header("x-goog-api-key", "g-key"))
        .and(body_partial_json(json!({
            "contents": [{"parts": [{"text": "hello"}]}],
            "generationConfig": {"maxOutputTokens": 256}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": " 1}"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider =
        HttpProvider::new("gemini", WireFormat::Gemini, server.uri(), Some("g-key".into()))
            .unwrap();
    let text = provider.generate("hello", &options()).await.unwrap();

    assert_eq!(text, "{\"a\": 1}");
}

// ============================================================================
// Status mapping
// ============================================================================

#[tokio::test]
async fn too_many_requests_maps_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let provider = HttpProvider::openai_compatible("openai", server.uri(), None).unwrap();
    let err = provider.generate("hello", &options()).await.unwrap_err();

    assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn error_status_keeps_truncated_body() {
    let server = MockServer::start().await;
    let long_body = "x".repeat(2_000);
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string(long_body))
        .mount(&server)
        .await;

    let provider = HttpProvider::openai_compatible("openai", server.uri(), None).unwrap();
    let err = provider.generate("hello", &options()).await.unwrap_err();

    match err {
        HuginnError::Rejected { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message.len(), 512);
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_host() {
    // Nothing listens on port 9 (discard) in the test environment.
    let provider =
        HttpProvider::openai_compatible("openai", "http://127.0.0.1:9", None).unwrap();
    let err = provider.generate("hello", &options()).await.unwrap_err();
    assert!(matches!(
        err,
        HuginnError::Unreachable(_) | HuginnError::Timeout(_)
    ));
}

// ============================================================================
// Through the orchestrator
// ============================================================================

#[tokio::test]
async fn server_error_falls_back_to_second_http_provider() {
    let primary = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .expect(1)
        .mount(&primary)
        .await;

    let secondary = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content":
                "```json\n{\"title\": \"Paying for college\", \"keyPoints\": [\"a\", \"b\", \"c\"], \"summary\": \"s\"}\n```"
            }}]
        })))
        .expect(1)
        .mount(&secondary)
        .await;

    let orchestrator = Orchestrator::builder()
        .provider(
            ProviderDescriptor::new("primary", "m"),
            Arc::new(HttpProvider::openai_compatible("primary", primary.uri(), None).unwrap()),
        )
        .provider(
            ProviderDescriptor::new("secondary", "m"),
            Arc::new(HttpProvider::openai_compatible("secondary", secondary.uri(), None).unwrap()),
        )
        .build()
        .unwrap();

    let request = GenerationRequest::new(kinds::key_points(), "Summarize financial aid.")
        .param("topic", "financial aid");
    let generated = orchestrator.generate(&request).await;

    assert!(!generated.fallback);
    assert_eq!(generated.provider.as_deref(), Some("secondary"));
    assert_eq!(generated.value["title"], "Paying for college");
}
