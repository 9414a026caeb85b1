// Gemini client against a mocked provider
// Author: kelexine (https://github.com/kelexine)

use folio_gateway::cache::ResponseCache;
use folio_gateway::config::{CacheConfig, GeminiConfig, PerformanceConfig};
use folio_gateway::error::GatewayError;
use folio_gateway::gemini::{GeminiClient, TextGenerator};
use mockito::{Matcher, Server};
use serde_json::json;
use std::sync::Arc;

const PATH: &str = "/models/gemini-2.0-flash:generateContent";

fn client(base_url: &str, api_key: Option<&str>) -> GeminiClient {
    let config = GeminiConfig {
        api_key: api_key.map(str::to_string),
        api_base_url: base_url.to_string(),
        timeout_seconds: 5,
        ..GeminiConfig::default()
    };
    GeminiClient::new(&config, &PerformanceConfig::default()).unwrap()
}

fn text_body(text: &str) -> String {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

#[tokio::test]
async fn test_successful_generation() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::PartialJson(json!({
            "contents": [{"role": "user", "parts": [{"text": "What do you build?"}]}],
            "generationConfig": {"maxOutputTokens": 2048}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(text_body("I build *fast* web services."))
        .expect(1)
        .create_async()
        .await;

    let client = client(&server.url(), Some("test-key"));
    let text = client.generate("What do you build?").await.unwrap();

    assert_eq!(text, "I build *fast* web services.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_credential_makes_no_request() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", PATH).expect(0).create_async().await;

    let client = client(&server.url(), None);
    assert!(!client.is_configured());

    let err = client.generate("hello").await.unwrap_err();
    assert!(matches!(err, GatewayError::Configuration(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_blank_text_is_empty_response() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(text_body("   \n  "))
        .create_async()
        .await;

    let err = client(&server.url(), Some("k")).generate("hi").await.unwrap_err();
    assert_eq!(err, GatewayError::EmptyResponse);
}

#[tokio::test]
async fn test_provider_status_translation() {
    let cases = [
        (
            429,
            json!({"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}),
            "rate_limit_error",
        ),
        (
            400,
            json!({"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT",
                "details": [{"reason": "API_KEY_INVALID"}]}}),
            "auth_error",
        ),
        (
            503,
            json!({"error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}}),
            "transient_error",
        ),
        (
            500,
            json!({"error": {"code": 500, "message": "Internal error encountered."}}),
            "transient_error",
        ),
        (
            404,
            json!({"error": {"code": 404, "message": "models/x is not found", "status": "NOT_FOUND"}}),
            "unknown_error",
        ),
    ];

    for (status, body, expected) in cases {
        let mut server = Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(status)
            .with_body(body.to_string())
            .create_async()
            .await;

        let err = client(&server.url(), Some("k")).generate("hi").await.unwrap_err();
        assert_eq!(err.category(), expected, "HTTP {}", status);
    }
}

#[tokio::test]
async fn test_connection_failure_is_transient() {
    // Nothing listens on port 1
    let err = client("http://127.0.0.1:1", Some("k"))
        .generate("hi")
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Transient(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_unparseable_success_body_is_unknown_and_not_cached() {
    let bodies = [
        "<html><body>502 from edge-proxy.internal.example</body></html>",
        r#"{"candidates": [{"content": {"parts": [{"text": "cut off"#,
    ];

    for raw in bodies {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(raw)
            .expect(2)
            .create_async()
            .await;

        let cache = ResponseCache::new(CacheConfig::default());
        let generator: Arc<dyn TextGenerator> = Arc::new(client(&server.url(), Some("k")));

        for _ in 0..2 {
            let err = cache.get_or_generate("hi", generator.clone()).await.unwrap_err();
            assert_eq!(err.category(), "unknown_error", "body {}", raw);
            assert!(!err.user_message().contains("edge-proxy"));
            assert!(!err.user_message().contains("cut off"));
        }
        assert!(cache.is_empty());
        mock.assert_async().await;
    }
}
