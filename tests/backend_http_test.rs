//! HTTP backend tests against a local mock server
//!
//! Every failure mode a remote service can produce must surface as an absent
//! result, never as a panic or an error.

use codelens::ai::{
    AnalysisBackend, BackendHealth, GeminiBackend, GeminiConfig, OllamaBackend, OllamaConfig,
    OpenAIBackend, OpenAIConfig,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CODE: &str = "def add(a, b):\n    return a + b\n";

fn ollama(server: &MockServer, timeout: Duration) -> OllamaBackend {
    OllamaBackend::new(OllamaConfig {
        host: server.uri(),
        model: "test-model".to_string(),
        timeout,
    })
}

fn openai(server: &MockServer, api_key: Option<&str>) -> OpenAIBackend {
    OpenAIBackend::new(OpenAIConfig {
        api_key: api_key.map(str::to_string),
        model: "test-model".to_string(),
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
    })
}

fn gemini(server: &MockServer, api_key: Option<&str>) -> GeminiBackend {
    GeminiBackend::new(GeminiConfig {
        api_key: api_key.map(str::to_string),
        model: "test-model".to_string(),
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
    })
}

#[tokio::test]
async fn test_ollama_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({"model": "test-model", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "test-model",
            "response": "# Overview\nAdds two numbers.",
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = ollama(&server, Duration::from_secs(5));
    let text = backend.explain(CODE, "math.py", "python").await;

    assert_eq!(text.as_deref(), Some("# Overview\nAdds two numbers."));
}

#[tokio::test]
async fn test_ollama_server_error_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let backend = ollama(&server, Duration::from_secs(5));
    assert!(backend.refactor(CODE, "math.py", "python").await.is_none());
}

#[tokio::test]
async fn test_ollama_malformed_json_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let backend = ollama(&server, Duration::from_secs(5));
    assert!(backend.trace_core_logic(CODE, "math.py", "python").await.is_none());
}

#[tokio::test]
async fn test_ollama_timeout_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": "too late"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let backend = ollama(&server, Duration::from_millis(200));
    assert!(backend.explain(CODE, "math.py", "python").await.is_none());
}

#[tokio::test]
async fn test_ollama_blank_response_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "   \n"})))
        .mount(&server)
        .await;

    let backend = ollama(&server, Duration::from_secs(5));
    assert!(backend.explain(CODE, "math.py", "python").await.is_none());
}

#[tokio::test]
async fn test_ollama_health_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .mount(&server)
        .await;

    let backend = ollama(&server, Duration::from_secs(5));
    assert_eq!(backend.health_check().await, BackendHealth::Available);
}

#[tokio::test]
async fn test_openai_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"model": "test-model"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "def add(a, b):\n    return a + b"},
                "finish_reason": "stop"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = openai(&server, Some("sk-test"));
    let text = backend.refactor(CODE, "math.py", "python").await;

    assert_eq!(text.as_deref(), Some("def add(a, b):\n    return a + b"));
}

#[tokio::test]
async fn test_openai_rate_limit_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "Rate limit reached"}
        })))
        .mount(&server)
        .await;

    let backend = openai(&server, Some("sk-test"));
    assert!(backend.explain(CODE, "math.py", "python").await.is_none());
}

#[tokio::test]
async fn test_openai_empty_choices_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let backend = openai(&server, Some("sk-test"));
    assert!(backend.explain(CODE, "math.py", "python").await.is_none());
}

#[tokio::test]
async fn test_openai_without_key_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let backend = openai(&server, None);
    assert!(backend.refactor(CODE, "math.py", "python").await.is_none());
    assert!(backend.explain(CODE, "math.py", "python").await.is_none());
    assert_eq!(backend.health_check().await, BackendHealth::NotConfigured);

    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

#[tokio::test]
async fn test_gemini_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/test-model:generateContent"))
        .and(header("x-goog-api-key", "g-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "1. Read a and b\n"}, {"text": "2. Return a + b"}]
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = gemini(&server, Some("g-test"));
    let text = backend.trace_core_logic(CODE, "math.py", "python").await;

    assert_eq!(text.as_deref(), Some("1. Read a and b\n2. Return a + b"));
}

#[tokio::test]
async fn test_gemini_malformed_json_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/test-model:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let backend = gemini(&server, Some("g-test"));
    assert!(backend.explain(CODE, "math.py", "python").await.is_none());
}

#[tokio::test]
async fn test_gemini_without_key_sends_nothing() {
    let server = MockServer::start().await;
    let backend = gemini(&server, Some("  "));

    assert!(backend.explain(CODE, "math.py", "python").await.is_none());
    assert_eq!(backend.health_check().await, BackendHealth::NotConfigured);

    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

#[tokio::test]
async fn test_gemini_health_check_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let backend = gemini(&server, Some("g-test"));
    match backend.health_check().await {
        BackendHealth::Unavailable(reason) => assert!(reason.contains("403")),
        other => panic!("Expected Unavailable, got {:?}", other),
    }
}
