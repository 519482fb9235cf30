//! Unit Tests for the OpenAI-compatible Adapter HTTP Integration
//!
//! UNIT UNDER TEST: OpenAiCompatibleAdapter
//!
//! BUSINESS RESPONSIBILITY:
//!   - Sends chat completion requests with bearer authentication
//!   - Translates successful responses into the provider-agnostic shape
//!   - Folds every provider failure into response text instead of an error
//!   - Retries transient failures according to the configured policy
//!
//! TEST COVERAGE:
//!   - Construction with and without an API key
//!   - Successful text and tool call responses
//!   - Authentication (401), rejection (400), rate limit (429) and server (500) errors
//!   - Malformed response bodies
//!   - Retry after a transient server error
//!   - Connection failures against a port nobody listens on

mod common;

use ai_helper::{
    Adapter, AdapterRequest, Conversation, ModelIdentifier, OpenAiCompatibleAdapter, Provider,
    ProviderSettings, TokenUsage,
};
use common::{
    chat_text_response, chat_tool_call_response, create_fast_test_retry_policy,
    mock_provider_settings, refused_base_url,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

fn model() -> ModelIdentifier {
    ModelIdentifier::new(Provider::OpenAi, "gpt-4o-mini")
}

fn simple_request(prompt: &str) -> AdapterRequest {
    AdapterRequest {
        messages: Conversation::from_prompt(prompt),
        tool_schemas: Vec::new(),
        schema: None,
        file: None,
    }
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_adapter_requires_api_key() {
    // Arrange
    let settings = ProviderSettings::new("https://api.openai.com/v1");

    // Act
    let result = OpenAiCompatibleAdapter::new(model(), settings);

    // Assert
    assert!(result.unwrap_err().is_configuration());
}

#[test]
fn test_adapter_reports_model_provider() {
    // Arrange
    let settings = mock_provider_settings("http://localhost:1");

    // Act
    let model = ModelIdentifier::new(Provider::Google, "gemini-2.0-flash");
    let adapter = OpenAiCompatibleAdapter::new(model, settings).unwrap();

    // Assert
    assert_eq!(adapter.provider_name(), "google");
    assert_eq!(adapter.model().model(), "gemini-2.0-flash");
}

// ============================================================================
// Successful responses
// ============================================================================

#[tokio::test]
async fn test_text_response_with_usage() {
    // Arrange
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "messages": [{"role": "user", "content": "Hello"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_text_response("Hi!", 9, 2)))
        .expect(1)
        .mount(&mock_server)
        .await;
    let adapter =
        OpenAiCompatibleAdapter::new(model(), mock_provider_settings(&mock_server.uri())).unwrap();

    // Act
    let response = adapter.process(simple_request("Hello")).await;

    // Assert
    assert_eq!(response.text.as_deref(), Some("Hi!"));
    assert_eq!(response.usage, Some(TokenUsage::new(9, 2)));
    assert!(response.tool_calls.is_empty());
}

#[tokio::test]
async fn test_tool_call_response_keeps_raw_arguments() {
    // Arrange
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_tool_call_response(
            "call_abc",
            "calculator",
            r#"{"expression":"2+2"}"#,
        )))
        .mount(&mock_server)
        .await;
    let adapter =
        OpenAiCompatibleAdapter::new(model(), mock_provider_settings(&mock_server.uri())).unwrap();

    // Act
    let response = adapter.process(simple_request("What is 2+2?")).await;

    // Assert
    assert_eq!(response.tool_calls.len(), 1);
    assert_eq!(response.tool_calls[0].id, "call_abc");
    assert_eq!(response.tool_calls[0].name, "calculator");
    assert_eq!(
        response.tool_calls[0].raw_arguments,
        r#"{"expression":"2+2"}"#
    );
}

// ============================================================================
// Failures become text
// ============================================================================

#[tokio::test]
async fn test_authentication_error_becomes_text() {
    // Arrange
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .expect(1)
        .mount(&mock_server)
        .await;
    let adapter =
        OpenAiCompatibleAdapter::new(model(), mock_provider_settings(&mock_server.uri())).unwrap();

    // Act
    let response = adapter.process(simple_request("Hello")).await;

    // Assert
    let text = response.text.unwrap();
    assert!(
        text.starts_with("Error: Authentication failed"),
        "got: {text}"
    );
    assert!(response.usage.is_none());
}

#[tokio::test]
async fn test_rejected_request_becomes_text() {
    // Arrange
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("unsupported parameter: tools"))
        .mount(&mock_server)
        .await;
    let adapter =
        OpenAiCompatibleAdapter::new(model(), mock_provider_settings(&mock_server.uri())).unwrap();

    // Act
    let response = adapter.process(simple_request("Hello")).await;

    // Assert
    assert_eq!(
        response.text.as_deref(),
        Some("Error: Request rejected with status 400: unsupported parameter: tools")
    );
}

#[tokio::test]
async fn test_rate_limit_becomes_text_with_retry_after() {
    // Arrange
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&mock_server)
        .await;
    let adapter =
        OpenAiCompatibleAdapter::new(model(), mock_provider_settings(&mock_server.uri())).unwrap();

    // Act
    let response = adapter.process(simple_request("Hello")).await;

    // Assert
    assert_eq!(
        response.text.as_deref(),
        Some("Error: Rate limit exceeded, retry after 7s")
    );
}

#[tokio::test]
async fn test_malformed_body_becomes_text() {
    // Arrange
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&mock_server)
        .await;
    let adapter =
        OpenAiCompatibleAdapter::new(model(), mock_provider_settings(&mock_server.uri())).unwrap();

    // Act
    let response = adapter.process(simple_request("Hello")).await;

    // Assert
    assert!(response
        .text
        .unwrap()
        .starts_with("Error: Response parsing failed"));
}

#[tokio::test]
async fn test_server_error_is_retried() {
    // Arrange
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_text_response("Recovered", 5, 1)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    let settings = mock_provider_settings(&mock_server.uri())
        .with_retry_policy(create_fast_test_retry_policy());
    let adapter = OpenAiCompatibleAdapter::new(model(), settings).unwrap();

    // Act
    let response = adapter.process(simple_request("Hello")).await;

    // Assert
    assert_eq!(response.text.as_deref(), Some("Recovered"));
}

#[tokio::test]
async fn test_unreachable_endpoint_becomes_text() {
    // Arrange
    let adapter =
        OpenAiCompatibleAdapter::new(model(), mock_provider_settings(&refused_base_url())).unwrap();

    // Act
    let response = adapter.process(simple_request("Hello")).await;

    // Assert
    assert!(response.text.unwrap().starts_with("Error: Request failed"));
}
