//! End-to-end Tests for the Ask Flow
//!
//! UNIT UNDER TEST: AiHelper over OpenAiCompatibleAdapter, CostModel and usage stores
//!
//! BUSINESS RESPONSIBILITY:
//!   - Resolves `provider:model` identifiers into a working adapter
//!   - Runs the tool loop against a real HTTP endpoint
//!   - Extracts structured answers and prices every call from the remote table
//!   - Persists usage events through the configured store
//!
//! TEST COVERAGE:
//!   - Calculator round trip over HTTP, tool result visible to the second request
//!   - Structured extraction with remote pricing and a JSON file store
//!   - Provider outage surfaces as answer text, not an error

mod common;

use ai_helper::{
    AdapterFactory, AiHelper, AskRequest, CostModel, FieldKind, HelperConfig, InMemoryUsageStore,
    JsonFileUsageStore, OpenRouterPricingSource, Provider, ProvidersConfig, RetryPolicy,
    SchemaDescriptor,
};
use common::{chat_text_response, chat_tool_call_response, mock_provider_settings, models_listing};
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn factory_for(server: &MockServer) -> AdapterFactory {
    let mut config = ProvidersConfig::default();
    for provider in Provider::ALL {
        *config.settings_mut(provider) = mock_provider_settings(&server.uri());
    }
    AdapterFactory::from_config(&config)
}

fn cost_model_for(server: &MockServer) -> Arc<CostModel> {
    let config = HelperConfig::default();
    let source = OpenRouterPricingSource::new(format!("{}/api/v1/models", server.uri()))
        .with_retry_policy(RetryPolicy::no_retry());
    Arc::new(CostModel::new(Arc::new(source), &config.pricing))
}

#[tokio::test]
async fn test_calculator_round_trip_over_http() {
    // Arrange
    let mock_server = MockServer::start().await;
    // Second turn: the request now carries the tool result
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("\"role\":\"tool\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_text_response(
            "2 + 2 is 4",
            60,
            8,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_tool_call_response(
            "call_1",
            "calculator",
            r#"{"expression":"2+2"}"#,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(models_listing()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(InMemoryUsageStore::new());
    let mut helper = AiHelper::from_model_id("openai:gpt-4o-mini", &factory_for(&mock_server))
        .unwrap()
        .with_cost_model(cost_model_for(&mock_server))
        .with_usage_store(store.clone());
    helper.tools_mut().register_calculator();

    // Act
    let response = helper
        .ask(AskRequest::new("What is 2+2?").with_tools(["calculator"]))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.output.text(), Some("2 + 2 is 4"));
    assert_eq!(response.tool_rounds, 1);
    let tool_message = response.conversation.tool_results().next().unwrap();
    assert_eq!(tool_message.text(), "4");

    // 40/10 tokens on the tool turn, 60/8 on the answer, at 0.15/0.6 USD per million
    let expected = (100.0 * 0.00000015) + (18.0 * 0.0000006);
    assert!((response.cost.unwrap() - expected).abs() < 1e-12);

    let summary = store.summary(chrono::Utc::now());
    assert_eq!(summary.total_requests, 2);
    assert_eq!(summary.tool_calls["calculator"], 1);
}

#[tokio::test]
async fn test_structured_answer_is_persisted_to_file_store() {
    // Arrange
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("json_schema"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_text_response(
            r#"```json
{"name": "Tokyo", "population": "37400068", "country": null}
```"#,
            30,
            20,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(models_listing()))
        .mount(&mock_server)
        .await;

    let usage_path = std::env::temp_dir()
        .join(format!("ai-helper-flow-{}", uuid::Uuid::new_v4()))
        .join("usage.json");
    let store = Arc::new(JsonFileUsageStore::open(&usage_path).await);
    let helper = AiHelper::from_model_id("anthropic/claude-3.5-sonnet", &factory_for(&mock_server))
        .unwrap()
        .with_cost_model(cost_model_for(&mock_server))
        .with_usage_store(store.clone());
    let schema = SchemaDescriptor::new("city")
        .required("name", FieldKind::String)
        .required("population", FieldKind::Integer)
        .optional("country", FieldKind::String);

    // Act
    let response = helper
        .ask(AskRequest::new("Largest city in Japan?").with_schema(schema))
        .await
        .unwrap();

    // Assert
    let city = response.output.structured().unwrap();
    assert_eq!(city.get("name").unwrap(), "Tokyo");
    assert_eq!(
        city.get("population").unwrap(),
        &serde_json::json!(37_400_068)
    );
    assert!((city.fill_percentage - 200.0 / 3.0).abs() < 1e-9);

    let reopened = JsonFileUsageStore::open(&usage_path).await;
    let summary = reopened.summary(chrono::Utc::now()).await;
    assert_eq!(summary.total_requests, 1);
    let fill = summary.fill_by_schema["city"];
    assert_eq!(fill.count, 1);
    let by_model = &summary.by_model;
    assert!(by_model.contains_key("openrouter:anthropic/claude-3.5-sonnet"));
    assert!((summary.total_cost - (30.0 * 0.000003 + 20.0 * 0.000015)).abs() < 1e-12);

    if let Some(dir) = usage_path.parent() {
        tokio::fs::remove_dir_all(dir).await.unwrap();
    }
}

#[tokio::test]
async fn test_provider_outage_is_answer_text() {
    // Arrange
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&mock_server)
        .await;
    let helper = AiHelper::from_model_id("google:gemini-2.0-flash", &factory_for(&mock_server))
        .unwrap();

    // Act
    let response = helper.ask(AskRequest::new("Hello")).await.unwrap();

    // Assert
    let text = response.output.text().unwrap();
    assert!(text.starts_with("Error: Request failed"), "got: {text}");
    assert_eq!(response.cost, None);
}

#[tokio::test]
async fn test_unknown_tool_is_rejected_without_http_traffic() {
    // Arrange
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_text_response("unused", 1, 1)))
        .expect(0)
        .mount(&mock_server)
        .await;
    let helper = AiHelper::from_model_id("openai:gpt-4o-mini", &factory_for(&mock_server)).unwrap();

    // Act
    let result = helper
        .ask(AskRequest::new("Weather?").with_tools(["get_weather"]))
        .await;

    // Assert
    assert!(result.unwrap_err().is_configuration());
}
