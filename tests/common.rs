//! Test helper utilities for ai-helper integration tests
//!
//! Shared fixtures for the wiremock-backed adapter, pricing and end-to-end tests.
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use ai_helper::{ProviderSettings, RetryPolicy};
use serde_json::{json, Value};
use std::time::Duration;

/// Create test retry policy with fast timeouts for testing
pub fn create_fast_test_retry_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 2,
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        backoff_multiplier: 2.0,
        total_timeout: Duration::from_secs(10),
        request_timeout: Duration::from_secs(5),
    }
}

/// Base URL of a local port with nothing listening on it.
///
/// A dropped `MockServer` is returned to wiremock's pool and keeps answering,
/// so connection failures need a port that was never served.
pub fn refused_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener
        .local_addr()
        .expect("read ephemeral port")
        .port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// Provider settings pointing at a mock server, without retries
pub fn mock_provider_settings(base_url: &str) -> ProviderSettings {
    ProviderSettings::new(base_url)
        .with_api_key("test-key")
        .with_retry_policy(RetryPolicy::no_retry())
}

/// `/chat/completions` body with a plain assistant answer
pub fn chat_text_response(content: &str, prompt_tokens: u32, completion_tokens: u32) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": prompt_tokens,
            "completion_tokens": completion_tokens,
            "total_tokens": prompt_tokens + completion_tokens
        }
    })
}

/// `/chat/completions` body requesting one tool call
pub fn chat_tool_call_response(call_id: &str, tool: &str, arguments: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": call_id,
                    "type": "function",
                    "function": {"name": tool, "arguments": arguments}
                }]
            },
            "finish_reason": "tool_calls"
        }],
        "usage": {"prompt_tokens": 40, "completion_tokens": 10, "total_tokens": 50}
    })
}

/// OpenRouter-style models listing
pub fn models_listing() -> Value {
    json!({
        "data": [
            {
                "id": "openai/gpt-4o-mini",
                "name": "OpenAI: GPT-4o-mini",
                "pricing": {"prompt": "0.00000015", "completion": "0.0000006"}
            },
            {
                "id": "anthropic/claude-3.5-sonnet",
                "pricing": {"prompt": 0.000003, "completion": 0.000015}
            },
            {
                "id": "broken/model",
                "pricing": {"prompt": "free", "completion": "0"}
            },
            {
                "id": "no-pricing/model"
            }
        ]
    })
}
