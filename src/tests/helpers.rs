//! Test fixtures shared by the unit test modules
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

#![allow(dead_code)]

use crate::core_types::{Adapter, AdapterRequest, AdapterResponse, TokenUsage, ToolCallRequest};
use crate::extraction::{FieldKind, SchemaDescriptor};
use crate::providers::{ModelIdentifier, Provider};
use crate::tools::{ToolRegistry, ToolSignature};

use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Adapter replaying a fixed script of responses.
///
/// Every request is kept for inspection. Once the script runs out the last
/// response is repeated, which lets a test drive the loop to its iteration cap.
pub struct ScriptedAdapter {
    script: Mutex<VecDeque<AdapterResponse>>,
    last: Mutex<AdapterResponse>,
    requests: Mutex<Vec<AdapterRequest>>,
}

impl ScriptedAdapter {
    pub fn new(responses: impl IntoIterator<Item = AdapterResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().collect()),
            last: Mutex::new(AdapterResponse::text("")),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<AdapterRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Adapter for ScriptedAdapter {
    async fn process(&self, request: AdapterRequest) -> AdapterResponse {
        self.requests.lock().unwrap().push(request);
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            *last = next;
        }
        last.clone()
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

pub fn test_model() -> ModelIdentifier {
    ModelIdentifier::new(Provider::OpenAi, "gpt-4o-mini")
}

/// Assistant turn requesting a single tool call
pub fn tool_call_turn(id: &str, name: &str, arguments: &str) -> AdapterResponse {
    AdapterResponse::tool_calls(vec![ToolCallRequest::new(id, name, arguments)])
        .with_usage(TokenUsage::new(100, 20))
}

/// Final assistant text
pub fn text_turn(text: &str) -> AdapterResponse {
    AdapterResponse::text(text).with_usage(TokenUsage::new(150, 30))
}

pub fn person_schema() -> SchemaDescriptor {
    SchemaDescriptor::new("person")
        .required("name", FieldKind::String)
        .required("age", FieldKind::Integer)
        .optional("email", FieldKind::String)
}

/// Registry with `calculator`, a failing tool and a panicking tool
pub fn sample_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register_calculator();
    registry.register(
        "always_fails",
        "Fails on every call",
        ToolSignature::new(),
        |_| Err(anyhow::anyhow!("backend unavailable")),
    );
    registry.register(
        "panics",
        "Panics on every call",
        ToolSignature::new(),
        |_| -> anyhow::Result<serde_json::Value> { panic!("tool exploded") },
    );
    registry.register(
        "echo",
        "Echo a message",
        ToolSignature::new().param::<String>("message"),
        |args| Ok(json!(args.string("message")?)),
    );
    registry
}
