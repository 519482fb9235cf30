//! Adapter contract for LLM backends
//!
//! Defines the `Adapter` trait every provider integration implements, along with
//! the provider-agnostic request/response shapes exchanged with it.

use crate::core_types::messages::{Conversation, FileAttachment, ToolCallRequest};
use crate::extraction::SchemaDescriptor;
use serde::{Deserialize, Serialize};

/// Tool definition exposed to the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSchema {
    /// Tool name - unique within a registry
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// Token usage reported by one adapter call
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    pub fn total_tokens(&self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }

    /// Component-wise saturating sum
    pub fn accumulate(&mut self, other: TokenUsage) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(other.prompt_tokens);
        self.completion_tokens = self
            .completion_tokens
            .saturating_add(other.completion_tokens);
    }
}

/// Everything an adapter needs for one model turn
#[derive(Debug, Clone)]
pub struct AdapterRequest {
    /// Full conversation so far
    pub messages: Conversation,
    /// Schemas of the tools the caller made available for this `ask`
    pub tool_schemas: Vec<ToolSchema>,
    /// Target shape when structured output was requested
    pub schema: Option<SchemaDescriptor>,
    /// Attachment, only present on the first turn
    pub file: Option<FileAttachment>,
}

/// Result of one adapter turn.
///
/// Provider failures are not errors at this boundary: adapters report them as
/// ordinary text so the conversation can carry on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdapterResponse {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
    pub usage: Option<TokenUsage>,
}

impl AdapterResponse {
    /// Plain text answer without tool calls
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Tool calls without accompanying text
    pub fn tool_calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            tool_calls,
            ..Default::default()
        }
    }

    /// Provider failure encoded as text
    pub fn from_error(error: &dyn std::fmt::Display) -> Self {
        Self::text(format!("Error: {error}"))
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// Trait for LLM backends to implement
///
/// `process` is infallible by signature: transport errors, refusals and malformed
/// provider payloads must be folded into [`AdapterResponse`] text.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Adapter: Send + Sync {
    /// Run one model turn over the full conversation
    async fn process(&self, request: AdapterRequest) -> AdapterResponse;

    /// Provider name for logging and debugging
    fn provider_name(&self) -> &'static str;
}
