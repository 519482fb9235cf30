//! Core types for the provider-agnostic request/response contract
//!
//! ## Organization
//! - `messages` - Conversation model (messages, tool call requests, attachments)
//! - `adapter` - The `Adapter` trait and the request/response shapes it exchanges

pub mod adapter;
pub mod messages;

pub use adapter::{Adapter, AdapterRequest, AdapterResponse, TokenUsage, ToolSchema};
pub use messages::{Conversation, FileAttachment, Message, MessageRole, ToolCallRequest};
