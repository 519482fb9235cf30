//! OpenAI-compatible chat completions adapter
//!
//! OpenAI, OpenRouter, and the compatibility endpoints of Anthropic and Google all
//! accept the same `/chat/completions` wire format, so one adapter serves every
//! provider.
//!
//! - `types` - request/response wire structures
//! - `conversion` - conversation, tools, schema and attachment mapping
//! - `adapter` - HTTP transport with retries

mod adapter;
pub mod conversion;
pub mod types;

pub use adapter::OpenAiCompatibleAdapter;
