//! Logging utilities for ai-helper
//!
//! Re-exports tracing macros with log_* naming and builds the span every `ask` runs in.

pub(crate) use tracing::{
    debug as log_debug, error as log_error, info as log_info, trace as log_trace, warn as log_warn,
};

/// Span wrapping a single `ask` call; `request_id` correlates every event of one loop.
pub(crate) fn ask_span(request_id: &uuid::Uuid, model: &str) -> tracing::Span {
    tracing::info_span!("ask", request_id = %request_id, model = %model)
}
