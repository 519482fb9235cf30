//! Tool calling support
//!
//! ## Organization
//! - `signature` - declared parameters and their JSON Schema
//! - `registry` - `ToolRegistry`, argument binding and panic-safe execution
//! - `calculator` - the built-in `calculator` tool
//!
//! ```rust
//! use ai_helper::{ToolRegistry, ToolSignature};
//! use serde_json::json;
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(
//!     "greet",
//!     "Greet someone by name",
//!     ToolSignature::new().param::<String>("name"),
//!     |args| Ok(json!(format!("Hello, {}!", args.string("name")?))),
//! );
//!
//! let output = registry.execute("greet", r#"{"name":"Ada"}"#);
//! assert_eq!(output.content, "Hello, Ada!");
//! assert!(!output.is_error);
//! ```

pub mod calculator;
mod registry;
mod signature;

pub use calculator::CALCULATOR_TOOL;
pub use registry::{ToolArguments, ToolFn, ToolOutput, ToolRegistry};
pub use signature::{ParamType, ParameterKind, ToolParameter, ToolSignature};
