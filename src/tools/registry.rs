//! Named tool callables and their safe execution

use crate::core_types::ToolSchema;
use crate::error::{LlmError, LlmResult};
use crate::logging::{log_debug, log_info, log_warn};
use crate::tools::signature::ToolSignature;

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Callable backing a tool
pub type ToolFn = dyn Fn(&ToolArguments) -> anyhow::Result<Value> + Send + Sync;

/// Validated arguments handed to a tool callable, defaults already filled in
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments(Map<String, Value>);

impl ToolArguments {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn string(&self, name: &str) -> anyhow::Result<&str> {
        self.get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow::anyhow!("parameter '{name}' must be a string"))
    }

    pub fn integer(&self, name: &str) -> anyhow::Result<i64> {
        self.get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| anyhow::anyhow!("parameter '{name}' must be an integer"))
    }

    pub fn number(&self, name: &str) -> anyhow::Result<f64> {
        self.get(name)
            .and_then(Value::as_f64)
            .ok_or_else(|| anyhow::anyhow!("parameter '{name}' must be a number"))
    }

    pub fn boolean(&self, name: &str) -> anyhow::Result<bool> {
        self.get(name)
            .and_then(Value::as_bool)
            .ok_or_else(|| anyhow::anyhow!("parameter '{name}' must be a boolean"))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Text fed back to the model for one tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub content: String,
    pub is_error: bool,
}

impl ToolOutput {
    fn success(value: Value) -> Self {
        let content = match value {
            Value::String(s) => s,
            other => other.to_string(),
        };
        Self {
            content,
            is_error: false,
        }
    }

    fn error(content: String) -> Self {
        Self {
            content,
            is_error: true,
        }
    }
}

#[derive(Clone)]
struct ToolDefinition {
    description: String,
    signature: ToolSignature,
    callable: Arc<ToolFn>,
}

/// Registry of tools available to an orchestrator.
///
/// `execute` never fails: unknown names, bad arguments, callable errors and
/// panics all come back as error text for the model to react to.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolDefinition>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; a later registration under the same name replaces it
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        signature: ToolSignature,
        callable: F,
    ) where
        F: Fn(&ToolArguments) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        let definition = ToolDefinition {
            description: description.into(),
            signature,
            callable: Arc::new(callable),
        };
        let replaced = self.tools.insert(name.clone(), definition).is_some();
        log_info!(tool = %name, replaced = replaced, "Registering tool");
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn schema_for(&self, name: &str) -> Option<ToolSchema> {
        self.tools.get(name).map(|tool| ToolSchema {
            name: name.to_string(),
            description: tool.description.clone(),
            parameters: tool.signature.to_json_schema(),
        })
    }

    /// Schemas for `names` in the given order
    ///
    /// # Errors
    ///
    /// [`LlmError::UnknownTool`] for the first name that is not registered.
    pub fn schemas_for<S: AsRef<str>>(&self, names: &[S]) -> LlmResult<Vec<ToolSchema>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.schema_for(name)
                    .ok_or_else(|| LlmError::unknown_tool(name))
            })
            .collect()
    }

    /// Run tool `name` with the serialized arguments the model produced
    pub fn execute(&self, name: &str, raw_arguments: &str) -> ToolOutput {
        let Some(tool) = self.tools.get(name) else {
            log_warn!(tool = %name, "Model requested an unregistered tool");
            return ToolOutput::error(format!("Error: unknown tool '{name}'"));
        };

        let arguments = match bind_arguments(&tool.signature, raw_arguments) {
            Ok(arguments) => arguments,
            Err(reason) => {
                log_warn!(tool = %name, reason = %reason, "Rejected tool arguments");
                return ToolOutput::error(format!(
                    "Error: invalid arguments for tool '{name}': {reason}"
                ));
            }
        };

        let callable = Arc::clone(&tool.callable);
        match catch_unwind(AssertUnwindSafe(|| callable(&arguments))) {
            Ok(Ok(value)) => {
                log_debug!(tool = %name, "Tool executed");
                ToolOutput::success(value)
            }
            Ok(Err(e)) => {
                log_warn!(tool = %name, error = %e, "Tool returned an error");
                ToolOutput::error(format!("Error: tool '{name}' failed: {e:#}"))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log_warn!(tool = %name, panic = %message, "Tool panicked");
                ToolOutput::error(format!("Error: tool '{name}' panicked: {message}"))
            }
        }
    }
}

/// Parse raw arguments and check them against the signature
fn bind_arguments(signature: &ToolSignature, raw_arguments: &str) -> Result<ToolArguments, String> {
    let mut map = if raw_arguments.trim().is_empty() {
        Map::new()
    } else {
        match serde_json::from_str::<Value>(raw_arguments) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(format!(
                    "expected a JSON object, got {}",
                    json_type_name(&other)
                ))
            }
            Err(e) => return Err(format!("could not parse arguments as JSON: {e}")),
        }
    };

    if let Some(unexpected) = map.keys().find(|key| signature.get(key).is_none()) {
        return Err(format!("unexpected parameter '{unexpected}'"));
    }

    for parameter in signature.parameters() {
        if map.contains_key(&parameter.name) {
            continue;
        }
        match &parameter.default {
            Some(default) => {
                map.insert(parameter.name.clone(), default.clone());
            }
            None => return Err(format!("missing required parameter '{}'", parameter.name)),
        }
    }

    Ok(ToolArguments(map))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
