//! Declared parameters of a tool and the JSON Schema derived from them

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// JSON type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Integer,
    Number,
    Boolean,
    String,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::String => "string",
        }
    }

    /// Kind of a default value: whole number, decimal, boolean, else string
    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            _ => Self::String,
        }
    }
}

/// Maps a Rust parameter type to its [`ParameterKind`].
///
/// Types without an explicit mapping describe themselves as strings; implement
/// the trait with an empty body to opt a custom type in.
pub trait ParamType {
    fn parameter_kind() -> ParameterKind {
        ParameterKind::String
    }
}

macro_rules! param_kind {
    ($kind:expr => $($ty:ty),+) => {
        $(impl ParamType for $ty {
            fn parameter_kind() -> ParameterKind {
                $kind
            }
        })+
    };
}

param_kind!(ParameterKind::Integer => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
param_kind!(ParameterKind::Number => f32, f64);
param_kind!(ParameterKind::Boolean => bool);

impl ParamType for String {}
impl ParamType for &str {}
impl ParamType for char {}

/// One declared parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub kind: ParameterKind,
    /// Parameters without a default are required
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl ToolParameter {
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Ordered parameter list of a tool callable.
///
/// ```rust
/// use ai_helper::ToolSignature;
///
/// let signature = ToolSignature::new()
///     .param::<String>("city")
///     .param_with_default("days", 3)
///     .describe("city", "City name, e.g. Paris");
///
/// let schema = signature.to_json_schema();
/// assert_eq!(schema["properties"]["days"]["type"], "integer");
/// assert_eq!(schema["required"], serde_json::json!(["city"]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolSignature {
    parameters: Vec<ToolParameter>,
}

impl ToolSignature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required parameter typed after `T`
    pub fn param<T: ParamType>(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(ToolParameter {
            name: name.into(),
            kind: T::parameter_kind(),
            default: None,
            description: None,
        });
        self
    }

    /// Add an optional parameter typed after its default value
    pub fn param_with_default(
        mut self,
        name: impl Into<String>,
        default: impl Into<Value>,
    ) -> Self {
        let default = default.into();
        self.parameters.push(ToolParameter {
            name: name.into(),
            kind: ParameterKind::of_value(&default),
            default: Some(default),
            description: None,
        });
        self
    }

    /// Attach a description to an already declared parameter
    pub fn describe(mut self, name: &str, description: impl Into<String>) -> Self {
        if let Some(parameter) = self.parameters.iter_mut().find(|p| p.name == name) {
            parameter.description = Some(description.into());
        }
        self
    }

    pub fn parameters(&self) -> &[ToolParameter] {
        &self.parameters
    }

    pub fn get(&self, name: &str) -> Option<&ToolParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for parameter in &self.parameters {
            let mut property = json!({"type": parameter.kind.as_str()});
            if let Some(description) = &parameter.description {
                property["description"] = json!(description);
            }
            if let Some(default) = &parameter.default {
                property["default"] = default.clone();
            }
            properties.insert(parameter.name.clone(), property);
        }

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.is_required())
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}
