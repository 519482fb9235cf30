//! Caller-declared target shapes for structured extraction

use crate::error::{LlmError, LlmResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

/// Declared type of a schema field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
    Array(Box<FieldKind>),
    Object,
}

impl FieldKind {
    /// Convenience constructor for `Array(Box::new(item))`
    pub fn array_of(item: FieldKind) -> Self {
        Self::Array(Box::new(item))
    }

    /// Type-appropriate default used when a field cannot be populated
    pub fn default_value(&self) -> Value {
        match self {
            Self::String => Value::String(String::new()),
            Self::Integer => json!(0),
            Self::Number => json!(0.0),
            Self::Boolean => Value::Bool(false),
            Self::Array(_) => Value::Array(Vec::new()),
            Self::Object => Value::Object(Map::new()),
        }
    }

    /// JSON Schema fragment for this kind
    pub fn to_json_schema(&self) -> Value {
        match self {
            Self::String => json!({"type": "string"}),
            Self::Integer => json!({"type": "integer"}),
            Self::Number => json!({"type": "number"}),
            Self::Boolean => json!({"type": "boolean"}),
            Self::Array(item) => json!({"type": "array", "items": item.to_json_schema()}),
            Self::Object => json!({"type": "object"}),
        }
    }

    /// Lenient conversion of `value` into this kind.
    ///
    /// Returns `None` when the value cannot represent the kind; `null` never can.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (_, Value::Null) => None,
            (Self::String, Value::String(s)) => Some(Value::String(s.clone())),
            (Self::Integer, Value::Number(n)) => integer_from_number(n),
            (Self::Integer, Value::String(s)) => integer_from_str(s),
            (Self::Number, Value::Number(n)) => n.as_f64().and_then(float_value),
            (Self::Number, Value::String(s)) => s.trim().parse::<f64>().ok().and_then(float_value),
            (Self::Boolean, Value::Bool(b)) => Some(Value::Bool(*b)),
            (Self::Boolean, Value::Number(n)) => match n.as_i64() {
                Some(0) => Some(Value::Bool(false)),
                Some(1) => Some(Value::Bool(true)),
                _ => None,
            },
            (Self::Boolean, Value::String(s)) => bool_from_str(s).map(Value::Bool),
            (Self::Array(item), Value::Array(values)) => values
                .iter()
                .map(|v| item.coerce(v))
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            (Self::Object, Value::Object(map)) => Some(Value::Object(map.clone())),
            _ => None,
        }
    }
}

fn integer_from_number(n: &serde_json::Number) -> Option<Value> {
    if let Some(i) = n.as_i64() {
        return Some(json!(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(json!(u));
    }
    let f = n.as_f64()?;
    integral_f64_to_i64(f).map(|i| json!(i))
}

fn integer_from_str(s: &str) -> Option<Value> {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(json!(i));
    }
    s.parse::<f64>()
        .ok()
        .and_then(integral_f64_to_i64)
        .map(|i| json!(i))
}

fn integral_f64_to_i64(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn float_value(f: f64) -> Option<Value> {
    serde_json::Number::from_f64(f).map(Value::Number)
}

fn bool_from_str(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// One named, typed field of a [`SchemaDescriptor`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Overrides the kind's default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldDescriptor {
    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            description: None,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Value the field holds when nothing could be extracted for it.
    ///
    /// An explicit default is normalised through the field's kind, so `5` and
    /// `5.0` compare equal for a number field.
    pub fn default_value(&self) -> Value {
        self.default
            .as_ref()
            .and_then(|default| self.kind.coerce(default))
            .unwrap_or_else(|| self.kind.default_value())
    }
}

/// Target record shape for structured extraction.
///
/// ```rust
/// use ai_helper::{FieldKind, SchemaDescriptor};
///
/// let schema = SchemaDescriptor::new("person")
///     .required("name", FieldKind::String)
///     .optional("age", FieldKind::Integer);
/// assert_eq!(schema.fields().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl SchemaDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn required(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.field(FieldDescriptor::required(name, kind))
    }

    pub fn optional(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.field(FieldDescriptor::optional(name, kind))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// JSON Schema rendering handed to adapters as the response format
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut property = field.kind.to_json_schema();
            if let (Some(description), Value::Object(obj)) = (&field.description, &mut property) {
                obj.insert("description".to_string(), json!(description));
            }
            properties.insert(field.name.clone(), property);
        }

        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Reject descriptors no extraction could honour.
    pub fn validate(&self) -> LlmResult<()> {
        if self.name.trim().is_empty() {
            return Err(LlmError::configuration_error("Schema name must not be empty"));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(LlmError::configuration_error(format!(
                    "Schema '{}' has a field with an empty name",
                    self.name
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(LlmError::configuration_error(format!(
                    "Schema '{}' declares field '{}' more than once",
                    self.name, field.name
                )));
            }
            if let Some(default) = &field.default {
                if field.kind.coerce(default).is_none() {
                    return Err(LlmError::configuration_error(format!(
                        "Default for field '{}' does not match its declared kind",
                        field.name
                    )));
                }
            }
        }
        Ok(())
    }
}
