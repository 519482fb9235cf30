//! Lenient, per-field extraction of model output into a schema instance

use crate::error::{LlmError, LlmResult};
use crate::extraction::json_scan::parse_object;
use crate::extraction::schema::SchemaDescriptor;
use crate::logging::log_debug;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Best-effort instance of a [`SchemaDescriptor`].
///
/// Every declared field is present in `instance`, holding either the extracted
/// value or the field's default.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub instance: Map<String, Value>,
    /// Share of fields holding a non-default value, in `[0, 100]`
    pub fill_percentage: f64,
    populated: Vec<String>,
}

impl ExtractionResult {
    /// Names of the fields whose value differs from their default, in schema order
    pub fn populated_fields(&self) -> &[String] {
        &self.populated
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.instance.get(field)
    }

    /// Deserialize the instance into a caller-defined type
    pub fn deserialize<T: DeserializeOwned>(&self) -> LlmResult<T> {
        serde_json::from_value(Value::Object(self.instance.clone())).map_err(|e| {
            LlmError::response_parsing_error(format!(
                "Extracted instance does not fit the target type: {e}"
            ))
        })
    }
}

/// Turns raw model text into an [`ExtractionResult`]; never fails.
pub struct StructuredExtractor;

impl StructuredExtractor {
    /// Extract `schema` from `text`.
    ///
    /// Each field is converted on its own: a value of the wrong type is
    /// discarded and the field keeps its default, the rest of the record is
    /// unaffected.
    pub fn parse(text: &str, schema: &SchemaDescriptor) -> ExtractionResult {
        let parsed = parse_object(text).unwrap_or_default();

        let mut instance = Map::new();
        let mut populated = Vec::new();
        let mut discarded = 0usize;

        for field in schema.fields() {
            let default = field.default_value();
            let value = match parsed.get(&field.name) {
                Some(raw) => field.kind.coerce(raw).unwrap_or_else(|| {
                    discarded += 1;
                    default.clone()
                }),
                None => default.clone(),
            };

            if value != default {
                populated.push(field.name.clone());
            }
            instance.insert(field.name.clone(), value);
        }

        let total = schema.fields().len();
        let fill_percentage = if total == 0 {
            0.0
        } else {
            populated.len() as f64 * 100.0 / total as f64
        };

        log_debug!(
            schema = schema.name(),
            fields = total,
            populated = populated.len(),
            discarded = discarded,
            fill_percentage = fill_percentage,
            "Structured extraction complete"
        );

        ExtractionResult {
            instance,
            fill_percentage,
            populated,
        }
    }
}
