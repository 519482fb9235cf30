//! Structured extraction
//!
//! Salvages a typed record from unreliable model output. Fields that cannot be
//! converted fall back to their defaults and `fill_percentage` reports how much
//! of the schema was actually populated.
//!
//! ```rust
//! use ai_helper::{FieldKind, SchemaDescriptor, StructuredExtractor};
//!
//! let schema = SchemaDescriptor::new("person")
//!     .required("name", FieldKind::String)
//!     .required("age", FieldKind::Integer);
//!
//! let result = StructuredExtractor::parse(r#"{"name":"Bob","age":"thirty"}"#, &schema);
//! assert_eq!(result.get("name").unwrap(), "Bob");
//! assert_eq!(result.get("age").unwrap(), 0);
//! assert_eq!(result.fill_percentage, 50.0);
//! ```

mod extractor;
mod json_scan;
mod schema;

pub use extractor::{ExtractionResult, StructuredExtractor};
pub use schema::{FieldDescriptor, FieldKind, SchemaDescriptor};
