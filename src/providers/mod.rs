//! Provider selection and the concrete adapter
//!
//! A model is named `provider:model` (or `vendor/model` for OpenRouter). The tag is
//! parsed into a [`Provider`] and the [`AdapterFactory`] maps each provider to one
//! adapter constructor:
//!
//! ```text
//! "openai:gpt-4o" -> ModelIdentifier { OpenAi, "gpt-4o" }
//!                 -> AdapterFactory::create -> Arc<dyn Adapter>
//! ```

mod factory;
mod model_id;
pub mod openai_compatible;

pub use factory::{AdapterConstructor, AdapterFactory};
pub use model_id::{ModelIdentifier, Provider};
pub use openai_compatible::OpenAiCompatibleAdapter;
