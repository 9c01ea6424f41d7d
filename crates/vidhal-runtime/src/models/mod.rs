//! Video model capability.
//!
//! A [`VideoModel`] is anything that can turn a prompt about a video into
//! free text. Real models (frame sampling, inference) live outside this
//! workspace and plug in through a [`ModelFactory`]; the built-in
//! [`RandomModel`] is the chance-level baseline.
//!
//! ## Usage
//!
//! ```ignore
//! let registry = ModelRegistry::with_defaults();
//! let model = registry.create("random", &serde_json::json!({"seed": 7}))?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use vidhal_core::VideoItem;

mod random;

pub use random::{RandomModel, RandomModelFactory};

/// Errors from model creation and generation.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid model config: {0}")]
    InvalidConfig(String),

    #[error("Generation failed: {0}")]
    Generation(String),
}

/// Prompt handed to a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// User-facing text: instructions followed by the options block
    pub main: String,

    /// System instructions, if the model takes them separately
    pub system: Option<String>,
}

/// Capability that answers prompts about a video.
///
/// Generation is blocking; callers run it off the async executor.
pub trait VideoModel: Send + Sync {
    /// Model name for logs and reports.
    fn name(&self) -> &str;

    /// Combine instructions and options into a prompt.
    ///
    /// The default places the options block after a blank line and keeps the
    /// system instructions separate.
    fn format_prompt(&self, main: &str, options: &str, system: Option<&str>) -> Prompt {
        Prompt {
            main: format!("{}\n\n{}", main, options),
            system: system.map(str::to_string),
        }
    }

    /// Generate a free-text answer for `item`.
    fn generate_response(&self, item: &VideoItem, prompt: &Prompt) -> Result<String, ModelError>;
}

/// Factory for creating models from configuration.
pub trait ModelFactory: Send + Sync {
    /// Unique identifier for this model type (e.g. "random").
    fn model_type(&self) -> &'static str;

    /// Create a model instance from JSON configuration.
    fn create(&self, config: &JsonValue) -> Result<Arc<dyn VideoModel>, ModelError>;

    /// Validate configuration without creating a model.
    fn validate_config(&self, config: &JsonValue) -> Result<(), ModelError>;

    fn default_config(&self) -> JsonValue {
        serde_json::json!({})
    }

    fn description(&self) -> &'static str {
        "Video model"
    }
}

/// Registry of available model factories, keyed by model type.
#[derive(Default)]
pub struct ModelRegistry {
    factories: BTreeMap<String, Arc<dyn ModelFactory>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in baseline registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(RandomModelFactory));
        registry
    }

    /// Register a factory, replacing any factory of the same type.
    pub fn register(&mut self, factory: Arc<dyn ModelFactory>) {
        self.factories
            .insert(factory.model_type().to_string(), factory);
    }

    /// Create a model from type name and configuration.
    pub fn create(
        &self,
        model_type: &str,
        config: &JsonValue,
    ) -> Result<Arc<dyn VideoModel>, ModelError> {
        self.factory(model_type)?.create(config)
    }

    pub fn validate(&self, model_type: &str, config: &JsonValue) -> Result<(), ModelError> {
        self.factory(model_type)?.validate_config(config)
    }

    pub fn available_types(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    pub fn has_model(&self, model_type: &str) -> bool {
        self.factories.contains_key(model_type)
    }

    pub fn default_config(&self, model_type: &str) -> Option<JsonValue> {
        self.factories.get(model_type).map(|f| f.default_config())
    }

    fn factory(&self, model_type: &str) -> Result<&Arc<dyn ModelFactory>, ModelError> {
        self.factories.get(model_type).ok_or_else(|| {
            ModelError::NotConfigured(format!(
                "Unknown model type: '{}'. Available: {:?}",
                model_type,
                self.available_types()
            ))
        })
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.available_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoModel {
        name: String,
    }

    impl VideoModel for EchoModel {
        fn name(&self) -> &str {
            &self.name
        }

        fn generate_response(&self, item: &VideoItem, _prompt: &Prompt) -> Result<String, ModelError> {
            Ok(item.video_id.clone())
        }
    }

    struct EchoModelFactory;

    impl ModelFactory for EchoModelFactory {
        fn model_type(&self) -> &'static str {
            "echo"
        }

        fn create(&self, config: &JsonValue) -> Result<Arc<dyn VideoModel>, ModelError> {
            let name = config["name"].as_str().unwrap_or("echo-model").to_string();
            Ok(Arc::new(EchoModel { name }))
        }

        fn validate_config(&self, _config: &JsonValue) -> Result<(), ModelError> {
            Ok(())
        }
    }

    #[test]
    fn test_default_prompt_layout() {
        let model = EchoModel { name: "echo".into() };
        let prompt = model.format_prompt("Pick one.", "A. x\nB. y", Some("Be brief."));

        assert_eq!(prompt.main, "Pick one.\n\nA. x\nB. y");
        assert_eq!(prompt.system.as_deref(), Some("Be brief."));
    }

    #[test]
    fn test_registry_register_and_create() {
        let mut registry = ModelRegistry::new();
        registry.register(Arc::new(EchoModelFactory));

        assert!(registry.has_model("echo"));
        assert!(!registry.has_model("unknown"));

        let model = registry
            .create("echo", &serde_json::json!({"name": "test-echo"}))
            .unwrap();
        assert_eq!(model.name(), "test-echo");
    }

    #[test]
    fn test_registry_unknown_model() {
        let registry = ModelRegistry::with_defaults();

        match registry.create("llava", &serde_json::json!({})) {
            Err(ModelError::NotConfigured(msg)) => {
                assert!(msg.contains("Unknown model type"));
                assert!(msg.contains("random"));
            }
            _ => panic!("Expected NotConfigured error"),
        }
    }

    #[test]
    fn test_registry_available_types() {
        let mut registry = ModelRegistry::with_defaults();
        registry.register(Arc::new(EchoModelFactory));
        assert_eq!(registry.available_types(), vec!["echo", "random"]);
        assert_eq!(registry.default_config("echo"), Some(serde_json::json!({})));
    }
}
