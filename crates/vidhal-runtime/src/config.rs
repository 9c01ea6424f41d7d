//! Run configuration.
//!
//! A [`RunConfig`] can be written in YAML or JSON. Every field has a
//! default, so an empty file is a valid configuration.
//!
//! ```yaml
//! model: random
//! model_config:
//!   seed: 7
//! num_captions: 3
//! concurrency: 4
//! use_hint: true
//! item_timeout: 30s
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use vidhal_core::MAX_OPTIONS;

/// Errors from loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Registered model type (e.g. "random")
    pub model: String,

    /// Model-specific settings, passed to the model factory
    pub model_config: JsonValue,

    /// Options every display-order mapping must have
    pub num_captions: usize,

    /// Items processed at the same time
    pub concurrency: usize,

    /// Seed for generated display orders
    pub seed: Option<u64>,

    /// Append the worked example to ordering instructions
    pub use_hint: bool,

    /// Upper bound on one item's processing time (e.g. "30s")
    #[serde(with = "humantime_opt", skip_serializing_if = "Option::is_none")]
    pub item_timeout: Option<Duration>,
}

mod humantime_opt {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_str(&humantime::format_duration(*d).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| humantime::parse_duration(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model: "random".to_string(),
            model_config: JsonValue::Object(Default::default()),
            num_captions: 3,
            concurrency: 1,
            seed: None,
            use_hint: true,
            item_timeout: None,
        }
    }
}

impl RunConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` files are read as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=MAX_OPTIONS).contains(&self.num_captions) {
            return Err(ConfigError::Invalid(format!(
                "num_captions must be between 2 and {}, got {}",
                MAX_OPTIONS, self.num_captions
            )));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".into()));
        }
        if self.item_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::Invalid("item_timeout must be positive".into()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".into()));
        }
        Ok(())
    }
}
