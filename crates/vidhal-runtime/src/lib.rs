//! # vidhal-runtime
//!
//! Model-facing side of VidHal evaluation.
//!
//! This crate runs the three evaluation tasks against a video model:
//! - MCQA: pick the caption that best describes the video
//! - Naive ordering: rank every caption in one answer
//! - Relative ordering: rebuild the ranking from pairwise questions
//!
//! ## Important
//!
//! Models are plugged in through [`ModelFactory`]; only the random
//! baseline ships here. All parsing and ranking logic lives in
//! `vidhal-core` and is deterministic.
//!
//! ## Example
//!
//! ```rust,ignore
//! use vidhal_core::{Dataset, DisplayOrder, TaskKind};
//! use vidhal_runtime::{ModelRegistry, RunConfig, Runner};
//!
//! let dataset = Dataset::from_json_file("annotations.json", "videos/")?;
//! let order = DisplayOrder::from_json_file("options.json")?;
//!
//! let runner = Runner::from_config(TaskKind::RelativeOrdering, &ModelRegistry::with_defaults(), RunConfig::default())?;
//! let report = runner.run(&dataset, &order).await?;
//! report.save_responses("results/random_relative.json")?;
//! ```

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use vidhal_core::{DatasetError, DisplayOrderError};

pub mod config;
pub mod models;
pub mod prompts;
pub mod runner;
pub mod tasks;
pub mod usage;

pub use config::{ConfigError, RunConfig};
pub use models::{
    ModelError, ModelFactory, ModelRegistry, Prompt, RandomModel, RandomModelFactory, VideoModel,
};
pub use runner::{RunReport, Runner};
pub use tasks::{
    build_task, McqaTask, NaiveOrderingTask, RelativeOrderingTask, TaskBehavior, TaskError,
};
pub use usage::{RunUsage, UsageTracker};

/// Errors from the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Display order error: {0}")]
    DisplayOrder(#[from] DisplayOrderError),

    #[error("Item {video_id} failed: {source}")]
    Task {
        video_id: String,
        #[source]
        source: TaskError,
    },

    #[error("Item {video_id} timed out after {limit:?}")]
    Timeout { video_id: String, limit: Duration },

    #[error("Worker failed: {0}")]
    Worker(String),

    #[error("Run cancelled")]
    Cancelled,

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_item() {
        let err = RuntimeError::Timeout {
            video_id: "v7".into(),
            limit: Duration::from_secs(2),
        };
        assert_eq!(err.to_string(), "Item v7 timed out after 2s");

        let err = RuntimeError::Task {
            video_id: "v8".into(),
            source: TaskError::Model(ModelError::Generation("boom".into())),
        };
        assert!(err.to_string().contains("v8"));
        assert!(err.to_string().contains("boom"));
    }
}
