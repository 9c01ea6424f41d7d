//! Runner for a task over a whole dataset.
//!
//! The runner:
//! - Resolves every item's display order up front (fail fast on gaps)
//! - Runs items on tokio's blocking pool, bounded by a semaphore
//! - Applies the optional per-item timeout
//! - Aborts the run on the first item error

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use vidhal_core::{
    Dataset, DisplayOrder, DisplayOrderError, OptionToRank, TaskKind, TaskOutput, VideoItem,
};

use crate::config::RunConfig;
use crate::models::ModelRegistry;
use crate::tasks::{build_task, TaskBehavior};
use crate::usage::{RunUsage, UsageTracker};
use crate::RuntimeError;

/// Result of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub task: TaskKind,

    pub model: String,

    pub started_at: DateTime<Utc>,

    pub finished_at: DateTime<Utc>,

    /// Parsed output per video
    pub responses: BTreeMap<String, TaskOutput>,

    pub usage: RunUsage,
}

impl RunReport {
    /// Pretty `{video_id: response}` JSON.
    pub fn responses_json(&self) -> Result<String, RuntimeError> {
        Ok(serde_json::to_string_pretty(&self.responses)?)
    }

    /// Write the responses to `path`, creating parent directories.
    pub fn save_responses(&self, path: impl AsRef<Path>) -> Result<(), RuntimeError> {
        let path = path.as_ref();
        let io_err = |source| RuntimeError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, self.responses_json()?).map_err(io_err)
    }
}

/// Drives one task over a dataset.
pub struct Runner {
    task: Arc<dyn TaskBehavior>,
    config: RunConfig,
    usage: Arc<UsageTracker>,
}

impl Runner {
    pub fn new(task: Arc<dyn TaskBehavior>, config: RunConfig) -> Self {
        Self {
            task,
            config,
            usage: Arc::new(UsageTracker::new()),
        }
    }

    /// Create the configured model from `registry` and wrap it in `kind`.
    pub fn from_config(
        kind: TaskKind,
        registry: &ModelRegistry,
        config: RunConfig,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;
        let model = registry.create(&config.model, &config.model_config)?;
        let task = build_task(kind, model, &config);
        Ok(Self::new(task, config))
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Get current usage.
    pub fn usage(&self) -> RunUsage {
        self.usage.snapshot()
    }

    /// Pair each item with its mapping.
    ///
    /// The mapping is checked after projection onto the item's captions, so
    /// an item with fewer captions runs with fewer options, while a mapping
    /// offering more than `num_captions` options is rejected.
    fn resolve(
        &self,
        dataset: &Dataset,
        display_order: &DisplayOrder,
    ) -> Result<Vec<(VideoItem, OptionToRank)>, DisplayOrderError> {
        dataset
            .items()
            .iter()
            .map(|item| {
                let mapping = display_order.get(&item.video_id)?;
                let projected =
                    mapping
                        .project(&item.captions)
                        .map_err(|source| DisplayOrderError::Mapping {
                            video_id: item.video_id.clone(),
                            source,
                        })?;
                if projected.len() > self.config.num_captions {
                    return Err(DisplayOrderError::OptionCount {
                        video_id: item.video_id.clone(),
                        expected: self.config.num_captions,
                        found: projected.len(),
                    });
                }
                Ok((item.clone(), mapping.clone()))
            })
            .collect()
    }

    /// Run the task over every item of `dataset`.
    pub async fn run(
        &self,
        dataset: &Dataset,
        display_order: &DisplayOrder,
    ) -> Result<RunReport, RuntimeError> {
        let started_at = Utc::now();
        let jobs = self.resolve(dataset, display_order)?;
        let total = jobs.len();

        tracing::info!(
            task = %self.task.kind(),
            model = self.task.model_name(),
            items = total,
            concurrency = self.config.concurrency,
            "Starting run"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let mut workers = JoinSet::new();

        for (item, mapping) in jobs {
            let semaphore = Arc::clone(&semaphore);
            let task = Arc::clone(&self.task);
            let usage = Arc::clone(&self.usage);
            let item_timeout = self.config.item_timeout;

            workers.spawn(async move {
                let video_id = item.video_id.clone();
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (video_id, Err(RuntimeError::Cancelled)),
                };

                let work = tokio::task::spawn_blocking(move || {
                    let output = task.run_item(&item, &mapping, &usage);
                    usage.record_item();
                    output
                });

                let joined = match item_timeout {
                    Some(limit) => match tokio::time::timeout(limit, work).await {
                        Ok(joined) => joined,
                        Err(_) => {
                            tracing::warn!(video_id = %video_id, timeout = ?limit, "Item timed out");
                            return (video_id.clone(), Err(RuntimeError::Timeout { video_id, limit }));
                        }
                    },
                    None => work.await,
                };

                let result = match joined {
                    Ok(output) => output.map_err(|source| RuntimeError::Task {
                        video_id: video_id.clone(),
                        source,
                    }),
                    Err(e) => Err(RuntimeError::Worker(e.to_string())),
                };
                (video_id, result)
            });
        }

        let mut responses = BTreeMap::new();
        while let Some(joined) = workers.join_next().await {
            let (video_id, result) = joined.map_err(|e| RuntimeError::Worker(e.to_string()))?;
            match result {
                Ok(output) => {
                    responses.insert(video_id.clone(), output);
                    tracing::debug!(video_id = %video_id, completed = responses.len(), total, "Item complete");
                }
                Err(e) => {
                    tracing::error!(video_id = %video_id, error = %e, "Aborting run");
                    workers.abort_all();
                    return Err(e);
                }
            }
        }

        let usage = self.usage.snapshot();
        tracing::info!(
            items = responses.len(),
            model_calls = usage.model_calls,
            unparsed = usage.unparsed_answers,
            "Run complete"
        );

        Ok(RunReport {
            task: self.task.kind(),
            model: self.task.model_name().to_string(),
            started_at,
            finished_at: Utc::now(),
            responses,
            usage,
        })
    }
}
