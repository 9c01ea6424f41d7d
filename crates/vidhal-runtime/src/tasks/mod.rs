//! Evaluation tasks.
//!
//! Each task is a behaviour composed over a [`VideoModel`]: it builds the
//! prompt for one item, calls the model, and parses the answer into a
//! [`TaskOutput`].

use std::sync::Arc;

use thiserror::Error;

use vidhal_core::{OptionToRank, OptionsError, RankingError, TaskKind, TaskOutput, VideoItem};

use crate::config::RunConfig;
use crate::models::{ModelError, VideoModel};
use crate::usage::UsageTracker;

mod mcqa;
mod naive;
mod relative;

pub use mcqa::McqaTask;
pub use naive::NaiveOrderingTask;
pub use relative::RelativeOrderingTask;

/// Errors from processing one item.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Invalid options: {0}")]
    Options(#[from] OptionsError),

    #[error("Ranking failed: {0}")]
    Ranking(#[from] RankingError),
}

/// One evaluation task.
pub trait TaskBehavior: Send + Sync {
    fn kind(&self) -> TaskKind;

    /// Name of the model answering the task.
    fn model_name(&self) -> &str;

    /// Process one item under its display order. Blocking.
    fn run_item(
        &self,
        item: &VideoItem,
        option_to_rank: &OptionToRank,
        usage: &UsageTracker,
    ) -> Result<TaskOutput, TaskError>;
}

/// Select the behaviour for `kind`.
pub fn build_task(
    kind: TaskKind,
    model: Arc<dyn VideoModel>,
    config: &RunConfig,
) -> Arc<dyn TaskBehavior> {
    match kind {
        TaskKind::Mcqa => Arc::new(McqaTask::new(model)),
        TaskKind::NaiveOrdering => Arc::new(NaiveOrderingTask::new(model, config.use_hint)),
        TaskKind::RelativeOrdering => Arc::new(RelativeOrderingTask::new(model)),
    }
}

/// Prompt `model` once with `main` and `system` over the options block.
fn ask(
    model: &dyn VideoModel,
    item: &VideoItem,
    main: &str,
    system: &str,
    options: &str,
    usage: &UsageTracker,
) -> Result<String, ModelError> {
    let prompt = model.format_prompt(main, options, Some(system));
    usage.record_call();
    model.generate_response(item, &prompt)
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedModel;
    use super::*;

    #[test]
    fn test_build_task_selects_behaviour() {
        let model: Arc<dyn VideoModel> = Arc::new(ScriptedModel::new(&[]));
        let config = RunConfig::default();

        for kind in [TaskKind::Mcqa, TaskKind::NaiveOrdering, TaskKind::RelativeOrdering] {
            let task = build_task(kind, Arc::clone(&model), &config);
            assert_eq!(task.kind(), kind);
            assert_eq!(task.model_name(), "scripted");
        }
    }
}
