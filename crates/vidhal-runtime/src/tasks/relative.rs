//! Rebuild the caption ranking from pairwise questions.

use std::sync::Arc;

use vidhal_core::{
    rank_pairwise, OptionToRank, OracleError, PairQuestion, TaskKind, TaskOutput, VideoItem,
};

use crate::models::VideoModel;
use crate::prompts::{MCQA_MAIN_PROMPT, MCQA_SYSTEM_PROMPT};
use crate::usage::UsageTracker;

use super::{ask, TaskBehavior, TaskError};

pub struct RelativeOrderingTask {
    model: Arc<dyn VideoModel>,
}

impl RelativeOrderingTask {
    pub fn new(model: Arc<dyn VideoModel>) -> Self {
        Self { model }
    }
}

impl TaskBehavior for RelativeOrderingTask {
    fn kind(&self) -> TaskKind {
        TaskKind::RelativeOrdering
    }

    fn model_name(&self) -> &str {
        self.model.name()
    }

    fn run_item(
        &self,
        item: &VideoItem,
        option_to_rank: &OptionToRank,
        usage: &UsageTracker,
    ) -> Result<TaskOutput, TaskError> {
        // Each pair is a two-option multiple choice
        let mut oracle = |question: &PairQuestion<'_>| -> Result<String, OracleError> {
            let options = question
                .options_prompt()
                .map_err(|e| OracleError::Failed(e.to_string()))?;
            ask(
                self.model.as_ref(),
                item,
                MCQA_MAIN_PROMPT,
                MCQA_SYSTEM_PROMPT,
                &options,
                usage,
            )
            .map_err(|e| OracleError::Failed(e.to_string()))
        };

        let result = rank_pairwise(&item.captions, option_to_rank, &mut oracle)?;

        for outcome in result.comparisons.iter().filter(|c| c.parsed.is_none()) {
            usage.record_unparsed();
            tracing::warn!(
                video_id = %item.video_id,
                pair = ?outcome.pair,
                response = %outcome.response,
                "No option letter in pairwise answer"
            );
        }

        tracing::debug!(
            video_id = %item.video_id,
            order = ?result.order,
            queries = result.query_count(),
            accuracy = ?result.pairwise_accuracy(),
            "Relative ordering complete"
        );

        Ok(TaskOutput::Ordering(result.order))
    }
}
