//! Rank every caption in a single answer.

use std::sync::Arc;

use vidhal_core::{parse_ordering, OptionToRank, TaskKind, TaskOutput, VideoItem};

use crate::models::VideoModel;
use crate::prompts::{naive_ordering_main_prompt, NAIVE_ORDERING_SYSTEM_PROMPT};
use crate::usage::UsageTracker;

use super::{ask, TaskBehavior, TaskError};

pub struct NaiveOrderingTask {
    model: Arc<dyn VideoModel>,
    main_prompt: String,
}

impl NaiveOrderingTask {
    pub fn new(model: Arc<dyn VideoModel>, use_hint: bool) -> Self {
        Self {
            model,
            main_prompt: naive_ordering_main_prompt(use_hint),
        }
    }
}

impl TaskBehavior for NaiveOrderingTask {
    fn kind(&self) -> TaskKind {
        TaskKind::NaiveOrdering
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
        let mapping = option_to_rank.project(&item.captions)?;
        let options = mapping.render_options(&item.captions)?;

        let response = ask(
            self.model.as_ref(),
            item,
            &self.main_prompt,
            NAIVE_ORDERING_SYSTEM_PROMPT,
            &options,
            usage,
        )?;

        let ordering = parse_ordering(&response, mapping.len());
        if ordering.len() != mapping.len() {
            usage.record_unparsed();
            tracing::warn!(
                video_id = %item.video_id,
                response = %response,
                parsed = ?ordering,
                "Ordering does not cover every option"
            );
        }

        Ok(TaskOutput::Ordering(ordering))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::NAIVE_ORDERING_HINT;
    use crate::tasks::testing::{item, mapping, ScriptedModel};

    #[test]
    fn test_ordering_answer() {
        let model = Arc::new(ScriptedModel::new(&["I think B is best, then A, then C."]));
        let task = NaiveOrderingTask::new(model.clone(), true);
        let usage = UsageTracker::new();

        let output = task
            .run_item(&item(&["1", "2", "3"]), &mapping(&["3", "1", "2"]), &usage)
            .unwrap();

        assert_eq!(output, TaskOutput::Ordering(vec!['B', 'A', 'C']));
        assert!(model.prompts.lock()[0].main.contains(NAIVE_ORDERING_HINT));
        assert_eq!(usage.snapshot().unparsed_answers, 0);
    }

    #[test]
    fn test_hint_can_be_disabled() {
        let model = Arc::new(ScriptedModel::new(&["A, B"]));
        let task = NaiveOrderingTask::new(model.clone(), false);

        task.run_item(&item(&["1", "2"]), &mapping(&["1", "2"]), &UsageTracker::new())
            .unwrap();

        assert!(!model.prompts.lock()[0].main.contains(NAIVE_ORDERING_HINT));
    }

    #[test]
    fn test_partial_ordering_is_counted() {
        let model = Arc::new(ScriptedModel::new(&["B then A"]));
        let task = NaiveOrderingTask::new(model, true);
        let usage = UsageTracker::new();

        let output = task
            .run_item(&item(&["1", "2", "3"]), &mapping(&["1", "2", "3"]), &usage)
            .unwrap();

        assert_eq!(output, TaskOutput::Ordering(vec!['B', 'A']));
        assert_eq!(usage.snapshot().unparsed_answers, 1);
    }

    #[test]
    fn test_model_failure_is_an_error() {
        let model = Arc::new(ScriptedModel::new(&[]));
        let task = NaiveOrderingTask::new(model, true);

        let result = task.run_item(&item(&["1", "2"]), &mapping(&["1", "2"]), &UsageTracker::new());
        assert!(matches!(result, Err(TaskError::Model(_))));
    }
}
