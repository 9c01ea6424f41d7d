//! Pick the single best caption.

use std::sync::Arc;

use vidhal_core::{parse_single_choice, OptionToRank, TaskKind, TaskOutput, VideoItem};

use crate::models::VideoModel;
use crate::prompts::{MCQA_MAIN_PROMPT, MCQA_SYSTEM_PROMPT};
use crate::usage::UsageTracker;

use super::{ask, TaskBehavior, TaskError};

pub struct McqaTask {
    model: Arc<dyn VideoModel>,
}

impl McqaTask {
    pub fn new(model: Arc<dyn VideoModel>) -> Self {
        Self { model }
    }
}

impl TaskBehavior for McqaTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Mcqa
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
            MCQA_MAIN_PROMPT,
            MCQA_SYSTEM_PROMPT,
            &options,
            usage,
        )?;

        let parsed = parse_single_choice(&response, mapping.len());
        if !parsed.is_label() {
            usage.record_unparsed();
            tracing::warn!(video_id = %item.video_id, response = %response, "No option letter in answer");
        }

        Ok(TaskOutput::Choice(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::testing::{item, mapping, ScriptedModel};
    use vidhal_core::ParsedChoice;

    #[test]
    fn test_prompt_and_parse() {
        let model = Arc::new(ScriptedModel::new(&["The answer is c."]));
        let task = McqaTask::new(model.clone());
        let usage = UsageTracker::new();

        let output = task
            .run_item(&item(&["1", "2", "3"]), &mapping(&["2", "3", "1"]), &usage)
            .unwrap();

        assert_eq!(output, TaskOutput::Choice(ParsedChoice::Label('C')));

        let prompts = model.prompts.lock();
        assert!(prompts[0].main.starts_with(MCQA_MAIN_PROMPT));
        assert!(prompts[0]
            .main
            .ends_with("A. caption 2\nB. caption 3\nC. caption 1"));
        assert_eq!(prompts[0].system.as_deref(), Some(MCQA_SYSTEM_PROMPT));
        assert_eq!(usage.snapshot().model_calls, 1);
    }

    #[test]
    fn test_caption_answer_is_kept_verbatim() {
        let model = Arc::new(ScriptedModel::new(&["The dog is sitting"]));
        let task = McqaTask::new(model);
        let usage = UsageTracker::new();

        let output = task
            .run_item(&item(&["1", "2"]), &mapping(&["1", "2"]), &usage)
            .unwrap();

        assert_eq!(
            output,
            TaskOutput::Choice(ParsedChoice::Unmatched("The dog is sitting".into()))
        );
        assert_eq!(usage.snapshot().unparsed_answers, 1);
    }

    #[test]
    fn test_missing_caption_shrinks_option_range() {
        // Only two captions, so "C" is out of range
        let model = Arc::new(ScriptedModel::new(&["C"]));
        let task = McqaTask::new(model);

        let output = task
            .run_item(&item(&["1", "3"]), &mapping(&["1", "2", "3"]), &UsageTracker::new())
            .unwrap();

        assert_eq!(output, TaskOutput::Choice(ParsedChoice::Unmatched("C".into())));
    }
}
