//! Instruction texts shown to video models.
//!
//! Every prompt has two parts:
//! 1. System instructions (task framing and answer format)
//! 2. Main instructions, followed by the rendered options block
//!
//! Relative ordering reuses the MCQA texts: each pairwise question is a
//! two-option multiple choice.

/// System instructions for picking the single best caption.
pub const MCQA_SYSTEM_PROMPT: &str = "You are provided with a video and a set of several captions. \
Your task is to watch the video provided carefully, and select the caption that best describes the video. \
Provide your answer only as a single letter representing the option whose caption that best describes the video, without any explanation.";

/// Main instructions for picking the single best caption.
pub const MCQA_MAIN_PROMPT: &str =
    "Watch the video provided, and choose the option whose caption describes the video most accurately.";

/// System instructions for ranking all captions in one answer.
pub const NAIVE_ORDERING_SYSTEM_PROMPT: &str = "You are provided with a video and a set of several captions. \
Your task is to order the captions in order of most to least relevant based on their alignment with the contents of the video. \
Provide your answer without any further explanation.";

/// Main instructions for ranking all captions in one answer.
pub const NAIVE_ORDERING_MAIN_PROMPT: &str = "Watch the video provided, and rank the captions below in order from the most accurate to the least accurate in describing the video. \
Provide your response only as a sequence of comma separated option letters matching the corresponding captions. \
Do not give any additional explanation for your answer.";

/// Worked example appended to the ordering instructions.
pub const NAIVE_ORDERING_HINT: &str = "For example, if option B contains the caption that best describes the video, \
option A contains the caption that describes the video second best and \
option C contains the caption that describes the video least accurately, provide your response as: B, A, C.";

/// Ordering main instructions, with the worked example when `use_hint` is set.
pub fn naive_ordering_main_prompt(use_hint: bool) -> String {
    if use_hint {
        format!("{}\n{}", NAIVE_ORDERING_MAIN_PROMPT, NAIVE_ORDERING_HINT)
    } else {
        NAIVE_ORDERING_MAIN_PROMPT.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_is_optional() {
        let with_hint = naive_ordering_main_prompt(true);
        assert!(with_hint.starts_with(NAIVE_ORDERING_MAIN_PROMPT));
        assert!(with_hint.ends_with("B, A, C."));

        assert_eq!(naive_ordering_main_prompt(false), NAIVE_ORDERING_MAIN_PROMPT);
    }

    #[test]
    fn test_ordering_prompts_mention_order() {
        // The random baseline keys off this word
        assert!(NAIVE_ORDERING_MAIN_PROMPT.contains("order"));
        assert!(!MCQA_MAIN_PROMPT.contains("order"));
    }

    #[test]
    fn test_answer_format_is_stated() {
        assert!(MCQA_SYSTEM_PROMPT.contains("single letter"));
        assert!(NAIVE_ORDERING_MAIN_PROMPT.contains("comma separated option letters"));
    }
}
