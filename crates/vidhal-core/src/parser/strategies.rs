//! Extraction stages of the ordering cascade.
//!
//! Each stage is a pure function of the (normalized) response and the
//! option count. [`Stage::CASCADE`] lists them from strictest to most
//! lenient; [`super::parse_ordering`] decides which result wins.

use crate::options::is_valid_option;

use super::patterns::{detached_letters, letters, DELIMITED_LETTER, STANDALONE_LETTER};

/// One step of the ordering cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Every standalone uppercase letter
    Standalone,

    /// Letters immediately followed by `:`, `.` or `,`
    Delimited,

    /// Best line or sentence when prose is interleaved with letters
    Segmented,
}

impl Stage {
    /// Stages in the order they are tried.
    pub const CASCADE: [Stage; 3] = [Stage::Standalone, Stage::Delimited, Stage::Segmented];

    /// Run this stage on already-normalized text.
    pub fn extract(self, text: &str, n: usize) -> Vec<char> {
        match self {
            Stage::Standalone => standalone_letters(text, n),
            Stage::Delimited => delimited_letters(text, n),
            Stage::Segmented => segmented_letters(text, n),
        }
    }

    /// Whether this stage runs, given the previous stage's result.
    ///
    /// Segmentation only pays off when the delimited pass over-matched.
    pub fn applies(self, previous: &[char], n: usize) -> bool {
        match self {
            Stage::Standalone | Stage::Delimited => true,
            Stage::Segmented => previous.len() > n,
        }
    }

    /// Whether this stage's result ends the cascade immediately.
    pub fn accepts(self, found: &[char], n: usize) -> bool {
        match self {
            Stage::Standalone => found.len() == n,
            Stage::Delimited => !found.is_empty() && found.len() <= n,
            Stage::Segmented => false,
        }
    }
}

/// Put `", "` between directly adjacent uppercase letters ("ABC" -> "A, B, C").
pub fn insert_separators(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 2);
    let mut prev_upper = false;

    for c in text.chars() {
        let upper = c.is_ascii_uppercase();
        if prev_upper && upper {
            out.push_str(", ");
        }
        out.push(c);
        prev_upper = upper;
    }

    out
}

/// Collapse runs of the same letter (explanations repeat the letter they explain).
pub fn condense(mut letters: Vec<char>) -> Vec<char> {
    letters.dedup();
    letters
}

/// Drop letters beyond the first `n` options.
pub fn within_range(letters: Vec<char>, n: usize) -> Vec<char> {
    letters
        .into_iter()
        .filter(|c| is_valid_option(*c, n))
        .collect()
}

/// Stage 2: standalone letters, condensed, then range-filtered.
pub fn standalone_letters(text: &str, n: usize) -> Vec<char> {
    within_range(condense(letters(&STANDALONE_LETTER, text)), n)
}

/// Stage 3: delimited letters, condensed, then range-filtered.
pub fn delimited_letters(text: &str, n: usize) -> Vec<char> {
    within_range(condense(letters(&DELIMITED_LETTER, text)), n)
}

/// Stage 4: look at each line, then each sentence, on its own.
///
/// A segment is a candidate when it holds between 2 and `n` detached
/// letters. The longest range-filtered candidate wins; ties go to the
/// first one seen (lines before sentences).
pub fn segmented_letters(text: &str, n: usize) -> Vec<char> {
    let mut candidates: Vec<Vec<char>> = Vec::new();

    for segment in text.split('\n').chain(text.split('.')) {
        let found = detached_letters(segment);
        if !(2..=n).contains(&found.len()) {
            continue;
        }

        let filtered = within_range(found, n);
        if !candidates.contains(&filtered) {
            candidates.push(filtered);
        }
    }

    candidates
        .into_iter()
        .fold(None::<Vec<char>>, |best, candidate| match best {
            Some(best) if best.len() >= candidate.len() => Some(best),
            _ => Some(candidate),
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_separators() {
        assert_eq!(insert_separators("ABC"), "A, B, C");
        assert_eq!(insert_separators("B, A, C"), "B, A, C");
        assert_eq!(insert_separators("Answer: CAB."), "Answer: C, A, B.");
    }

    #[test]
    fn test_condense_only_collapses_neighbours() {
        assert_eq!(condense(vec!['B', 'B', 'A', 'B']), vec!['B', 'A', 'B']);
    }

    #[test]
    fn test_within_range() {
        assert_eq!(within_range(vec!['I', 'B', 'D', 'A'], 3), vec!['B', 'A']);
    }

    #[test]
    fn test_standalone_stage_filters_after_condensing() {
        assert_eq!(standalone_letters("A X A", 3), vec!['A', 'A']);
        assert_eq!(standalone_letters("I think B, then A, then C", 3), vec!['B', 'A', 'C']);
    }

    #[test]
    fn test_delimited_stage_ignores_bare_letters() {
        assert_eq!(delimited_letters("B: best. I like A less", 3), vec!['B']);
    }

    #[test]
    fn test_segmented_stage_prefers_longest_segment() {
        let text = "My ranking is B, C\nA is a dog running; B is a dog sitting.\nFinal: B, A, C";
        assert_eq!(segmented_letters(text, 3), vec!['B', 'A', 'C']);
    }

    #[test]
    fn test_segmented_stage_ties_go_to_first_line() {
        let text = "Ranking: B, A, C.\nA: a dog running. B: a dog sitting. C: a cat.";
        assert_eq!(segmented_letters(text, 3), vec!['B', 'A', 'C']);
    }

    #[test]
    fn test_segmented_stage_skips_oversized_segments() {
        assert_eq!(segmented_letters("A B C D\nno letters here", 3), Vec::<char>::new());
    }

    #[test]
    fn test_stage_rules() {
        assert!(Stage::Standalone.accepts(&['A', 'B'], 2));
        assert!(!Stage::Standalone.accepts(&['A'], 2));
        assert!(Stage::Delimited.accepts(&['A'], 2));
        assert!(!Stage::Delimited.accepts(&[], 2));
        assert!(!Stage::Segmented.applies(&['A', 'B'], 2));
        assert!(Stage::Segmented.applies(&['A', 'B', 'A'], 2));
    }
}
