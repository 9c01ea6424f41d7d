//! Response parsing.
//!
//! Turns unconstrained model text into either a single option label or an
//! ordered list of labels. Parsing never fails: malformed answers come back
//! as [`ParsedChoice::Unmatched`] or as a short (possibly empty) ordering,
//! and callers decide what an incomplete answer means.

mod patterns;
mod strategies;

pub use strategies::{
    condense, delimited_letters, insert_separators, segmented_letters, standalone_letters,
    within_range, Stage,
};

use crate::options::is_valid_option;
use crate::types::ParsedChoice;

use patterns::{letters, ANY_CASE_LETTER};

/// Extract the first standalone letter (either case) among the first `n`
/// options.
///
/// Returns the uppercased label, or the original text when no label is
/// present (e.g. the model repeated a caption instead of a letter).
pub fn parse_single_choice(text: &str, n: usize) -> ParsedChoice {
    letters(&ANY_CASE_LETTER, text)
        .into_iter()
        .find(|c| is_valid_option(*c, n))
        .map(ParsedChoice::Label)
        .unwrap_or_else(|| ParsedChoice::Unmatched(text.to_string()))
}

/// Extract an ordering of option labels from free text.
///
/// Runs the [`Stage::CASCADE`] over the separator-normalized text and stops
/// at the first stage that accepts its own result. When the cascade runs
/// out, a result no longer than `n` loses to a longer standalone-letter
/// result.
pub fn parse_ordering(text: &str, n: usize) -> Vec<char> {
    let normalized = insert_separators(text);

    let mut standalone: Option<Vec<char>> = None;
    let mut current: Vec<char> = Vec::new();

    for stage in Stage::CASCADE {
        if !stage.applies(&current, n) {
            break;
        }

        current = stage.extract(&normalized, n);
        if stage.accepts(&current, n) {
            tracing::trace!(stage = ?stage, ordering = ?current, "Ordering accepted");
            return current;
        }

        if standalone.is_none() {
            standalone = Some(current.clone());
        }
    }

    match standalone {
        Some(standalone) if current.len() <= n && standalone.len() > current.len() => standalone,
        _ => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_single_choice_in_range() {
        for n in 2..=4 {
            let last = (b'A' + n as u8 - 1) as char;
            let text = format!("The answer is {}.", last.to_ascii_lowercase());
            assert_eq!(parse_single_choice(&text, n), ParsedChoice::Label(last));
        }
    }

    #[test]
    fn test_single_choice_without_letter_returns_input() {
        // No standalone letter at all ("a" would count as option A)
        let text = "The man is riding one horse";
        for n in 2..=4 {
            assert_eq!(
                parse_single_choice(text, n),
                ParsedChoice::Unmatched(text.to_string())
            );
        }
    }

    #[test]
    fn test_single_choice_skips_out_of_range_letters() {
        assert_eq!(parse_single_choice("I pick D, no wait, B", 3), ParsedChoice::Label('B'));
        assert_eq!(
            parse_single_choice("Option D", 2),
            ParsedChoice::Unmatched("Option D".to_string())
        );
    }

    #[test]
    fn test_single_choice_requires_standalone_letter() {
        assert_eq!(
            parse_single_choice("Best caption", 2),
            ParsedChoice::Unmatched("Best caption".to_string())
        );
        assert_eq!(parse_single_choice("(B)", 2), ParsedChoice::Label('B'));
    }

    #[test]
    fn test_ordering_comma_separated() {
        assert_eq!(parse_ordering("A, B, C", 3), vec!['A', 'B', 'C']);
    }

    #[test]
    fn test_ordering_adjacent_letters() {
        assert_eq!(parse_ordering("ABC", 3), vec!['A', 'B', 'C']);
        assert_eq!(parse_ordering("CAB", 3), vec!['C', 'A', 'B']);
    }

    #[test]
    fn test_ordering_from_prose() {
        let parsed = parse_ordering("I think B is best, then A, then C.", 3);
        assert_eq!(parsed, vec!['B', 'A', 'C']);
    }

    #[test]
    fn test_ordering_collapses_repeated_mentions() {
        let parsed = parse_ordering("B B is the best, A is next, C C is last", 3);
        assert_eq!(parsed, vec!['B', 'A', 'C']);
    }

    #[test]
    fn test_ordering_falls_back_to_delimited_letters() {
        // Four standalone letters, but only two carry a delimiter
        let parsed = parse_ordering("A: best. B, then A or B", 3);
        assert_eq!(parsed, vec!['A', 'B']);
    }

    #[test]
    fn test_ordering_prefers_longer_standalone_result() {
        // Delimited pass finds nothing, so the partial standalone pass wins
        assert_eq!(parse_ordering("B then A", 3), vec!['B', 'A']);
    }

    #[test]
    fn test_ordering_keeps_standalone_result_over_segments() {
        let text = "Ranking: B, A, C.\nA: a dog running. B: a dog sitting. C: a cat.";
        assert_eq!(parse_ordering(text, 3), vec!['B', 'A', 'C', 'A', 'B', 'C']);
    }

    #[test]
    fn test_ordering_without_letters_is_empty() {
        assert!(parse_ordering("the dog is running", 3).is_empty());
    }

    #[test]
    fn test_ordering_is_deterministic() {
        let text = "A, B, C";
        let first = parse_ordering(text, 3);
        for _ in 0..5 {
            assert_eq!(parse_ordering(text, 3), first);
        }
    }

    proptest! {
        #[test]
        fn prop_parsing_never_panics_and_is_stable(text in ".{0,200}", n in 1usize..=26) {
            let ordering = parse_ordering(&text, n);
            prop_assert_eq!(&ordering, &parse_ordering(&text, n));
            prop_assert!(ordering.iter().all(|c| is_valid_option(*c, n)));

            match parse_single_choice(&text, n) {
                ParsedChoice::Label(c) => prop_assert!(is_valid_option(c, n)),
                ParsedChoice::Unmatched(original) => prop_assert_eq!(original, text),
            }
        }

        #[test]
        fn prop_clean_permutation_round_trips(perm in Just(vec!['A', 'B', 'C', 'D']).prop_shuffle()) {
            let text = perm.iter().map(char::to_string).collect::<Vec<_>>().join(", ");
            prop_assert_eq!(parse_ordering(&text, 4), perm);
        }
    }
}
