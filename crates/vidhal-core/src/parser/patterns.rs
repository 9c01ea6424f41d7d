//! Shared letter-extraction patterns.
//!
//! Every pattern matches exactly one letter, so `find_iter` visits the same
//! positions a look-around engine would. Context checks the `regex` crate
//! cannot express (what precedes a letter) are done on the surrounding text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Single letter of either case standing alone between word breaks.
    pub static ref ANY_CASE_LETTER: Regex = Regex::new(r"\b[a-zA-Z]\b").unwrap();

    /// Single uppercase letter standing alone between word breaks.
    pub static ref STANDALONE_LETTER: Regex = Regex::new(r"\b[A-Z]\b").unwrap();

    /// Uppercase letter starting a word and followed by `:`, `.` or `,`.
    pub static ref DELIMITED_LETTER: Regex = Regex::new(r"\b[A-Z][:.,]").unwrap();

    /// Uppercase letter ending a word.
    pub static ref TRAILING_LETTER: Regex = Regex::new(r"[A-Z]\b").unwrap();
}

/// Characters trimmed from an extracted token.
const TOKEN_PUNCTUATION: &[char] = &[';', ':', '.', ',', ' '];

/// Uppercase the first letter of a matched token, dropping punctuation.
pub fn token_letter(token: &str) -> Option<char> {
    token
        .trim_matches(TOKEN_PUNCTUATION)
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
}

/// Letters matched by `pattern`, in order of appearance.
pub fn letters(pattern: &Regex, text: &str) -> Vec<char> {
    pattern
        .find_iter(text)
        .filter_map(|m| token_letter(m.as_str()))
        .collect()
}

/// Uppercase letters ending a word that are not glued to a preceding
/// letter or apostrophe (so "I'M" or "xB" do not count).
pub fn detached_letters(text: &str) -> Vec<char> {
    TRAILING_LETTER
        .find_iter(text)
        .filter(|m| {
            !text[..m.start()]
                .chars()
                .next_back()
                .is_some_and(|prev| prev.is_ascii_alphabetic() || prev == '\'')
        })
        .filter_map(|m| m.as_str().chars().next())
        .collect()
}
