//! Option labels and the option-to-rank bijection.
//!
//! Labels are the first N uppercase letters. An [`OptionToRank`] assigns one
//! rank to each label and is the only way display identity and rank identity
//! are connected.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Captions, Rank};

/// Upper bound on the number of options (one per Latin letter).
pub const MAX_OPTIONS: usize = 26;

/// Errors raised when building or using an option mapping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    #[error("Option count {0} outside 1..=26")]
    InvalidCount(usize),

    #[error("Option labels must be the contiguous prefix starting at 'A', found {0:?}")]
    NonContiguousLabels(Vec<char>),

    #[error("Invalid option label: {0:?}")]
    InvalidLabel(String),

    #[error("Rank {0} is assigned to more than one option")]
    DuplicateRank(String),

    #[error("No caption for rank {0}")]
    MissingCaption(String),

    #[error("Unknown option label: {0}")]
    UnknownLabel(char),
}

/// The first `n` option labels, in order.
pub fn option_letters(n: usize) -> impl Iterator<Item = char> {
    (0..n.min(MAX_OPTIONS) as u8).map(|i| (b'A' + i) as char)
}

/// Label at a zero-based position.
pub fn option_label(index: usize) -> Option<char> {
    (index < MAX_OPTIONS).then(|| (b'A' + index as u8) as char)
}

/// Whether `c` is one of the first `n` labels.
pub fn is_valid_option(c: char, n: usize) -> bool {
    c.is_ascii_uppercase() && ((c as u8 - b'A') as usize) < n.min(MAX_OPTIONS)
}

/// Compare two ranks; the smaller one is preferred.
///
/// Integer ranks compare numerically, anything else lexicographically.
pub fn compare_ranks(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.trim(), b.trim());
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

/// Bijection from option labels `A..` to caption ranks.
///
/// Position `i` holds the rank shown under label `'A' + i`, so labels are a
/// contiguous prefix by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct OptionToRank {
    ranks: Vec<Rank>,
}

impl OptionToRank {
    /// Assign labels `A, B, C, ...` to `ranks` in the given order.
    pub fn from_ranks<I, R>(ranks: I) -> Result<Self, OptionsError>
    where
        I: IntoIterator<Item = R>,
        R: Into<Rank>,
    {
        let ranks: Vec<Rank> = ranks.into_iter().map(Into::into).collect();

        if ranks.is_empty() || ranks.len() > MAX_OPTIONS {
            return Err(OptionsError::InvalidCount(ranks.len()));
        }

        let mut seen = HashSet::new();
        for rank in &ranks {
            if !seen.insert(rank.as_str()) {
                return Err(OptionsError::DuplicateRank(rank.clone()));
            }
        }

        Ok(Self { ranks })
    }

    /// Build from explicit `(label, rank)` pairs in any order.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, OptionsError>
    where
        I: IntoIterator<Item = (char, Rank)>,
    {
        let mut pairs: Vec<(char, Rank)> = pairs.into_iter().collect();
        pairs.sort_by_key(|(label, _)| *label);

        let labels: Vec<char> = pairs.iter().map(|(label, _)| *label).collect();
        if !labels.iter().copied().eq(option_letters(labels.len())) {
            return Err(OptionsError::NonContiguousLabels(labels));
        }

        Self::from_ranks(pairs.into_iter().map(|(_, rank)| rank))
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Labels in canonical (alphabetical) order.
    pub fn labels(&self) -> impl Iterator<Item = char> + '_ {
        option_letters(self.ranks.len())
    }

    /// `(label, rank)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> + '_ {
        self.labels().zip(self.ranks.iter().map(String::as_str))
    }

    /// Rank shown under `label`.
    pub fn rank_of(&self, label: char) -> Option<&str> {
        if !is_valid_option(label, self.ranks.len()) {
            return None;
        }
        self.ranks
            .get((label as u8 - b'A') as usize)
            .map(String::as_str)
    }

    fn require_rank(&self, label: char) -> Result<&str, OptionsError> {
        self.rank_of(label).ok_or(OptionsError::UnknownLabel(label))
    }

    /// Of two labels, the one whose rank is preferred.
    pub fn preferred(&self, a: char, b: char) -> Result<char, OptionsError> {
        let (rank_a, rank_b) = (self.require_rank(a)?, self.require_rank(b)?);
        Ok(match compare_ranks(rank_a, rank_b) {
            Ordering::Greater => b,
            _ => a,
        })
    }

    /// Of two labels, the one whose rank is not preferred.
    pub fn less_preferred(&self, a: char, b: char) -> Result<char, OptionsError> {
        let winner = self.preferred(a, b)?;
        Ok(if winner == a { b } else { a })
    }

    /// Restrict the mapping to ranks that have a caption.
    ///
    /// Surviving options keep their relative label order and are relabeled
    /// to a contiguous prefix, so `{A: 1, B: 2, C: 3}` over captions for
    /// ranks 1 and 3 becomes `{A: 1, B: 3}`.
    pub fn project(&self, captions: &Captions) -> Result<Self, OptionsError> {
        if self.ranks.iter().all(|rank| captions.contains_key(rank)) {
            return Ok(self.clone());
        }

        Self::from_ranks(
            self.ranks
                .iter()
                .filter(|rank| captions.contains_key(*rank))
                .cloned(),
        )
    }

    /// Mapping that shows `labels` (original label space) as `A, B, ...`.
    pub fn relabel(&self, labels: &[char]) -> Result<Self, OptionsError> {
        let ranks = labels
            .iter()
            .map(|label| self.require_rank(*label).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_ranks(ranks)
    }

    /// Line-separated `"A. caption"` block shown to a model.
    pub fn render_options(&self, captions: &Captions) -> Result<String, OptionsError> {
        let lines = self
            .iter()
            .map(|(label, rank)| {
                captions
                    .get(rank)
                    .map(|caption| format!("{}. {}", label, caption))
                    .ok_or_else(|| OptionsError::MissingCaption(rank.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(lines.join("\n"))
    }
}

impl TryFrom<BTreeMap<String, String>> for OptionToRank {
    type Error = OptionsError;

    fn try_from(map: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let pairs = map
            .into_iter()
            .map(|(key, rank)| {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_uppercase() => Ok((c, rank)),
                    _ => Err(OptionsError::InvalidLabel(key)),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_pairs(pairs)
    }
}

impl From<OptionToRank> for BTreeMap<String, String> {
    fn from(mapping: OptionToRank) -> Self {
        option_letters(mapping.ranks.len())
            .map(|label| label.to_string())
            .zip(mapping.ranks)
            .collect()
    }
}
