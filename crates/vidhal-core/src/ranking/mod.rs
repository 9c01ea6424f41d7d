//! Pairwise rank reconstruction.
//!
//! Builds a total order over an item's options from binary questions only.
//! Each question shows two captions as options `A` and `B`, asks an
//! injected [`PairwiseOracle`] which is better, and parses the answer with
//! single-choice extraction.
//!
//! ## Guarantees
//!
//! 1. **Total**: the result is always a permutation of the item's options
//! 2. **Bounded**: placing an option costs at most one question per option
//!    already placed
//! 3. **No retries**: an unreadable answer counts as a loss for the option
//!    the reference ranks higher; the pair is never asked again
//!
//! Transitivity is not checked. Cyclic answers are taken as given and still
//! produce a permutation, just not a meaningful one.

mod reconstructor;

pub use reconstructor::{Reconstruction, Reconstructor};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::{OptionToRank, OptionsError};
use crate::types::Captions;

/// Errors from the answering capability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("Oracle call failed: {0}")]
    Failed(String),
}

/// Errors that stop a reconstruction.
#[derive(Error, Debug)]
pub enum RankingError {
    #[error("Invalid option mapping: {0}")]
    Options(#[from] OptionsError),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// One binary question, as the oracle sees it.
#[derive(Debug, Clone)]
pub struct PairQuestion<'a> {
    /// The two options in the item's label space, alphabetical
    pub pair: [char; 2],

    /// The same two options relabeled `A` and `B`
    pub display: OptionToRank,

    /// Captions of the item, keyed by rank
    pub captions: &'a Captions,
}

impl PairQuestion<'_> {
    /// `"A. caption\nB. caption"` for the two options.
    pub fn options_prompt(&self) -> Result<String, OptionsError> {
        self.display.render_options(self.captions)
    }

    /// Map a display label (`A`/`B`) back to the item's label space.
    pub fn to_original(&self, display_label: char) -> Option<char> {
        match display_label {
            'A' => Some(self.pair[0]),
            'B' => Some(self.pair[1]),
            _ => None,
        }
    }
}

/// Capability that answers a pairwise question with free text.
pub trait PairwiseOracle {
    fn answer(&mut self, question: &PairQuestion<'_>) -> Result<String, OracleError>;
}

impl<F> PairwiseOracle for F
where
    F: FnMut(&PairQuestion<'_>) -> Result<String, OracleError>,
{
    fn answer(&mut self, question: &PairQuestion<'_>) -> Result<String, OracleError> {
        self(question)
    }
}

/// Record of one question and how it was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairwiseOutcome {
    /// Options asked about, in the item's label space
    pub pair: [char; 2],

    /// Raw oracle answer
    pub response: String,

    /// Parsed answer mapped back to the item's label space
    pub parsed: Option<char>,

    /// Option the reference ranking prefers
    pub expected: char,

    /// Option treated as better when merging
    pub winner: char,
}

impl PairwiseOutcome {
    /// Whether the oracle picked the reference-preferred option.
    pub fn is_correct(&self) -> bool {
        self.parsed == Some(self.expected)
    }
}
