//! Insertion-based merge of pairwise outcomes into a total order.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::options::OptionToRank;
use crate::parser::parse_single_choice;
use crate::types::Captions;

use super::{PairQuestion, PairwiseOracle, PairwiseOutcome, RankingError};

/// Result of reconstructing one item's order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconstruction {
    /// Options from best to worst
    pub order: Vec<char>,

    /// Every question asked, in order
    pub comparisons: Vec<PairwiseOutcome>,
}

impl Reconstruction {
    /// Number of oracle calls made.
    pub fn query_count(&self) -> usize {
        self.comparisons.len()
    }

    /// Fraction of questions the oracle answered in line with the reference.
    pub fn pairwise_accuracy(&self) -> Option<f64> {
        if self.comparisons.is_empty() {
            return None;
        }
        let correct = self.comparisons.iter().filter(|c| c.is_correct()).count();
        Some(correct as f64 / self.comparisons.len() as f64)
    }
}

/// Rebuilds an item's caption order from pairwise questions.
///
/// The mapping is projected onto the item's captions at construction, so
/// an item missing some captions is ranked over a contiguous `A..` prefix.
pub struct Reconstructor<'a> {
    captions: &'a Captions,
    mapping: OptionToRank,
}

impl<'a> Reconstructor<'a> {
    pub fn new(captions: &'a Captions, option_to_rank: &OptionToRank) -> Result<Self, RankingError> {
        let mapping = option_to_rank.project(captions)?;
        Ok(Self { captions, mapping })
    }

    /// The (projected) mapping questions are built from.
    pub fn option_to_rank(&self) -> &OptionToRank {
        &self.mapping
    }

    /// Ask `oracle` about adjacent options and merge the answers.
    pub fn reconstruct<O>(&self, oracle: &mut O) -> Result<Reconstruction, RankingError>
    where
        O: PairwiseOracle + ?Sized,
    {
        let labels: Vec<char> = self.mapping.labels().collect();
        if labels.len() < 2 {
            return Ok(Reconstruction {
                order: labels,
                comparisons: Vec::new(),
            });
        }

        let mut session = Session {
            captions: self.captions,
            mapping: &self.mapping,
            oracle,
            order: Vec::with_capacity(labels.len()),
            comparisons: Vec::new(),
        };

        for pair in labels.windows(2) {
            session.merge_adjacent(pair[0], pair[1])?;
        }

        debug!(
            order = ?session.order,
            queries = session.comparisons.len(),
            "Reconstruction complete"
        );

        Ok(Reconstruction {
            order: session.order,
            comparisons: session.comparisons,
        })
    }
}

/// Per-call state: the accumulator and the trace.
struct Session<'s, O: ?Sized> {
    captions: &'s Captions,
    mapping: &'s OptionToRank,
    oracle: &'s mut O,
    order: Vec<char>,
    comparisons: Vec<PairwiseOutcome>,
}

impl<O> Session<'_, O>
where
    O: PairwiseOracle + ?Sized,
{
    /// Ask which of two options is better and record the outcome.
    fn ask(&mut self, a: char, b: char) -> Result<char, RankingError> {
        let pair = if a <= b { [a, b] } else { [b, a] };
        let question = PairQuestion {
            pair,
            display: self.mapping.relabel(&pair)?,
            captions: self.captions,
        };

        let response = self.oracle.answer(&question)?;
        let parsed = parse_single_choice(&response, 2)
            .label()
            .and_then(|label| question.to_original(label));
        let expected = self.mapping.preferred(pair[0], pair[1])?;

        let winner = match parsed {
            Some(label) => label,
            None => {
                warn!(pair = ?pair, response = %response, "Unreadable pairwise answer, penalizing");
                self.mapping.less_preferred(pair[0], pair[1])?
            }
        };

        debug!(pair = ?pair, winner = %winner, expected = %expected, "Pairwise decision");

        self.comparisons.push(PairwiseOutcome {
            pair,
            response,
            parsed,
            expected,
            winner,
        });

        Ok(winner)
    }

    /// Fold the outcome of one adjacent pair into the accumulator.
    fn merge_adjacent(&mut self, first: char, second: char) -> Result<(), RankingError> {
        let winner = self.ask(first, second)?;
        let loser = if winner == first { second } else { first };

        if self.order.is_empty() {
            self.order = vec![winner, loser];
        } else if self.order.first() == Some(&loser) {
            self.order.insert(0, winner);
        } else if self.order.last() == Some(&winner) {
            self.order.push(loser);
        } else if let Some(anchor) = self.position(winner) {
            self.insert_below(loser, anchor)?;
        } else if let Some(anchor) = self.position(loser) {
            self.insert_above(winner, anchor)?;
        } else {
            // Adjacent pairs always share an option with the accumulator
            self.order.extend([winner, loser]);
        }

        Ok(())
    }

    fn position(&self, label: char) -> Option<usize> {
        self.order.iter().position(|&placed| placed == label)
    }

    /// Place `target`, known to be worse than `order[anchor]`, by walking
    /// down from the anchor until it beats a candidate.
    fn insert_below(&mut self, target: char, anchor: usize) -> Result<(), RankingError> {
        for pos in anchor + 1..self.order.len() {
            let candidate = self.order[pos];
            if self.ask(target, candidate)? == target {
                self.order.insert(pos, target);
                return Ok(());
            }
        }

        self.order.push(target);
        Ok(())
    }

    /// Place `target`, known to be better than `order[anchor]`, by walking
    /// up from the anchor until a candidate beats it.
    fn insert_above(&mut self, target: char, anchor: usize) -> Result<(), RankingError> {
        for pos in (0..anchor).rev() {
            let candidate = self.order[pos];
            if self.ask(target, candidate)? != target {
                self.order.insert(pos + 1, target);
                return Ok(());
            }
        }

        self.order.insert(0, target);
        Ok(())
    }
}
