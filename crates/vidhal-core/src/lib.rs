//! # vidhal-core
//!
//! Deterministic layer of the VidHal caption-ranking harness.
//!
//! This crate turns free-text model answers into structured results:
//! - Which option did the model pick?
//! - In what order did it rank the options?
//! - What total order follows from a series of pairwise answers?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same text (and same oracle answers) always gives
//!    the same result
//! 2. **No model calls**: The reconstructor receives its oracle as an
//!    injected capability
//! 3. **Total**: Parsing never fails, and reconstruction always yields a
//!    permutation of the item's options
//!
//! ## Example
//!
//! ```rust,ignore
//! use vidhal_core::{rank_pairwise, OptionToRank, PairQuestion};
//!
//! let mapping = OptionToRank::from_ranks(["2", "1", "3"])?;
//! let result = rank_pairwise(&item.captions, &mapping, &mut |q: &PairQuestion<'_>| {
//!     model.ask(&q.options_prompt()?)
//! })?;
//!
//! println!("{:?}", result.order);
//! ```

pub mod dataset;
pub mod display_order;
pub mod options;
pub mod parser;
pub mod ranking;
pub mod schema;
pub mod types;

// Re-export main types at crate root
pub use dataset::{Dataset, DatasetError};
pub use display_order::{DisplayOrder, DisplayOrderError};
pub use options::{OptionToRank, OptionsError, MAX_OPTIONS};
pub use parser::{parse_ordering, parse_single_choice};
pub use ranking::{
    OracleError, PairQuestion, PairwiseOracle, PairwiseOutcome, RankingError, Reconstruction,
    Reconstructor,
};
pub use schema::SchemaError;
pub use types::{Captions, ParsedChoice, Rank, TaskKind, TaskOutput, VideoItem};

/// Rebuild an item's caption order from pairwise questions.
///
/// This is the main entry point for relative ordering. The mapping is
/// projected onto `captions` first, so ranks without a caption are never
/// shown.
pub fn rank_pairwise<O>(
    captions: &Captions,
    option_to_rank: &OptionToRank,
    oracle: &mut O,
) -> Result<Reconstruction, RankingError>
where
    O: PairwiseOracle + ?Sized,
{
    Reconstructor::new(captions, option_to_rank)?.reconstruct(oracle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANNOTATIONS: &str = r#"[
        {
            "video": "v001",
            "captions": {
                "1": "A man rides a brown horse",
                "2": "A man rides a white horse",
                "3": "A man walks a horse"
            },
            "aspect": "attribute"
        }
    ]"#;

    #[test]
    fn test_dataset_to_pairwise_order() {
        let dataset = Dataset::from_json(ANNOTATIONS, "videos").unwrap();
        let order = DisplayOrder::from_json(r#"{"v001": {"A": "3", "B": "1", "C": "2"}}"#).unwrap();

        let item = dataset.get(0).unwrap();
        let mapping = order.get(&item.video_id).unwrap();

        // An oracle that always names the caption mentioning "brown", then "white"
        let mut oracle = |q: &PairQuestion<'_>| -> Result<String, OracleError> {
            let prompt = q
                .options_prompt()
                .map_err(|e| OracleError::Failed(e.to_string()))?;
            let pick = prompt
                .lines()
                .find(|line| line.contains("brown"))
                .or_else(|| prompt.lines().find(|line| line.contains("white")))
                .and_then(|line| line.chars().next())
                .unwrap_or('A');
            Ok(format!("Answer: {}", pick))
        };

        let result = rank_pairwise(&item.captions, mapping, &mut oracle).unwrap();

        assert_eq!(result.order, vec!['B', 'C', 'A']);
        assert_eq!(result.pairwise_accuracy(), Some(1.0));
    }

    #[test]
    fn test_naive_ordering_answer() {
        let parsed = parse_ordering("My ranking: C, A, B", 3);
        assert_eq!(parsed, vec!['C', 'A', 'B']);
        assert_eq!(
            serde_json::to_string(&TaskOutput::Ordering(parsed)).unwrap(),
            r#"["C","A","B"]"#
        );
    }
}
