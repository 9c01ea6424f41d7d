//! Shared data types for items, parsed answers and task outputs.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Rank identifier of a caption (e.g. "1", "2", "3").
pub type Rank = String;

/// Caption text keyed by rank.
pub type Captions = BTreeMap<Rank, String>;

/// One annotated video with its candidate captions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoItem {
    /// Video identifier (file stem of the video)
    pub video_id: String,

    /// Captions keyed by rank
    pub captions: Captions,

    /// Hallucination aspect this item probes (e.g. "action", "object")
    #[serde(default)]
    pub aspect: Option<String>,

    /// Where the video would be read from; decoding happens elsewhere
    pub video_path: PathBuf,
}

/// Result of single-choice extraction.
///
/// Serialized untagged: a label persists as `"A"`, an unmatched answer as
/// the original response text. Only a lone uppercase letter reads back as a
/// label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParsedChoice {
    /// A valid option label, uppercased
    Label(char),

    /// No option label found; carries the response unchanged
    Unmatched(String),
}

impl ParsedChoice {
    /// The parsed label, if any.
    pub fn label(&self) -> Option<char> {
        match self {
            ParsedChoice::Label(c) => Some(*c),
            ParsedChoice::Unmatched(_) => None,
        }
    }

    pub fn is_label(&self) -> bool {
        matches!(self, ParsedChoice::Label(_))
    }
}

impl<'de> Deserialize<'de> for ParsedChoice {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_uppercase() => Ok(ParsedChoice::Label(c)),
            _ => Ok(ParsedChoice::Unmatched(text)),
        }
    }
}

/// The three evaluation tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Pick the single best caption
    Mcqa,

    /// Ask for the full ranking in one response
    NaiveOrdering,

    /// Rebuild the ranking from pairwise questions
    RelativeOrdering,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Mcqa => "mcqa",
            TaskKind::NaiveOrdering => "naive_ordering",
            TaskKind::RelativeOrdering => "relative_ordering",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "mcqa" => Ok(TaskKind::Mcqa),
            "naive_ordering" => Ok(TaskKind::NaiveOrdering),
            "relative_ordering" => Ok(TaskKind::RelativeOrdering),
            other => Err(format!("unknown task: {}", other)),
        }
    }
}

/// What a task produced for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskOutput {
    /// MCQA answer
    Choice(ParsedChoice),

    /// Ordering, best option first
    Ordering(Vec<char>),
}
