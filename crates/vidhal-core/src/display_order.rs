//! Per-video option display order.
//!
//! A [`DisplayOrder`] fixes, for every video, which caption is shown under
//! which option letter. It is either loaded from a file (so several runs
//! share one presentation) or generated with a shuffle and saved.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::options::{OptionToRank, OptionsError};
use crate::schema::{self, Document, SchemaError};
use crate::types::{Rank, VideoItem};

/// Errors from building, loading or querying a display order.
#[derive(Error, Debug)]
pub enum DisplayOrderError {
    #[error("No display order for video {0}")]
    MissingItem(String),

    #[error("Video {video_id} has {found} options, expected {expected}")]
    OptionCount {
        video_id: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid mapping for video {video_id}: {source}")]
    Mapping {
        video_id: String,
        #[source]
        source: OptionsError,
    },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid display order JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Mapping `video_id -> OptionToRank` for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayOrder {
    orders: BTreeMap<String, OptionToRank>,
}

impl DisplayOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shuffle each item's caption ranks and label them `A, B, C, ...`.
    pub fn generate<'a, I, R>(items: I, rng: &mut R) -> Result<Self, DisplayOrderError>
    where
        I: IntoIterator<Item = &'a VideoItem>,
        R: Rng + ?Sized,
    {
        let mut order = Self::new();

        for item in items {
            let mut ranks: Vec<Rank> = item.captions.keys().cloned().collect();
            ranks.shuffle(rng);

            let mapping =
                OptionToRank::from_ranks(ranks).map_err(|source| DisplayOrderError::Mapping {
                    video_id: item.video_id.clone(),
                    source,
                })?;
            order.insert(item.video_id.clone(), mapping);
        }

        tracing::debug!(videos = order.len(), "Generated display order");
        Ok(order)
    }

    /// [`DisplayOrder::generate`] with a seeded (or, without a seed, an
    /// entropy-seeded) generator.
    pub fn generate_seeded<'a, I>(items: I, seed: Option<u64>) -> Result<Self, DisplayOrderError>
    where
        I: IntoIterator<Item = &'a VideoItem>,
    {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::generate(items, &mut rng)
    }

    /// Parse a `{video_id: {label: rank}}` document.
    pub fn from_json(json: &str) -> Result<Self, DisplayOrderError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        schema::validate(Document::DisplayOrder, &value)?;

        let raw: BTreeMap<String, BTreeMap<String, String>> = serde_json::from_value(value)?;
        let orders = raw
            .into_iter()
            .map(|(video_id, mapping)| match OptionToRank::try_from(mapping) {
                Ok(mapping) => Ok((video_id, mapping)),
                Err(source) => Err(DisplayOrderError::Mapping { video_id, source }),
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Self { orders })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DisplayOrderError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| DisplayOrderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, DisplayOrderError> {
        Ok(serde_json::to_string_pretty(&self.orders)?)
    }

    /// Write the order to `path`, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DisplayOrderError> {
        let path = path.as_ref();
        let io_err = |source| DisplayOrderError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, self.to_json_pretty()?).map_err(io_err)
    }

    pub fn insert(&mut self, video_id: impl Into<String>, mapping: OptionToRank) {
        self.orders.insert(video_id.into(), mapping);
    }

    /// Mapping for `video_id`. A missing id is an error, never a guess.
    pub fn get(&self, video_id: &str) -> Result<&OptionToRank, DisplayOrderError> {
        self.orders
            .get(video_id)
            .ok_or_else(|| DisplayOrderError::MissingItem(video_id.to_string()))
    }

    /// Check that every mapping has exactly `expected` options.
    pub fn validate_option_count(&self, expected: usize) -> Result<(), DisplayOrderError> {
        match self.orders.iter().find(|(_, m)| m.len() != expected) {
            Some((video_id, mapping)) => Err(DisplayOrderError::OptionCount {
                video_id: video_id.clone(),
                expected,
                found: mapping.len(),
            }),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionToRank)> + '_ {
        self.orders.iter().map(|(id, mapping)| (id.as_str(), mapping))
    }
}
