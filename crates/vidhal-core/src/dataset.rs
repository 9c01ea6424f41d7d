//! Annotation loading.
//!
//! An annotation file is a JSON array of `{video, captions, aspect}`
//! records. Records are schema-checked first, then turned into
//! [`VideoItem`]s with a video path under the configured root.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::schema::{self, Document, SchemaError};
use crate::types::{Captions, VideoItem};

/// Errors from loading annotations.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid annotations JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Video {0} has no captions")]
    NoCaptions(String),
}

#[derive(Debug, Deserialize)]
struct Annotation {
    video: String,
    captions: Captions,
    #[serde(default)]
    aspect: Option<String>,
}

/// Ordered collection of annotated videos.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    items: Vec<VideoItem>,
}

impl Dataset {
    /// Parse annotations from a JSON string.
    pub fn from_json(json: &str, video_root: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        schema::validate(Document::Annotations, &value)?;

        let annotations: Vec<Annotation> = serde_json::from_value(value)?;
        let video_root = video_root.as_ref();

        let items = annotations
            .into_iter()
            .map(|annotation| {
                if annotation.captions.is_empty() {
                    return Err(DatasetError::NoCaptions(annotation.video));
                }
                Ok(VideoItem {
                    video_path: video_root.join(format!("{}.mp4", annotation.video)),
                    video_id: annotation.video,
                    captions: annotation.captions,
                    aspect: annotation.aspect,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(items = items.len(), "Loaded annotations");
        Ok(Self { items })
    }

    /// Load annotations from a file.
    pub fn from_json_file(
        path: impl AsRef<Path>,
        video_root: impl AsRef<Path>,
    ) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json, video_root)
    }

    pub fn from_items(items: Vec<VideoItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[VideoItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&VideoItem> {
        self.items.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANNOTATIONS: &str = r#"[
        {
            "video": "v001",
            "captions": { "1": "A dog runs", "2": "A dog sits", "3": "A cat runs" },
            "aspect": "action"
        },
        { "video": "v002", "captions": { "1": "Rain", "2": "Snow" } }
    ]"#;

    #[test]
    fn test_load_from_json() {
        let dataset = Dataset::from_json(ANNOTATIONS, "/data/videos").unwrap();

        assert_eq!(dataset.len(), 2);
        let first = dataset.get(0).unwrap();
        assert_eq!(first.video_id, "v001");
        assert_eq!(first.captions.len(), 3);
        assert_eq!(first.aspect.as_deref(), Some("action"));
        assert_eq!(first.video_path, PathBuf::from("/data/videos/v001.mp4"));

        assert_eq!(dataset.get(1).unwrap().aspect, None);
        assert!(dataset.get(2).is_none());
    }

    #[test]
    fn test_schema_violation_is_reported() {
        let result = Dataset::from_json(r#"[{ "captions": { "1": "x" } }]"#, ".");
        assert!(matches!(result, Err(DatasetError::Schema(_))));
    }

    #[test]
    fn test_empty_captions_rejected() {
        let result = Dataset::from_json(r#"[{ "video": "v", "captions": {} }]"#, ".");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_json() {
        let result = Dataset::from_json("not json", ".");
        assert!(matches!(result, Err(DatasetError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Dataset::from_json_file("/nonexistent/annotations.json", ".");
        assert!(matches!(result, Err(DatasetError::Io { .. })));
    }
}
