//! JSON Schema validation for input files.
//!
//! Annotation files and display-order files are validated against the
//! schemas in `schema/` before they are deserialized, so structural mistakes
//! are reported with their JSON path instead of as a serde error.

use std::sync::OnceLock;
use thiserror::Error;

/// Embedded annotations schema (loaded at compile time).
const ANNOTATIONS_SCHEMA_JSON: &str = include_str!("../../../schema/annotations.schema.json");

/// Embedded display-order schema (loaded at compile time).
const DISPLAY_ORDER_SCHEMA_JSON: &str = include_str!("../../../schema/display_order.schema.json");

type CompiledSchema = OnceLock<Result<jsonschema::Validator, String>>;

static ANNOTATIONS_SCHEMA: CompiledSchema = OnceLock::new();
static DISPLAY_ORDER_SCHEMA: CompiledSchema = OnceLock::new();

/// Errors from schema validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Failed to load schema: {0}")]
    LoadError(String),

    #[error("Document does not match schema: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Input documents with an embedded schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    Annotations,
    DisplayOrder,
}

impl Document {
    fn source(self) -> &'static str {
        match self {
            Document::Annotations => ANNOTATIONS_SCHEMA_JSON,
            Document::DisplayOrder => DISPLAY_ORDER_SCHEMA_JSON,
        }
    }

    fn cell(self) -> &'static CompiledSchema {
        match self {
            Document::Annotations => &ANNOTATIONS_SCHEMA,
            Document::DisplayOrder => &DISPLAY_ORDER_SCHEMA,
        }
    }
}

/// Get or initialize the compiled validator for `document`.
fn get_validator(document: Document) -> Result<&'static jsonschema::Validator, SchemaError> {
    let result = document.cell().get_or_init(|| {
        let schema_value: serde_json::Value = serde_json::from_str(document.source())
            .map_err(|e| format!("Invalid schema JSON: {}", e))?;

        jsonschema::options()
            .build(&schema_value)
            .map_err(|e| format!("Failed to compile schema: {}", e))
    });

    result
        .as_ref()
        .map_err(|e| SchemaError::LoadError(e.clone()))
}

/// Validate a JSON value against the schema for `document`.
pub fn validate(document: Document, value: &serde_json::Value) -> Result<(), SchemaError> {
    let validator = get_validator(document)?;

    let errors: Vec<String> = validator
        .iter_errors(value)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::Invalid(errors))
    }
}
