//! Error types for layout parsing, record parsing, and batch rejection.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a park layout cannot be interpreted.
///
/// Callers render a diagnostic for the owning file instead of aborting the
/// batch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("layout must be a JSON object (got {found})")]
    NotAnObject { found: &'static str },
    #[error("layout field `trees` must be a list (got {found})")]
    TreesNotAList { found: &'static str },
    #[error("tree entry {index} is not an object")]
    TreeNotAnObject { index: usize },
    #[error("tree entry {index} has no integer `treeId`")]
    MissingTreeId { index: usize },
    #[error("tree {tree_id} has a non-numeric `{axis}` coordinate")]
    BadCoordinate { tree_id: i64, axis: &'static str },
    #[error("embedded layout string is not valid JSON: {0}")]
    EmbeddedJson(String),
}

/// Raised when one uploaded result file cannot become a `ResultRecord`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("file is not valid JSON: {0}")]
    Json(String),
    #[error("top-level value must be an object")]
    NotAnObject,
    #[error("`scenario.trees` is missing")]
    MissingTrees,
    #[error("`scenario.trees` is invalid: {0}")]
    InvalidLayout(#[from] LayoutError),
}

/// Batch-level rejection raised before any file is parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("no JSON files selected ({skipped} non-JSON file(s) skipped)")]
    NoJsonFiles { skipped: usize },
}

/// Per-file diagnostic collected while the rest of the batch proceeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub file: String,
    pub reason: String,
}

impl FileFailure {
    #[must_use]
    pub fn new(file: impl Into<String>, error: &RecordError) -> Self {
        Self {
            file: file.into(),
            reason: error.to_string(),
        }
    }
}

pub(crate) const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
