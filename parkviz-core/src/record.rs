//! Result-file parsing into normalized records.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{JSON_EXTENSION, UNKNOWN_MODEL};
use crate::error::RecordError;
use crate::layout::ParkLayout;
use crate::removals::{RemovalSet, normalize_removals};

/// One uploaded result, normalized for grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub layout: ParkLayout,
    /// Raw `identifiedTrees` text as supplied.
    pub identified_trees: String,
    pub removals: RemovalSet,
    pub source_file: String,
    pub display_stem: String,
    pub model: String,
    pub hint_mode: String,
    pub meta_tag: String,
    pub timestamp: Option<String>,
    pub csv_hash: Option<String>,
}

impl ResultRecord {
    /// Parse the contents of one result file.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] when the file is not a JSON object or its
    /// `scenario.trees` layout is absent or malformed. Every other field
    /// degrades to a default.
    pub fn parse(file_name: &str, contents: &str) -> Result<Self, RecordError> {
        let value: Value =
            serde_json::from_str(contents).map_err(|err| RecordError::Json(err.to_string()))?;
        Self::from_value(file_name, &value)
    }

    /// Build a record from an already-parsed JSON document.
    ///
    /// # Errors
    ///
    /// See [`ResultRecord::parse`].
    pub fn from_value(file_name: &str, value: &Value) -> Result<Self, RecordError> {
        if !value.is_object() {
            return Err(RecordError::NotAnObject);
        }

        let trees = value
            .pointer("/scenario/trees")
            .filter(|trees| !trees.is_null())
            .ok_or(RecordError::MissingTrees)?;
        let layout = ParkLayout::from_embedded(trees)?;

        let identified_trees = value
            .pointer("/result/identifiedTrees")
            .map(identified_trees_text)
            .unwrap_or_default();
        let removals = normalize_removals(&identified_trees);

        Ok(Self {
            layout,
            removals,
            identified_trees,
            source_file: file_name.to_string(),
            display_stem: display_stem(file_name),
            model: scalar_text(value.pointer("/llm/model"))
                .unwrap_or_else(|| UNKNOWN_MODEL.to_string()),
            hint_mode: scalar_text(value.pointer("/scenario/hintMode")).unwrap_or_default(),
            meta_tag: scalar_text(value.pointer("/meta/tag")).unwrap_or_default(),
            timestamp: scalar_text(value.pointer("/meta/timestamp")),
            csv_hash: scalar_text(value.pointer("/scenario/csvHash")),
        })
    }

    /// Timestamp used for grouping; absent timestamps all compare equal.
    #[must_use]
    pub fn grouping_timestamp(&self) -> &str {
        self.timestamp.as_deref().unwrap_or("")
    }
}

/// File name with a trailing `.json` removed.
#[must_use]
pub fn display_stem(file_name: &str) -> String {
    file_name
        .strip_suffix(JSON_EXTENSION)
        .unwrap_or(file_name)
        .to_string()
}

/// Stem cut just after its second `]`, e.g. `[park-3][seed-9]` from
/// `[park-3][seed-9][gpt]_run1`. Stems with fewer brackets are kept whole.
#[must_use]
pub fn original_stem(stem: &str) -> &str {
    let mut closing = stem.match_indices(']').map(|(idx, _)| idx);
    match (closing.next(), closing.next()) {
        (Some(_), Some(second)) => &stem[..=second],
        _ => stem,
    }
}

/// Text of a scalar metadata field. Null, false, zero, and empty values
/// count as absent.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) if number.as_f64().is_some_and(|n| n != 0.0) => {
            Some(number.to_string())
        }
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

fn identified_trees_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Number(number) => Some(number.to_string()),
                Value::String(text) => Some(text.clone()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(","),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(trees: Value) -> Value {
        json!({
            "scenario": { "trees": trees, "csvHash": "abc123", "hintMode": "clusters" },
            "result": { "identifiedTrees": "4, 2,2" },
            "meta": { "tag": "run-a", "timestamp": 1_717_000_000 },
            "llm": { "model": "gpt-x" }
        })
    }

    #[test]
    fn parses_embedded_string_layout() {
        let layout = json!({ "treeRadius": 1, "trees": [{ "treeId": 2, "x": 1, "y": 1 }] });
        let record = ResultRecord::from_value(
            "[park][seed]_gpt.json",
            &sample(Value::String(layout.to_string())),
        )
        .unwrap();
        assert_eq!(record.removals.ids(), &[2, 4]);
        assert_eq!(record.model, "gpt-x");
        assert_eq!(record.hint_mode, "clusters");
        assert_eq!(record.meta_tag, "run-a");
        assert_eq!(record.timestamp.as_deref(), Some("1717000000"));
        assert_eq!(record.csv_hash.as_deref(), Some("abc123"));
        assert_eq!(record.display_stem, "[park][seed]_gpt");
    }

    #[test]
    fn missing_optional_fields_degrade_to_defaults() {
        let record = ResultRecord::parse(
            "bare.json",
            r#"{ "scenario": { "trees": { "trees": [] } } }"#,
        )
        .unwrap();
        assert_eq!(record.model, UNKNOWN_MODEL);
        assert_eq!(record.hint_mode, "");
        assert_eq!(record.meta_tag, "");
        assert_eq!(record.timestamp, None);
        assert_eq!(record.grouping_timestamp(), "");
        assert!(record.removals.is_empty());
    }

    #[test]
    fn malformed_files_are_distinguished() {
        assert!(matches!(
            ResultRecord::parse("x.json", "{oops"),
            Err(RecordError::Json(_))
        ));
        assert_eq!(
            ResultRecord::parse("x.json", "[1]"),
            Err(RecordError::NotAnObject)
        );
        assert_eq!(
            ResultRecord::parse("x.json", r#"{ "scenario": {} }"#),
            Err(RecordError::MissingTrees)
        );
        assert!(matches!(
            ResultRecord::from_value("x.json", &sample(Value::String("nope".into()))),
            Err(RecordError::InvalidLayout(_))
        ));
    }

    #[test]
    fn identified_trees_accepts_arrays() {
        let mut value = sample(json!({ "trees": [] }));
        value["result"]["identifiedTrees"] = json!([5, 1, 5]);
        let record = ResultRecord::from_value("a.json", &value).unwrap();
        assert_eq!(record.removals.ids(), &[1, 5]);
    }

    #[test]
    fn original_stem_cuts_after_second_bracket() {
        assert_eq!(original_stem("[p1][s2][m3]_x"), "[p1][s2]");
        assert_eq!(original_stem("[p1]_x"), "[p1]_x");
        assert_eq!(original_stem("plain"), "plain");
    }
}
