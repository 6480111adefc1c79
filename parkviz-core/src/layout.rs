//! Park layouts and their canonical scenario signature.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{
    COORDINATE_DECIMALS, DEFAULT_PARK_HEIGHT, DEFAULT_PARK_WIDTH, DEFAULT_TREE_RADIUS,
};
use crate::error::{LayoutError, json_kind};
use crate::numbers::{format_dimension, format_fixed, integral_f64_to_i64};

/// A single tree placed in the park.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tree {
    pub tree_id: i64,
    pub x: f64,
    pub y: f64,
}

/// Fixed-size park grid with circular trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkLayout {
    pub width: f64,
    pub height: f64,
    pub tree_radius: f64,
    pub trees: Vec<Tree>,
}

impl Default for ParkLayout {
    fn default() -> Self {
        Self {
            width: DEFAULT_PARK_WIDTH,
            height: DEFAULT_PARK_HEIGHT,
            tree_radius: DEFAULT_TREE_RADIUS,
            trees: Vec::new(),
        }
    }
}

impl ParkLayout {
    /// Interpret a structured layout value.
    ///
    /// Missing or zero dimensions fall back to `parkWidth`/`parkHeight` and
    /// then to the defaults. A missing `trees` key is an empty park.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] when the value is not an object, when
    /// `trees` is not a list, or when a tree lacks an id or coordinates.
    pub fn from_value(value: &Value) -> Result<Self, LayoutError> {
        let Value::Object(map) = value else {
            return Err(LayoutError::NotAnObject {
                found: json_kind(value),
            });
        };

        let width = first_truthy_number(map, &["width", "parkWidth"]).unwrap_or(DEFAULT_PARK_WIDTH);
        let height =
            first_truthy_number(map, &["height", "parkHeight"]).unwrap_or(DEFAULT_PARK_HEIGHT);
        let tree_radius = first_truthy_number(map, &["treeRadius"]).unwrap_or(DEFAULT_TREE_RADIUS);

        let trees = match map.get("trees") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => entries
                .iter()
                .enumerate()
                .map(|(index, entry)| parse_tree(index, entry))
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(LayoutError::TreesNotAList {
                    found: json_kind(other),
                });
            }
        };

        Ok(Self {
            width,
            height,
            tree_radius,
            trees,
        })
    }

    /// Interpret a layout supplied either inline or as a JSON-encoded string.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::EmbeddedJson`] when the string does not parse,
    /// or any error from [`ParkLayout::from_value`].
    pub fn from_embedded(value: &Value) -> Result<Self, LayoutError> {
        match value {
            Value::String(raw) => {
                let parsed: Value = serde_json::from_str(raw)
                    .map_err(|err| LayoutError::EmbeddedJson(err.to_string()))?;
                Self::from_value(&parsed)
            }
            other => Self::from_value(other),
        }
    }

    /// Canonical, order-independent identity of this park.
    #[must_use]
    pub fn signature(&self) -> String {
        let mut coords: Vec<String> = self
            .trees
            .iter()
            .map(|tree| {
                format!(
                    "{}:{},{}",
                    tree.tree_id,
                    format_fixed(tree.x, COORDINATE_DECIMALS),
                    format_fixed(tree.y, COORDINATE_DECIMALS)
                )
            })
            .collect();
        coords.sort();
        format!(
            "{}x{}|r={}|{}",
            format_dimension(self.width),
            format_dimension(self.height),
            format_dimension(self.tree_radius),
            coords.join("|")
        )
    }

    /// Number of trees left standing once `removals` are cut.
    #[must_use]
    pub fn remaining_after(&self, removals: &crate::RemovalSet) -> usize {
        self.trees
            .iter()
            .filter(|tree| !removals.contains(tree.tree_id))
            .count()
    }
}

/// Signature of a raw layout value without keeping the parsed layout.
///
/// # Errors
///
/// Returns a [`LayoutError`] when the value is malformed.
pub fn scenario_signature(value: &Value) -> Result<String, LayoutError> {
    ParkLayout::from_value(value).map(|layout| layout.signature())
}

fn first_truthy_number(map: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| map.get(*key).and_then(number_like))
        .find(|value| *value != 0.0 && !value.is_nan())
}

fn number_like(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn parse_tree(index: usize, entry: &Value) -> Result<Tree, LayoutError> {
    let Value::Object(map) = entry else {
        return Err(LayoutError::TreeNotAnObject { index });
    };
    let tree_id = map
        .get("treeId")
        .and_then(number_like)
        .and_then(integral_f64_to_i64)
        .ok_or(LayoutError::MissingTreeId { index })?;
    let x = map
        .get("x")
        .and_then(number_like)
        .filter(|v| v.is_finite())
        .ok_or(LayoutError::BadCoordinate { tree_id, axis: "x" })?;
    let y = map
        .get("y")
        .and_then(number_like)
        .filter(|v| v.is_finite())
        .ok_or(LayoutError::BadCoordinate { tree_id, axis: "y" })?;
    Ok(Tree { tree_id, x, y })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signature_matches_canonical_shape() {
        let layout = ParkLayout::from_value(&json!({
            "width": 30,
            "height": 20.5,
            "treeRadius": 1.5,
            "trees": [
                { "treeId": 2, "x": 3, "y": 4.25 },
                { "treeId": 1, "x": 1.1, "y": 2 }
            ]
        }))
        .unwrap();
        assert_eq!(
            layout.signature(),
            "30x20.5|r=1.5|1:1.100000,2.000000|2:3.000000,4.250000"
        );
    }

    #[test]
    fn signature_ignores_tree_order() {
        let forward = json!({ "trees": [
            { "treeId": 1, "x": 1, "y": 1 },
            { "treeId": 2, "x": 2, "y": 2 },
            { "treeId": 10, "x": 3, "y": 3 }
        ]});
        let reversed = json!({ "trees": [
            { "treeId": 10, "x": 3, "y": 3 },
            { "treeId": 2, "x": 2, "y": 2 },
            { "treeId": 1, "x": 1, "y": 1 }
        ]});
        assert_eq!(
            scenario_signature(&forward).unwrap(),
            scenario_signature(&reversed).unwrap()
        );
    }

    #[test]
    fn negative_zero_coordinates_match_zero() {
        let signed = json!({ "trees": [{ "treeId": 4, "x": -0.0, "y": 2 }] });
        let unsigned = json!({ "trees": [{ "treeId": 4, "x": 0, "y": 2 }] });
        assert_eq!(
            scenario_signature(&signed).unwrap(),
            scenario_signature(&unsigned).unwrap()
        );
        assert_eq!(
            scenario_signature(&signed).unwrap(),
            "30x30|r=0|4:0.000000,2.000000"
        );
    }

    #[test]
    fn missing_dimensions_use_defaults_and_aliases() {
        let bare = ParkLayout::from_value(&json!({})).unwrap();
        assert_eq!(bare.signature(), "30x30|r=0|");

        let aliased = ParkLayout::from_value(&json!({ "parkWidth": 40, "parkHeight": 12 })).unwrap();
        assert!((aliased.width - 40.0).abs() < f64::EPSILON);
        assert!((aliased.height - 12.0).abs() < f64::EPSILON);

        let zeroed = ParkLayout::from_value(&json!({ "width": 0, "treeRadius": 0 })).unwrap();
        assert!((zeroed.width - DEFAULT_PARK_WIDTH).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_layouts_fail_closed() {
        assert_eq!(
            scenario_signature(&json!([1, 2])),
            Err(LayoutError::NotAnObject { found: "array" })
        );
        assert_eq!(
            scenario_signature(&json!({ "trees": "oops" })),
            Err(LayoutError::TreesNotAList { found: "string" })
        );
        assert_eq!(
            scenario_signature(&json!({ "trees": [{ "x": 1, "y": 1 }] })),
            Err(LayoutError::MissingTreeId { index: 0 })
        );
        assert_eq!(
            scenario_signature(&json!({ "trees": [{ "treeId": 4, "x": "abc", "y": 1 }] })),
            Err(LayoutError::BadCoordinate {
                tree_id: 4,
                axis: "x"
            })
        );
    }

    #[test]
    fn embedded_string_layouts_parse_like_inline_ones() {
        let inline = json!({ "treeRadius": 1, "trees": [{ "treeId": 1, "x": 5, "y": 6 }] });
        let embedded = Value::String(inline.to_string());
        assert_eq!(
            ParkLayout::from_embedded(&inline).unwrap(),
            ParkLayout::from_embedded(&embedded).unwrap()
        );
        assert!(matches!(
            ParkLayout::from_embedded(&Value::String("{not json".to_string())),
            Err(LayoutError::EmbeddedJson(_))
        ));
    }

    #[test]
    fn numeric_strings_are_accepted_as_coordinates() {
        let layout = ParkLayout::from_value(&json!({
            "trees": [{ "treeId": "3", "x": "1.5", "y": " 2 " }]
        }))
        .unwrap();
        assert_eq!(layout.trees[0].tree_id, 3);
        assert!((layout.trees[0].x - 1.5).abs() < f64::EPSILON);
    }
}
