//! Normalized tree-removal sets.
//!
//! Every comparison between results goes through [`RemovalSet`], so two
//! proposals naming the same trees in a different order, or with repeats,
//! are indistinguishable downstream.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sorted, de-duplicated tree ids proposed for removal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemovalSet(Vec<i64>);

impl RemovalSet {
    #[must_use]
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build from ids in any order, with duplicates allowed.
    #[must_use]
    pub fn from_ids(ids: impl IntoIterator<Item = i64>) -> Self {
        let mut ids: Vec<i64> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self(ids)
    }

    #[must_use]
    pub fn ids(&self) -> &[i64] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, tree_id: i64) -> bool {
        self.0.binary_search(&tree_id).is_ok()
    }

    /// Compact JSON array form, e.g. `[1,2,3]` or `[]`.
    #[must_use]
    pub fn normalized_key(&self) -> String {
        let joined = self
            .0
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        format!("[{joined}]")
    }

    /// Ids joined with `sep`, e.g. `1,2,3` for sorting or `1, 2, 3` for captions.
    #[must_use]
    pub fn joined(&self, sep: &str) -> String {
        self.0
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(sep)
    }
}

impl fmt::Display for RemovalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized_key())
    }
}

/// Parse a comma-separated id list.
///
/// Each token contributes its leading integer (`" 12"`, `"12abc"`, `"-3"`).
/// Tokens without one are dropped, since they stand for malformed or missing
/// input rather than a failure.
#[must_use]
pub fn normalize_removals(raw: &str) -> RemovalSet {
    if raw.trim().is_empty() {
        return RemovalSet::empty();
    }
    RemovalSet::from_ids(raw.split(',').filter_map(parse_leading_int))
}

fn parse_leading_int(token: &str) -> Option<i64> {
    let token = token.trim();
    let (negative, rest) = match token.as_bytes().first()? {
        b'-' => (true, &token[1..]),
        b'+' => (false, &token[1..]),
        _ => (false, token),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits_end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_order_and_duplicates() {
        assert_eq!(normalize_removals("3, 1,2,2").ids(), &[1, 2, 3]);
        assert_eq!(
            normalize_removals("2,1").normalized_key(),
            normalize_removals("1,2,2").normalized_key()
        );
    }

    #[test]
    fn empty_input_is_empty_array() {
        assert!(normalize_removals("").is_empty());
        assert_eq!(normalize_removals("   ").normalized_key(), "[]");
    }

    #[test]
    fn unparsable_tokens_are_dropped() {
        assert_eq!(normalize_removals("a, 4, ,x9, 7").ids(), &[4, 7]);
        assert_eq!(normalize_removals("12abc,-3,+5").ids(), &[-3, 5, 12]);
        assert_eq!(normalize_removals("-,+").ids(), &[] as &[i64]);
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["5,3,3,1", "", "9, x, 2", "10,9,100"] {
            let once = normalize_removals(raw);
            let twice = normalize_removals(&once.joined(","));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn key_parses_back_to_ids() {
        let set = normalize_removals("10,2,33");
        let parsed: Vec<i64> = serde_json::from_str(&set.normalized_key()).unwrap();
        assert_eq!(parsed, set.ids());
    }

    #[test]
    fn contains_uses_sorted_ids() {
        let set = RemovalSet::from_ids([9, 1, 4]);
        assert!(set.contains(4));
        assert!(!set.contains(5));
    }
}
