//! Duplicate-set detection and short tag assignment.
//!
//! Within each scope, records with identical normalized removal sets form a
//! duplicate set. Sets of two or more get a tag (`M.A`, `MH.B`, ...) in the
//! order their key is first seen; singletons get none.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::constants::{MODEL_HINT_TAG_PREFIX, MODEL_TAG_PREFIX};
use crate::grouping::ScenarioGroup;
use crate::record::ResultRecord;

const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Bijective base-26 letters: 0 → `A`, 25 → `Z`, 26 → `AA`, 27 → `AB`.
#[must_use]
pub fn index_to_letters(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        letters.push(char::from(ALPHABET[(n - 1) % 26]));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagScope {
    /// Duplicate within one model of a scenario group.
    Model,
    /// Duplicate within one (model, hint mode) pair of a scenario group.
    ModelHint,
}

impl TagScope {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Model => MODEL_TAG_PREFIX,
            Self::ModelHint => MODEL_HINT_TAG_PREFIX,
        }
    }
}

/// A duplicate-set label such as `M.A` or `MH.AB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DuplicateTag {
    pub scope: TagScope,
    /// 0-based position among the scope's tagged sets.
    pub ordinal: usize,
}

impl DuplicateTag {
    #[must_use]
    pub const fn new(scope: TagScope, ordinal: usize) -> Self {
        Self { scope, ordinal }
    }
}

impl fmt::Display for DuplicateTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}",
            self.scope.prefix(),
            index_to_letters(self.ordinal)
        )
    }
}

impl Serialize for DuplicateTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Tags derived for one record. Each slot is written at most once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTags {
    pub model_tag: Option<DuplicateTag>,
    pub model_hint_tag: Option<DuplicateTag>,
}

impl RecordTags {
    fn slot(&mut self, scope: TagScope) -> &mut Option<DuplicateTag> {
        match scope {
            TagScope::Model => &mut self.model_tag,
            TagScope::ModelHint => &mut self.model_hint_tag,
        }
    }

    /// Rendered tags, model scope first.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        [self.model_tag, self.model_hint_tag]
            .into_iter()
            .flatten()
            .map(|tag| tag.to_string())
            .collect()
    }
}

/// Assign duplicate tags for every group. `tags` is indexed like `records`.
pub fn assign_duplicate_tags(
    records: &[ResultRecord],
    groups: &[ScenarioGroup],
    tags: &mut [RecordTags],
) {
    for group in groups {
        tag_group(records, group, tags);
    }
}

/// Tag one scenario group: `M.*` per model, `MH.*` per (model, hint mode).
pub fn tag_group(records: &[ResultRecord], group: &ScenarioGroup, tags: &mut [RecordTags]) {
    let mut by_model: IndexMap<&str, Vec<usize>> = IndexMap::new();
    let mut by_model_hint: IndexMap<(&str, &str), Vec<usize>> = IndexMap::new();
    for &index in &group.members {
        let record = &records[index];
        by_model
            .entry(record.model.as_str())
            .or_default()
            .push(index);
        by_model_hint
            .entry((record.model.as_str(), record.hint_mode.as_str()))
            .or_default()
            .push(index);
    }

    for members in by_model.values() {
        tag_scope(records, members, TagScope::Model, tags);
    }
    for members in by_model_hint.values() {
        tag_scope(records, members, TagScope::ModelHint, tags);
    }
}

/// Tag the duplicate sets among `members`, which share one scope.
///
/// Only the normalized removal set is compared; the scope already fixes
/// model and hint identity.
pub fn tag_scope(
    records: &[ResultRecord],
    members: &[usize],
    scope: TagScope,
    tags: &mut [RecordTags],
) {
    let mut sets: IndexMap<String, Vec<usize>> = IndexMap::new();
    for &index in members {
        sets.entry(records[index].removals.normalized_key())
            .or_default()
            .push(index);
    }

    let duplicate_sets = sets.values().filter(|set| set.len() > 1);
    for (ordinal, set) in duplicate_sets.enumerate() {
        let tag = DuplicateTag::new(scope, ordinal);
        for &index in set {
            tags[index].slot(scope).get_or_insert(tag);
        }
    }
}
