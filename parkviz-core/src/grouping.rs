//! Partitioning of a batch into scenario groups, model cohorts, and hint cohorts.
//!
//! All buckets keep first-insertion order. Groups are ordered by the batch
//! position of their first member, never by signature.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::hash::Hasher;
use twox_hash::XxHash64;

use crate::constants::{GROUP_ID_PREFIX, GROUP_KEY_SEPARATOR, PREFERRED_HINT_ORDER};
use crate::record::ResultRecord;

/// Records of one model that share a hint mode. Members are batch indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintCohort {
    pub hint_mode: String,
    pub members: Vec<usize>,
}

/// Records of one scenario group that share a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCohort {
    pub model: String,
    pub members: Vec<usize>,
    /// Hint cohorts in preferred render order.
    pub hints: Vec<HintCohort>,
}

/// Records sharing park signature, run tag, and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioGroup {
    /// 1-based position in output order.
    pub ordinal: usize,
    pub group_id: String,
    pub signature: String,
    pub meta_tag: String,
    pub timestamp: String,
    /// `scenario.csvHash` of the first member, or empty.
    pub csv_hash: String,
    pub members: Vec<usize>,
    pub models: Vec<ModelCohort>,
}

impl ScenarioGroup {
    #[must_use]
    pub fn first_member(&self) -> Option<usize> {
        self.members.first().copied()
    }
}

/// Grouping key for one record: `signature||metaTag||timestamp`.
#[must_use]
pub fn group_key(signature: &str, record: &ResultRecord) -> String {
    [
        signature,
        record.meta_tag.as_str(),
        record.grouping_timestamp(),
    ]
    .join(GROUP_KEY_SEPARATOR)
}

/// Stable short id for a group key.
#[must_use]
pub fn group_id(key: &str) -> String {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(key.as_bytes());
    format!("{GROUP_ID_PREFIX}{:016x}", hasher.finish())
}

/// Partition `records` (in upload order) into nested groups.
#[must_use]
pub fn group_records(records: &[ResultRecord]) -> Vec<ScenarioGroup> {
    struct Bucket {
        signature: String,
        members: Vec<usize>,
    }

    let mut buckets: IndexMap<String, Bucket> = IndexMap::new();
    for (index, record) in records.iter().enumerate() {
        let signature = record.layout.signature();
        let key = group_key(&signature, record);
        buckets
            .entry(key)
            .or_insert_with(|| Bucket {
                signature,
                members: Vec::new(),
            })
            .members
            .push(index);
    }

    let mut ordered: Vec<(String, Bucket)> = buckets.into_iter().collect();
    ordered.sort_by_key(|(_, bucket)| bucket.members.first().copied().unwrap_or(usize::MAX));

    ordered
        .into_iter()
        .enumerate()
        .map(|(position, (key, bucket))| {
            let first = &records[bucket.members[0]];
            let group = ScenarioGroup {
                ordinal: position + 1,
                group_id: group_id(&key),
                signature: bucket.signature,
                meta_tag: first.meta_tag.clone(),
                timestamp: first.grouping_timestamp().to_string(),
                csv_hash: first.csv_hash.clone().unwrap_or_default(),
                models: model_cohorts(records, &bucket.members),
                members: bucket.members,
            };
            log::debug!(
                "group {} ({}): {} member(s), {} model(s)",
                group.ordinal,
                group.group_id,
                group.members.len(),
                group.models.len()
            );
            group
        })
        .collect()
}

fn model_cohorts(records: &[ResultRecord], members: &[usize]) -> Vec<ModelCohort> {
    let mut by_model: IndexMap<&str, Vec<usize>> = IndexMap::new();
    for &index in members {
        by_model
            .entry(records[index].model.as_str())
            .or_default()
            .push(index);
    }
    by_model
        .into_iter()
        .map(|(model, members)| ModelCohort {
            model: model.to_string(),
            hints: hint_cohorts(records, &members),
            members,
        })
        .collect()
}

fn hint_cohorts(records: &[ResultRecord], members: &[usize]) -> Vec<HintCohort> {
    let mut by_hint: IndexMap<&str, Vec<usize>> = IndexMap::new();
    for &index in members {
        by_hint
            .entry(records[index].hint_mode.as_str())
            .or_default()
            .push(index);
    }
    let mut cohorts: Vec<HintCohort> = by_hint
        .into_iter()
        .map(|(hint_mode, members)| HintCohort {
            hint_mode: hint_mode.to_string(),
            members,
        })
        .collect();
    // Stable: unlisted modes keep insertion order behind the preferred ones.
    cohorts.sort_by_key(|cohort| hint_rank(&cohort.hint_mode));
    cohorts
}

/// Position of a hint mode in the preferred render order.
#[must_use]
pub fn hint_rank(hint_mode: &str) -> usize {
    if hint_mode.is_empty() {
        return 0;
    }
    PREFERRED_HINT_ORDER
        .iter()
        .position(|preferred| *preferred == hint_mode)
        .unwrap_or(PREFERRED_HINT_ORDER.len())
}
