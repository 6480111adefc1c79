//! Per-batch metadata manifest.
//!
//! The manifest ties every produced image back to its source file and
//! cohort, and records the duplicate sets that drove tagging.
use indexmap::IndexMap;
use serde::Serialize;
use smallvec::SmallVec;

use crate::config::BatchConfig;
use crate::error::FileFailure;
use crate::grouping::ScenarioGroup;
use crate::record::ResultRecord;
use crate::render::{RenderKind, RenderRequest};
use crate::tags::RecordTags;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    pub summary: ManifestSummary,
    pub images: Vec<ManifestImage>,
    pub groups: Vec<ManifestGroup>,
    pub duplicates: DuplicateIndex,
    /// Source file to produced image filenames.
    pub mapping: IndexMap<String, Vec<String>>,
    pub failures: Vec<FileFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestSummary {
    pub files: usize,
    pub records: usize,
    pub failures: usize,
    pub groups: usize,
    pub images: usize,
    pub threshold: f64,
    pub composite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestImage {
    pub filename: String,
    pub kind: RenderKind,
    pub original_file: Option<String>,
    pub model: String,
    pub hint_mode: String,
    pub normalized_key: String,
    pub timestamp: Option<String>,
    pub scenario_hash: String,
    pub model_tag: Option<String>,
    pub model_hint_tag: Option<String>,
    pub group: usize,
    pub group_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestGroup {
    pub ordinal: usize,
    pub group_id: String,
    pub tag: String,
    pub run_tag: String,
    pub timestamp: String,
    pub csv_hash: String,
    pub park_layout: String,
    pub signature: String,
    pub members: Vec<ManifestMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestMember {
    pub file: String,
    pub tags: SmallVec<[String; 2]>,
}

/// Files per normalized key, nested under model (and hint mode).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateIndex {
    pub model_groups: IndexMap<String, IndexMap<String, Vec<String>>>,
    pub model_hint_groups: IndexMap<String, IndexMap<String, IndexMap<String, Vec<String>>>>,
}

impl Manifest {
    /// Assemble the manifest. `generated_at` is supplied by the caller so the
    /// engine never reads the clock.
    #[must_use]
    pub fn build(
        records: &[ResultRecord],
        groups: &[ScenarioGroup],
        tags: &[RecordTags],
        requests: &[RenderRequest],
        failures: &[FileFailure],
        config: &BatchConfig,
        generated_at: Option<String>,
    ) -> Self {
        let images: Vec<ManifestImage> = requests.iter().map(ManifestImage::from).collect();

        let mut mapping: IndexMap<String, Vec<String>> = records
            .iter()
            .map(|record| (record.source_file.clone(), Vec::new()))
            .collect();
        for request in requests {
            if request.kind == RenderKind::Member
                && let Some(source) = &request.source_file
            {
                mapping
                    .entry(source.clone())
                    .or_default()
                    .push(request.filename.clone());
            }
        }

        Self {
            generated_at,
            summary: ManifestSummary {
                files: records.len() + failures.len(),
                records: records.len(),
                failures: failures.len(),
                groups: groups.len(),
                images: images.len(),
                threshold: config.threshold.value(),
                composite: config.composite,
            },
            images,
            groups: groups
                .iter()
                .map(|group| ManifestGroup::new(group, records, tags))
                .collect(),
            duplicates: DuplicateIndex::build(records),
            mapping,
            failures: failures.to_vec(),
        }
    }
}

impl From<&RenderRequest> for ManifestImage {
    fn from(request: &RenderRequest) -> Self {
        Self {
            filename: request.filename.clone(),
            kind: request.kind,
            original_file: request.source_file.clone(),
            model: request.tags.model.clone(),
            hint_mode: request.tags.hint_mode.clone(),
            normalized_key: request.tags.normalized_key.clone(),
            timestamp: request.tags.timestamp.clone(),
            scenario_hash: request.tags.scenario_hash.clone(),
            model_tag: request.tags.model_tag.clone(),
            model_hint_tag: request.tags.model_hint_tag.clone(),
            group: request.group,
            group_id: request.group_id.clone(),
        }
    }
}

impl ManifestGroup {
    fn new(group: &ScenarioGroup, records: &[ResultRecord], tags: &[RecordTags]) -> Self {
        Self {
            ordinal: group.ordinal,
            group_id: group.group_id.clone(),
            tag: group.meta_tag.clone(),
            run_tag: group.meta_tag.clone(),
            timestamp: group.timestamp.clone(),
            csv_hash: group.csv_hash.clone(),
            park_layout: group.csv_hash.clone(),
            signature: group.signature.clone(),
            members: group
                .members
                .iter()
                .map(|&index| ManifestMember {
                    file: records[index].source_file.clone(),
                    tags: tags
                        .get(index)
                        .map(|t| t.labels().into_iter().collect())
                        .unwrap_or_default(),
                })
                .collect(),
        }
    }
}

impl DuplicateIndex {
    /// Index every record by model and normalized key, batch-wide.
    #[must_use]
    pub fn build(records: &[ResultRecord]) -> Self {
        let mut index = Self::default();
        for record in records {
            let key = record.removals.normalized_key();
            index
                .model_groups
                .entry(record.model.clone())
                .or_default()
                .entry(key.clone())
                .or_default()
                .push(record.source_file.clone());
            index
                .model_hint_groups
                .entry(record.model.clone())
                .or_default()
                .entry(record.hint_mode.clone())
                .or_default()
                .entry(key)
                .or_default()
                .push(record.source_file.clone());
        }
        index
    }
}
