//! Render requests handed to the external rasterizer.
//!
//! Each request is self-contained: the layout to draw, the trees to omit,
//! a label, a caption, and enough provenance to file the image without
//! re-deriving any grouping.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::composite::composite_removals;
use crate::config::BatchConfig;
use crate::constants::{
    COMPOSITE_TAG, DUPLICATE_SETS_PREFIX, EMPTY_HINT_LABEL, IMAGE_EXTENSION, ORIGINAL_TAG,
};
use crate::grouping::{HintCohort, ModelCohort, ScenarioGroup};
use crate::layout::ParkLayout;
use crate::ordering::natural_cmp;
use crate::record::{ResultRecord, original_stem};
use crate::removals::RemovalSet;
use crate::tags::RecordTags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderKind {
    /// The untouched park, once per scenario group.
    Original,
    /// Consensus removals of one hint cohort.
    Composite,
    /// One uploaded result.
    Member,
}

/// Provenance attached to every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderTags {
    /// `ORIGINAL`, `COMPOSITE`, or an `M.*` duplicate tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_hint_tag: Option<String>,
    pub model: String,
    pub hint_mode: String,
    pub timestamp: Option<String>,
    pub scenario_hash: String,
    pub meta_tag: String,
    pub normalized_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub kind: RenderKind,
    /// Ordinal of the owning scenario group.
    pub group: usize,
    pub group_id: String,
    pub layout: ParkLayout,
    pub removal_ids: RemovalSet,
    pub label: String,
    pub filename: String,
    pub source_file: Option<String>,
    /// Text lines drawn under the image.
    pub caption: Vec<String>,
    pub tags: RenderTags,
}

/// Build every request for a grouped batch, in display order.
///
/// Per group: one ORIGINAL, then for each model cohort and hint cohort an
/// optional COMPOSITE followed by the members sorted by removal count.
#[must_use]
pub fn build_render_requests(
    records: &[ResultRecord],
    groups: &[ScenarioGroup],
    tags: &[RecordTags],
    config: &BatchConfig,
) -> Vec<RenderRequest> {
    let mut builder = RequestBuilder {
        records,
        tags,
        config,
        filenames: HashSet::new(),
        out: Vec::new(),
    };
    for group in groups {
        builder.push_group(group);
    }
    builder.out
}

/// Members of a hint cohort ordered by removal count, then by id list.
#[must_use]
pub fn sort_members(records: &[ResultRecord], members: &[usize]) -> Vec<usize> {
    let mut sorted = members.to_vec();
    sorted.sort_by(|&a, &b| {
        let (left, right) = (&records[a].removals, &records[b].removals);
        left.len()
            .cmp(&right.len())
            .then_with(|| natural_cmp(&left.joined(","), &right.joined(",")))
    });
    sorted
}

struct RequestBuilder<'a> {
    records: &'a [ResultRecord],
    tags: &'a [RecordTags],
    config: &'a BatchConfig,
    filenames: HashSet<String>,
    out: Vec<RenderRequest>,
}

impl RequestBuilder<'_> {
    fn push_group(&mut self, group: &ScenarioGroup) {
        let Some(first_index) = group.first_member() else {
            return;
        };
        let first = &self.records[first_index];
        let stem = original_stem(&first.display_stem).to_string();

        let removal_ids = RemovalSet::empty();
        let filename = self.claim_filename(&stem, &[ORIGINAL_TAG.to_string()]);
        self.out.push(RenderRequest {
            kind: RenderKind::Original,
            group: group.ordinal,
            group_id: group.group_id.clone(),
            layout: first.layout.clone(),
            caption: vec![format!("[{ORIGINAL_TAG}]")],
            tags: RenderTags {
                model_tag: Some(ORIGINAL_TAG.to_string()),
                model_hint_tag: None,
                model: first.model.clone(),
                hint_mode: first.hint_mode.clone(),
                timestamp: first.timestamp.clone(),
                scenario_hash: group.csv_hash.clone(),
                meta_tag: group.meta_tag.clone(),
                normalized_key: removal_ids.normalized_key(),
            },
            removal_ids,
            label: stem.clone(),
            filename,
            source_file: Some(first.source_file.clone()),
        });

        for cohort in &group.models {
            for hint in &cohort.hints {
                if self.config.composite {
                    self.push_composite(group, &stem, cohort, hint);
                }
                for index in sort_members(self.records, &hint.members) {
                    self.push_member(group, index);
                }
            }
        }
    }

    fn push_composite(
        &mut self,
        group: &ScenarioGroup,
        stem: &str,
        cohort: &ModelCohort,
        hint: &HintCohort,
    ) {
        let Some(&first_index) = hint.members.first() else {
            return;
        };
        let first = &self.records[first_index];
        let removal_ids = composite_removals(
            hint.members.iter().map(|&i| &self.records[i].removals),
            self.config.threshold,
        );
        let hint_label = if hint.hint_mode.is_empty() {
            EMPTY_HINT_LABEL
        } else {
            hint.hint_mode.as_str()
        };
        let label = format!(
            "{stem} {COMPOSITE_TAG} {} {hint_label} >={}%",
            cohort.model,
            self.config.threshold.percent()
        );
        let filename = self.claim_filename(
            &format!("{stem}_{}_{hint_label}", cohort.model),
            &[COMPOSITE_TAG.to_string()],
        );
        let caption = caption_lines(&first.layout, &removal_ids, &[COMPOSITE_TAG.to_string()]);
        self.out.push(RenderRequest {
            kind: RenderKind::Composite,
            group: group.ordinal,
            group_id: group.group_id.clone(),
            layout: first.layout.clone(),
            tags: RenderTags {
                model_tag: Some(COMPOSITE_TAG.to_string()),
                model_hint_tag: None,
                model: cohort.model.clone(),
                hint_mode: hint.hint_mode.clone(),
                timestamp: first.timestamp.clone(),
                scenario_hash: group.csv_hash.clone(),
                meta_tag: group.meta_tag.clone(),
                normalized_key: removal_ids.normalized_key(),
            },
            removal_ids,
            label,
            filename,
            source_file: None,
            caption,
        });
    }

    fn push_member(&mut self, group: &ScenarioGroup, index: usize) {
        let record = &self.records[index];
        let record_tags = self.tags.get(index).copied().unwrap_or_default();
        let labels = record_tags.labels();
        let filename = self.claim_filename(&record.display_stem, &labels);
        self.out.push(RenderRequest {
            kind: RenderKind::Member,
            group: group.ordinal,
            group_id: group.group_id.clone(),
            layout: record.layout.clone(),
            removal_ids: record.removals.clone(),
            label: record.display_stem.clone(),
            filename,
            source_file: Some(record.source_file.clone()),
            caption: caption_lines(&record.layout, &record.removals, &labels),
            tags: RenderTags {
                model_tag: record_tags.model_tag.map(|tag| tag.to_string()),
                model_hint_tag: record_tags.model_hint_tag.map(|tag| tag.to_string()),
                model: record.model.clone(),
                hint_mode: record.hint_mode.clone(),
                timestamp: record.timestamp.clone(),
                scenario_hash: group.csv_hash.clone(),
                meta_tag: record.meta_tag.clone(),
                normalized_key: record.removals.normalized_key(),
            },
        });
    }

    fn claim_filename(&mut self, stem: &str, tags: &[String]) -> String {
        let mut base = sanitize_file_component(stem);
        for tag in tags {
            base.push_str(&format!("_[{}]", sanitize_file_component(tag)));
        }
        let mut candidate = format!("{base}{IMAGE_EXTENSION}");
        let mut suffix = 2;
        while self.filenames.contains(&candidate) {
            candidate = format!("{base}-{suffix}{IMAGE_EXTENSION}");
            suffix += 1;
        }
        self.filenames.insert(candidate.clone());
        candidate
    }
}

/// Caption lines: removed ids, remaining count, and the tag line.
#[must_use]
pub fn caption_lines(layout: &ParkLayout, removals: &RemovalSet, tags: &[String]) -> Vec<String> {
    let mut lines = Vec::new();
    if !removals.is_empty() {
        lines.push(format!("Tree ids removed: {}", removals.joined(", ")));
    }
    lines.push(format!(
        "Trees remaining: {} (of {})",
        layout.remaining_after(removals),
        layout.trees.len()
    ));
    if !tags.is_empty() {
        let bracketed = tags
            .iter()
            .map(|tag| format!("[{tag}]"))
            .collect::<Vec<_>>()
            .join(" ");
        let duplicate = tags
            .iter()
            .any(|tag| tag.starts_with("M.") || tag.starts_with("MH."));
        if duplicate {
            lines.push(format!("{DUPLICATE_SETS_PREFIX}{bracketed}"));
        } else {
            lines.push(bracketed);
        }
    }
    lines
}

/// Replace characters that are unsafe in file names with `_`.
#[must_use]
pub fn sanitize_file_component(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
