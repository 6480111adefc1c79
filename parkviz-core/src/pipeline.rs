//! Whole-batch processing: parse, group, tag, and build outputs.
use serde::Serialize;

use crate::config::BatchConfig;
use crate::constants::JSON_EXTENSION;
use crate::error::{BatchError, FileFailure};
use crate::grouping::{ScenarioGroup, group_records};
use crate::manifest::Manifest;
use crate::record::ResultRecord;
use crate::render::{RenderRequest, build_render_requests};
use crate::tags::{RecordTags, assign_duplicate_tags};

/// One selected file: its name and raw contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub name: String,
    pub contents: String,
}

impl InputFile {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        self.name.ends_with(JSON_EXTENSION)
    }
}

/// Parsed records with their grouping and duplicate tags.
///
/// `tags[i]` belongs to `records[i]`; group members index into `records`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedBatch {
    pub records: Vec<ResultRecord>,
    pub groups: Vec<ScenarioGroup>,
    pub tags: Vec<RecordTags>,
}

impl GroupedBatch {
    #[must_use]
    pub fn build(records: Vec<ResultRecord>) -> Self {
        let groups = group_records(&records);
        let mut tags = vec![RecordTags::default(); records.len()];
        assign_duplicate_tags(&records, &groups, &mut tags);
        Self {
            records,
            groups,
            tags,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutput {
    pub batch: GroupedBatch,
    pub render_requests: Vec<RenderRequest>,
    pub manifest: Manifest,
    pub failures: Vec<FileFailure>,
}

impl BatchOutput {
    /// Stamp the manifest with a generation time.
    #[must_use]
    pub fn with_generated_at(mut self, generated_at: impl Into<String>) -> Self {
        self.manifest.generated_at = Some(generated_at.into());
        self
    }
}

/// Run the full pipeline over the selected files.
///
/// Non-JSON names are skipped. Files that fail to parse are reported in
/// `failures` and the rest of the batch proceeds.
///
/// # Errors
///
/// Returns [`BatchError::NoJsonFiles`] when no `.json` file was selected.
pub fn process_batch(files: &[InputFile], config: &BatchConfig) -> Result<BatchOutput, BatchError> {
    let (json, skipped): (Vec<&InputFile>, Vec<&InputFile>) =
        files.iter().partition(|file| file.is_json());
    for file in &skipped {
        log::warn!("skipping non-JSON file {}", file.name);
    }
    if json.is_empty() {
        return Err(BatchError::NoJsonFiles {
            skipped: skipped.len(),
        });
    }

    let mut records = Vec::with_capacity(json.len());
    let mut failures = Vec::new();
    for file in json {
        match ResultRecord::parse(&file.name, &file.contents) {
            Ok(record) => records.push(record),
            Err(err) => {
                log::warn!("failed to parse {}: {err}", file.name);
                failures.push(FileFailure::new(&file.name, &err));
            }
        }
    }

    let batch = GroupedBatch::build(records);
    let render_requests =
        build_render_requests(&batch.records, &batch.groups, &batch.tags, config);
    let manifest = Manifest::build(
        &batch.records,
        &batch.groups,
        &batch.tags,
        &render_requests,
        &failures,
        config,
        None,
    );
    log::info!(
        "processed {} record(s) into {} group(s) and {} render request(s)",
        batch.records.len(),
        batch.groups.len(),
        render_requests.len()
    );

    Ok(BatchOutput {
        batch,
        render_requests,
        manifest,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = r#"{"width":10,"height":10,"trees":[{"treeId":1,"x":1,"y":1},{"treeId":2,"x":2,"y":2}]}"#;

    fn result_file(name: &str, removals: &str) -> InputFile {
        InputFile::new(
            name,
            format!(
                r#"{{"scenario":{{"trees":{LAYOUT}}},"result":{{"identifiedTrees":"{removals}"}},"llm":{{"model":"m"}}}}"#
            ),
        )
    }

    #[test]
    fn rejects_batches_without_json() {
        let files = vec![InputFile::new("notes.txt", "hi")];
        let err = process_batch(&files, &BatchConfig::default()).unwrap_err();
        assert_eq!(err, BatchError::NoJsonFiles { skipped: 1 });
    }

    #[test]
    fn skips_non_json_and_collects_failures() {
        let files = vec![
            result_file("a.json", "1"),
            InputFile::new("readme.md", "# nope"),
            InputFile::new("broken.json", "{"),
        ];
        let output = process_batch(&files, &BatchConfig::default()).unwrap();
        assert_eq!(output.batch.records.len(), 1);
        assert_eq!(output.failures.len(), 1);
        assert_eq!(output.failures[0].file, "broken.json");
        assert_eq!(output.manifest.summary.files, 2);
    }

    #[test]
    fn composite_toggle_controls_requests() {
        let files = vec![result_file("a.json", "1"), result_file("b.json", "2")];
        let with = process_batch(&files, &BatchConfig::default()).unwrap();
        let without =
            process_batch(&files, &BatchConfig::default().with_composite(false)).unwrap();
        // ORIGINAL + COMPOSITE + 2 members, then without the composite.
        assert_eq!(with.render_requests.len(), 4);
        assert_eq!(without.render_requests.len(), 3);
    }

    #[test]
    fn generated_at_is_caller_supplied() {
        let files = vec![result_file("a.json", "")];
        let output = process_batch(&files, &BatchConfig::default()).unwrap();
        assert!(output.manifest.generated_at.is_none());
        let stamped = output.with_generated_at("2024-01-01T00:00:00Z");
        assert_eq!(
            stamped.manifest.generated_at.as_deref(),
            Some("2024-01-01T00:00:00Z")
        );
    }
}
