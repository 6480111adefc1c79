//! Parkviz Core
//!
//! Platform-agnostic grouping engine for park tree-removal experiment results.
//! This crate groups uploaded results by scenario, tags duplicate removal
//! sets, computes consensus composites, and describes the images to draw.
//! It performs no I/O and never renders pixels.

pub mod composite;
pub mod config;
pub mod constants;
pub mod error;
pub mod grouping;
pub mod layout;
pub mod manifest;
pub mod numbers;
pub mod ordering;
pub mod pipeline;
pub mod record;
pub mod removals;
pub mod render;
pub mod tags;

use anyhow::Context;

// Re-export commonly used types
pub use composite::composite_removals;
pub use config::{BatchConfig, Threshold};
pub use error::{BatchError, FileFailure, LayoutError, RecordError};
pub use grouping::{HintCohort, ModelCohort, ScenarioGroup, group_records};
pub use layout::{ParkLayout, Tree, scenario_signature};
pub use manifest::{DuplicateIndex, Manifest, ManifestGroup, ManifestImage, ManifestSummary};
pub use ordering::natural_cmp;
pub use pipeline::{BatchOutput, GroupedBatch, InputFile, process_batch};
pub use record::ResultRecord;
pub use removals::{RemovalSet, normalize_removals};
pub use render::{RenderKind, RenderRequest, RenderTags, build_render_requests};
pub use tags::{DuplicateTag, RecordTags, TagScope, assign_duplicate_tags, index_to_letters};

/// Trait for abstracting where result files come from.
/// Platform-specific implementations should provide this
pub trait ResultSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the selected result files, in selection order
    ///
    /// # Errors
    ///
    /// Returns an error if the files cannot be listed or read.
    fn load_files(&self) -> Result<Vec<InputFile>, Self::Error>;
}

/// Batch engine bound to one result source
pub struct GalleryEngine<S>
where
    S: ResultSource,
{
    source: S,
    config: BatchConfig,
}

impl<S> GalleryEngine<S>
where
    S: ResultSource,
{
    /// Create a new engine with the provided source and configuration
    pub const fn new(source: S, config: BatchConfig) -> Self {
        Self { source, config }
    }

    #[must_use]
    pub const fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Load every file from the source and process them as one batch
    ///
    /// # Errors
    ///
    /// Returns an error if the source fails or no JSON file was selected.
    pub fn run(&self) -> anyhow::Result<BatchOutput> {
        let files = self
            .source
            .load_files()
            .context("failed to load result files")?;
        log::debug!("loaded {} file(s) from source", files.len());
        Ok(process_batch(&files, &self.config)?)
    }
}
