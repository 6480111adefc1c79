//! Centralized defaults and fixed vocabulary for the grouping engine.
//!
//! These values define how result files are interpreted and labeled.

// Layout defaults ----------------------------------------------------------
pub const DEFAULT_PARK_WIDTH: f64 = 30.0;
pub const DEFAULT_PARK_HEIGHT: f64 = 30.0;
pub const DEFAULT_TREE_RADIUS: f64 = 0.0;
pub(crate) const COORDINATE_DECIMALS: usize = 6;

// Record defaults ----------------------------------------------------------
/// Model label used when a result file names no LLM.
pub const UNKNOWN_MODEL: &str = "<<unknown>>";
pub(crate) const JSON_EXTENSION: &str = ".json";

// Grouping -----------------------------------------------------------------
pub(crate) const GROUP_KEY_SEPARATOR: &str = "||";
pub(crate) const GROUP_ID_PREFIX: &str = "g-";

/// Hint modes rendered ahead of any others, in this order.
/// `"none"` and the empty string share the first slot.
pub const PREFERRED_HINT_ORDER: [&str; 4] = ["none", "clusters", "densities", "clusters,densities"];
pub(crate) const EMPTY_HINT_LABEL: &str = "none";

// Tagging ------------------------------------------------------------------
pub(crate) const MODEL_TAG_PREFIX: &str = "M";
pub(crate) const MODEL_HINT_TAG_PREFIX: &str = "MH";
pub(crate) const ORIGINAL_TAG: &str = "ORIGINAL";
pub(crate) const COMPOSITE_TAG: &str = "COMPOSITE";
pub(crate) const DUPLICATE_SETS_PREFIX: &str = "Duplicate sets: ";

// Consensus ----------------------------------------------------------------
pub const DEFAULT_THRESHOLD: f64 = 0.5;

// Output naming ------------------------------------------------------------
pub(crate) const IMAGE_EXTENSION: &str = ".png";
pub const MANIFEST_FILE_NAME: &str = "metadata.json";
pub const RENDER_REQUESTS_FILE_NAME: &str = "render_requests.json";
