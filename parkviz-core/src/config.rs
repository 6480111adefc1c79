//! Batch configuration supplied by the caller.
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::DEFAULT_THRESHOLD;
use crate::numbers::round_f64_to_i32;

/// Vote fraction in `[0, 1]` a tree needs to enter a composite.
///
/// Out-of-range input is clamped rather than rejected; NaN falls back to the
/// default.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Threshold(f64);

impl Threshold {
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(0.0, 1.0))
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Whole-number percentage used in composite labels.
    #[must_use]
    pub fn percent(self) -> i32 {
        round_f64_to_i32(self.0 * 100.0)
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

impl<'de> Deserialize<'de> for Threshold {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Self::new)
    }
}

/// Options for one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default)]
    pub threshold: Threshold,
    /// Emit a COMPOSITE render request ahead of each hint cohort.
    #[serde(default = "BatchConfig::default_composite")]
    pub composite: bool,
}

impl BatchConfig {
    const fn default_composite() -> bool {
        true
    }

    /// Load configuration from a JSON document; missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a configuration.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Threshold::new(threshold);
        self
    }

    #[must_use]
    pub const fn with_composite(mut self, composite: bool) -> Self {
        self.composite = composite;
        self
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            threshold: Threshold::default(),
            composite: Self::default_composite(),
        }
    }
}
