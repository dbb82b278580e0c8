//! Row-width inference.
//!
//! UNI archives do not declare how many 4-byte fields make up one row. The
//! width has to be recovered from the bytes themselves, and the archives seen
//! in the field support more than one way of doing that. Each approach is a
//! [`RowWidthInference`] implementation; [`InferenceStrategy`] names them and
//! [`create_inference`] is the single place where one is selected.
//!
//! | Strategy              | Module            | Fallback                        |
//! |-----------------------|-------------------|---------------------------------|
//! | `marker-periodicity`  | [`marker`]        | [`DEFAULT_ROW_WIDTH`]           |
//! | `plausibility`        | [`plausibility`]  | whole payload as a single row   |
//! | `fixed`               | this module       | always the configured width     |
//!
//! All strategies operate on the *payload*: the archive buffer after the
//! optional marker prefix has been skipped, so sampled rows line up with the
//! rows the decoder will produce.

use serde::{Deserialize, Serialize};

pub mod marker;
pub mod plausibility;

pub use marker::MarkerPeriodicity;
pub use plausibility::PlausibilityScoring;

// =============================================================================
// Constants
// =============================================================================

/// Width used when the payload gives no usable structure
pub const DEFAULT_ROW_WIDTH: usize = 47;

/// Narrowest row width that is structurally plausible
pub const MIN_ROW_WIDTH: usize = 3;

// =============================================================================
// RowWidthInference Trait
// =============================================================================

/// Determines the raw row width (service fields included) of an archive.
///
/// Implementations must be pure and must never panic, whatever the payload
/// contains. When the payload carries no usable signal they degrade to their
/// documented fallback instead of failing.
pub trait RowWidthInference: Send + Sync {
    /// Infer the number of 4-byte fields per row.
    ///
    /// # Arguments
    ///
    /// * `payload` - Archive bytes following the optional marker prefix.
    fn infer(&self, payload: &[u8]) -> usize;

    /// The strategy this implementation represents.
    fn strategy(&self) -> InferenceStrategy;
}

// =============================================================================
// Strategy Selection
// =============================================================================

/// Named row-width inference strategies
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InferenceStrategy {
    /// Always use a fixed width
    Fixed,
    /// Score a fixed list of typical widths by first-row value ranges
    Plausibility,
    /// Derive candidates from marker spacing and score by marker alignment
    #[default]
    MarkerPeriodicity,
}

impl InferenceStrategy {
    pub const ALL: [InferenceStrategy; 3] = [
        InferenceStrategy::Fixed,
        InferenceStrategy::Plausibility,
        InferenceStrategy::MarkerPeriodicity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InferenceStrategy::Fixed => "fixed",
            InferenceStrategy::Plausibility => "plausibility",
            InferenceStrategy::MarkerPeriodicity => "marker-periodicity",
        }
    }
}

impl std::fmt::Display for InferenceStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for InferenceStrategy {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "fixed" => Ok(InferenceStrategy::Fixed),
            "plausibility" => Ok(InferenceStrategy::Plausibility),
            "marker-periodicity" | "marker" => Ok(InferenceStrategy::MarkerPeriodicity),
            _ => Err(format!("Unknown inference strategy: {}", s)),
        }
    }
}

/// Create the inference implementation for a strategy.
///
/// `Fixed` uses [`DEFAULT_ROW_WIDTH`]; construct [`FixedWidth`] directly for
/// any other width.
pub fn create_inference(strategy: InferenceStrategy) -> Box<dyn RowWidthInference> {
    match strategy {
        InferenceStrategy::Fixed => Box::new(FixedWidth::default()),
        InferenceStrategy::Plausibility => Box::new(PlausibilityScoring),
        InferenceStrategy::MarkerPeriodicity => Box::new(MarkerPeriodicity),
    }
}

// =============================================================================
// Fixed Width
// =============================================================================

/// Ignores the payload and always reports the same width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWidth {
    width: usize,
}

impl FixedWidth {
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

impl Default for FixedWidth {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_WIDTH)
    }
}

impl RowWidthInference for FixedWidth {
    fn infer(&self, _payload: &[u8]) -> usize {
        self.width
    }

    fn strategy(&self) -> InferenceStrategy {
        InferenceStrategy::Fixed
    }
}

// =============================================================================
// Tests
// =============================================================================
