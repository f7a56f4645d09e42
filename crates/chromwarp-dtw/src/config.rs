//! Alignment configuration builder.

use serde::{Deserialize, Serialize};

use crate::constraint::BandConstraint;
use crate::transition::Weights;

/// Configuration for one or many alignments.
///
/// Construct via [`AlignmentConfig::new`], then chain `with_*` methods to override defaults.
///
/// # Defaults
///
/// | Parameter    | Default                          |
/// |--------------|----------------------------------|
/// | `constraint` | `BandConstraint::Unconstrained`  |
/// | `weights`    | `Weights::default()` (1, 1, 1; no penalties) |
/// | `normalize`  | false                            |
/// | `levels`     | none                             |
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    pub(crate) constraint: BandConstraint,
    pub(crate) weights: Weights,
    pub(crate) normalize: bool,
    pub(crate) levels: Vec<usize>,
}

impl AlignmentConfig {
    /// Create a configuration with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the band constraint applied to the alignment matrix.
    #[must_use]
    pub fn with_constraint(mut self, constraint: BandConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    /// Set the transition weights and gap penalties.
    #[must_use]
    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    /// Divide the optimal value by the weighted path length.
    #[must_use]
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Set the recursion depths at which the warp path is simplified.
    ///
    /// One anchor set is produced per entry, in the given order.
    #[must_use]
    pub fn with_levels(mut self, levels: impl Into<Vec<usize>>) -> Self {
        self.levels = levels.into();
        self
    }

    /// Return the band constraint.
    #[must_use]
    pub fn constraint(&self) -> &BandConstraint {
        &self.constraint
    }

    /// Return the transition weights.
    #[must_use]
    pub fn weights(&self) -> Weights {
        self.weights
    }

    /// Return true if optimal values are normalized.
    #[must_use]
    pub fn normalize(&self) -> bool {
        self.normalize
    }

    /// Return the simplification depths.
    #[must_use]
    pub fn levels(&self) -> &[usize] {
        &self.levels
    }
}
