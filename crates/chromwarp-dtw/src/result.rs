//! Alignment result type.

use serde::Serialize;

use crate::matrix::AlignmentMatrix;
use crate::path::WarpPath;
use crate::score::AlignmentScore;
use crate::simplify::AnchorSet;
use crate::transition::OperationCounts;

/// Result of a single alignment.
///
/// Serializes without the matrix; persisting the banded stores is left to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct AlignmentResult {
    /// Optimal value, normalized when the configuration requests it.
    pub optimal_value: AlignmentScore,
    /// Accumulated score at `(n-1, m-1)` before normalization.
    pub raw_value: f64,
    /// Optimal warp path from `(0, 0)` to `(n-1, m-1)`.
    pub warp_path: WarpPath,
    /// Number of path cells entered by each transition.
    pub operation_counts: OperationCounts,
    /// One anchor set per configured simplification depth.
    pub anchor_sets: Vec<AnchorSet>,
    #[serde(skip)]
    pub(crate) matrix: AlignmentMatrix,
}

impl AlignmentResult {
    /// Borrow the filled alignment matrix.
    #[must_use]
    pub fn matrix(&self) -> &AlignmentMatrix {
        &self.matrix
    }

    /// Return the anchor set built for `max_level`, if one was configured.
    #[must_use]
    pub fn anchor_set(&self, max_level: usize) -> Option<&AnchorSet> {
        self.anchor_sets.iter().find(|s| s.max_level == max_level)
    }
}
