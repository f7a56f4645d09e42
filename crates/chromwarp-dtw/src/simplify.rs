//! Recursive anchor selection over a warp path.
//!
//! The simplifier keeps the two endpoints of a path and then, for each open
//! interval between consecutive anchors, promotes the highest-scoring interior
//! point to an anchor and recurses on both halves. Running it at several depths
//! yields progressively denser summaries of the same path.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::DtwError;
use crate::matrix::AlignmentMatrix;
use crate::path::{SequencePosition, WarpPath};

/// Scores a path point for anchor selection. Higher scores are preferred as pivots.
///
/// Implemented for any `Fn(SequencePosition, f64) -> f64`, where the second
/// argument is the raw pairwise score stored for that cell.
pub trait AnchorScorer {
    /// Score the point at `position` whose raw pairwise score is `pairwise`.
    fn score(&self, position: SequencePosition, pairwise: f64) -> f64;
}

impl<F: Fn(SequencePosition, f64) -> f64> AnchorScorer for F {
    fn score(&self, position: SequencePosition, pairwise: f64) -> f64 {
        self(position, pairwise)
    }
}

/// Scores each point by its raw pairwise score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairwiseCost;

impl AnchorScorer for PairwiseCost {
    fn score(&self, _position: SequencePosition, pairwise: f64) -> f64 {
        pairwise
    }
}

/// A path point retained (or considered) as an anchor, with its selection score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnchorNode {
    /// Location on the warp path.
    pub position: SequencePosition,
    /// Score used to rank this point as a pivot.
    pub score: f64,
}

/// Anchors selected at one recursion depth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorSet {
    /// Maximum recursion depth the set was built with.
    pub max_level: usize,
    /// Anchors in path order, first and last included.
    pub anchors: Vec<AnchorNode>,
    /// True if at least one interval stopped because the depth limit was
    /// reached while it still held more than two points.
    pub depth_limited: bool,
}

impl AnchorSet {
    /// Return the anchor positions in path order.
    #[must_use]
    pub fn positions(&self) -> Vec<SequencePosition> {
        self.anchors.iter().map(|a| a.position).collect()
    }

    /// Return the number of anchors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Return true if the set holds no anchors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

/// Divide-and-conquer path summarizer parameterized by an [`AnchorScorer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PathSimplifier<S = PairwiseCost> {
    scorer: S,
}

impl PathSimplifier<PairwiseCost> {
    /// Create a simplifier that ranks points by their raw pairwise score.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scorer: PairwiseCost,
        }
    }
}

impl<S: AnchorScorer> PathSimplifier<S> {
    /// Create a simplifier with a custom scoring function.
    #[must_use]
    pub fn with_scorer(scorer: S) -> Self {
        Self { scorer }
    }

    /// Annotate every point of `path` with its anchor score.
    #[must_use]
    pub fn score_path(&self, path: &WarpPath, matrix: &AlignmentMatrix) -> Vec<AnchorNode> {
        path.positions()
            .iter()
            .map(|&position| AnchorNode {
                position,
                score: self
                    .scorer
                    .score(position, matrix.pairwise(position.row, position.col)),
            })
            .collect()
    }

    /// Select anchors from `points` with recursion limited to `max_level`.
    ///
    /// The first and last points are always kept. The result has at most
    /// `2^max_level + 1` anchors and is a subsequence of `points`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptyPath`] | `points` is empty |
    #[instrument(skip(self, points), fields(n = points.len()))]
    pub fn simplify(&self, points: &[AnchorNode], max_level: usize) -> Result<AnchorSet, DtwError> {
        let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
            return Err(DtwError::EmptyPath);
        };

        let mut anchors = vec![first];
        let mut depth_limited = false;
        if points.len() > 1 {
            select(points, 0, points.len() - 1, 0, max_level, &mut anchors, &mut depth_limited);
            anchors.push(last);
        }

        debug!(anchors = anchors.len(), depth_limited, "path simplified");
        Ok(AnchorSet {
            max_level,
            anchors,
            depth_limited,
        })
    }

    /// Run [`simplify`](Self::simplify) once per entry of `levels`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptyPath`] | `points` is empty |
    pub fn simplify_levels(
        &self,
        points: &[AnchorNode],
        levels: &[usize],
    ) -> Result<Vec<AnchorSet>, DtwError> {
        levels
            .iter()
            .map(|&level| self.simplify(points, level))
            .collect()
    }
}

/// Append the anchors strictly between indices `a` and `c` to `out`, in order.
fn select(
    points: &[AnchorNode],
    a: usize,
    c: usize,
    depth: usize,
    max_level: usize,
    out: &mut Vec<AnchorNode>,
    depth_limited: &mut bool,
) {
    let interior = c - a - 1;
    if interior <= 2 {
        return;
    }
    if depth == max_level {
        *depth_limited = true;
        return;
    }

    // First maximum wins: only a strictly greater score replaces the pivot.
    let mut b = a + 1;
    for i in a + 2..c {
        if points[i].score > points[b].score {
            b = i;
        }
    }

    select(points, a, b, depth + 1, max_level, out, depth_limited);
    out.push(points[b]);
    select(points, b, c, depth + 1, max_level, out, depth_limited);
}
