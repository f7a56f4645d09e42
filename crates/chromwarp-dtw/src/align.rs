//! Alignment driver: allocation, forward pass, traceback, and simplification.

use rayon::prelude::*;
use tracing::{debug, instrument, trace};

use crate::cancel::{Cancellation, NeverCancel};
use crate::config::AlignmentConfig;
use crate::constraint::MatrixShape;
use crate::error::DtwError;
use crate::matrix::AlignmentMatrix;
use crate::optimizer::DynamicProgrammingOptimizer;
use crate::result::AlignmentResult;
use crate::score::AlignmentScore;
use crate::score_matrix::ScoreMatrix;
use crate::similarity::PairwiseSimilarity;
use crate::simplify::{AnchorScorer, PairwiseCost, PathSimplifier};

/// Runs complete alignments under an immutable [`AlignmentConfig`].
///
/// Every call allocates its own matrix and optimizer, so one `Aligner` can be
/// shared across threads and reused for any number of sequence pairs.
#[derive(Debug, Clone, Default)]
pub struct Aligner {
    config: AlignmentConfig,
}

impl Aligner {
    /// Create an aligner with the given configuration.
    #[must_use]
    pub fn new(config: AlignmentConfig) -> Self {
        Self { config }
    }

    /// Return the configuration.
    #[must_use]
    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    /// Align `a` against `b`, ranking anchors by raw pairwise score and never cancelling.
    ///
    /// # Errors
    ///
    /// See [`apply_with`](Self::apply_with).
    pub fn apply<T, S>(&self, a: &[T], b: &[T], similarity: &S) -> Result<AlignmentResult, DtwError>
    where
        S: PairwiseSimilarity<T> + ?Sized,
    {
        self.apply_with(a, b, similarity, &PathSimplifier::new(), &NeverCancel)
    }

    /// Align `a` against `b`.
    ///
    /// 1. Allocates the banded matrix with the similarity's sentinel.
    /// 2. Evaluates every band cell, row by row, polling `cancel` before each row.
    /// 3. Traces the optimal path back from `(n-1, m-1)`.
    /// 4. Builds one anchor set per configured level with `simplifier`.
    ///
    /// Runs in O(n * bw) time and space, where `bw` is the band width.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySequence`] | `a` or `b` is empty |
    /// | [`DtwError::InvalidBand`] | The constraint does not connect `(0, 0)` to `(n-1, m-1)` |
    /// | [`DtwError::Cancelled`] | `cancel` fired before the forward pass finished |
    /// | [`DtwError::Similarity`] / [`DtwError::NanCost`] | The similarity failed for some cell |
    /// | [`DtwError::ZeroNormalizer`] | Normalization requested with a zero weighted path length |
    #[instrument(skip_all, fields(rows = a.len(), cols = b.len()))]
    pub fn apply_with<T, S, A, C>(
        &self,
        a: &[T],
        b: &[T],
        similarity: &S,
        simplifier: &PathSimplifier<A>,
        cancel: &C,
    ) -> Result<AlignmentResult, DtwError>
    where
        S: PairwiseSimilarity<T> + ?Sized,
        A: AnchorScorer,
        C: Cancellation + ?Sized,
    {
        self.align(a, b, similarity, simplifier, cancel, self.config.levels())
    }

    fn align<T, S, A, C>(
        &self,
        a: &[T],
        b: &[T],
        similarity: &S,
        simplifier: &PathSimplifier<A>,
        cancel: &C,
        levels: &[usize],
    ) -> Result<AlignmentResult, DtwError>
    where
        S: PairwiseSimilarity<T> + ?Sized,
        A: AnchorScorer,
        C: Cancellation + ?Sized,
    {
        let shape = MatrixShape::new(a.len(), b.len());
        let matrix =
            AlignmentMatrix::allocate(shape, &self.config.constraint, similarity.objective())?;
        let cells = matrix.cell_count();
        let mut optimizer =
            DynamicProgrammingOptimizer::new(a, b, similarity, self.config.weights, matrix)?;

        for row in 0..shape.rows {
            if cancel.is_cancelled() {
                debug!(row, "alignment cancelled");
                return Err(DtwError::Cancelled { row });
            }
            optimizer.step_row(row)?;
            trace!(row, "row evaluated");
        }

        let traceback = optimizer.trace()?;
        let raw_value = optimizer.raw_value()?;
        let optimal_value = optimizer.optimal_value(&traceback.counts, self.config.normalize)?;
        let matrix = optimizer.into_matrix();

        let anchor_sets = if levels.is_empty() {
            Vec::new()
        } else {
            let points = simplifier.score_path(&traceback.path, &matrix);
            simplifier.simplify_levels(&points, levels)?
        };

        debug!(
            cells,
            path_len = traceback.path.len(),
            raw_value,
            optimal_value,
            "alignment complete"
        );

        Ok(AlignmentResult {
            optimal_value: AlignmentScore::new(optimal_value),
            raw_value,
            warp_path: traceback.path,
            operation_counts: traceback.counts,
            anchor_sets,
            matrix,
        })
    }

    /// Align many independent pairs in parallel.
    ///
    /// Each pair gets its own matrix and optimizer; results are returned in
    /// input order, one `Result` per pair.
    #[must_use]
    #[instrument(skip_all, fields(pairs = pairs.len()))]
    pub fn apply_batch<T, S>(
        &self,
        pairs: &[(&[T], &[T])],
        similarity: &S,
    ) -> Vec<Result<AlignmentResult, DtwError>>
    where
        T: Sync,
        S: PairwiseSimilarity<T> + Sync + ?Sized,
    {
        pairs
            .par_iter()
            .map(|(a, b)| self.apply(a, b, similarity))
            .collect()
    }

    /// Compute the optimal value for every unordered pair of `sequences`.
    ///
    /// Each pair is aligned in both orders and the better value under the
    /// similarity's objective is stored. Argument order matters whenever
    /// `up != left`, the insertion and deletion penalties differ, or the
    /// similarity itself is asymmetric. Computation is parallelized across
    /// pairs using rayon. Anchor sets are not built.
    ///
    /// # Errors
    ///
    /// Returns the first [`DtwError`] raised by any pair.
    #[instrument(skip_all, fields(n = sequences.len()))]
    pub fn pairwise<T, Q, S>(
        &self,
        sequences: &[Q],
        similarity: &S,
    ) -> Result<ScoreMatrix, DtwError>
    where
        T: Sync,
        Q: AsRef<[T]> + Sync,
        S: PairwiseSimilarity<T> + Sync + ?Sized,
    {
        let n = sequences.len();
        let total_pairs = n * n.saturating_sub(1) / 2;
        let objective = similarity.objective();
        let simplifier = PathSimplifier::with_scorer(PairwiseCost);
        let value = |a: &[T], b: &[T]| {
            self.align(a, b, similarity, &simplifier, &NeverCancel, &[])
                .map(|r| r.optimal_value)
        };

        let scores: Vec<AlignmentScore> = (0..total_pairs)
            .into_par_iter()
            .map(|flat_idx| {
                // flat_idx = i*(i-1)/2 + j with i > j
                let i = ((1.0 + (1.0 + 8.0 * flat_idx as f64).sqrt()) / 2.0).floor() as usize;
                let j = flat_idx - i * (i - 1) / 2;
                let (a, b) = (sequences[i].as_ref(), sequences[j].as_ref());
                let forward = value(a, b)?;
                let backward = value(b, a)?;
                Ok(if backward.is_better_than(forward, objective) {
                    backward
                } else {
                    forward
                })
            })
            .collect::<Result<_, DtwError>>()?;

        debug!(pairs = total_pairs, "pairwise alignment complete");
        Ok(ScoreMatrix::from_raw(n, objective, scores))
    }
}
