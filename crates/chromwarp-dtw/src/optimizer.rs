//! Three-predecessor dynamic-programming recurrence and deterministic traceback.

use tracing::{debug, instrument};

use crate::constraint::MatrixShape;
use crate::error::DtwError;
use crate::matrix::AlignmentMatrix;
use crate::path::{SequencePosition, WarpPath};
use crate::similarity::{Objective, PairwiseSimilarity};
use crate::transition::{OperationCounts, TransitionState, Weights};

/// Output of [`DynamicProgrammingOptimizer::trace`].
#[derive(Debug, Clone, PartialEq)]
pub struct Traceback {
    /// The optimal path in forward order.
    pub path: WarpPath,
    /// How each cell on the path was entered.
    pub counts: OperationCounts,
}

/// Evaluates the DTW recurrence cell by cell and reconstructs the optimal path.
///
/// The optimizer owns the [`AlignmentMatrix`] for the duration of one forward
/// pass. Cells must be stepped in row-major band order (rows ascending, columns
/// ascending within each row's band) because every cell reads its north, west
/// and north-west neighbours. The optimizer tracks the next expected cell and
/// rejects any other.
#[derive(Debug)]
pub struct DynamicProgrammingOptimizer<'a, T, S: ?Sized> {
    seq_a: &'a [T],
    seq_b: &'a [T],
    similarity: &'a S,
    weights: Weights,
    objective: Objective,
    matrix: AlignmentMatrix,
    cursor: Option<SequencePosition>,
}

impl<'a, T, S> DynamicProgrammingOptimizer<'a, T, S>
where
    S: PairwiseSimilarity<T> + ?Sized,
{
    /// Bind an optimizer to two sequences, a similarity and a freshly allocated matrix.
    ///
    /// The objective (and therefore the min/max selection) is taken from the matrix.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::DimensionMismatch`] | Matrix shape is not `(seq_a.len(), seq_b.len())` |
    pub fn new(
        seq_a: &'a [T],
        seq_b: &'a [T],
        similarity: &'a S,
        weights: Weights,
        matrix: AlignmentMatrix,
    ) -> Result<Self, DtwError> {
        let shape = matrix.shape();
        if shape != MatrixShape::new(seq_a.len(), seq_b.len()) {
            return Err(DtwError::DimensionMismatch {
                matrix_rows: shape.rows,
                matrix_cols: shape.cols,
                rows: seq_a.len(),
                cols: seq_b.len(),
            });
        }
        let objective = matrix.objective();
        let cursor = first_cell(&matrix, 0);
        Ok(Self {
            seq_a,
            seq_b,
            similarity,
            weights,
            objective,
            matrix,
            cursor,
        })
    }

    /// The next cell the forward pass expects, or `None` once every band cell is evaluated.
    #[must_use]
    pub fn next_cell(&self) -> Option<SequencePosition> {
        self.cursor
    }

    /// Return true once every band cell has been evaluated.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cursor.is_none()
    }

    /// Borrow the matrix being filled.
    #[must_use]
    pub fn matrix(&self) -> &AlignmentMatrix {
        &self.matrix
    }

    /// Release the matrix to the caller.
    #[must_use]
    pub fn into_matrix(self) -> AlignmentMatrix {
        self.matrix
    }

    /// Evaluate every band cell of `row`.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`step`](Self::step).
    pub fn step_row(&mut self, row: usize) -> Result<(), DtwError> {
        for col in self.matrix.column_range(row) {
            self.step(row, col)?;
        }
        Ok(())
    }

    /// Evaluate the recurrence at `(row, col)`.
    ///
    /// ```text
    /// (0,0):         w[D]*c
    /// (r>0, 0):      w[U]*c + cum[r-1][0]   + ins
    /// (0, c>0):      w[L]*c + cum[0][c-1]   + del
    /// otherwise:     best of
    ///                  w[D]*c + cum[r-1][c-1]
    ///                  w[U]*c + cum[r-1][c]   + ins
    ///                  w[L]*c + cum[r][c-1]   + del
    /// ```
    ///
    /// Predecessors outside the band are not candidates. Ties resolve to the
    /// first of `Diagonal`, `Up`, `Left`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::OutOfOrderCell`] | `(row, col)` is not the next cell in band order |
    /// | [`DtwError::Similarity`] | The similarity strategy failed for this pair |
    /// | [`DtwError::NanCost`] | The similarity returned NaN |
    pub fn step(&mut self, row: usize, col: usize) -> Result<(), DtwError> {
        let got = SequencePosition::new(row, col);
        if self.cursor != Some(got) {
            return Err(DtwError::OutOfOrderCell {
                expected: self.cursor,
                got,
            });
        }

        let cost = self
            .similarity
            .cost(&self.seq_a[row], &self.seq_b[col])
            .map_err(|source| DtwError::Similarity { row, col, source })?;
        if cost.is_nan() {
            return Err(DtwError::NanCost { row, col });
        }

        let (score, state) = self.select(row, col, cost);
        self.matrix.record(row, col, cost, score, state.code())?;
        self.cursor = self.advance(got);
        Ok(())
    }

    /// Pick the best in-band predecessor for `(row, col)`.
    fn select(&self, row: usize, col: usize, cost: f64) -> (f64, TransitionState) {
        if row == 0 && col == 0 {
            return (
                self.weights.weight(TransitionState::Diagonal) * cost,
                TransitionState::Diagonal,
            );
        }

        let mut best: Option<(f64, TransitionState)> = None;
        for state in TransitionState::ALL {
            let Some((pr, pc)) = predecessor(row, col, state) else {
                continue;
            };
            if !self.matrix.contains(pr, pc) {
                continue;
            }
            let candidate = self.weights.weight(state) * cost
                + self.matrix.cumulative(pr, pc)
                + self.weights.penalty(state);
            match best {
                Some((score, _)) if !self.objective.is_better(candidate, score) => {}
                _ => best = Some((candidate, state)),
            }
        }

        // A validated band gives every non-origin cell at least one in-band predecessor.
        best.unwrap_or((self.objective.sentinel(), TransitionState::Diagonal))
    }

    fn advance(&self, current: SequencePosition) -> Option<SequencePosition> {
        let range = self.matrix.column_range(current.row);
        if current.col + 1 < range.end {
            return Some(SequencePosition::new(current.row, current.col + 1));
        }
        first_cell(&self.matrix, current.row + 1)
    }

    /// Reconstruct the optimal path from `(n-1, m-1)` back to `(0, 0)`.
    ///
    /// Follows stored predecessors until either index reaches zero, then walks
    /// straight along the remaining boundary.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::IncompleteForwardPass`] | Some band cell has not been evaluated |
    /// | [`DtwError::InvalidPredecessor`] | A stored code is not a transition |
    #[instrument(skip(self), fields(rows = self.seq_a.len(), cols = self.seq_b.len()))]
    pub fn trace(&self) -> Result<Traceback, DtwError> {
        if let Some(next) = self.cursor {
            return Err(DtwError::IncompleteForwardPass { next });
        }

        let mut row = self.seq_a.len() - 1;
        let mut col = self.seq_b.len() - 1;
        let mut counts = OperationCounts::default();
        let mut positions = Vec::with_capacity(row + col + 1);

        while row > 0 && col > 0 {
            positions.push(SequencePosition::new(row, col));
            let code = self.matrix.traceback_code(row, col);
            let state = TransitionState::try_from(code)
                .map_err(|code| DtwError::InvalidPredecessor { row, col, code })?;
            counts.record(state);
            match state {
                TransitionState::Diagonal => {
                    row -= 1;
                    col -= 1;
                }
                TransitionState::Up => row -= 1,
                TransitionState::Left => col -= 1,
            }
        }

        while row > 0 {
            positions.push(SequencePosition::new(row, 0));
            counts.record(TransitionState::Up);
            row -= 1;
        }
        while col > 0 {
            positions.push(SequencePosition::new(0, col));
            counts.record(TransitionState::Left);
            col -= 1;
        }
        positions.push(SequencePosition::new(0, 0));
        counts.record(TransitionState::Diagonal);

        positions.reverse();
        debug!(
            len = positions.len(),
            diagonal = counts.diagonal,
            up = counts.up,
            left = counts.left,
            "traceback complete"
        );
        Ok(Traceback {
            path: WarpPath::new(positions),
            counts,
        })
    }

    /// Accumulated score at `(n-1, m-1)`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::IncompleteForwardPass`] | Some band cell has not been evaluated |
    pub fn raw_value(&self) -> Result<f64, DtwError> {
        if let Some(next) = self.cursor {
            return Err(DtwError::IncompleteForwardPass { next });
        }
        Ok(self
            .matrix
            .cumulative(self.seq_a.len() - 1, self.seq_b.len() - 1))
    }

    /// The optimal value, divided by the weighted path length when `normalize` is set.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::IncompleteForwardPass`] | Some band cell has not been evaluated |
    /// | [`DtwError::ZeroNormalizer`] | `normalize` is set and `Σ weight * count` is zero |
    pub fn optimal_value(
        &self,
        counts: &OperationCounts,
        normalize: bool,
    ) -> Result<f64, DtwError> {
        let raw = self.raw_value()?;
        if !normalize {
            return Ok(raw);
        }
        let denominator = counts.weighted_length(&self.weights);
        if denominator == 0.0 {
            return Err(DtwError::ZeroNormalizer);
        }
        Ok(raw / denominator)
    }
}

/// Cell from which `state` enters `(row, col)`, if it exists.
fn predecessor(row: usize, col: usize, state: TransitionState) -> Option<(usize, usize)> {
    match state {
        TransitionState::Diagonal => Some((row.checked_sub(1)?, col.checked_sub(1)?)),
        TransitionState::Up => Some((row.checked_sub(1)?, col)),
        TransitionState::Left => Some((row, col.checked_sub(1)?)),
    }
}

/// First band cell at or after `row`.
fn first_cell(matrix: &AlignmentMatrix, row: usize) -> Option<SequencePosition> {
    (row < matrix.shape().rows).then(|| SequencePosition::new(row, matrix.column_range(row).start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::BandConstraint;
    use crate::similarity::FnSimilarity;

    fn index_cost(a: &usize, b: &usize) -> f64 {
        if a == b { 0.0 } else { 1.0 }
    }

    fn run<'a, S: PairwiseSimilarity<usize>>(
        a: &'a [usize],
        b: &'a [usize],
        similarity: &'a S,
        weights: Weights,
        constraint: &BandConstraint,
    ) -> DynamicProgrammingOptimizer<'a, usize, S> {
        let matrix = AlignmentMatrix::allocate(
            MatrixShape::new(a.len(), b.len()),
            constraint,
            similarity.objective(),
        )
        .unwrap();
        let mut opt = DynamicProgrammingOptimizer::new(a, b, similarity, weights, matrix).unwrap();
        for row in 0..a.len() {
            opt.step_row(row).unwrap();
        }
        opt
    }

    fn positions(t: &Traceback) -> Vec<(usize, usize)> {
        t.path.positions().iter().map(|p| (p.row, p.col)).collect()
    }

    #[test]
    fn diagonal_match_scores_zero() {
        let sim = FnSimilarity::minimize(index_cost);
        let opt = run(
            &[0, 1, 2, 3],
            &[0, 1, 2, 3],
            &sim,
            Weights::default(),
            &BandConstraint::Unconstrained,
        );
        let t = opt.trace().unwrap();
        assert_eq!(positions(&t), vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
        assert_eq!(opt.optimal_value(&t.counts, false).unwrap(), 0.0);
        assert_eq!(t.counts, OperationCounts { diagonal: 4, up: 0, left: 0 });
    }

    #[test]
    fn three_way_tie_prefers_diagonal() {
        // Constant cost 1, unit weights, both penalties -0.5:
        // cum[0][0] = 1, cum[0][1] = cum[1][0] = 1 + 1 - 0.5 = 1.5
        // nw = 1 + 1 = 2 ; n = 1 + 1.5 - 0.5 = 2 ; w = 1 + 1.5 - 0.5 = 2
        let sim = FnSimilarity::minimize(|_: &usize, _: &usize| 1.0);
        let weights = Weights::default()
            .with_insertion_penalty(-0.5)
            .unwrap()
            .with_deletion_penalty(-0.5)
            .unwrap();
        let opt = run(&[0, 0], &[0, 0], &sim, weights, &BandConstraint::Unconstrained);
        assert_eq!(opt.matrix().cumulative(0, 1), 1.5);
        assert_eq!(opt.matrix().cumulative(1, 0), 1.5);
        assert_eq!(
            TransitionState::try_from(opt.matrix().traceback_code(1, 1)),
            Ok(TransitionState::Diagonal)
        );
        assert_eq!(opt.matrix().cumulative(1, 1), 2.0);
    }

    #[test]
    fn up_wins_tie_against_left() {
        // Make the diagonal strictly worse, leaving Up and Left tied.
        let sim = FnSimilarity::minimize(|_: &usize, _: &usize| 1.0);
        let weights = Weights::new(5.0, 1.0, 1.0).unwrap();
        let opt = run(&[0, 0], &[0, 0], &sim, weights, &BandConstraint::Unconstrained);
        // cum[0][0] = 5, cum[0][1] = 6, cum[1][0] = 6
        // nw = 5 + 5 = 10 ; n = 1 + 6 = 7 ; w = 1 + 6 = 7
        assert_eq!(opt.matrix().cumulative(1, 1), 7.0);
        assert_eq!(
            TransitionState::try_from(opt.matrix().traceback_code(1, 1)),
            Ok(TransitionState::Up)
        );
    }

    #[test]
    fn single_row_is_all_left() {
        let sim = FnSimilarity::minimize(index_cost);
        let opt = run(
            &[0],
            &[0, 1, 2, 3, 4],
            &sim,
            Weights::default(),
            &BandConstraint::Unconstrained,
        );
        let t = opt.trace().unwrap();
        assert_eq!(positions(&t), vec![(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]);
        assert_eq!(t.counts, OperationCounts { diagonal: 1, up: 0, left: 4 });
    }

    #[test]
    fn single_column_is_all_up() {
        let sim = FnSimilarity::minimize(index_cost);
        let opt = run(&[0, 1, 2], &[0], &sim, Weights::default(), &BandConstraint::Unconstrained);
        let t = opt.trace().unwrap();
        assert_eq!(positions(&t), vec![(0, 0), (1, 0), (2, 0)]);
        assert_eq!(t.counts, OperationCounts { diagonal: 1, up: 2, left: 0 });
    }

    #[test]
    fn normalization_divides_by_weighted_length() {
        // a = [0, 1, 2], b = [0, 2, 2], cost = |a - b|, weights [2, 1, 1].
        let sim = FnSimilarity::minimize(|a: &usize, b: &usize| a.abs_diff(*b) as f64);
        let weights = Weights::new(2.0, 1.0, 1.0).unwrap();
        let opt = run(&[0, 1, 2], &[0, 2, 2], &sim, weights, &BandConstraint::Unconstrained);
        let t = opt.trace().unwrap();
        let raw = opt.optimal_value(&t.counts, false).unwrap();
        let normalized = opt.optimal_value(&t.counts, true).unwrap();

        // cum row 0: [0, 2, 4]; row 1: [1, 2, 3]; row 2: [3, 1, 1]
        assert_eq!(raw, 1.0);
        assert_eq!(positions(&t), vec![(0, 0), (1, 0), (2, 1), (2, 2)]);
        assert_eq!(t.counts, OperationCounts { diagonal: 2, up: 1, left: 1 });
        let denominator = 2.0 * 2.0 + 1.0 + 1.0;
        assert!((normalized - raw / denominator).abs() < 1e-12);
    }

    #[test]
    fn maximize_picks_largest_candidate() {
        let sim = FnSimilarity::maximize(|a: &usize, b: &usize| if a == b { 1.0 } else { 0.0 });
        let opt = run(
            &[1, 2, 3],
            &[1, 1, 2, 3],
            &sim,
            Weights::default(),
            &BandConstraint::Unconstrained,
        );
        let t = opt.trace().unwrap();
        let raw = opt.optimal_value(&t.counts, false).unwrap();
        // Both copies of `1` in b match a[0]; then 2 and 3 match diagonally.
        assert_eq!(raw, 4.0);
        assert_eq!(positions(&t), vec![(0, 0), (0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn out_of_order_step_rejected() {
        let sim = FnSimilarity::minimize(index_cost);
        let a = [0usize, 1];
        let b = [0usize, 1];
        let matrix = AlignmentMatrix::allocate(
            MatrixShape::new(2, 2),
            &BandConstraint::Unconstrained,
            Objective::Minimize,
        )
        .unwrap();
        let mut opt =
            DynamicProgrammingOptimizer::new(&a, &b, &sim, Weights::default(), matrix).unwrap();
        let err = opt.step(1, 0).unwrap_err();
        assert!(matches!(
            err,
            DtwError::OutOfOrderCell { expected: Some(SequencePosition { row: 0, col: 0 }), .. }
        ));
        opt.step(0, 0).unwrap();
        opt.step(0, 1).unwrap();
        assert_eq!(opt.next_cell(), Some(SequencePosition::new(1, 0)));
    }

    #[test]
    fn trace_before_forward_pass_rejected() {
        let sim = FnSimilarity::minimize(index_cost);
        let a = [0usize, 1];
        let matrix = AlignmentMatrix::allocate(
            MatrixShape::new(2, 2),
            &BandConstraint::Unconstrained,
            Objective::Minimize,
        )
        .unwrap();
        let mut opt =
            DynamicProgrammingOptimizer::new(&a, &a, &sim, Weights::default(), matrix).unwrap();
        opt.step_row(0).unwrap();
        assert!(matches!(
            opt.trace(),
            Err(DtwError::IncompleteForwardPass { next: SequencePosition { row: 1, col: 0 } })
        ));
        assert!(opt.raw_value().is_err());
    }

    #[test]
    fn dimension_mismatch_rejected() {
        let sim = FnSimilarity::minimize(index_cost);
        let a = [0usize, 1, 2];
        let matrix = AlignmentMatrix::allocate(
            MatrixShape::new(2, 3),
            &BandConstraint::Unconstrained,
            Objective::Minimize,
        )
        .unwrap();
        let err =
            DynamicProgrammingOptimizer::new(&a, &a, &sim, Weights::default(), matrix).err().unwrap();
        assert!(matches!(err, DtwError::DimensionMismatch { matrix_rows: 2, rows: 3, .. }));
    }

    #[test]
    fn nan_cost_rejected() {
        let sim = FnSimilarity::minimize(|_: &usize, _: &usize| f64::NAN);
        let a = [0usize];
        let matrix = AlignmentMatrix::allocate(
            MatrixShape::new(1, 1),
            &BandConstraint::Unconstrained,
            Objective::Minimize,
        )
        .unwrap();
        let mut opt =
            DynamicProgrammingOptimizer::new(&a, &a, &sim, Weights::default(), matrix).unwrap();
        assert!(matches!(opt.step(0, 0), Err(DtwError::NanCost { row: 0, col: 0 })));
    }

    #[test]
    fn corrupt_traceback_is_reported() {
        let sim = FnSimilarity::minimize(index_cost);
        let a = [0usize, 1, 2];
        let matrix = AlignmentMatrix::allocate(
            MatrixShape::new(3, 3),
            &BandConstraint::Unconstrained,
            Objective::Minimize,
        )
        .unwrap();
        let mut opt =
            DynamicProgrammingOptimizer::new(&a, &a, &sim, Weights::default(), matrix).unwrap();
        for row in 0..3 {
            opt.step_row(row).unwrap();
        }
        opt.matrix.corrupt_traceback(2, 2, 9);
        assert!(matches!(
            opt.trace(),
            Err(DtwError::InvalidPredecessor { row: 2, col: 2, code: 9 })
        ));
    }

    #[test]
    fn band_cells_only_on_path() {
        let sim = FnSimilarity::minimize(|a: &usize, b: &usize| a.abs_diff(*b) as f64);
        let a: Vec<usize> = (0..12).collect();
        let b: Vec<usize> = (0..12).rev().collect();
        let constraint = BandConstraint::SakoeChiba { radius: 2 };
        let opt = run(&a, &b, &sim, Weights::default(), &constraint);
        let t = opt.trace().unwrap();
        let shape = MatrixShape::new(12, 12);
        for p in t.path.positions() {
            assert!(constraint.column_range(p.row, shape).contains(&p.col), "{p} outside band");
        }
    }

    #[test]
    fn out_of_band_cells_keep_sentinel() {
        let sim = FnSimilarity::minimize(index_cost);
        let a: Vec<usize> = (0..6).collect();
        let opt = run(&a, &a, &sim, Weights::default(), &BandConstraint::SakoeChiba { radius: 1 });
        assert_eq!(opt.matrix().cumulative(0, 5), f64::INFINITY);
        assert_eq!(opt.matrix().pairwise(5, 0), f64::INFINITY);
    }
}
