//! Lower-triangular matrix of optimal values from all-pairs alignment.

use crate::score::AlignmentScore;
use crate::similarity::Objective;

/// Symmetric score matrix stored as a lower-triangular flat vector.
///
/// For `n` sequences, stores `n*(n-1)/2` scores, one per unordered pair.
/// Access is symmetric: `get(i, j) == get(j, i)`. When alignment depends on
/// argument order, the stored value is the better of the two directions.
/// Self-alignments are not stored.
#[derive(Debug, Clone)]
pub struct ScoreMatrix {
    n: usize,
    objective: Objective,
    data: Vec<AlignmentScore>,
}

impl ScoreMatrix {
    /// Create a score matrix from pre-computed lower-triangular data.
    ///
    /// `data` must contain exactly `n*(n-1)/2` elements, stored as
    /// `data[row*(row-1)/2 + col]` where `row > col`.
    pub(crate) fn from_raw(n: usize, objective: Objective, data: Vec<AlignmentScore>) -> Self {
        debug_assert_eq!(data.len(), n * n.saturating_sub(1) / 2);
        Self { n, objective, data }
    }

    /// Return the number of sequences in the matrix.
    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Return true if the matrix covers no sequences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Return the objective the scores were computed under.
    #[must_use]
    pub fn objective(&self) -> Objective {
        self.objective
    }

    /// Return the score between sequence `i` and sequence `j`, or `None` for `i == j`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n` or `j >= n`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<AlignmentScore> {
        assert!(i < self.n, "row index {i} out of bounds for matrix of size {}", self.n);
        assert!(j < self.n, "column index {j} out of bounds for matrix of size {}", self.n);
        if i == j {
            return None;
        }
        let (row, col) = if i > j { (i, j) } else { (j, i) };
        Some(self.data[row * (row - 1) / 2 + col])
    }

    /// Iterate over all unique pairs `(i, j, score)` where `i > j`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, AlignmentScore)> + '_ {
        (1..self.n).flat_map(move |i| (0..i).map(move |j| (i, j, self.data[i * (i - 1) / 2 + j])))
    }

    /// Sum of the scores between sequence `i` and every other sequence.
    #[must_use]
    pub fn row_sum(&self, i: usize) -> f64 {
        (0..self.n).filter_map(|j| self.get(i, j)).map(AlignmentScore::value).sum()
    }

    /// Index of the sequence whose summed score to all others is best.
    ///
    /// This is the center of a center-star multiple alignment: the natural
    /// reference to which every other sequence is aligned. Ties resolve to the
    /// lowest index. Returns `None` for an empty matrix.
    #[must_use]
    pub fn center(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for i in 0..self.n {
            let sum = self.row_sum(i);
            match best {
                Some((_, incumbent)) if !self.objective.is_better(sum, incumbent) => {}
                _ => best = Some((i, sum)),
            }
        }
        best.map(|(i, _)| i)
    }
}
