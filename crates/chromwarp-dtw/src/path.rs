//! Warp path types produced by traceback.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A matched pair of indices: `row` into sequence A, `col` into sequence B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SequencePosition {
    /// Index in sequence A.
    pub row: usize,
    /// Index in sequence B.
    pub col: usize,
}

impl SequencePosition {
    /// Create a new position.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for SequencePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for SequencePosition {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

/// An ordered sequence of positions from `(0, 0)` to `(n-1, m-1)`.
///
/// Consecutive positions differ by exactly one of `(+1, +1)`, `(+1, 0)` or `(0, +1)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WarpPath(Vec<SequencePosition>);

impl WarpPath {
    /// Create a warp path from positions already in forward order.
    pub(crate) fn new(positions: Vec<SequencePosition>) -> Self {
        Self(positions)
    }

    /// Return the positions as a slice.
    #[must_use]
    pub fn positions(&self) -> &[SequencePosition] {
        &self.0
    }

    /// Return the number of positions in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the path contains no positions.
    ///
    /// Paths produced by traceback always contain at least `(0, 0)`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return the first position, always `(0, 0)` for traceback output.
    #[must_use]
    pub fn first(&self) -> Option<SequencePosition> {
        self.0.first().copied()
    }

    /// Return the last position, always `(n-1, m-1)` for traceback output.
    #[must_use]
    pub fn last(&self) -> Option<SequencePosition> {
        self.0.last().copied()
    }

    /// For every row of sequence A, the range of columns of B it is matched to.
    ///
    /// Index `i` of the returned vector holds `(min_col, max_col)` for row `i`.
    #[must_use]
    pub fn row_spans(&self) -> Vec<(usize, usize)> {
        let mut spans: Vec<(usize, usize)> = Vec::new();
        for p in &self.0 {
            match spans.get_mut(p.row) {
                Some(span) => span.1 = span.1.max(p.col),
                None => spans.push((p.col, p.col)),
            }
        }
        spans
    }

    /// Consume and return the inner vector.
    #[must_use]
    pub fn into_inner(self) -> Vec<SequencePosition> {
        self.0
    }
}

impl<'a> IntoIterator for &'a WarpPath {
    type Item = &'a SequencePosition;
    type IntoIter = std::slice::Iter<'a, SequencePosition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(points: &[(usize, usize)]) -> WarpPath {
        WarpPath::new(points.iter().copied().map(SequencePosition::from).collect())
    }

    #[test]
    fn display_position() {
        assert_eq!(SequencePosition::new(3, 7).to_string(), "(3, 7)");
    }

    #[test]
    fn row_spans_cover_horizontal_runs() {
        let p = path(&[(0, 0), (0, 1), (1, 2), (2, 2), (2, 3)]);
        assert_eq!(p.row_spans(), vec![(0, 1), (2, 2), (2, 3)]);
    }

    #[test]
    fn endpoints() {
        let p = path(&[(0, 0), (1, 1), (1, 2)]);
        assert_eq!(p.first(), Some(SequencePosition::new(0, 0)));
        assert_eq!(p.last(), Some(SequencePosition::new(1, 2)));
        assert_eq!(p.len(), 3);
        assert!(!p.is_empty());
    }
}
