//! Band constraints restricting which cells of the alignment matrix are evaluated.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::DtwError;
use crate::path::WarpPath;

/// Dimensions of an alignment matrix: `rows = len(A)`, `cols = len(B)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatrixShape {
    /// Number of rows (length of sequence A).
    pub rows: usize,
    /// Number of columns (length of sequence B).
    pub cols: usize,
}

impl MatrixShape {
    /// Create a new shape.
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }
}

/// The contiguous run of valid columns in one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnBounds {
    /// First valid column.
    pub start: usize,
    /// Number of valid columns.
    pub len: usize,
}

impl ColumnBounds {
    /// One past the last valid column.
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

impl From<Range<usize>> for ColumnBounds {
    fn from(r: Range<usize>) -> Self {
        Self {
            start: r.start,
            len: r.end.saturating_sub(r.start),
        }
    }
}

/// Constraint on the alignment window.
///
/// Every variant describes, per row, one contiguous range of columns. Cells
/// outside the range hold the objective's sentinel and are never evaluated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum BandConstraint {
    /// No constraint: every cell of the `n x m` matrix is evaluated.
    #[default]
    Unconstrained,

    /// Band of `radius` columns on either side of the straight line from
    /// `(0, 0)` to `(n-1, m-1)`. For square matrices this is `|i - j| <= radius`.
    SakoeChiba {
        /// Maximum permitted deviation from the diagonal, in columns.
        radius: usize,
    },

    /// Sakoe-Chiba band whose radius is `ceil(fraction * max(n, m))`.
    Fraction(f64),

    /// Caller-supplied column range for each row.
    Explicit(Vec<Range<usize>>),
}

impl BandConstraint {
    /// Build a corridor of `radius` extra columns around an existing warp path.
    ///
    /// Row `i` of the corridor spans the columns the path visits in row `i`,
    /// widened by `radius` on each side. Typical use is refining a coarse
    /// alignment, or re-aligning under a band learned from a previous one.
    #[must_use]
    pub fn around_path(path: &WarpPath, radius: usize) -> Self {
        let n_cols = path.last().map_or(0, |p| p.col + 1);
        let ranges = path
            .row_spans()
            .into_iter()
            .map(|(lo, hi)| {
                lo.saturating_sub(radius)..hi.saturating_add(radius).saturating_add(1).min(n_cols)
            })
            .collect();
        Self::Explicit(ranges)
    }

    /// Return the valid column range for `row` of a matrix of the given shape.
    ///
    /// Rows past the end of an [`Explicit`](Self::Explicit) band yield an empty range.
    #[must_use]
    pub fn column_range(&self, row: usize, shape: MatrixShape) -> Range<usize> {
        match self {
            Self::Unconstrained => 0..shape.cols,
            Self::SakoeChiba { radius } => diagonal_band(row, shape, *radius),
            Self::Fraction(f) => diagonal_band(row, shape, fraction_radius(*f, shape)),
            Self::Explicit(ranges) => ranges.get(row).cloned().unwrap_or(0..0),
        }
    }

    /// Return the valid columns of `row` as a start and a length.
    #[must_use]
    pub fn column_bounds(&self, row: usize, shape: MatrixShape) -> ColumnBounds {
        self.column_range(row, shape).into()
    }

    /// Return the widest row of the band for a matrix of the given shape.
    #[must_use]
    pub fn band_width(&self, shape: MatrixShape) -> usize {
        (0..shape.rows)
            .map(|row| self.column_range(row, shape).len())
            .max()
            .unwrap_or(0)
    }

    /// Compute and validate every row range for a matrix of the given shape.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::InvalidBand`] | The fraction is outside `(0, 1]` |
    /// | [`DtwError::InvalidBand`] | An explicit band has the wrong row count |
    /// | [`DtwError::InvalidBand`] | The band leaves a cell unreachable |
    pub fn resolve(&self, shape: MatrixShape) -> Result<Vec<Range<usize>>, DtwError> {
        if let Self::Fraction(f) = self
            && !(*f > 0.0 && *f <= 1.0)
        {
            return Err(DtwError::InvalidBand {
                row: 0,
                reason: "band fraction must lie in (0, 1]",
            });
        }
        if let Self::Explicit(ranges) = self
            && ranges.len() != shape.rows
        {
            return Err(DtwError::InvalidBand {
                row: ranges.len().min(shape.rows),
                reason: "explicit band row count differs from sequence A length",
            });
        }

        let ranges: Vec<Range<usize>> = (0..shape.rows)
            .map(|row| self.column_range(row, shape))
            .collect();
        validate_band(&ranges, shape)?;
        Ok(ranges)
    }
}

fn fraction_radius(fraction: f64, shape: MatrixShape) -> usize {
    (fraction * shape.rows.max(shape.cols) as f64).ceil() as usize
}

/// Columns crossed by the line from `(0, 0)` to `(n-1, m-1)` in `row`, widened by `radius`.
///
/// Row `i` maps onto the half-open interval `[i*m/n, (i+1)*m/n)` of columns.
fn diagonal_band(row: usize, shape: MatrixShape, radius: usize) -> Range<usize> {
    let MatrixShape { rows: n, cols: m } = shape;
    if n == 0 || m == 0 {
        return 0..0;
    }
    let lo = row * m / n;
    let hi = ((row + 1) * m).div_ceil(n).saturating_sub(1).max(lo);
    lo.saturating_sub(radius)..hi.saturating_add(radius).saturating_add(1).min(m)
}

/// Check that every band cell is reachable from `(0, 0)` and that `(n-1, m-1)` is in the band.
fn validate_band(ranges: &[Range<usize>], shape: MatrixShape) -> Result<(), DtwError> {
    let invalid = |row, reason| Err(DtwError::InvalidBand { row, reason });

    for (row, r) in ranges.iter().enumerate() {
        if r.is_empty() {
            return invalid(row, "row has no valid columns");
        }
        if r.end > shape.cols {
            return invalid(row, "range extends past the last column");
        }
        if row == 0 {
            if r.start != 0 {
                return invalid(row, "first row must start at column 0");
            }
            continue;
        }
        let prev = &ranges[row - 1];
        if r.start < prev.start {
            return invalid(row, "row starts before the previous row");
        }
        if r.start > prev.end {
            return invalid(row, "row is disconnected from the previous row");
        }
    }

    match ranges.last() {
        Some(last) if last.end == shape.cols => Ok(()),
        _ => invalid(shape.rows.saturating_sub(1), "last row must end at the last column"),
    }
}
