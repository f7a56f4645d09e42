//! Banded storage for cumulative scores, raw pairwise scores, and traceback codes.

use std::ops::Range;

use crate::constraint::{BandConstraint, MatrixShape};
use crate::error::DtwError;
use crate::similarity::Objective;

/// Traceback code of a cell that has not been evaluated yet.
pub(crate) const UNSET: u8 = u8::MAX;

/// A matrix that stores only the cells inside a per-row band.
///
/// Row `i` owns the columns `bands[i]`, stored contiguously at
/// `data[offsets[i]..offsets[i + 1]]`. Reads outside the band return the
/// default value; writes outside the band are rejected.
#[derive(Debug, Clone)]
pub struct BandedMatrix<T> {
    shape: MatrixShape,
    bands: Vec<Range<usize>>,
    offsets: Vec<usize>,
    data: Vec<T>,
    default: T,
}

impl<T: Copy> BandedMatrix<T> {
    /// Allocate a matrix with the given per-row bands, every cell set to `default`.
    ///
    /// `bands` must hold one range per row; ranges are not validated here.
    pub(crate) fn new(shape: MatrixShape, bands: Vec<Range<usize>>, default: T) -> Self {
        debug_assert_eq!(bands.len(), shape.rows);
        let mut offsets = Vec::with_capacity(bands.len() + 1);
        let mut total = 0;
        offsets.push(0);
        for band in &bands {
            total += band.len();
            offsets.push(total);
        }
        Self {
            shape,
            bands,
            offsets,
            data: vec![default; total],
            default,
        }
    }

    /// Return the matrix dimensions.
    #[must_use]
    pub fn shape(&self) -> MatrixShape {
        self.shape
    }

    /// Return the valid columns of `row`, or an empty range for a row past the end.
    #[must_use]
    pub fn column_range(&self, row: usize) -> Range<usize> {
        self.bands.get(row).cloned().unwrap_or(0..0)
    }

    /// Return true if `(row, col)` lies inside the band.
    #[must_use]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.bands.get(row).is_some_and(|r| r.contains(&col))
    }

    /// Total number of stored cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.data.len()
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        let band = self.bands.get(row)?;
        band.contains(&col)
            .then(|| self.offsets[row] + (col - band.start))
    }

    /// Return the value at `(row, col)`, or the default value when out of band.
    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.index(row, col).map_or(self.default, |i| self.data[i])
    }

    /// Return a mutable reference to an in-band cell.
    #[inline]
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        let i = self.index(row, col)?;
        Some(&mut self.data[i])
    }

    /// Overwrite an in-band cell.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::OutOfBand`] | `(row, col)` is outside the band |
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<(), DtwError> {
        let cell = self
            .get_mut(row, col)
            .ok_or(DtwError::OutOfBand { row, col })?;
        *cell = value;
        Ok(())
    }

    /// Return the stored cells of `row` in column order.
    #[must_use]
    pub fn row(&self, row: usize) -> &[T] {
        match self.offsets.get(row..=row + 1) {
            Some([start, end]) => &self.data[*start..*end],
            _ => &[],
        }
    }
}

/// The three parallel stores filled by one forward pass.
///
/// Created fresh for each alignment, written exactly once per band cell by
/// the optimizer, then handed to the caller read-only.
#[derive(Debug, Clone)]
pub struct AlignmentMatrix {
    objective: Objective,
    cumulative: BandedMatrix<f64>,
    pairwise: BandedMatrix<f64>,
    traceback: BandedMatrix<u8>,
}

impl AlignmentMatrix {
    /// Allocate stores for a `shape.rows x shape.cols` alignment under `constraint`.
    ///
    /// Out-of-band and unevaluated cells hold `objective.sentinel()`. Memory is
    /// proportional to the number of band cells, not to `rows * cols`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySequence`] | `shape.rows` or `shape.cols` is zero |
    /// | [`DtwError::InvalidBand`] | The constraint does not yield a connected band |
    pub fn allocate(
        shape: MatrixShape,
        constraint: &BandConstraint,
        objective: Objective,
    ) -> Result<Self, DtwError> {
        if shape.rows == 0 {
            return Err(DtwError::EmptySequence { which: 'A' });
        }
        if shape.cols == 0 {
            return Err(DtwError::EmptySequence { which: 'B' });
        }
        let bands = constraint.resolve(shape)?;
        let sentinel = objective.sentinel();
        Ok(Self {
            objective,
            cumulative: BandedMatrix::new(shape, bands.clone(), sentinel),
            pairwise: BandedMatrix::new(shape, bands.clone(), sentinel),
            traceback: BandedMatrix::new(shape, bands, UNSET),
        })
    }

    /// Return the matrix dimensions.
    #[must_use]
    pub fn shape(&self) -> MatrixShape {
        self.cumulative.shape()
    }

    /// Return the optimization direction the sentinel was chosen for.
    #[must_use]
    pub fn objective(&self) -> Objective {
        self.objective
    }

    /// Return the valid columns of `row`.
    #[must_use]
    pub fn column_range(&self, row: usize) -> Range<usize> {
        self.cumulative.column_range(row)
    }

    /// Return true if `(row, col)` lies inside the band.
    #[must_use]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.cumulative.contains(row, col)
    }

    /// Number of band cells, i.e. the number of forward-pass steps.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cumulative.cell_count()
    }

    /// Accumulated score at `(row, col)`; the sentinel when out of band.
    #[must_use]
    pub fn cumulative(&self, row: usize, col: usize) -> f64 {
        self.cumulative.get(row, col)
    }

    /// Raw pairwise score at `(row, col)`; the sentinel when out of band.
    #[must_use]
    pub fn pairwise(&self, row: usize, col: usize) -> f64 {
        self.pairwise.get(row, col)
    }

    /// Raw traceback code at `(row, col)`.
    pub(crate) fn traceback_code(&self, row: usize, col: usize) -> u8 {
        self.traceback.get(row, col)
    }

    /// Borrow the cumulative score store.
    #[must_use]
    pub fn cumulative_store(&self) -> &BandedMatrix<f64> {
        &self.cumulative
    }

    /// Borrow the raw pairwise score store.
    #[must_use]
    pub fn pairwise_store(&self) -> &BandedMatrix<f64> {
        &self.pairwise
    }

    /// Record the result of evaluating one cell.
    pub(crate) fn record(
        &mut self,
        row: usize,
        col: usize,
        pairwise: f64,
        cumulative: f64,
        code: u8,
    ) -> Result<(), DtwError> {
        self.pairwise.set(row, col, pairwise)?;
        self.cumulative.set(row, col, cumulative)?;
        self.traceback.set(row, col, code)
    }

    /// Overwrite a traceback code, for exercising corrupt-store handling.
    #[cfg(test)]
    pub(crate) fn corrupt_traceback(&mut self, row: usize, col: usize, code: u8) {
        if let Some(cell) = self.traceback.get_mut(row, col) {
            *cell = code;
        }
    }
}
