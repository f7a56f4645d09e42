//! Error types for alignment, traceback, and pairwise similarity evaluation.

use crate::path::SequencePosition;

/// Errors raised by a [`PairwiseSimilarity`](crate::PairwiseSimilarity) strategy.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimilarityError {
    /// Returned when a feature vector does not carry the key the strategy reads.
    #[error("feature vector is missing key \"{key}\"")]
    MissingFeature {
        /// The requested feature key.
        key: String,
    },

    /// Returned when two feature arrays that must be compared element-wise differ in length.
    #[error("feature \"{key}\" has mismatched lengths: {left} vs {right}")]
    LengthMismatch {
        /// The compared feature key.
        key: String,
        /// Length of the array from sequence A.
        left: usize,
        /// Length of the array from sequence B.
        right: usize,
    },

    /// Returned when a feature that must hold a single value is empty.
    #[error("feature \"{key}\" is empty")]
    EmptyFeature {
        /// The empty feature key.
        key: String,
    },
}

/// Errors from banded matrix allocation, the forward pass, traceback, and path simplification.
#[derive(Debug, thiserror::Error)]
pub enum DtwError {
    /// Returned when either input sequence has no elements.
    #[error("sequence {which} must be non-empty")]
    EmptySequence {
        /// `'A'` for the row sequence, `'B'` for the column sequence.
        which: char,
    },

    /// Returned when a band constraint leaves part of the matrix unreachable
    /// or does not connect `(0, 0)` to `(n-1, m-1)`.
    #[error("invalid band at row {row}: {reason}")]
    InvalidBand {
        /// First row at which the band is invalid.
        row: usize,
        /// Which band condition failed.
        reason: &'static str,
    },

    /// Returned when the matrix shape does not match the sequence lengths.
    #[error("matrix is {matrix_rows}x{matrix_cols} but sequences are {rows}x{cols}")]
    DimensionMismatch {
        /// Rows allocated in the matrix.
        matrix_rows: usize,
        /// Columns allocated in the matrix.
        matrix_cols: usize,
        /// Length of sequence A.
        rows: usize,
        /// Length of sequence B.
        cols: usize,
    },

    /// Returned when a write targets a cell outside the band.
    #[error("cell ({row}, {col}) lies outside the band")]
    OutOfBand {
        /// Row of the rejected write.
        row: usize,
        /// Column of the rejected write.
        col: usize,
    },

    /// Returned when the forward pass is driven out of row-major band order.
    #[error("cell {got} stepped out of order, expected {expected:?}")]
    OutOfOrderCell {
        /// The next cell the optimizer expected, `None` once the pass is complete.
        expected: Option<SequencePosition>,
        /// The cell that was requested.
        got: SequencePosition,
    },

    /// Returned when traceback or score retrieval is requested before every band
    /// cell has been evaluated.
    #[error("forward pass incomplete: next cell is {next}")]
    IncompleteForwardPass {
        /// The first cell not yet evaluated.
        next: SequencePosition,
    },

    /// Returned when traceback reads a predecessor code that is not a transition.
    ///
    /// Indicates a defect in the recurrence; never transient.
    #[error("invalid predecessor code {code} at ({row}, {col})")]
    InvalidPredecessor {
        /// Row of the corrupt cell.
        row: usize,
        /// Column of the corrupt cell.
        col: usize,
        /// The raw code found in the traceback store.
        code: u8,
    },

    /// Returned when the similarity strategy yields NaN for a cell.
    #[error("similarity returned NaN at ({row}, {col})")]
    NanCost {
        /// Row of the offending cell.
        row: usize,
        /// Column of the offending cell.
        col: usize,
    },

    /// Wraps a similarity failure with the cell being evaluated.
    #[error("similarity failed at ({row}, {col}): {source}")]
    Similarity {
        /// Row of the offending cell.
        row: usize,
        /// Column of the offending cell.
        col: usize,
        /// Underlying strategy error.
        source: SimilarityError,
    },

    /// Returned when a transition weight or penalty is not finite.
    #[error("weight {name} must be finite, got {value}")]
    InvalidWeight {
        /// Name of the offending weight.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Returned when normalization would divide by a zero weighted path length.
    #[error("weighted path length is zero, cannot normalize")]
    ZeroNormalizer,

    /// Returned when path simplification is given no points.
    #[error("cannot simplify an empty path")]
    EmptyPath,

    /// Returned when the caller's cancellation check fires during the forward pass.
    #[error("alignment cancelled before row {row}")]
    Cancelled {
        /// The row that was about to be evaluated.
        row: usize,
    },
}
