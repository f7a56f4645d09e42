//! Banded dynamic time warping with pluggable similarity and path simplification.
//!
//! Pure math library, zero I/O. Aligns two sequences of arbitrary elements
//! under a caller-supplied [`PairwiseSimilarity`], restricted to an optional
//! [`BandConstraint`], using a three-predecessor recurrence with per-transition
//! [`Weights`] and gap penalties. The optimal [`WarpPath`] is recovered by a
//! deterministic traceback and summarized into [`AnchorSet`]s by recursive
//! pivot selection.
//!
//! ```
//! use chromwarp_dtw::{Aligner, AlignmentConfig, BandConstraint, FnSimilarity};
//!
//! let a = [1.0, 2.0, 3.0, 4.0];
//! let b = [1.0, 3.0, 4.0];
//! let aligner = Aligner::new(
//!     AlignmentConfig::new()
//!         .with_constraint(BandConstraint::SakoeChiba { radius: 1 })
//!         .with_levels([2]),
//! );
//! let result = aligner
//!     .apply(&a, &b, &FnSimilarity::minimize(|x: &f64, y: &f64| (x - y).abs()))
//!     .unwrap();
//! assert_eq!(result.warp_path.first().map(|p| (p.row, p.col)), Some((0, 0)));
//! assert_eq!(result.warp_path.last().map(|p| (p.row, p.col)), Some((3, 2)));
//! ```

mod align;
mod cancel;
mod config;
mod constraint;
mod error;
mod matrix;
mod optimizer;
mod path;
mod result;
mod score;
mod score_matrix;
mod similarity;
mod simplify;
mod transition;

pub use align::Aligner;
pub use cancel::{Cancellation, Deadline, NeverCancel};
pub use config::AlignmentConfig;
pub use constraint::{BandConstraint, ColumnBounds, MatrixShape};
pub use error::{DtwError, SimilarityError};
pub use matrix::{AlignmentMatrix, BandedMatrix};
pub use optimizer::{DynamicProgrammingOptimizer, Traceback};
pub use path::{SequencePosition, WarpPath};
pub use result::AlignmentResult;
pub use score::AlignmentScore;
pub use score_matrix::ScoreMatrix;
pub use similarity::{FnSimilarity, Objective, PairwiseSimilarity};
pub use simplify::{AnchorNode, AnchorScorer, AnchorSet, PairwiseCost, PathSimplifier};
pub use transition::{OperationCounts, TransitionState, Weights};
