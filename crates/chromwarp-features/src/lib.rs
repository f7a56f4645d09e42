//! Scan feature vectors and built-in similarity strategies for chromwarp.
//!
//! A chromatogram is a sequence of [`FeatureVector`]s, one per scan. The
//! strategies here implement [`chromwarp_dtw::PairwiseSimilarity`] over those
//! vectors so that two chromatograms can be aligned with
//! [`chromwarp_dtw::Aligner`].

mod error;
mod feature;
mod metric;
mod time_penalty;

pub use error::FeatureError;
pub use feature::{
    FeatureVector, INTENSITY_VALUES, MASS_VALUES, SCAN_ACQUISITION_TIME, TOTAL_INTENSITY,
};
pub use metric::{CosineSimilarity, DotProduct, LpDistance, PearsonCorrelation};
pub use time_penalty::TimePenalized;
