//! Error types for chromwarp-features.

/// Errors from building feature vectors and configuring similarity strategies.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureError {
    /// Returned when a feature array contains NaN or an infinite value.
    #[error("feature \"{key}\" has non-finite value {value} at index {index}")]
    NonFiniteValue {
        /// The feature key.
        key: String,
        /// Position of the first offending value.
        index: usize,
        /// The offending value.
        value: f64,
    },

    /// Returned when a wrapper strategy requires a different objective from its inner strategy.
    #[error("{strategy} requires a maximizing inner similarity")]
    UnsupportedObjective {
        /// Name of the wrapping strategy.
        strategy: &'static str,
    },

    /// Returned when a numeric strategy parameter is out of range.
    #[error("invalid {name} = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The rejected value.
        value: f64,
        /// Accepted range.
        reason: &'static str,
    },
}
