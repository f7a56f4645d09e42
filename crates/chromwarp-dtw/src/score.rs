//! Optimal alignment value newtype.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::similarity::Objective;

/// The optimal accumulated value of an alignment, possibly normalized.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct AlignmentScore(f64);

impl AlignmentScore {
    /// Create a score from a raw value.
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Total ordering comparison using [`f64::total_cmp`].
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }

    /// Return true if `self` is strictly better than `other` under `objective`.
    #[must_use]
    pub fn is_better_than(self, other: Self, objective: Objective) -> bool {
        objective.is_better(self.0, other.0)
    }
}

impl fmt::Display for AlignmentScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}
