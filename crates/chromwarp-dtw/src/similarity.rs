//! Pairwise similarity contract and optimization direction.

use serde::{Deserialize, Serialize};

use crate::error::SimilarityError;

/// Whether the accumulated objective is minimized (a cost) or maximized (a similarity).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Objective {
    /// Lower accumulated scores are better.
    #[default]
    Minimize,
    /// Higher accumulated scores are better.
    Maximize,
}

impl Objective {
    /// Value held by cells that are outside the band or not yet evaluated.
    ///
    /// `+inf` when minimizing, `-inf` when maximizing, so that such a cell can
    /// never win a comparison against a reachable one.
    #[must_use]
    pub fn sentinel(self) -> f64 {
        match self {
            Self::Minimize => f64::INFINITY,
            Self::Maximize => f64::NEG_INFINITY,
        }
    }

    /// Return true if `candidate` is strictly better than `incumbent`.
    #[must_use]
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Self::Minimize => candidate < incumbent,
            Self::Maximize => candidate > incumbent,
        }
    }
}

/// A pure scoring function between two sequence elements.
///
/// Implementations must be deterministic: the optimizer calls [`cost`](Self::cost)
/// exactly once per band cell and assumes repeated runs see identical values.
pub trait PairwiseSimilarity<T: ?Sized> {
    /// Score the pair `(a, b)`.
    ///
    /// # Errors
    ///
    /// Returns a [`SimilarityError`] when an element lacks the data the strategy
    /// reads. The optimizer treats this as fatal for the whole alignment.
    fn cost(&self, a: &T, b: &T) -> Result<f64, SimilarityError>;

    /// The direction in which accumulated scores improve.
    fn objective(&self) -> Objective;

    /// Return true if accumulated scores are minimized.
    fn is_minimize(&self) -> bool {
        self.objective() == Objective::Minimize
    }
}

impl<T: ?Sized, S: PairwiseSimilarity<T> + ?Sized> PairwiseSimilarity<T> for &S {
    fn cost(&self, a: &T, b: &T) -> Result<f64, SimilarityError> {
        (**self).cost(a, b)
    }

    fn objective(&self) -> Objective {
        (**self).objective()
    }
}

/// Adapts an infallible closure into a [`PairwiseSimilarity`].
///
/// ```
/// use chromwarp_dtw::{FnSimilarity, PairwiseSimilarity};
///
/// let abs = FnSimilarity::minimize(|a: &f64, b: &f64| (a - b).abs());
/// assert_eq!(abs.cost(&1.0, &4.0).unwrap(), 3.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnSimilarity<F> {
    f: F,
    objective: Objective,
}

impl<F> FnSimilarity<F> {
    /// Wrap `f` with an explicit objective.
    #[must_use]
    pub fn new(f: F, objective: Objective) -> Self {
        Self { f, objective }
    }

    /// Wrap a cost function whose accumulated value is minimized.
    #[must_use]
    pub fn minimize(f: F) -> Self {
        Self::new(f, Objective::Minimize)
    }

    /// Wrap a similarity function whose accumulated value is maximized.
    #[must_use]
    pub fn maximize(f: F) -> Self {
        Self::new(f, Objective::Maximize)
    }
}

impl<T: ?Sized, F: Fn(&T, &T) -> f64> PairwiseSimilarity<T> for FnSimilarity<F> {
    fn cost(&self, a: &T, b: &T) -> Result<f64, SimilarityError> {
        Ok((self.f)(a, b))
    }

    fn objective(&self) -> Objective {
        self.objective
    }
}
