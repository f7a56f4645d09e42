//! Retention-time penalty wrapped around another similarity.

use chromwarp_dtw::{Objective, PairwiseSimilarity, SimilarityError};
use serde::Serialize;

use crate::{FeatureError, FeatureVector, SCAN_ACQUISITION_TIME};

/// Scales a maximizing similarity by how close two scans eluted.
///
/// ```text
/// score = max(inner(a, b), 0) * exp(-(t_a - t_b)^2 / (2 * sigma^2))
/// ```
///
/// where `t` is [`SCAN_ACQUISITION_TIME`]. Negative inner scores (for example
/// anti-correlated spectra) are floored at 0 before the penalty is applied, so
/// a larger time gap can never raise a pair's score. With a window set, pairs
/// further apart than the window score 0 without evaluating the inner
/// similarity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimePenalized<S> {
    inner: S,
    sigma: f64,
    window: Option<f64>,
}

impl<S: PairwiseSimilarity<FeatureVector>> TimePenalized<S> {
    /// Wrap `inner` with a Gaussian penalty of width `sigma`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FeatureError::UnsupportedObjective`] | `inner` is minimized |
    /// | [`FeatureError::InvalidParameter`] | `sigma` is not positive and finite |
    pub fn new(inner: S, sigma: f64) -> Result<Self, FeatureError> {
        if inner.objective() != Objective::Maximize {
            return Err(FeatureError::UnsupportedObjective {
                strategy: "TimePenalized",
            });
        }
        positive("sigma", sigma)?;
        Ok(Self {
            inner,
            sigma,
            window: None,
        })
    }

    /// Score 0 for every pair whose retention times differ by more than `window`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FeatureError::InvalidParameter`] | `window` is not positive and finite |
    pub fn with_window(mut self, window: f64) -> Result<Self, FeatureError> {
        positive("window", window)?;
        self.window = Some(window);
        Ok(self)
    }

    /// Return the wrapped similarity.
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Return the Gaussian width.
    #[must_use]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Return the hard retention-time window, if any.
    #[must_use]
    pub fn window(&self) -> Option<f64> {
        self.window
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), FeatureError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FeatureError::InvalidParameter {
            name,
            value,
            reason: "must be positive and finite",
        })
    }
}

impl<S: PairwiseSimilarity<FeatureVector>> PairwiseSimilarity<FeatureVector> for TimePenalized<S> {
    fn cost(&self, a: &FeatureVector, b: &FeatureVector) -> Result<f64, SimilarityError> {
        let dt = a.scalar(SCAN_ACQUISITION_TIME)? - b.scalar(SCAN_ACQUISITION_TIME)?;
        if let Some(window) = self.window
            && dt.abs() > window
        {
            return Ok(0.0);
        }
        let penalty = (-(dt * dt) / (2.0 * self.sigma * self.sigma)).exp();
        Ok(self.inner.cost(a, b)?.max(0.0) * penalty)
    }

    fn objective(&self) -> Objective {
        Objective::Maximize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CosineSimilarity, INTENSITY_VALUES, LpDistance, PearsonCorrelation};

    fn scan(time: f64, values: &[f64]) -> FeatureVector {
        FeatureVector::new()
            .with_feature(INTENSITY_VALUES, values.to_vec())
            .unwrap()
            .with_scalar(SCAN_ACQUISITION_TIME, time)
            .unwrap()
    }

    #[test]
    fn gaussian_penalty_on_time_difference() {
        let sim = TimePenalized::new(CosineSimilarity::new(INTENSITY_VALUES), 2.0).unwrap();
        let a = scan(10.0, &[1.0, 0.0]);
        assert!((sim.cost(&a, &scan(10.0, &[1.0, 0.0])).unwrap() - 1.0).abs() < 1e-12);

        // dt = 2, sigma = 2: exp(-4 / 8)
        let shifted = sim.cost(&a, &scan(12.0, &[1.0, 0.0])).unwrap();
        assert!((shifted - (-0.5f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn anti_correlated_scans_never_favour_distance() {
        let sim = TimePenalized::new(PearsonCorrelation::new(INTENSITY_VALUES), 1.0).unwrap();
        let a = scan(0.0, &[1.0, 2.0, 3.0]);
        let near = sim.cost(&a, &scan(0.0, &[3.0, 2.0, 1.0])).unwrap();
        let far = sim.cost(&a, &scan(10.0, &[3.0, 2.0, 1.0])).unwrap();
        assert_eq!(near, 0.0);
        assert_eq!(far, 0.0);
        assert!(!Objective::Maximize.is_better(far, near));

        // Positive scores keep their time ordering.
        let near = sim.cost(&a, &scan(0.5, &[1.0, 2.0, 3.0])).unwrap();
        let far = sim.cost(&a, &scan(3.0, &[1.0, 2.0, 3.0])).unwrap();
        assert!(Objective::Maximize.is_better(near, far));
    }

    #[test]
    fn window_cuts_off_distant_scans() {
        let sim = TimePenalized::new(CosineSimilarity::new(INTENSITY_VALUES), 5.0)
            .unwrap()
            .with_window(1.5)
            .unwrap();
        let a = scan(0.0, &[1.0, 1.0]);
        assert!(sim.cost(&a, &scan(1.0, &[1.0, 1.0])).unwrap() > 0.0);
        assert_eq!(sim.cost(&a, &scan(2.0, &[1.0, 1.0])).unwrap(), 0.0);
        assert_eq!(sim.window(), Some(1.5));
    }

    #[test]
    fn rejects_minimizing_inner() {
        let err = TimePenalized::new(LpDistance::euclidean(INTENSITY_VALUES), 1.0).unwrap_err();
        assert_eq!(
            err,
            FeatureError::UnsupportedObjective {
                strategy: "TimePenalized"
            }
        );
    }

    #[test]
    fn rejects_bad_parameters() {
        let cosine = CosineSimilarity::new(INTENSITY_VALUES);
        assert!(TimePenalized::new(cosine.clone(), 0.0).is_err());
        assert!(TimePenalized::new(cosine.clone(), f64::NAN).is_err());
        let sim = TimePenalized::new(cosine, 1.0).unwrap();
        assert!(matches!(
            sim.with_window(-1.0),
            Err(FeatureError::InvalidParameter { name: "window", .. })
        ));
    }

    #[test]
    fn missing_time_is_a_similarity_error() {
        let sim = TimePenalized::new(CosineSimilarity::new(INTENSITY_VALUES), 1.0).unwrap();
        let untimed = FeatureVector::new()
            .with_feature(INTENSITY_VALUES, [1.0])
            .unwrap();
        assert_eq!(
            sim.cost(&untimed, &scan(0.0, &[1.0])).unwrap_err(),
            SimilarityError::MissingFeature {
                key: SCAN_ACQUISITION_TIME.into()
            }
        );
    }
}
