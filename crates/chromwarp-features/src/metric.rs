//! Built-in similarity strategies over a single feature array.

use chromwarp_dtw::{Objective, PairwiseSimilarity, SimilarityError};
use serde::{Deserialize, Serialize};

use crate::{FeatureError, FeatureVector};

/// Fetch the arrays stored under `key` in both vectors and check they line up.
fn paired<'a>(
    key: &str,
    a: &'a FeatureVector,
    b: &'a FeatureVector,
) -> Result<(&'a [f64], &'a [f64]), SimilarityError> {
    let (x, y) = (a.get(key)?, b.get(key)?);
    if x.len() != y.len() {
        return Err(SimilarityError::LengthMismatch {
            key: key.to_owned(),
            left: x.len(),
            right: y.len(),
        });
    }
    Ok((x, y))
}

fn dot(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y).map(|(a, b)| a * b).sum()
}

/// Minkowski distance `(Σ|a_i - b_i|^p)^(1/p)` between the arrays under `key`.
///
/// Minimized. `p = 1` and `p = 2` take exact fast paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLpDistance")]
pub struct LpDistance {
    key: String,
    p: f64,
}

impl LpDistance {
    /// Create an L<sup>p</sup> distance over `key`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FeatureError::InvalidParameter`] | `p` is below 1 or not finite |
    pub fn new(key: impl Into<String>, p: f64) -> Result<Self, FeatureError> {
        if !(p.is_finite() && p >= 1.0) {
            return Err(FeatureError::InvalidParameter {
                name: "p",
                value: p,
                reason: "must be finite and at least 1",
            });
        }
        Ok(Self { key: key.into(), p })
    }

    /// Euclidean (L<sup>2</sup>) distance over `key`.
    #[must_use]
    pub fn euclidean(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            p: 2.0,
        }
    }

    /// Manhattan (L<sup>1</sup>) distance over `key`.
    #[must_use]
    pub fn manhattan(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            p: 1.0,
        }
    }

    /// Return the feature key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Return the exponent.
    #[must_use]
    pub fn p(&self) -> f64 {
        self.p
    }
}

impl PairwiseSimilarity<FeatureVector> for LpDistance {
    fn cost(&self, a: &FeatureVector, b: &FeatureVector) -> Result<f64, SimilarityError> {
        let (x, y) = paired(&self.key, a, b)?;
        let diffs = x.iter().zip(y).map(|(a, b)| (a - b).abs());
        Ok(if self.p == 1.0 {
            diffs.sum()
        } else if self.p == 2.0 {
            diffs.map(|d| d * d).sum::<f64>().sqrt()
        } else {
            diffs.map(|d| d.powf(self.p)).sum::<f64>().powf(self.p.recip())
        })
    }

    fn objective(&self) -> Objective {
        Objective::Minimize
    }
}

#[derive(Deserialize)]
struct RawLpDistance {
    key: String,
    p: f64,
}

impl TryFrom<RawLpDistance> for LpDistance {
    type Error = FeatureError;

    fn try_from(raw: RawLpDistance) -> Result<Self, Self::Error> {
        Self::new(raw.key, raw.p)
    }
}

/// Cosine of the angle between the arrays under `key`. Maximized.
///
/// A zero-norm array scores 0 against anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CosineSimilarity {
    key: String,
}

impl CosineSimilarity {
    /// Create a cosine similarity over `key`.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Return the feature key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl PairwiseSimilarity<FeatureVector> for CosineSimilarity {
    fn cost(&self, a: &FeatureVector, b: &FeatureVector) -> Result<f64, SimilarityError> {
        let (x, y) = paired(&self.key, a, b)?;
        let norms = dot(x, x).sqrt() * dot(y, y).sqrt();
        if norms == 0.0 {
            return Ok(0.0);
        }
        Ok(dot(x, y) / norms)
    }

    fn objective(&self) -> Objective {
        Objective::Maximize
    }
}

/// Inner product of the arrays under `key`. Maximized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DotProduct {
    key: String,
}

impl DotProduct {
    /// Create a dot-product similarity over `key`.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Return the feature key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl PairwiseSimilarity<FeatureVector> for DotProduct {
    fn cost(&self, a: &FeatureVector, b: &FeatureVector) -> Result<f64, SimilarityError> {
        let (x, y) = paired(&self.key, a, b)?;
        Ok(dot(x, y))
    }

    fn objective(&self) -> Objective {
        Objective::Maximize
    }
}

/// Pearson correlation between the arrays under `key`. Maximized.
///
/// Arrays with zero variance (including empty and single-element arrays) score 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PearsonCorrelation {
    key: String,
}

impl PearsonCorrelation {
    /// Create a Pearson correlation over `key`.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Return the feature key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl PairwiseSimilarity<FeatureVector> for PearsonCorrelation {
    fn cost(&self, a: &FeatureVector, b: &FeatureVector) -> Result<f64, SimilarityError> {
        let (x, y) = paired(&self.key, a, b)?;
        if x.is_empty() {
            return Ok(0.0);
        }
        let n = x.len() as f64;
        let mean_x = x.iter().sum::<f64>() / n;
        let mean_y = y.iter().sum::<f64>() / n;

        let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
        for (a, b) in x.iter().zip(y) {
            let (dx, dy) = (a - mean_x, b - mean_y);
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }
        if var_x == 0.0 || var_y == 0.0 {
            return Ok(0.0);
        }
        Ok(cov / (var_x.sqrt() * var_y.sqrt()))
    }

    fn objective(&self) -> Objective {
        Objective::Maximize
    }
}
