//! Named numeric arrays describing one scan.

use std::collections::BTreeMap;

use chromwarp_dtw::SimilarityError;
use serde::{Deserialize, Serialize};

use crate::FeatureError;

/// Per-bin intensities of the scan's spectrum.
pub const INTENSITY_VALUES: &str = "intensity_values";
/// Mass-to-charge values of the spectrum bins.
pub const MASS_VALUES: &str = "mass_values";
/// Retention time of the scan, stored as a one-element array.
pub const SCAN_ACQUISITION_TIME: &str = "scan_acquisition_time";
/// Summed intensity of the scan, stored as a one-element array.
pub const TOTAL_INTENSITY: &str = "total_intensity";

/// A scan described by named arrays of finite numbers.
///
/// Keys are free-form; the constants in this module name the ones the built-in
/// strategies read. Scalars such as [`SCAN_ACQUISITION_TIME`] are stored as
/// one-element arrays and read back with [`scalar`](Self::scalar).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Vec<f64>>",
    into = "BTreeMap<String, Vec<f64>>"
)]
pub struct FeatureVector {
    features: BTreeMap<String, Vec<f64>>,
}

impl FeatureVector {
    /// Create an empty feature vector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the array stored under `key`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FeatureError::NonFiniteValue`] | `values` contains NaN or an infinity |
    pub fn with_feature(
        mut self,
        key: impl Into<String>,
        values: impl Into<Vec<f64>>,
    ) -> Result<Self, FeatureError> {
        self.insert(key, values)?;
        Ok(self)
    }

    /// Add or replace a one-element array under `key`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FeatureError::NonFiniteValue`] | `value` is NaN or an infinity |
    pub fn with_scalar(self, key: impl Into<String>, value: f64) -> Result<Self, FeatureError> {
        self.with_feature(key, vec![value])
    }

    /// Store `values` under `key`, returning the array it replaced.
    ///
    /// On error the vector is left unchanged.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FeatureError::NonFiniteValue`] | `values` contains NaN or an infinity |
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        values: impl Into<Vec<f64>>,
    ) -> Result<Option<Vec<f64>>, FeatureError> {
        let key = key.into();
        let values = values.into();
        check_finite(&key, &values)?;
        Ok(self.features.insert(key, values))
    }

    /// Return the array stored under `key`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SimilarityError::MissingFeature`] | No array is stored under `key` |
    pub fn get(&self, key: &str) -> Result<&[f64], SimilarityError> {
        self.features
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| SimilarityError::MissingFeature {
                key: key.to_owned(),
            })
    }

    /// Return the first element of the array stored under `key`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SimilarityError::MissingFeature`] | No array is stored under `key` |
    /// | [`SimilarityError::EmptyFeature`] | The array is empty |
    pub fn scalar(&self, key: &str) -> Result<f64, SimilarityError> {
        self.get(key)?
            .first()
            .copied()
            .ok_or_else(|| SimilarityError::EmptyFeature {
                key: key.to_owned(),
            })
    }

    /// Return true if an array is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.features.contains_key(key)
    }

    /// Iterate over the stored keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    /// Return the number of stored arrays.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Return true if no arrays are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn check_finite(key: &str, values: &[f64]) -> Result<(), FeatureError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(FeatureError::NonFiniteValue {
            key: key.to_owned(),
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

impl TryFrom<BTreeMap<String, Vec<f64>>> for FeatureVector {
    type Error = FeatureError;

    fn try_from(features: BTreeMap<String, Vec<f64>>) -> Result<Self, Self::Error> {
        for (key, values) in &features {
            check_finite(key, values)?;
        }
        Ok(Self { features })
    }
}

impl From<FeatureVector> for BTreeMap<String, Vec<f64>> {
    fn from(vector: FeatureVector) -> Self {
        vector.features
    }
}
