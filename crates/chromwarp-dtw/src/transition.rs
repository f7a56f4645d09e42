//! Transition states, their weights, and per-path transition tallies.

use serde::{Deserialize, Serialize};

use crate::error::DtwError;

/// The step that led into a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransitionState {
    /// From `(row-1, col-1)`: a match.
    Diagonal = 0,
    /// From `(row-1, col)`: an insertion, advancing only sequence A.
    Up = 1,
    /// From `(row, col-1)`: a deletion, advancing only sequence B.
    Left = 2,
}

impl TransitionState {
    /// All states in tie-break order.
    pub const ALL: [Self; 3] = [Self::Diagonal, Self::Up, Self::Left];

    /// Return the traceback code stored for this state.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for TransitionState {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Diagonal),
            1 => Ok(Self::Up),
            2 => Ok(Self::Left),
            other => Err(other),
        }
    }
}

/// Multiplicative weights per transition plus additive gap penalties.
///
/// # Defaults
///
/// | Parameter           | Default |
/// |---------------------|---------|
/// | `diagonal`          | 1.0     |
/// | `up`                | 1.0     |
/// | `left`              | 1.0     |
/// | `insertion_penalty` | 0.0     |
/// | `deletion_penalty`  | 0.0     |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWeights")]
pub struct Weights {
    diagonal: f64,
    up: f64,
    left: f64,
    insertion_penalty: f64,
    deletion_penalty: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            diagonal: 1.0,
            up: 1.0,
            left: 1.0,
            insertion_penalty: 0.0,
            deletion_penalty: 0.0,
        }
    }
}

impl Weights {
    /// Create weights for the `Diagonal`, `Up` and `Left` transitions with zero penalties.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::InvalidWeight`] | Any weight is NaN or infinite |
    pub fn new(diagonal: f64, up: f64, left: f64) -> Result<Self, DtwError> {
        check("diagonal", diagonal)?;
        check("up", up)?;
        check("left", left)?;
        Ok(Self {
            diagonal,
            up,
            left,
            ..Self::default()
        })
    }

    /// Set the additive penalty applied to every `Up` transition.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::InvalidWeight`] | `penalty` is NaN or infinite |
    pub fn with_insertion_penalty(mut self, penalty: f64) -> Result<Self, DtwError> {
        check("insertion_penalty", penalty)?;
        self.insertion_penalty = penalty;
        Ok(self)
    }

    /// Set the additive penalty applied to every `Left` transition.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::InvalidWeight`] | `penalty` is NaN or infinite |
    pub fn with_deletion_penalty(mut self, penalty: f64) -> Result<Self, DtwError> {
        check("deletion_penalty", penalty)?;
        self.deletion_penalty = penalty;
        Ok(self)
    }

    /// Return the multiplicative weight of `state`.
    #[must_use]
    pub fn weight(&self, state: TransitionState) -> f64 {
        match state {
            TransitionState::Diagonal => self.diagonal,
            TransitionState::Up => self.up,
            TransitionState::Left => self.left,
        }
    }

    /// Return the additive penalty of `state`; zero for `Diagonal`.
    #[must_use]
    pub fn penalty(&self, state: TransitionState) -> f64 {
        match state {
            TransitionState::Diagonal => 0.0,
            TransitionState::Up => self.insertion_penalty,
            TransitionState::Left => self.deletion_penalty,
        }
    }

    /// Return the penalty added to `Up` transitions.
    #[must_use]
    pub fn insertion_penalty(&self) -> f64 {
        self.insertion_penalty
    }

    /// Return the penalty added to `Left` transitions.
    #[must_use]
    pub fn deletion_penalty(&self) -> f64 {
        self.deletion_penalty
    }
}

fn check(name: &'static str, value: f64) -> Result<(), DtwError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DtwError::InvalidWeight { name, value })
    }
}

/// Field-by-field form of [`Weights`] used to validate deserialized input.
#[derive(Deserialize)]
#[serde(default)]
struct RawWeights {
    diagonal: f64,
    up: f64,
    left: f64,
    insertion_penalty: f64,
    deletion_penalty: f64,
}

impl Default for RawWeights {
    fn default() -> Self {
        let w = Weights::default();
        Self {
            diagonal: w.diagonal,
            up: w.up,
            left: w.left,
            insertion_penalty: w.insertion_penalty,
            deletion_penalty: w.deletion_penalty,
        }
    }
}

impl TryFrom<RawWeights> for Weights {
    type Error = DtwError;

    fn try_from(raw: RawWeights) -> Result<Self, Self::Error> {
        Weights::new(raw.diagonal, raw.up, raw.left)?
            .with_insertion_penalty(raw.insertion_penalty)?
            .with_deletion_penalty(raw.deletion_penalty)
    }
}

/// Number of cells on a warp path entered by each transition.
///
/// The origin `(0, 0)` counts as `Diagonal`, so `total()` equals the path length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationCounts {
    /// Cells entered diagonally (including the origin).
    pub diagonal: u64,
    /// Cells entered from above.
    pub up: u64,
    /// Cells entered from the left.
    pub left: u64,
}

impl OperationCounts {
    /// Record one cell entered by `state`.
    pub(crate) fn record(&mut self, state: TransitionState) {
        match state {
            TransitionState::Diagonal => self.diagonal += 1,
            TransitionState::Up => self.up += 1,
            TransitionState::Left => self.left += 1,
        }
    }

    /// Return the count for `state`.
    #[must_use]
    pub fn count(&self, state: TransitionState) -> u64 {
        match state {
            TransitionState::Diagonal => self.diagonal,
            TransitionState::Up => self.up,
            TransitionState::Left => self.left,
        }
    }

    /// Total number of counted cells.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.diagonal + self.up + self.left
    }

    /// `Σ weight[state] * count[state]`, the normalizer for optimal values.
    #[must_use]
    pub fn weighted_length(&self, weights: &Weights) -> f64 {
        TransitionState::ALL
            .iter()
            .map(|&s| weights.weight(s) * self.count(s) as f64)
            .sum()
    }
}
