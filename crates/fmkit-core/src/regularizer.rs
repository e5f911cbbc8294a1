//! Per-group regularization strengths and the soft-threshold operator.

use serde::{Deserialize, Serialize};

/// Regularization strength for each coefficient group of a factorization machine.
///
/// The array form `[r0, r1, r2]` maps to bias, first-order weights and
/// second-order factors respectively.
///
/// # Example
///
/// ```
/// use fmkit_core::regularizer::GroupReg;
///
/// let reg = GroupReg::from([0.0, 0.01, 0.001]);
/// assert_eq!(reg.weights, 0.01);
/// assert_eq!(reg.to_array(), [0.0, 0.01, 0.001]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupReg {
    /// Strength applied to the bias.
    pub bias: f32,
    /// Strength applied to the first-order weights.
    pub weights: f32,
    /// Strength applied to the second-order factors.
    pub factors: f32,
}

impl GroupReg {
    /// Creates per-group strengths.
    pub fn new(bias: f32, weights: f32, factors: f32) -> Self {
        Self {
            bias,
            weights,
            factors,
        }
    }

    /// Uses the same strength for every group.
    pub fn uniform(strength: f32) -> Self {
        Self::new(strength, strength, strength)
    }

    /// Returns the strengths as `[bias, weights, factors]`.
    pub fn to_array(self) -> [f32; 3] {
        [self.bias, self.weights, self.factors]
    }
}

impl From<[f32; 3]> for GroupReg {
    fn from(reg: [f32; 3]) -> Self {
        Self::new(reg[0], reg[1], reg[2])
    }
}

/// Soft-thresholding (proximal L1) operator.
///
/// `S(x, t) = sign(x) * max(|x| - t, 0)`. Values whose magnitude does not
/// exceed the threshold map to exactly `+0.0`. NaN passes through unchanged.
#[inline]
pub fn soft_threshold(x: f32, threshold: f32) -> f32 {
    if x.is_nan() {
        x
    } else if x > threshold {
        x - threshold
    } else if x < -threshold {
        x + threshold
    } else {
        0.0
    }
}
