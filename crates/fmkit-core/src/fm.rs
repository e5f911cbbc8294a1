//! Factorization machine coefficient store.
//!
//! [`FmCoefficients`] holds the three coefficient groups of a factorization
//! machine and implements the [`Coefficients`] capability over them:
//!
//! - bias: a single intercept value
//! - weights: one first-order weight per feature
//! - factors: a `num_interact_features x num_factors` latent matrix
//!
//! Each group is gated by a flag in [`Groups`]. A disabled group keeps its
//! storage at the declared shape so the shape invariants always hold, but no
//! arithmetic or regularization operation ever reads or writes it.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array, Array1, Array2, ArrayView1, ArrayView2, Dimension, Zip};
use tracing::debug;

use crate::codec;
use crate::coefficients::Coefficients;
use crate::config::{FmShape, Groups, InitParams};
use crate::error::{CoefficientError, Result};
use crate::random::RandomSource;
use crate::regularizer::{soft_threshold, GroupReg};

/// Coefficients of a factorization machine.
///
/// # Example
///
/// ```
/// use fmkit_core::{Coefficients, FmCoefficients, FmShape, Groups, InitParams};
/// use fmkit_core::random::GaussianSource;
///
/// let mut rng = GaussianSource::seeded(42);
/// let fm = FmCoefficients::new(
///     FmShape::new(10, 10, 4),
///     Groups::all(),
///     InitParams::new(0.0, 0.01),
///     &mut rng,
/// )
/// .unwrap();
///
/// let decoded = FmCoefficients::decode(&fm.encode()).unwrap();
/// assert_eq!(decoded.weights(), fm.weights());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FmCoefficients {
    bias: f32,
    weights: Array1<f32>,
    factors: Array2<f32>,
    groups: Groups,
    init: InitParams,
}

impl FmCoefficients {
    /// Creates a store whose enabled groups are drawn from `Normal(init.mean, init.stdev)`.
    ///
    /// Disabled groups are zero-filled. Values are drawn bias first, then
    /// weights, then factors in row-major order, so a seeded source always
    /// produces the same store.
    ///
    /// # Errors
    ///
    /// Returns [`CoefficientError::InvalidConfig`] if the init parameters are
    /// not finite, the standard deviation is negative, or second-order
    /// factors are enabled with `num_factors == 0`.
    pub fn new<R: RandomSource + ?Sized>(
        shape: FmShape,
        groups: Groups,
        init: InitParams,
        rng: &mut R,
    ) -> Result<Self> {
        init.validate()?;
        if groups.second_order && shape.num_factors == 0 {
            return Err(CoefficientError::InvalidConfig {
                message: "num_factors must be positive when second-order factors are enabled"
                    .to_string(),
            });
        }
        Ok(Self::draw(shape, groups, init, rng))
    }

    fn draw<R: RandomSource + ?Sized>(
        shape: FmShape,
        groups: Groups,
        init: InitParams,
        rng: &mut R,
    ) -> Self {
        let InitParams { mean, stdev } = init;
        let bias = if groups.bias {
            rng.scalar(mean, stdev)
        } else {
            0.0
        };
        let weights = if groups.first_order {
            rng.vector(mean, stdev, shape.num_features)
        } else {
            Array1::zeros(shape.num_features)
        };
        let factors = if groups.second_order {
            rng.matrix(
                mean,
                stdev,
                shape.num_interact_features,
                shape.num_factors,
            )
        } else {
            Array2::zeros((shape.num_interact_features, shape.num_factors))
        };

        Self {
            bias,
            weights,
            factors,
            groups,
            init,
        }
    }

    /// Creates a store from explicit values with default init parameters.
    ///
    /// The shape is taken from `weights` and `factors`.
    pub fn from_parts(
        bias: f32,
        weights: Array1<f32>,
        factors: Array2<f32>,
        groups: Groups,
    ) -> Self {
        Self {
            bias,
            weights,
            factors,
            groups,
            init: InitParams::default(),
        }
    }

    /// Replaces the init parameters used by [`Coefficients::copy_empty`].
    pub fn with_init_params(mut self, init: InitParams) -> Result<Self> {
        init.validate()?;
        self.init = init;
        Ok(self)
    }

    /// Bias value.
    pub fn bias(&self) -> f32 {
        self.bias
    }

    /// First-order weights.
    pub fn weights(&self) -> ArrayView1<'_, f32> {
        self.weights.view()
    }

    /// Second-order factor matrix (row = feature, column = latent dimension).
    pub fn factors(&self) -> ArrayView2<'_, f32> {
        self.factors.view()
    }

    /// Group flags fixed at construction.
    pub fn groups(&self) -> Groups {
        self.groups
    }

    /// Init parameters used by [`Coefficients::copy_empty`].
    pub fn init_params(&self) -> InitParams {
        self.init
    }

    /// Dimensions of the weight vector and factor matrix.
    pub fn shape(&self) -> FmShape {
        FmShape::new(
            self.weights.len(),
            self.factors.nrows(),
            self.factors.ncols(),
        )
    }

    /// Length of the weight vector.
    pub fn num_features(&self) -> usize {
        self.weights.len()
    }

    /// Rows of the factor matrix.
    pub fn num_interact_features(&self) -> usize {
        self.factors.nrows()
    }

    /// Latent dimensions per row of the factor matrix.
    pub fn num_factors(&self) -> usize {
        self.factors.ncols()
    }

    /// Number of non-zero first-order weights.
    pub fn active_weight_count(&self) -> usize {
        count_active(self.weights.iter())
    }

    /// Number of non-zero factor entries.
    pub fn active_factor_count(&self) -> usize {
        count_active(self.factors.iter())
    }

    fn check_shape(&self, other: &Self) -> Result<()> {
        let checks = [
            ("weights", self.weights.len(), other.weights.len()),
            ("factors.rows", self.factors.nrows(), other.factors.nrows()),
            ("factors.cols", self.factors.ncols(), other.factors.ncols()),
        ];
        for (group, expected, actual) in checks {
            if expected != actual {
                return Err(CoefficientError::DimensionMismatch {
                    group,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Returns a copy with `f` applied to every value of every enabled group.
    fn map_enabled(&self, f: impl Fn(f32) -> f32) -> Self {
        let mut out = self.clone();
        if self.groups.bias {
            out.bias = f(out.bias);
        }
        if self.groups.first_order {
            out.weights.mapv_inplace(&f);
        }
        if self.groups.second_order {
            out.factors.mapv_inplace(&f);
        }
        out
    }

    fn combine(&mut self, other: &Self, f: impl Fn(f32, f32) -> f32) -> Result<&mut Self> {
        self.check_shape(other)?;
        if self.groups.bias {
            self.bias = f(self.bias, other.bias);
        }
        if self.groups.first_order {
            Zip::from(&mut self.weights)
                .and(&other.weights)
                .for_each(|a, &b| *a = f(*a, b));
        }
        if self.groups.second_order {
            Zip::from(&mut self.factors)
                .and(&other.factors)
                .for_each(|a, &b| *a = f(*a, b));
        }
        Ok(self)
    }
}

fn count_active<'a>(values: impl Iterator<Item = &'a f32>) -> usize {
    values.filter(|&&v| v != 0.0).count()
}

fn sum_squares<'a>(values: impl Iterator<Item = &'a f32>) -> f32 {
    values.map(|v| v * v).sum()
}

fn sum_abs<'a>(values: impl Iterator<Item = &'a f32>) -> f32 {
    values.map(|v| v.abs()).sum()
}

/// Soft-thresholds the active entries of `values` into a fresh zeroed
/// container and returns the number of entries that became zero.
fn shrink_active<D: Dimension>(values: &mut Array<f32, D>, threshold: f32) -> usize {
    let mut shrunk = Array::<f32, D>::zeros(values.raw_dim());
    let mut dropped = 0;
    Zip::from(&mut shrunk).and(&*values).for_each(|out, &x| {
        if x != 0.0 {
            let y = soft_threshold(x, threshold);
            if y != 0.0 {
                *out = y;
            } else {
                dropped += 1;
            }
        }
    });
    *values = shrunk;
    dropped
}

impl Coefficients for FmCoefficients {
    type Reg = GroupReg;

    fn copy_empty<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Self {
        Self::draw(self.shape(), self.groups, self.init, rng)
    }

    fn add_in_place(&mut self, other: &Self) -> Result<&mut Self> {
        self.combine(other, |a, b| a + b)
    }

    fn sub_in_place(&mut self, other: &Self) -> Result<&mut Self> {
        self.combine(other, |a, b| a - b)
    }

    fn plus_scalar(&self, x: f32) -> Self {
        self.map_enabled(|v| v + x)
    }

    fn times_scalar(&self, x: f32) -> Self {
        self.map_enabled(|v| v * x)
    }

    fn divided_by_scalar(&self, x: f32) -> Self {
        self.map_enabled(|v| v / x)
    }

    fn l2_reg_value(&self, reg: &GroupReg) -> f32 {
        let mut value = 0.0;
        if self.groups.bias {
            value += reg.bias * self.bias * self.bias;
        }
        if self.groups.first_order {
            value += reg.weights * sum_squares(self.weights.iter());
        }
        if self.groups.second_order {
            value += reg.factors * sum_squares(self.factors.iter());
        }
        0.5 * value
    }

    fn l2_reg_gradient(&self, reg: &GroupReg) -> Self {
        let mut out = self.clone();
        if self.groups.bias {
            out.bias *= reg.bias;
        }
        if self.groups.first_order {
            out.weights *= reg.weights;
        }
        if self.groups.second_order {
            out.factors *= reg.factors;
        }
        out
    }

    fn l1_reg_value(&self, reg: &GroupReg) -> f32 {
        let mut value = 0.0;
        if self.groups.bias {
            value += reg.bias * self.bias.abs();
        }
        if self.groups.first_order {
            value += reg.weights * sum_abs(self.weights.iter());
        }
        if self.groups.second_order {
            value += reg.factors * sum_abs(self.factors.iter());
        }
        value
    }

    fn l1_shrink(&mut self, reg: &GroupReg, step_size: f32) -> &mut Self {
        if self.groups.bias {
            self.bias = soft_threshold(self.bias, reg.bias * step_size);
        }

        let mut weights_dropped = 0;
        if self.groups.first_order {
            weights_dropped = shrink_active(&mut self.weights, reg.weights * step_size);
        }

        let mut factors_dropped = 0;
        if self.groups.second_order && self.num_factors() > 0 {
            // Spread the penalty over the latent dimensions.
            let threshold = reg.factors * step_size / self.num_factors() as f32;
            factors_dropped = shrink_active(&mut self.factors, threshold);
        }

        debug!(step_size, weights_dropped, factors_dropped, "Applied L1 shrink");
        self
    }

    fn norm(&self) -> f32 {
        let mut sum = 0.0;
        if self.groups.bias {
            sum += self.bias * self.bias;
        }
        if self.groups.first_order {
            sum += sum_squares(self.weights.iter());
        }
        if self.groups.second_order {
            sum += sum_squares(self.factors.iter());
        }
        sum.sqrt()
    }

    fn encode(&self) -> String {
        codec::encode(self)
    }

    fn decode(text: &str) -> Result<Self> {
        codec::decode(text)
    }
}

impl fmt::Display for FmCoefficients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&codec::encode(self))
    }
}

impl FromStr for FmCoefficients {
    type Err = CoefficientError;

    fn from_str(s: &str) -> Result<Self> {
        codec::decode(s)
    }
}
