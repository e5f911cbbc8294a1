//! The model coefficients capability.

use crate::error::Result;
use crate::random::RandomSource;

/// Arithmetic, regularization and serialization operations an optimizer
/// needs from a set of model coefficients.
///
/// Operations that mutate take `&mut self` and hand the receiver back so
/// calls can be chained. Every other operation takes `&self` and returns a
/// new owned instance; the receiver is left unchanged. `Clone` is the exact
/// content copy.
///
/// # Thread Safety
///
/// Implementations are plain data and do no internal synchronization.
/// Shared read-only access is fine; a mutating call needs exclusive access,
/// which the borrow checker already enforces.
///
/// # Example
///
/// ```
/// use fmkit_core::{Coefficients, FmCoefficients, Groups, GroupReg};
/// use ndarray::{arr1, arr2};
///
/// let mut current = FmCoefficients::from_parts(
///     1.0,
///     arr1(&[1.0, 2.0]),
///     arr2(&[[0.5, 0.5]]),
///     Groups::all(),
/// );
/// let delta = current.times_scalar(0.5);
/// current.sub_in_place(&delta).unwrap();
/// assert_eq!(current.bias(), 0.5);
///
/// let reg = GroupReg::uniform(0.1);
/// assert!(current.l2_reg_value(&reg) > 0.0);
/// ```
pub trait Coefficients: Clone + Sized {
    /// Per-group regularization strengths understood by this type.
    type Reg;

    /// Creates an instance with the same shape, flags and init parameters,
    /// filled with fresh values drawn from `rng`.
    ///
    /// This is a structural copy, not a content copy.
    fn copy_empty<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Self;

    /// Adds `other` elementwise to every enabled group of `self`.
    ///
    /// # Errors
    ///
    /// Returns [`CoefficientError::DimensionMismatch`] if the shapes differ.
    /// The receiver is not modified in that case.
    ///
    /// [`CoefficientError::DimensionMismatch`]: crate::CoefficientError::DimensionMismatch
    fn add_in_place(&mut self, other: &Self) -> Result<&mut Self>;

    /// Subtracts `other` elementwise from every enabled group of `self`.
    ///
    /// # Errors
    ///
    /// Same as [`add_in_place`](Coefficients::add_in_place).
    fn sub_in_place(&mut self, other: &Self) -> Result<&mut Self>;

    /// Returns a copy with `x` added to every enabled value.
    fn plus_scalar(&self, x: f32) -> Self;

    /// Returns a copy with every enabled value multiplied by `x`.
    fn times_scalar(&self, x: f32) -> Self;

    /// Returns a copy with every enabled value divided by `x`.
    ///
    /// Division by zero is not checked.
    fn divided_by_scalar(&self, x: f32) -> Self;

    /// L2 penalty `0.5 * sum(reg_g * |c|^2)` over enabled groups.
    fn l2_reg_value(&self, reg: &Self::Reg) -> f32;

    /// Gradient of the L2 penalty: a copy with each enabled group scaled by its strength.
    fn l2_reg_gradient(&self, reg: &Self::Reg) -> Self;

    /// L1 penalty `sum(reg_g * |c|_1)` over enabled groups.
    fn l1_reg_value(&self, reg: &Self::Reg) -> f32;

    /// Applies one proximal L1 (soft-threshold) step in place.
    ///
    /// # Arguments
    ///
    /// * `reg` - Per-group regularization strengths
    /// * `step_size` - Step size of the update the shrink follows
    fn l1_shrink(&mut self, reg: &Self::Reg, step_size: f32) -> &mut Self;

    /// Euclidean norm over all enabled values.
    fn norm(&self) -> f32;

    /// Serializes to the text format.
    fn encode(&self) -> String;

    /// Parses the text format.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the text is malformed. No partial result is
    /// ever produced.
    fn decode(text: &str) -> Result<Self>;
}

/// Performs a proximal gradient step: `current -= step_size * gradient`,
/// followed by an L1 shrink with the same step size.
///
/// # Errors
///
/// Returns [`CoefficientError::DimensionMismatch`] if `gradient` does not
/// match the shape of `current`; `current` is untouched in that case.
///
/// [`CoefficientError::DimensionMismatch`]: crate::CoefficientError::DimensionMismatch
pub fn proximal_step<C: Coefficients>(
    current: &mut C,
    gradient: &C,
    reg: &C::Reg,
    step_size: f32,
) -> Result<()> {
    let delta = gradient.times_scalar(step_size);
    current.sub_in_place(&delta)?.l1_shrink(reg, step_size);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Groups;
    use crate::fm::FmCoefficients;
    use crate::regularizer::GroupReg;
    use ndarray::{arr1, arr2, Array1, Array2};

    fn store(bias: f32, weights: &[f32]) -> FmCoefficients {
        FmCoefficients::from_parts(
            bias,
            arr1(weights),
            Array2::zeros((1, 2)),
            Groups::all(),
        )
    }

    #[test]
    fn test_proximal_step() {
        let mut current = store(1.0, &[2.0, 0.05]);
        let gradient = store(1.0, &[1.0, 0.0]);
        let reg = GroupReg::new(0.0, 0.1, 0.0);

        proximal_step(&mut current, &gradient, &reg, 0.5).unwrap();

        assert!((current.bias() - 0.5).abs() < 1e-6);
        // 2.0 - 0.5 = 1.5, shrunk by 0.05
        assert!((current.weights()[0] - 1.45).abs() < 1e-6);
        assert_eq!(current.weights()[1], 0.0);
    }

    #[test]
    fn test_proximal_step_dimension_mismatch() {
        let mut current = store(1.0, &[2.0, 3.0]);
        let before = current.clone();
        let gradient = store(1.0, &[1.0]);

        let result = proximal_step(&mut current, &gradient, &GroupReg::default(), 1.0);
        assert!(result.is_err());
        assert_eq!(current, before);
    }

    #[test]
    fn test_generic_usage() {
        fn total_penalty<C: Coefficients>(c: &C, reg: &C::Reg) -> f32 {
            c.l1_reg_value(reg) + c.l2_reg_value(reg)
        }

        let c = FmCoefficients::from_parts(
            0.0,
            Array1::zeros(2),
            arr2(&[[1.0, -1.0]]),
            Groups::all(),
        );
        let reg = GroupReg::uniform(1.0);
        assert!((total_penalty(&c, &reg) - 3.0).abs() < 1e-6);
    }
}
