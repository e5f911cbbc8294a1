//! Random value sources used to initialize coefficient groups.
//!
//! Coefficient stores never reach for a process-wide generator. Anything that
//! draws fresh values takes a [`RandomSource`] argument instead, so a caller
//! can pin a seed for reproducible models or swap in a deterministic source
//! in tests.
//!
//! # Overview
//!
//! - [`RandomSource`] - The trait consumed by coefficient constructors
//! - [`GaussianSource`] - Normal samples from a seedable [`StdRng`]
//! - [`ConstantSource`] - Always returns the same value
//!
//! # Example
//!
//! ```
//! use fmkit_core::random::{GaussianSource, RandomSource};
//!
//! let mut rng = GaussianSource::seeded(7);
//! let weights = rng.vector(0.0, 0.01, 16);
//! assert_eq!(weights.len(), 16);
//! ```

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// A source of Gaussian-distributed values.
///
/// Only `scalar` is required; `vector` and `matrix` draw `scalar` repeatedly,
/// filling matrices in row-major order.
pub trait RandomSource {
    /// Draws one value from `Normal(mean, stdev)`.
    fn scalar(&mut self, mean: f32, stdev: f32) -> f32;

    /// Draws `len` independent values from `Normal(mean, stdev)`.
    fn vector(&mut self, mean: f32, stdev: f32, len: usize) -> Array1<f32> {
        Array1::from_shape_simple_fn(len, || self.scalar(mean, stdev))
    }

    /// Draws a `rows x cols` matrix of independent values from `Normal(mean, stdev)`.
    fn matrix(&mut self, mean: f32, stdev: f32, rows: usize, cols: usize) -> Array2<f32> {
        Array2::from_shape_simple_fn((rows, cols), || self.scalar(mean, stdev))
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn scalar(&mut self, mean: f32, stdev: f32) -> f32 {
        (**self).scalar(mean, stdev)
    }
}

/// Gaussian source backed by a seedable standard RNG.
///
/// Samples are `mean + stdev * z` with `z ~ N(0, 1)`, so a zero standard
/// deviation returns the mean exactly.
#[derive(Debug, Clone)]
pub struct GaussianSource {
    rng: StdRng,
}

impl GaussianSource {
    /// Creates a source with a fixed seed; equal seeds produce equal streams.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a source seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a seeded source when `seed` is given, an entropy-seeded one otherwise.
    pub fn with_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl RandomSource for GaussianSource {
    fn scalar(&mut self, mean: f32, stdev: f32) -> f32 {
        if stdev == 0.0 {
            return mean;
        }
        let z: f32 = self.rng.sample(StandardNormal);
        mean + stdev * z
    }
}

/// Source that ignores the distribution parameters and returns a constant.
///
/// # Example
///
/// ```
/// use fmkit_core::random::{ConstantSource, RandomSource};
///
/// let mut zeros = ConstantSource(0.0);
/// assert_eq!(zeros.scalar(1.0, 2.0), 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConstantSource(pub f32);

impl RandomSource for ConstantSource {
    fn scalar(&mut self, _mean: f32, _stdev: f32) -> f32 {
        self.0
    }
}
