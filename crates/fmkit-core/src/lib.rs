//! Factorization machine coefficients for fmkit.
//!
//! This crate holds the parameters of a factorization machine (a bias, one
//! weight per feature and a latent factor matrix for feature interactions)
//! together with the arithmetic, regularization and serialization operations
//! an optimizer needs to update and persist them.
//!
//! # Overview
//!
//! - [`Coefficients`] - The capability any optimizer works against
//! - [`FmCoefficients`] - The factorization machine implementation
//! - [`FmConfig`] - Shape, group flags and init parameters, loadable from JSON
//! - [`GroupReg`] - Per-group regularization strengths
//! - [`random::RandomSource`] - Injected source of initial values
//! - [`codec`] - The line-oriented text format
//!
//! # Example
//!
//! ```
//! use fmkit_core::{Coefficients, FmConfig, GroupReg};
//! use fmkit_core::random::GaussianSource;
//!
//! let mut rng = GaussianSource::seeded(0);
//! let mut model = FmConfig::new(16, 16, 4).build(&mut rng).unwrap();
//!
//! let gradient = model.copy_empty(&mut rng);
//! model.sub_in_place(&gradient.times_scalar(0.1)).unwrap();
//! model.l1_shrink(&GroupReg::new(0.0, 0.01, 0.01), 0.1);
//!
//! let text = model.encode();
//! let restored = fmkit_core::FmCoefficients::decode(&text).unwrap();
//! assert_eq!(restored.weights(), model.weights());
//! ```

pub mod codec;
pub mod coefficients;
pub mod config;
mod error;
pub mod fm;
pub mod random;
pub mod regularizer;

pub use coefficients::{proximal_step, Coefficients};
pub use config::{FmConfig, FmShape, Groups, InitParams};
pub use error::{CoefficientError, Result};
pub use fm::FmCoefficients;
pub use random::{ConstantSource, GaussianSource, RandomSource};
pub use regularizer::{soft_threshold, GroupReg};
