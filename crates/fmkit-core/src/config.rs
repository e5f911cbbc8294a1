//! Configuration for factorization machine coefficient stores.
//!
//! [`FmConfig`] bundles the dimensions, enabled groups and initialization
//! parameters of a model. It is JSON-serializable so a model definition can
//! live in a file next to its checkpoints.
//!
//! # Example
//!
//! ```
//! use fmkit_core::config::FmConfig;
//! use fmkit_core::random::GaussianSource;
//!
//! let config = FmConfig::new(100, 100, 8)
//!     .with_bias(true)
//!     .with_init(0.0, 0.05);
//! let coefficients = config.build(&mut GaussianSource::seeded(1)).unwrap();
//! assert_eq!(coefficients.num_factors(), 8);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoefficientError, Result};
use crate::fm::FmCoefficients;
use crate::random::RandomSource;

/// Dimensions of the three coefficient groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FmShape {
    /// Length of the first-order weight vector.
    pub num_features: usize,
    /// Number of rows of the factor matrix.
    pub num_interact_features: usize,
    /// Number of columns of the factor matrix (latent dimensions).
    pub num_factors: usize,
}

impl FmShape {
    /// Creates a shape.
    pub fn new(num_features: usize, num_interact_features: usize, num_factors: usize) -> Self {
        Self {
            num_features,
            num_interact_features,
            num_factors,
        }
    }
}

/// Which coefficient groups take part in arithmetic, regularization and shrinking.
///
/// Disabled groups keep their storage but are never read or written by any
/// operation other than encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Groups {
    /// Bias (zero-order) term.
    pub bias: bool,
    /// First-order weights.
    pub first_order: bool,
    /// Second-order factors.
    pub second_order: bool,
}

impl Groups {
    /// Creates a set of group flags.
    pub fn new(bias: bool, first_order: bool, second_order: bool) -> Self {
        Self {
            bias,
            first_order,
            second_order,
        }
    }

    /// Every group enabled.
    pub fn all() -> Self {
        Self::new(true, true, true)
    }

    /// Flags in `[bias, first_order, second_order]` order.
    pub fn to_array(self) -> [bool; 3] {
        [self.bias, self.first_order, self.second_order]
    }
}

impl Default for Groups {
    fn default() -> Self {
        Self::all()
    }
}

impl From<[bool; 3]> for Groups {
    fn from(flags: [bool; 3]) -> Self {
        Self::new(flags[0], flags[1], flags[2])
    }
}

/// Parameters of the Gaussian used to draw fresh coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitParams {
    /// Mean of the distribution.
    pub mean: f32,
    /// Standard deviation of the distribution.
    pub stdev: f32,
}

impl InitParams {
    /// Creates initialization parameters.
    pub fn new(mean: f32, stdev: f32) -> Self {
        Self { mean, stdev }
    }

    /// Checks that the mean is finite and the standard deviation finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        if !self.mean.is_finite() {
            return Err(CoefficientError::InvalidConfig {
                message: format!("init mean must be finite, got {}", self.mean),
            });
        }
        if !self.stdev.is_finite() || self.stdev < 0.0 {
            return Err(CoefficientError::InvalidConfig {
                message: format!(
                    "init stdev must be finite and non-negative, got {}",
                    self.stdev
                ),
            });
        }
        Ok(())
    }
}

impl Default for InitParams {
    fn default() -> Self {
        Self {
            mean: 0.0,
            stdev: 0.01,
        }
    }
}

/// Complete definition of a factorization machine coefficient store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FmConfig {
    /// Group dimensions.
    #[serde(flatten)]
    pub shape: FmShape,

    /// Enabled groups (default: all).
    #[serde(default)]
    pub groups: Groups,

    /// Initialization distribution.
    #[serde(default)]
    pub init: InitParams,
}

impl FmConfig {
    /// Creates a configuration with every group enabled and default init parameters.
    pub fn new(num_features: usize, num_interact_features: usize, num_factors: usize) -> Self {
        Self {
            shape: FmShape::new(num_features, num_interact_features, num_factors),
            groups: Groups::all(),
            init: InitParams::default(),
        }
    }

    /// Replaces all group flags at once.
    pub fn with_groups(mut self, groups: Groups) -> Self {
        self.groups = groups;
        self
    }

    /// Enables or disables the bias term.
    pub fn with_bias(mut self, enabled: bool) -> Self {
        self.groups.bias = enabled;
        self
    }

    /// Enables or disables the first-order weights.
    pub fn with_first_order(mut self, enabled: bool) -> Self {
        self.groups.first_order = enabled;
        self
    }

    /// Enables or disables the second-order factors.
    pub fn with_second_order(mut self, enabled: bool) -> Self {
        self.groups.second_order = enabled;
        self
    }

    /// Sets the Gaussian initialization parameters.
    pub fn with_init(mut self, mean: f32, stdev: f32) -> Self {
        self.init = InitParams::new(mean, stdev);
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoefficientError::InvalidConfig`] when the init parameters are
    /// not usable or when second-order factors are enabled with zero latent
    /// dimensions.
    pub fn validate(&self) -> Result<()> {
        self.init.validate()?;
        if self.groups.second_order && self.shape.num_factors == 0 {
            return Err(CoefficientError::InvalidConfig {
                message: "num_factors must be positive when second-order factors are enabled"
                    .to_string(),
            });
        }
        Ok(())
    }

    /// Builds a freshly initialized coefficient store.
    pub fn build<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<FmCoefficients> {
        self.validate()?;
        FmCoefficients::new(self.shape, self.groups, self.init, rng)
    }

    /// Parses a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: FmConfig =
            serde_json::from_str(json).map_err(|e| CoefficientError::InvalidConfig {
                message: format!("failed to parse config: {e}"),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json =
            std::fs::read_to_string(path).map_err(|e| CoefficientError::InvalidConfig {
                message: format!("failed to read {}: {e}", path.display()),
            })?;
        Self::from_json_str(&json)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> String {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
