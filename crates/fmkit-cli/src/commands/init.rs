//! Init Command Implementation
//!
//! Creates a freshly initialized model from a JSON config or from flags.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use fmkit_core::{FmConfig, GaussianSource};
use tracing::info;

use super::emit_model;

/// Create a freshly initialized model
///
/// Enabled groups are drawn from a Gaussian with the configured mean and
/// standard deviation; disabled groups are zero.
///
/// # Example
///
/// ```bash
/// fmkit init --features 1000 --interact-features 200 --factors 8 \
///     --init-stdev 0.05 --seed 42 --output model.fm
/// ```
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// JSON model configuration (replaces the shape and init flags)
    #[arg(
        long,
        short = 'c',
        env = "FMKIT_CONFIG",
        conflicts_with_all = [
            "features",
            "interact_features",
            "factors",
            "no_bias",
            "no_first_order",
            "no_second_order",
            "init_mean",
            "init_stdev",
        ]
    )]
    pub config: Option<PathBuf>,

    /// Number of first-order weights
    #[arg(long, required_unless_present = "config")]
    pub features: Option<usize>,

    /// Number of factor matrix rows (defaults to --features)
    #[arg(long)]
    pub interact_features: Option<usize>,

    /// Number of latent factors per feature
    #[arg(long, default_value_t = 8)]
    pub factors: usize,

    /// Disable the bias term
    #[arg(long)]
    pub no_bias: bool,

    /// Disable the first-order weights
    #[arg(long)]
    pub no_first_order: bool,

    /// Disable the second-order factors
    #[arg(long)]
    pub no_second_order: bool,

    /// Mean of the initialization distribution
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub init_mean: f32,

    /// Standard deviation of the initialization distribution
    #[arg(long, default_value_t = 0.01)]
    pub init_stdev: f32,

    /// Random seed; omit for a seed from system entropy
    #[arg(long, env = "FMKIT_SEED")]
    pub seed: Option<u64>,

    /// Output file (stdout when omitted)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Resolve the model configuration from the config file or the flags.
    pub fn model_config(&self) -> Result<FmConfig> {
        if let Some(path) = &self.config {
            return FmConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()));
        }

        let features = self
            .features
            .context("--features is required without --config")?;
        let config = FmConfig::new(
            features,
            self.interact_features.unwrap_or(features),
            self.factors,
        )
        .with_bias(!self.no_bias)
        .with_first_order(!self.no_first_order)
        .with_second_order(!self.no_second_order)
        .with_init(self.init_mean, self.init_stdev);

        config.validate().context("Invalid model configuration")?;
        Ok(config)
    }

    /// Execute the init command
    pub fn run<W: Write>(&self, out: &mut W) -> Result<()> {
        let config = self.model_config()?;
        info!(
            features = config.shape.num_features,
            interact_features = config.shape.num_interact_features,
            factors = config.shape.num_factors,
            seed = ?self.seed,
            "Initializing model"
        );

        let mut rng = GaussianSource::with_seed(self.seed);
        let model = config.build(&mut rng).context("Failed to build model")?;
        emit_model(self.output.as_deref(), &model, out)?;

        if let Some(path) = &self.output {
            info!(path = %path.display(), "Model written");
        }
        Ok(())
    }
}
