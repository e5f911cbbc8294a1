//! Shrink Command Implementation

use std::io::Write;
use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::Args;
use fmkit_core::{Coefficients, GroupReg};
use tracing::info;

use super::{load_model, parse_reg, save_model};

/// Apply an L1 proximal shrink step to a model file
///
/// Entries whose magnitude does not exceed the threshold become zero; the
/// factor threshold is divided by the number of latent factors.
///
/// # Example
///
/// ```bash
/// fmkit shrink model.fm --reg 0,0.5,0.5 --step-size 0.1 --output sparse.fm
/// ```
#[derive(Args, Debug, Clone)]
pub struct ShrinkCommand {
    /// Model file to shrink
    pub path: PathBuf,

    /// Regularization strengths `bias,weights,factors`
    #[arg(long, value_parser = parse_reg)]
    pub reg: GroupReg,

    /// Step size of the proximal update
    #[arg(long)]
    pub step_size: f32,

    /// Output file (the input is overwritten when omitted)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

impl ShrinkCommand {
    /// Execute the shrink command
    pub fn run<W: Write>(&self, out: &mut W) -> Result<()> {
        ensure!(
            self.step_size.is_finite() && self.step_size >= 0.0,
            "step size must be finite and non-negative, got {}",
            self.step_size
        );

        let mut model = load_model(&self.path)?;
        let weights_before = model.active_weight_count();
        let factors_before = model.active_factor_count();

        model.l1_shrink(&self.reg, self.step_size);

        let target = self.output.as_ref().unwrap_or(&self.path);
        save_model(target, &model)?;

        info!(
            path = %target.display(),
            weights_before,
            weights_after = model.active_weight_count(),
            factors_before,
            factors_after = model.active_factor_count(),
            "Shrink applied"
        );
        writeln!(
            out,
            "active weights: {} -> {}, active factors: {} -> {}",
            weights_before,
            model.active_weight_count(),
            factors_before,
            model.active_factor_count()
        )?;
        Ok(())
    }
}
