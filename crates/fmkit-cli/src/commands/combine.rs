//! Combine Command Implementation

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use fmkit_core::Coefficients;
use tracing::info;

use super::{load_model, save_model};

/// Add or subtract two model files
///
/// The models must have the same shape. Group flags of the first model
/// decide which groups are combined.
///
/// # Example
///
/// ```bash
/// fmkit combine model.fm delta.fm --subtract --output next.fm
/// ```
#[derive(Args, Debug, Clone)]
pub struct CombineCommand {
    /// Left-hand model
    pub left: PathBuf,

    /// Right-hand model
    pub right: PathBuf,

    /// Subtract the right-hand model instead of adding it
    #[arg(long)]
    pub subtract: bool,

    /// Output file
    #[arg(long, short = 'o')]
    pub output: PathBuf,
}

impl CombineCommand {
    /// Execute the combine command
    pub fn run(&self) -> Result<()> {
        let mut left = load_model(&self.left)?;
        let right = load_model(&self.right)?;

        let op = if self.subtract { "subtract" } else { "add" };
        let combined = if self.subtract {
            left.sub_in_place(&right)
        } else {
            left.add_in_place(&right)
        };
        combined.with_context(|| {
            format!(
                "Cannot {op} {} and {}",
                self.left.display(),
                self.right.display()
            )
        })?;

        save_model(&self.output, &left)?;
        info!(op, output = %self.output.display(), "Models combined");
        Ok(())
    }
}
