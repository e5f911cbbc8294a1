//! CLI Command Implementations
//!
//! - [`init`]: Fresh model creation
//! - [`inspect`]: Model summaries
//! - [`shrink`]: L1 proximal shrink
//! - [`combine`]: Elementwise add/subtract of two models

mod combine;
mod init;
mod inspect;
mod shrink;

pub use combine::CombineCommand;
pub use init::InitCommand;
pub use inspect::{InspectCommand, ModelSummary};
pub use shrink::ShrinkCommand;

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use fmkit_checkpoint::{Checkpointer, TextCheckpointer};
use fmkit_core::{FmCoefficients, GroupReg};

/// Parses `r0,r1,r2` into per-group regularization strengths.
///
/// Used as a clap value parser.
pub fn parse_reg(s: &str) -> std::result::Result<GroupReg, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!(
            "expected three comma-separated values (bias,weights,factors), got {}",
            parts.len()
        ));
    }

    let mut reg = [0.0f32; 3];
    for (slot, part) in reg.iter_mut().zip(parts) {
        let value: f32 = part
            .parse()
            .map_err(|_| format!("invalid regularization value {part:?}"))?;
        if !value.is_finite() || value < 0.0 {
            return Err(format!(
                "regularization values must be finite and non-negative, got {value}"
            ));
        }
        *slot = value;
    }
    Ok(GroupReg::from(reg))
}

pub(crate) fn load_model(path: &Path) -> Result<FmCoefficients> {
    let restored: fmkit_checkpoint::Result<FmCoefficients> = TextCheckpointer::new().restore(path);
    restored.with_context(|| format!("Failed to load model from {}", path.display()))
}

pub(crate) fn save_model(path: &Path, model: &FmCoefficients) -> Result<()> {
    TextCheckpointer::new()
        .save(path, model)
        .with_context(|| format!("Failed to write model to {}", path.display()))
}

/// Writes the model to `path`, or its encoding to `out` when no path is given.
pub(crate) fn emit_model<W: Write>(
    path: Option<&Path>,
    model: &FmCoefficients,
    out: &mut W,
) -> Result<()> {
    match path {
        Some(path) => save_model(path, model),
        None => {
            write!(out, "{model}").context("Failed to write model to stdout")?;
            out.flush().context("Failed to flush stdout")?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reg() {
        assert_eq!(
            parse_reg("0,0.01,1e-3").unwrap(),
            GroupReg::new(0.0, 0.01, 0.001)
        );
        assert_eq!(parse_reg(" 1, 2 ,3").unwrap().to_array(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_parse_reg_errors() {
        assert!(parse_reg("1,2").unwrap_err().contains("three"));
        assert!(parse_reg("1,x,3").unwrap_err().contains("\"x\""));
        assert!(parse_reg("1,-2,3").unwrap_err().contains("non-negative"));
        assert!(parse_reg("1,2,3,4").is_err());
    }

    #[test]
    fn test_load_missing_model_has_context() {
        let err = load_model(Path::new("/nonexistent/model.fm")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/model.fm"));
    }
}
