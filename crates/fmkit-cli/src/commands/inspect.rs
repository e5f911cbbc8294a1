//! Inspect Command Implementation

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use fmkit_core::{Coefficients, FmCoefficients, GroupReg, Groups};
use serde::Serialize;

use super::{load_model, parse_reg};

/// Print a summary of a model file
///
/// # Example
///
/// ```bash
/// fmkit inspect model.fm --reg 0,0.01,0.001 --json
/// ```
#[derive(Args, Debug, Clone)]
pub struct InspectCommand {
    /// Model file to inspect
    pub path: PathBuf,

    /// Regularization strengths `bias,weights,factors` for L1/L2 values
    #[arg(long, value_parser = parse_reg)]
    pub reg: Option<GroupReg>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Summary of a model's shape, sparsity and magnitude.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub num_features: usize,
    pub num_interact_features: usize,
    pub num_factors: usize,
    pub groups: Groups,
    pub bias: f32,
    pub active_weights: usize,
    pub active_factors: usize,
    pub norm: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l1_reg_value: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l2_reg_value: Option<f32>,
}

impl ModelSummary {
    /// Summarize `model`, including regularization values when `reg` is given.
    pub fn new(model: &FmCoefficients, reg: Option<&GroupReg>) -> Self {
        Self {
            num_features: model.num_features(),
            num_interact_features: model.num_interact_features(),
            num_factors: model.num_factors(),
            groups: model.groups(),
            bias: model.bias(),
            active_weights: model.active_weight_count(),
            active_factors: model.active_factor_count(),
            norm: model.norm(),
            l1_reg_value: reg.map(|r| model.l1_reg_value(r)),
            l2_reg_value: reg.map(|r| model.l2_reg_value(r)),
        }
    }

    fn write_text<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(
            out,
            "shape:          {} weights, {}x{} factors",
            self.num_features, self.num_interact_features, self.num_factors
        )?;
        writeln!(
            out,
            "groups:         bias={} first_order={} second_order={}",
            self.groups.bias, self.groups.first_order, self.groups.second_order
        )?;
        writeln!(out, "bias:           {}", self.bias)?;
        writeln!(
            out,
            "active weights: {}/{}",
            self.active_weights, self.num_features
        )?;
        writeln!(
            out,
            "active factors: {}/{}",
            self.active_factors,
            self.num_interact_features * self.num_factors
        )?;
        writeln!(out, "norm:           {}", self.norm)?;
        if let Some(l1) = self.l1_reg_value {
            writeln!(out, "l1 reg value:   {l1}")?;
        }
        if let Some(l2) = self.l2_reg_value {
            writeln!(out, "l2 reg value:   {l2}")?;
        }
        Ok(())
    }
}

impl InspectCommand {
    /// Execute the inspect command
    pub fn run<W: Write>(&self, out: &mut W) -> Result<()> {
        let model = load_model(&self.path)?;
        let summary = ModelSummary::new(&model, self.reg.as_ref());

        if self.json {
            serde_json::to_writer_pretty(&mut *out, &summary)
                .context("Failed to serialize summary")?;
            writeln!(out)?;
        } else {
            summary.write_text(out)?;
        }
        Ok(())
    }
}
