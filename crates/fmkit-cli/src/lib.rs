//! fmkit CLI Library
//!
//! Command-line tools for factorization machine coefficient files:
//!
//! - **Init**: Create a freshly initialized model from a config or flags
//! - **Inspect**: Print shape, flags, sparsity and regularization values
//! - **Shrink**: Apply one L1 proximal shrink step
//! - **Combine**: Add or subtract two models of the same shape
//!
//! # Example
//!
//! ```bash
//! # Create a model with a fixed seed
//! fmkit init --features 1000 --factors 8 --seed 42 --output model.fm
//!
//! # Inspect it, including regularization values
//! fmkit inspect model.fm --reg 0,0.01,0.001
//!
//! # Sparsify the weights in place
//! fmkit shrink model.fm --reg 0,0.5,0.5 --step-size 0.1
//!
//! # Subtract a delta
//! fmkit combine model.fm delta.fm --subtract --output next.fm
//! ```

pub mod commands;

use clap::{Parser, Subcommand};

pub use commands::{parse_reg, CombineCommand, InitCommand, InspectCommand, ShrinkCommand};

/// fmkit - factorization machine coefficient tools
#[derive(Parser, Debug)]
#[command(name = "fmkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a freshly initialized model
    Init(InitCommand),

    /// Print a summary of a model file
    Inspect(InspectCommand),

    /// Apply an L1 proximal shrink step to a model file
    Shrink(ShrinkCommand),

    /// Add or subtract two model files
    Combine(CombineCommand),
}

/// Result type alias for CLI operations
pub type CliResult<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::PathBuf;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_init() {
        let cli = Cli::try_parse_from([
            "fmkit",
            "init",
            "--features",
            "10",
            "--factors",
            "4",
            "--no-bias",
            "--init-mean",
            "-0.5",
            "--seed",
            "7",
        ])
        .unwrap();

        match cli.command {
            Commands::Init(cmd) => {
                assert_eq!(cmd.features, Some(10));
                assert_eq!(cmd.factors, 4);
                assert!(cmd.no_bias);
                assert_eq!(cmd.init_mean, -0.5);
                assert_eq!(cmd.seed, Some(7));
                assert!(cmd.output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_init_requires_shape_or_config() {
        assert!(Cli::try_parse_from(["fmkit", "init"]).is_err());
        assert!(Cli::try_parse_from(["fmkit", "init", "--config", "model.json"]).is_ok());
    }

    #[test]
    fn test_parse_init_config_conflicts_with_shape_flags() {
        for flag in [
            ["--factors", "4"],
            ["--init-mean", "0.5"],
            ["--init-stdev", "0.1"],
            ["--features", "10"],
        ] {
            let mut args = vec!["fmkit", "init", "--config", "model.json"];
            args.extend(flag);
            assert!(Cli::try_parse_from(args).is_err(), "{flag:?}");
        }

        let cli = Cli::try_parse_from([
            "fmkit",
            "init",
            "--config",
            "model.json",
            "--seed",
            "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Init(cmd) => assert_eq!(cmd.seed, Some(3)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_shrink() {
        let cli = Cli::try_parse_from([
            "fmkit",
            "shrink",
            "model.fm",
            "--reg",
            "0,0.1,0.2",
            "--step-size",
            "0.5",
        ])
        .unwrap();

        match cli.command {
            Commands::Shrink(cmd) => {
                assert_eq!(cmd.path, PathBuf::from("model.fm"));
                assert_eq!(cmd.reg.to_array(), [0.0, 0.1, 0.2]);
                assert_eq!(cmd.step_size, 0.5);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_combine_requires_output() {
        assert!(Cli::try_parse_from(["fmkit", "combine", "a.fm", "b.fm"]).is_err());

        let cli = Cli::try_parse_from([
            "fmkit", "combine", "a.fm", "b.fm", "--subtract", "-o", "c.fm",
        ])
        .unwrap();
        match cli.command {
            Commands::Combine(cmd) => {
                assert!(cmd.subtract);
                assert_eq!(cmd.output, PathBuf::from("c.fm"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_bad_reg() {
        assert!(Cli::try_parse_from(["fmkit", "inspect", "m.fm", "--reg", "1,2"]).is_err());
    }
}
