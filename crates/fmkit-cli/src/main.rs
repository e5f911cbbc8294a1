//! fmkit CLI - Create, inspect and transform factorization machine coefficient files.
//!
//! Encoded models are written to stdout when no output path is given, so all
//! logging goes to stderr.

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fmkit_cli::{Cli, Commands};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("fmkit=info".parse()?))
        .init();

    let cli = Cli::parse();
    debug!(?cli, "Parsed arguments");

    let mut out = std::io::stdout().lock();
    match cli.command {
        Commands::Init(cmd) => cmd.run(&mut out)?,
        Commands::Inspect(cmd) => cmd.run(&mut out)?,
        Commands::Shrink(cmd) => cmd.run(&mut out)?,
        Commands::Combine(cmd) => cmd.run()?,
    }

    Ok(())
}
