//! Checkpoint persistence for fmkit coefficient stores.
//!
//! Coefficients are stored in their text encoding, one file per training
//! step, named `checkpoint-<step>.fm`.
//!
//! # Core Components
//!
//! - [`Checkpointer`]: Trait for saving and restoring a store at a path
//! - [`TextCheckpointer`]: Writes the text encoding to disk
//! - [`CheckpointManager`]: Step-numbered checkpoints with retention cleanup
//!
//! # Example
//!
//! ```no_run
//! use fmkit_checkpoint::{CheckpointConfig, CheckpointManager, TextCheckpointer};
//! use fmkit_core::{FmCoefficients, FmConfig, GaussianSource};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let model = FmConfig::new(100, 100, 8).build(&mut GaussianSource::seeded(0))?;
//!
//!     let config = CheckpointConfig::new("/tmp/fm-checkpoints").with_max_to_keep(3);
//!     let mut manager = CheckpointManager::new(config, TextCheckpointer::new())?;
//!
//!     manager.save(1000, &model)?;
//!     let restored: FmCoefficients = manager.restore_latest()?;
//!     Ok(())
//! }
//! ```

pub mod checkpointer;
pub mod manager;

pub use checkpointer::{
    checkpoint_filename, parse_step, scan_checkpoints, Checkpointer, TextCheckpointer,
};
pub use manager::{CheckpointConfig, CheckpointInfo, CheckpointManager};

use std::path::PathBuf;

use fmkit_core::CoefficientError;
use thiserror::Error;

/// Errors that can occur during checkpoint operations.
#[derive(Error, Debug)]
pub enum CheckpointError {
    /// I/O error during checkpoint operations.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Checkpoint file not found.
    #[error("Checkpoint not found: {0}")]
    NotFound(PathBuf),

    /// The file exists but does not hold a valid encoding.
    #[error("Failed to decode checkpoint {path}: {source}")]
    Decode {
        /// Path of the corrupt checkpoint.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: CoefficientError,
    },

    /// Invalid checkpoint configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for checkpoint operations.
pub type Result<T> = std::result::Result<T, CheckpointError>;
