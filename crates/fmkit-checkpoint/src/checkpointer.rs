//! Checkpointer trait for save/restore operations.

use std::path::{Path, PathBuf};

use fmkit_core::Coefficients;

use crate::{CheckpointError, Result};

const PREFIX: &str = "checkpoint-";
const EXTENSION: &str = ".fm";

/// Returns the file name used for the checkpoint of `step`.
pub fn checkpoint_filename(step: u64) -> String {
    format!("{PREFIX}{step}{EXTENSION}")
}

/// Parses the step number out of a checkpoint file name.
pub fn parse_step(filename: &str) -> Option<u64> {
    filename
        .strip_prefix(PREFIX)?
        .strip_suffix(EXTENSION)?
        .parse()
        .ok()
}

/// Lists the checkpoints found in `dir`, sorted by step (ascending).
///
/// A missing or unreadable directory yields an empty list.
pub fn scan_checkpoints(dir: &Path) -> Vec<(u64, PathBuf)> {
    let mut checkpoints = Vec::new();

    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Some(step) = path.file_name().and_then(|f| f.to_str()).and_then(parse_step) {
                checkpoints.push((step, path));
            }
        }
    }

    checkpoints.sort_by_key(|(step, _)| *step);
    checkpoints
}

/// Trait for persisting coefficient stores.
///
/// # Examples
///
/// ```no_run
/// use fmkit_checkpoint::{Checkpointer, TextCheckpointer};
/// use fmkit_core::{FmCoefficients, FmConfig, GaussianSource};
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let checkpointer = TextCheckpointer::new();
///     let model = FmConfig::new(8, 8, 2).build(&mut GaussianSource::seeded(1))?;
///
///     checkpointer.save(Path::new("/tmp/model.fm"), &model)?;
///     let restored: FmCoefficients = checkpointer.restore(Path::new("/tmp/model.fm"))?;
///     Ok(())
/// }
/// ```
pub trait Checkpointer<C: Coefficients> {
    /// Save coefficients to the specified path.
    ///
    /// # Arguments
    ///
    /// * `path` - Path where the checkpoint should be written
    /// * `coefficients` - Store to persist
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be written.
    fn save(&self, path: &Path, coefficients: &C) -> Result<()>;

    /// Restore coefficients from the specified path.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::NotFound`] if the file does not exist and
    /// [`CheckpointError::Decode`] if its content is not a valid encoding.
    fn restore(&self, path: &Path) -> Result<C>;

    /// Find the checkpoint with the highest step in a directory.
    ///
    /// Returns `None` when the directory holds no checkpoint.
    fn latest(&self, dir: &Path) -> Option<PathBuf>;
}

/// Checkpointer storing the text encoding of a store.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCheckpointer;

impl TextCheckpointer {
    /// Create a new text checkpointer.
    pub fn new() -> Self {
        Self
    }
}

impl<C: Coefficients> Checkpointer<C> for TextCheckpointer {
    fn save(&self, path: &Path, coefficients: &C) -> Result<()> {
        tracing::info!(path = %path.display(), "Saving checkpoint");

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CheckpointError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let text = coefficients.encode();
        std::fs::write(path, &text).map_err(|e| CheckpointError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::debug!(path = %path.display(), size = text.len(), "Checkpoint saved");
        Ok(())
    }

    fn restore(&self, path: &Path) -> Result<C> {
        tracing::info!(path = %path.display(), "Restoring checkpoint");

        if !path.exists() {
            return Err(CheckpointError::NotFound(path.to_path_buf()));
        }

        let text = std::fs::read_to_string(path).map_err(|e| CheckpointError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        C::decode(&text).map_err(|source| CheckpointError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    fn latest(&self, dir: &Path) -> Option<PathBuf> {
        scan_checkpoints(dir).pop().map(|(_, path)| path)
    }
}
