//! Checkpoint manager for step-numbered checkpoints.
//!
//! `CheckpointManager` handles:
//! - Naming checkpoints after the training step they capture
//! - Finding the latest checkpoint for restore operations
//! - Deleting the oldest checkpoints beyond `max_to_keep`

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use fmkit_core::Coefficients;
use serde::{Deserialize, Serialize};

use crate::checkpointer::{checkpoint_filename, scan_checkpoints, Checkpointer, TextCheckpointer};
use crate::{CheckpointError, Result};

/// Information about a saved checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointInfo {
    /// Path to the checkpoint file.
    pub path: PathBuf,

    /// Training step the checkpoint captures.
    pub step: u64,

    /// Modification time (Unix epoch seconds), 0 if unknown.
    pub timestamp: u64,
}

/// Configuration for the checkpoint manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// Directory where checkpoints are stored.
    pub dir: PathBuf,

    /// Maximum number of checkpoints to keep.
    /// Older checkpoints are deleted after each save.
    pub max_to_keep: usize,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("checkpoints"),
            max_to_keep: 5,
        }
    }
}

impl CheckpointConfig {
    /// Create a new checkpoint configuration.
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory where checkpoints will be stored
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Default::default()
        }
    }

    /// Set the maximum number of checkpoints to keep.
    pub fn with_max_to_keep(mut self, max_to_keep: usize) -> Self {
        self.max_to_keep = max_to_keep;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_to_keep == 0 {
            return Err(CheckpointError::InvalidConfig(
                "max_to_keep must be at least 1".to_string(),
            ));
        }
        if self.dir.as_os_str().is_empty() {
            return Err(CheckpointError::InvalidConfig(
                "checkpoint directory must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Manages checkpoint lifecycle including saving, restoring, and cleanup.
///
/// The manager tracks the checkpoints it has written (plus any found by
/// [`initialize`](CheckpointManager::initialize)) and deletes the oldest of
/// them once there are more than `max_to_keep`.
///
/// # Examples
///
/// ```no_run
/// use fmkit_checkpoint::{CheckpointConfig, CheckpointManager, TextCheckpointer};
/// use fmkit_core::{FmCoefficients, FmConfig, GaussianSource};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = CheckpointConfig::new("/tmp/checkpoints").with_max_to_keep(3);
///     let mut manager = CheckpointManager::new(config, TextCheckpointer::new())?;
///     manager.initialize()?;
///
///     let model = FmConfig::new(10, 10, 2).build(&mut GaussianSource::seeded(3))?;
///     manager.save(1000, &model)?;
///
///     let restored: FmCoefficients = manager.restore_step(1000)?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct CheckpointManager<K = TextCheckpointer> {
    config: CheckpointConfig,

    checkpointer: K,

    /// Tracked checkpoints, oldest first.
    history: VecDeque<CheckpointInfo>,
}

impl<K> CheckpointManager<K> {
    /// Create a new checkpoint manager.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: CheckpointConfig, checkpointer: K) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            checkpointer,
            history: VecDeque::new(),
        })
    }

    /// Get the checkpoint directory.
    pub fn checkpoint_dir(&self) -> &Path {
        &self.config.dir
    }

    /// Get the number of tracked checkpoints.
    pub fn checkpoint_count(&self) -> usize {
        self.history.len()
    }

    /// Get the configuration.
    pub fn config(&self) -> &CheckpointConfig {
        &self.config
    }

    /// Path of the checkpoint for `step`.
    pub fn checkpoint_path(&self, step: u64) -> PathBuf {
        self.config.dir.join(checkpoint_filename(step))
    }

    /// Save a checkpoint for `step` and apply retention.
    ///
    /// Saving a step that is already tracked overwrites its file.
    ///
    /// # Returns
    ///
    /// Returns the checkpoint info for the saved checkpoint.
    pub fn save<C>(&mut self, step: u64, coefficients: &C) -> Result<CheckpointInfo>
    where
        C: Coefficients,
        K: Checkpointer<C>,
    {
        let path = self.checkpoint_path(step);

        tracing::info!(step, path = %path.display(), "Saving checkpoint via manager");

        self.checkpointer.save(&path, coefficients)?;

        let info = CheckpointInfo {
            timestamp: modified_secs(&path),
            path,
            step,
        };

        self.history.retain(|c| c.step != step);
        self.history.push_back(info.clone());

        self.cleanup_old()?;

        Ok(info)
    }

    /// Restore the checkpoint with the highest step in the directory.
    pub fn restore_latest<C>(&self) -> Result<C>
    where
        C: Coefficients,
        K: Checkpointer<C>,
    {
        let latest_path = self
            .checkpointer
            .latest(&self.config.dir)
            .ok_or_else(|| CheckpointError::NotFound(self.config.dir.clone()))?;

        tracing::info!(path = %latest_path.display(), "Restoring latest checkpoint");

        self.checkpointer.restore(&latest_path)
    }

    /// Restore the checkpoint saved for `step`.
    pub fn restore_step<C>(&self, step: u64) -> Result<C>
    where
        C: Coefficients,
        K: Checkpointer<C>,
    {
        self.checkpointer.restore(&self.checkpoint_path(step))
    }

    /// Restore a specific checkpoint by path.
    pub fn restore<C>(&self, path: &Path) -> Result<C>
    where
        C: Coefficients,
        K: Checkpointer<C>,
    {
        self.checkpointer.restore(path)
    }

    /// Delete the oldest tracked checkpoints until at most `max_to_keep` remain.
    pub fn cleanup_old(&mut self) -> Result<()> {
        while self.history.len() > self.config.max_to_keep {
            let Some(old) = self.history.pop_front() else {
                break;
            };

            tracing::debug!(
                path = %old.path.display(),
                step = old.step,
                "Removing old checkpoint"
            );

            if old.path.exists() {
                std::fs::remove_file(&old.path).map_err(|e| CheckpointError::Io {
                    path: old.path.clone(),
                    source: e,
                })?;
            }
        }

        Ok(())
    }

    /// List all checkpoints in the checkpoint directory, sorted by step (ascending).
    pub fn list_checkpoints(&self) -> Vec<CheckpointInfo> {
        scan_checkpoints(&self.config.dir)
            .into_iter()
            .map(|(step, path)| CheckpointInfo {
                timestamp: modified_secs(&path),
                path,
                step,
            })
            .collect()
    }

    /// Track the checkpoints already present in the directory.
    ///
    /// Call this when resuming so that retention also covers files written
    /// by an earlier run. Cleanup is applied immediately.
    pub fn initialize(&mut self) -> Result<()> {
        self.history = self.list_checkpoints().into();

        tracing::info!(
            count = self.history.len(),
            dir = %self.config.dir.display(),
            "Initialized checkpoint manager"
        );

        self.cleanup_old()
    }
}

fn modified_secs(path: &Path) -> u64 {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .or_else(|| SystemTime::now().duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
