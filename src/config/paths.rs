//! Path resolution for ocr-labeler configuration and data files.
//!
//! Per-user data is stored in `~/.ocr-labeler/`:
//! - `config.yaml` - Main configuration file
//! - `logs/` - Daily rolling log files
//!
//! Images and labels live wherever the configuration points, relative to
//! the working directory by default.

use std::path::PathBuf;

use crate::error::LabelerError;

/// Paths to ocr-labeler configuration and data directories.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.ocr-labeler/`
    pub root: PathBuf,
    /// Config file: `~/.ocr-labeler/config.yaml`
    pub config_file: PathBuf,
    /// Logs directory: `~/.ocr-labeler/logs/`
    pub logs: PathBuf,
}

impl Paths {
    /// Create paths based on the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, LabelerError> {
        let home = std::env::var("HOME").map_err(|_| {
            LabelerError::Config("Could not determine home directory".to_string())
        })?;

        Ok(Self::with_root(PathBuf::from(home).join(".ocr-labeler")))
    }

    /// Create paths with a custom root directory (useful for testing).
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            logs: root.join("logs"),
            root,
        }
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| {
            // Fallback to current directory if home cannot be determined
            Self::with_root(PathBuf::from(".ocr-labeler"))
        })
    }
}
