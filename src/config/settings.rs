//! Configuration settings for ocr-labeler.
//!
//! Settings are loaded from `~/.ocr-labeler/config.yaml`. Every field has a
//! default, so an absent or partial file is fine.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::LabelerError;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Where images come from.
    pub images: ImagesConfig,
    /// Where labels go.
    pub labels: LabelsConfig,
    /// How text is extracted.
    pub extraction: ExtractionConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Color output setting.
    pub color: ColorSetting,
}

/// Color output setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorSetting {
    /// Auto-detect based on terminal.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

/// Image directory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Directory scanned for images.
    #[serde(default = "default_images_dir")]
    pub dir: PathBuf,
    /// File extensions treated as images (case-insensitive).
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

/// Label storage backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LabelBackend {
    /// Append-only `labels.txt`, one `<image> <text>` line per label.
    #[default]
    Text,
    /// `SQLite` database.
    Sqlite,
}

/// Label storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelsConfig {
    /// Which backend records labels.
    #[serde(default)]
    pub backend: LabelBackend,
    /// Labels file for the text backend.
    #[serde(default = "default_labels_file")]
    pub file: PathBuf,
    /// Database file for the sqlite backend.
    #[serde(default = "default_labels_database")]
    pub database: PathBuf,
}

/// Extraction engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Program to run.
    #[serde(default = "default_program")]
    pub program: String,
    /// Arguments; `{image}` is replaced with the image path.
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Seconds before a run is abandoned.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log directory; defaults to `~/.ocr-labeler/logs/`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

// Default value functions for serde
fn default_images_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "bmp", "tiff"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_labels_file() -> PathBuf {
    PathBuf::from("labels.txt")
}

fn default_labels_database() -> PathBuf {
    PathBuf::from("labels.db")
}

fn default_program() -> String {
    "tesseract".to_string()
}

fn default_args() -> Vec<String> {
    vec!["{image}".to_string(), "stdout".to_string()]
}

const fn default_timeout_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            dir: default_images_dir(),
            extensions: default_extensions(),
        }
    }
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            backend: LabelBackend::default(),
            file: default_labels_file(),
            database: default_labels_database(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

impl LabelsConfig {
    /// The file the selected backend writes to.
    #[must_use]
    pub fn location(&self) -> &std::path::Path {
        match self.backend {
            LabelBackend::Text => &self.file,
            LabelBackend::Sqlite => &self.database,
        }
    }
}

impl Config {
    /// Apply command-line overrides. `labels` replaces the file of the
    /// selected backend.
    pub fn apply_overrides(&mut self, images: Option<PathBuf>, labels: Option<PathBuf>) {
        if let Some(dir) = images {
            self.images.dir = dir;
        }
        if let Some(path) = labels {
            match self.labels.backend {
                LabelBackend::Text => self.labels.file = path,
                LabelBackend::Sqlite => self.labels.database = path,
            }
        }
    }

    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, LabelerError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            LabelerError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            LabelerError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }
}
