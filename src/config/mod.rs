//! Configuration management for ocr-labeler.
//!
//! This module handles loading configuration from `~/.ocr-labeler/`.

mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{
    ColorSetting, Config, ExtractionConfig, GeneralConfig, ImagesConfig, LabelBackend,
    LabelsConfig, LoggingConfig,
};
