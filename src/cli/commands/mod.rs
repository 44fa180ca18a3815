//! Command implementations for ocr-labeler.
//!
//! This module contains the implementation of all CLI commands.

mod completions;
mod review;

pub use completions::{completion_install_instructions, completions, generate_completions};
pub use review::review;

use std::path::Path;
use std::sync::Arc;

use crate::cli::args::OutputFormat;
use crate::config::{Config, LabelBackend};
use crate::core::{ExtractionService, ImageSource, LabelStore};
use crate::error::LabelerError;
use crate::extraction::CommandExtractor;
use crate::features::review::WorkflowController;
use crate::images::DirectoryImageSource;
use crate::output::{format_extraction, format_labels, format_next, format_overview};
use crate::storage::{LabelsFile, SqliteLabelStore};

/// The collaborators a configuration selects.
pub struct Backend {
    pub source: Arc<DirectoryImageSource>,
    pub extractor: Arc<CommandExtractor>,
    pub store: Arc<dyn LabelStore>,
}

impl Backend {
    /// Build the image source, extractor, and label store from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the sqlite database cannot be opened.
    pub fn from_config(config: &Config) -> Result<Self, LabelerError> {
        let images_dir = &config.images.dir;

        let store: Arc<dyn LabelStore> = match config.labels.backend {
            LabelBackend::Text => {
                Arc::new(LabelsFile::new(&config.labels.file).with_images_dir(images_dir))
            },
            LabelBackend::Sqlite => Arc::new(SqliteLabelStore::open(&config.labels.database)?),
        };

        let source = Arc::new(DirectoryImageSource::new(
            images_dir,
            config.images.extensions.clone(),
            Arc::clone(&store),
        ));
        let extractor = Arc::new(CommandExtractor::from_config(&config.extraction, images_dir));

        Ok(Self {
            source,
            extractor,
            store,
        })
    }

    /// A fresh review controller over these collaborators.
    #[must_use]
    pub fn controller(&self) -> WorkflowController {
        WorkflowController::new(
            Arc::clone(&self.source) as Arc<dyn ImageSource>,
            Arc::clone(&self.extractor) as Arc<dyn ExtractionService>,
            Arc::clone(&self.store),
        )
    }
}

/// Execute images command
///
/// # Errors
///
/// Returns an error if the images directory or labels cannot be read.
pub async fn images(backend: &Backend, format: OutputFormat) -> Result<String, LabelerError> {
    let overview = backend.source.overview().await?;
    format_overview(&overview, format)
}

/// Execute next command
///
/// # Errors
///
/// Returns an error if the images directory or labels cannot be read.
pub async fn next(backend: &Backend, format: OutputFormat) -> Result<String, LabelerError> {
    let next = backend.source.peek().await?;
    format_next(&next, format)
}

/// Execute labels command
///
/// # Errors
///
/// Returns an error if the label store cannot be read.
pub async fn labels(backend: &Backend, format: OutputFormat) -> Result<String, LabelerError> {
    let labels = backend.store.labels().await?;
    format_labels(&labels, format)
}

/// Execute extract command
///
/// `image` is an id in the images directory, or a path to any existing file.
///
/// # Errors
///
/// Returns an error if the image is missing or the extraction program
/// cannot be run.
pub async fn extract(
    backend: &Backend,
    image: &str,
    format: OutputFormat,
) -> Result<String, LabelerError> {
    let path = Path::new(image);
    let (name, extraction) = if path.components().count() > 1 && path.is_file() {
        let name = path
            .file_name()
            .map_or_else(|| image.to_string(), |n| n.to_string_lossy().to_string());
        (name, backend.extractor.extract_path(path).await?)
    } else {
        (image.to_string(), backend.extractor.extract(image).await?)
    };
    format_extraction(&name, &extraction, format)
}
