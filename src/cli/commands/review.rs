//! Interactive review CLI command.
//!
//! This module implements the `ocr-labeler review` command.

use tracing::info;

use crate::cli::args::OutputFormat;
use crate::cli::commands::Backend;
use crate::core::ImageSource;
use crate::error::LabelerError;
use crate::output::format_summary;
use crate::tui;

/// Execute the review command.
///
/// Runs the review screen, then returns the session summary.
///
/// # Errors
///
/// Returns an error if the images directory cannot be read or the terminal
/// cannot be used.
pub async fn review(backend: &Backend, format: OutputFormat) -> Result<String, LabelerError> {
    // Fail before taking over the terminal if the directory is unusable.
    let progress = backend.source.progress().await?;
    info!(
        processed = progress.processed,
        total = progress.total,
        "Starting review session"
    );

    let mut controller = backend.controller();
    tui::run(&mut controller).await?;

    format_summary(&controller.state().summary(), format)
}
