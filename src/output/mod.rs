//! Output formatting for ocr-labeler.
//!
//! This module provides formatters for displaying labeling data in various formats.

mod json;
mod pretty;

use crate::cli::args::OutputFormat;
use crate::core::{Extraction, Label, NextImage};
use crate::error::LabelerError;
use crate::features::review::SessionSummary;
use crate::images::Overview;

pub use json::*;
pub use pretty::*;

/// Format progress and the image list based on output format
///
/// # Errors
///
/// Returns `LabelerError::Parse` if JSON serialization fails.
pub fn format_overview(overview: &Overview, format: OutputFormat) -> Result<String, LabelerError> {
    match format {
        OutputFormat::Pretty => Ok(format_overview_pretty(overview)),
        OutputFormat::Json => format_overview_json(overview),
    }
}

/// Format the next image based on output format
///
/// # Errors
///
/// Returns `LabelerError::Parse` if JSON serialization fails.
pub fn format_next(next: &NextImage, format: OutputFormat) -> Result<String, LabelerError> {
    match format {
        OutputFormat::Pretty => Ok(format_next_pretty(next)),
        OutputFormat::Json => format_next_json(next),
    }
}

/// Format saved labels based on output format
///
/// # Errors
///
/// Returns `LabelerError::Parse` if JSON serialization fails.
pub fn format_labels(labels: &[Label], format: OutputFormat) -> Result<String, LabelerError> {
    match format {
        OutputFormat::Pretty => Ok(format_labels_pretty(labels)),
        OutputFormat::Json => format_labels_json(labels),
    }
}

/// Format an extraction result based on output format
///
/// # Errors
///
/// Returns `LabelerError::Parse` if JSON serialization fails.
pub fn format_extraction(
    image: &str,
    extraction: &Extraction,
    format: OutputFormat,
) -> Result<String, LabelerError> {
    match format {
        OutputFormat::Pretty => Ok(format_extraction_pretty(image, extraction)),
        OutputFormat::Json => format_extraction_json(image, extraction),
    }
}

/// Format a session summary based on output format
///
/// # Errors
///
/// Returns `LabelerError::Parse` if JSON serialization fails.
pub fn format_summary(
    summary: &SessionSummary,
    format: OutputFormat,
) -> Result<String, LabelerError> {
    match format {
        OutputFormat::Pretty => Ok(format_summary_pretty(summary)),
        OutputFormat::Json => format_summary_json(summary),
    }
}
