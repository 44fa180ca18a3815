//! Text extraction by running an external OCR program.
//!
//! The program is started once per image. `{image}` anywhere in an argument
//! is replaced with the image path, and stdout is read as the result. With
//! the default `tesseract {image} stdout`, each detected line arrives on its
//! own output line.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::ExtractionConfig;
use crate::core::{Extraction, ExtractionService};
use crate::error::LabelerError;

/// Placeholder substituted with the image path.
pub const IMAGE_PLACEHOLDER: &str = "{image}";

/// [`ExtractionService`] that shells out to an OCR program.
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    program: String,
    args: Vec<String>,
    images_dir: PathBuf,
    timeout: Duration,
}

impl CommandExtractor {
    #[must_use]
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        images_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            images_dir: images_dir.into(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Build from configuration, resolving image ids against `images_dir`.
    #[must_use]
    pub fn from_config(config: &ExtractionConfig, images_dir: impl Into<PathBuf>) -> Self {
        Self::new(config.program.clone(), config.args.clone(), images_dir)
            .with_timeout(Duration::from_secs(config.timeout_secs))
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command_args(&self, image: &Path) -> Vec<String> {
        let image = image.display().to_string();
        self.args
            .iter()
            .map(|arg| arg.replace(IMAGE_PLACEHOLDER, &image))
            .collect()
    }

    /// Extract text from a file path rather than an image id.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, the program cannot be
    /// started, or it does not finish before the timeout.
    pub async fn extract_path(&self, image: &Path) -> Result<Extraction, LabelerError> {
        if !image.is_file() {
            return Err(LabelerError::NotFound(format!("image {}", image.display())));
        }

        let args = self.command_args(image);
        debug!(program = %self.program, ?args, "Running extraction");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, output)
            .await
            .map_err(|_| {
                LabelerError::Extraction(format!(
                    "{} timed out after {}s",
                    self.program,
                    self.timeout.as_secs_f32()
                ))
            })?
            .map_err(|e| LabelerError::Extraction(format!("Failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            warn!(
                program = %self.program,
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "Extraction program failed"
            );
            return Ok(Extraction::failed());
        }

        Ok(Extraction::found(join_lines(&String::from_utf8_lossy(
            &output.stdout,
        ))))
    }
}

/// Trim each line, drop empty ones, and join the rest with single spaces.
#[must_use]
pub fn join_lines(output: &str) -> String {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl ExtractionService for CommandExtractor {
    async fn extract(&self, id: &str) -> Result<Extraction, LabelerError> {
        self.extract_path(&self.images_dir.join(id)).await
    }
}
