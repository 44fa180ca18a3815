//! Append-only `labels.txt` backend.
//!
//! One label per line: the image name, a single space, then the text with
//! its whitespace collapsed. A later line for the same image does not
//! replace an earlier one; readers see both.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::core::{Label, LabelStore, StoreReceipt};
use crate::error::LabelerError;

use super::normalize_label;

/// Label store backed by a plain text file.
#[derive(Debug, Clone)]
pub struct LabelsFile {
    path: PathBuf,
    images_dir: Option<PathBuf>,
}

impl LabelsFile {
    /// Store labels in `path`. The file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            images_dir: None,
        }
    }

    /// Refuse to label images that do not exist under `dir`.
    #[must_use]
    pub fn with_images_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.images_dir = Some(dir.into());
        self
    }

    /// The labels file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn validate(&self, id: &str) -> Result<(), LabelerError> {
        if id.is_empty() {
            return Err(LabelerError::Store("Image name is required".to_string()));
        }
        if id.chars().any(char::is_whitespace) {
            return Err(LabelerError::Store(format!(
                "Image name cannot contain whitespace: {id:?}"
            )));
        }
        if let Some(dir) = &self.images_dir {
            if !dir.join(id).is_file() {
                return Err(LabelerError::NotFound(format!("image {id}")));
            }
        }
        Ok(())
    }
}

/// Parse the contents of a labels file.
///
/// Blank lines are skipped. A line with no text after the image name yields
/// an empty label.
#[must_use]
pub fn parse_labels(contents: &str) -> Vec<Label> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let (image, text) = line.split_once(' ').unwrap_or((line, ""));
            Label {
                image: image.to_string(),
                text: text.to_string(),
            }
        })
        .collect()
}

#[async_trait]
impl LabelStore for LabelsFile {
    async fn save(&self, id: &str, text: &str) -> Result<StoreReceipt, LabelerError> {
        self.validate(id)?;

        let cleaned = normalize_label(text);
        if cleaned.is_empty() {
            return Err(LabelerError::Store("Label text is required".to_string()));
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                LabelerError::Store(format!("Failed to open {}: {e}", self.path.display()))
            })?;

        file.write_all(format!("{id} {cleaned}\n").as_bytes())
            .await
            .map_err(|e| {
                LabelerError::Store(format!("Failed to write {}: {e}", self.path.display()))
            })?;
        file.flush().await?;

        info!(image = id, text = %cleaned, "Saved label");
        Ok(StoreReceipt { success: true })
    }

    async fn labels(&self) -> Result<Vec<Label>, LabelerError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(parse_labels(&contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No labels file yet");
                Ok(Vec::new())
            }
            Err(e) => Err(LabelerError::Store(format!(
                "Failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_labels() {
        let labels = parse_labels("a.png Hello World\n\n  b.png   \nc.png x\n");
        assert_eq!(labels.len(), 3);
        assert_eq!(labels[0].image, "a.png");
        assert_eq!(labels[0].text, "Hello World");
        assert_eq!(labels[1].image, "b.png");
        assert_eq!(labels[1].text, "");
        assert_eq!(labels[2].text, "x");
    }

    #[tokio::test]
    async fn test_missing_file_has_no_labels() {
        let temp_dir = TempDir::new().unwrap();
        let store = LabelsFile::new(temp_dir.path().join("labels.txt"));
        assert!(store.labels().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_appends_normalized_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("labels.txt");
        let store = LabelsFile::new(&path);

        let receipt = store.save("img001.png", "  Hello \n  World\t").await.unwrap();
        assert!(receipt.success);
        store.save("img002.png", "Second").await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "img001.png Hello World\nimg002.png Second\n");

        let labels = store.labels().await.unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[1].image, "img002.png");
    }

    #[tokio::test]
    async fn test_save_rejects_bad_input() {
        let temp_dir = TempDir::new().unwrap();
        let store = LabelsFile::new(temp_dir.path().join("labels.txt"));

        assert!(store.save("", "text").await.is_err());
        assert!(store.save("my image.png", "text").await.is_err());
        assert!(store.save("a.png", " \n\t ").await.is_err());
        assert!(store.labels().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_checks_image_exists() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("real.png"), b"png").unwrap();
        let store =
            LabelsFile::new(temp_dir.path().join("labels.txt")).with_images_dir(temp_dir.path());

        assert!(store.save("real.png", "ok").await.is_ok());
        let err = store.save("ghost.png", "nope").await.unwrap_err();
        assert!(matches!(err, LabelerError::NotFound(_)));
    }
}
