//! [`ImageSource`] over a directory of image files.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::core::{ImageRef, ImageSource, LabelStore, NextImage, Progress};
use crate::error::LabelerError;

use super::scan::{scan_images, ImageFile};

/// One image and whether it has a label yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageStatus {
    pub name: String,
    pub path: PathBuf,
    pub labeled: bool,
}

/// Progress plus the full image list.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub progress: Progress,
    pub images: Vec<ImageStatus>,
}

/// Hands out unlabeled images from a directory, in natural order.
///
/// An image counts as processed once the label store has a label for it.
/// Images already handed out by this source are not handed out again, so a
/// skipped image is not offered twice in one session.
pub struct DirectoryImageSource {
    dir: PathBuf,
    extensions: Vec<String>,
    store: Arc<dyn LabelStore>,
    handed_out: Mutex<HashSet<String>>,
}

impl DirectoryImageSource {
    #[must_use]
    pub fn new(
        dir: impl Into<PathBuf>,
        extensions: Vec<String>,
        store: Arc<dyn LabelStore>,
    ) -> Self {
        Self {
            dir: dir.into(),
            extensions,
            store,
            handed_out: Mutex::new(HashSet::new()),
        }
    }

    async fn scan(&self) -> Result<Vec<ImageFile>, LabelerError> {
        let dir = self.dir.clone();
        let extensions = self.extensions.clone();
        tokio::task::spawn_blocking(move || scan_images(&dir, &extensions))
            .await
            .map_err(|e| LabelerError::Source(format!("Scan task failed: {e}")))?
    }

    async fn labeled(&self) -> Result<HashSet<String>, LabelerError> {
        Ok(self
            .store
            .labels()
            .await?
            .into_iter()
            .map(|label| label.image)
            .collect())
    }

    /// Every image with its labeled flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the label store cannot be read.
    pub async fn overview(&self) -> Result<Overview, LabelerError> {
        let images = self.scan().await?;
        let labeled = self.labeled().await?;

        let images: Vec<ImageStatus> = images
            .into_iter()
            .map(|image| ImageStatus {
                labeled: labeled.contains(&image.name),
                name: image.name,
                path: image.path,
            })
            .collect();
        let processed = images.iter().filter(|i| i.labeled).count();

        Ok(Overview {
            progress: Progress::new(processed, images.len()),
            images,
        })
    }

    /// The next unlabeled image without marking it as handed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the label store cannot be read.
    pub async fn peek(&self) -> Result<NextImage, LabelerError> {
        self.select(false).await
    }

    async fn select(&self, claim: bool) -> Result<NextImage, LabelerError> {
        let overview = self.overview().await?;
        let mut handed_out = self
            .handed_out
            .lock()
            .map_err(|_| LabelerError::Source("Image source lock poisoned".to_string()))?;

        let next = overview
            .images
            .into_iter()
            .find(|image| !image.labeled && !handed_out.contains(&image.name));

        let Some(image) = next else {
            debug!(progress = ?overview.progress, "No unlabeled images left");
            return Ok(NextImage::Exhausted {
                progress: overview.progress,
            });
        };

        if claim {
            handed_out.insert(image.name.clone());
        }
        debug!(image = %image.name, "Next image");

        Ok(NextImage::Ready {
            image: ImageRef {
                id: image.name,
                source_uri: image.path.display().to_string(),
            },
            progress: overview.progress,
        })
    }
}

#[async_trait]
impl ImageSource for DirectoryImageSource {
    async fn progress(&self) -> Result<Progress, LabelerError> {
        Ok(self.overview().await?.progress)
    }

    async fn next(&self) -> Result<NextImage, LabelerError> {
        self.select(true).await
    }
}
