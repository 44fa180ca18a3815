//! Contracts for the collaborators the review controller talks to.
//!
//! The controller only knows these shapes. Any transport can sit behind
//! them: a directory on disk, an OCR binary, a text file, a database.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LabelerError;

/// How far through the corpus the reviewer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    /// Images that already have a label.
    pub processed: usize,
    /// Images in the corpus.
    pub total: usize,
}

impl Progress {
    /// Create a progress value, clamping `processed` to `total`.
    #[must_use]
    pub fn new(processed: usize, total: usize) -> Self {
        Self {
            processed: processed.min(total),
            total,
        }
    }

    /// Images still waiting for a label.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.total.saturating_sub(self.processed)
    }

    /// Completion as a percentage in `0.0..=100.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.processed as f64 * 100.0 / self.total as f64
        }
    }
}

/// An image handed out by an [`ImageSource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Stable identifier, unique within the corpus.
    pub id: String,
    /// Opaque locator the presentation layer can resolve to image bytes.
    pub source_uri: String,
}

/// Response of [`ImageSource::next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextImage {
    /// Another image is waiting for review.
    Ready {
        /// The image to review.
        image: ImageRef,
        /// Progress at the time the image was handed out.
        progress: Progress,
    },
    /// No further images remain.
    Exhausted {
        /// Final progress.
        progress: Progress,
    },
}

/// Response of [`ExtractionService::extract`].
///
/// `success == false` is an engine failure. A successful run with empty
/// `text` means the engine found nothing, which is not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub success: bool,
    pub text: String,
}

impl Extraction {
    /// A successful extraction.
    #[must_use]
    pub fn found(text: impl Into<String>) -> Self {
        Self {
            success: true,
            text: text.into(),
        }
    }

    /// A failed extraction.
    #[must_use]
    pub const fn failed() -> Self {
        Self {
            success: false,
            text: String::new(),
        }
    }
}

/// Response of [`LabelStore::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreReceipt {
    /// Whether the label was durably recorded.
    pub success: bool,
}

/// A recorded label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Image identifier.
    pub image: String,
    /// Reviewer-approved text.
    pub text: String,
}

/// Supplies images to review.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Current progress through the corpus.
    async fn progress(&self) -> Result<Progress, LabelerError>;

    /// The next unreviewed image, or exhaustion.
    async fn next(&self) -> Result<NextImage, LabelerError>;
}

/// Turns an image into proposed text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExtractionService: Send + Sync {
    /// Extract text from the image with the given identifier.
    async fn extract(&self, id: &str) -> Result<Extraction, LabelerError>;
}

/// Durably records corrected labels.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LabelStore: Send + Sync {
    /// Record `text` as the label for image `id`.
    async fn save(&self, id: &str, text: &str) -> Result<StoreReceipt, LabelerError>;

    /// All labels recorded so far, in the order they were saved.
    async fn labels(&self) -> Result<Vec<Label>, LabelerError>;
}
