//! Session state observed by the presentation layer.
//!
//! Only the review controller mutates these values.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::core::{ImageRef, Progress};

/// Lifecycle of a review item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Handed out by the source, extraction not yet dispatched.
    Loading,
    /// Extraction is in flight.
    ExtractionPending,
    /// Extraction finished, possibly with no text.
    Extracted,
    /// Extraction failed; the reviewer may retry or type the text.
    ExtractionFailed,
    /// The label is being written.
    Saving,
    /// The label was recorded.
    Saved,
    /// The reviewer moved on without recording a label.
    Skipped,
}

impl ItemStatus {
    /// Get the human-readable name for this status.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading",
            Self::ExtractionPending => "Extracting",
            Self::Extracted => "Extracted",
            Self::ExtractionFailed => "Extraction failed",
            Self::Saving => "Saving",
            Self::Saved => "Saved",
            Self::Skipped => "Skipped",
        }
    }

    /// Whether the item has been left behind by a save or a skip.
    #[must_use]
    pub const fn is_retired(&self) -> bool {
        matches!(self, Self::Saved | Self::Skipped)
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The image currently under review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewItem {
    /// Image identifier.
    pub id: String,
    /// Locator of the image bytes.
    pub source_uri: String,
    /// Text proposed by the extraction engine, once it has answered.
    pub extracted_text: Option<String>,
    /// Text as edited by the reviewer.
    pub edited_text: String,
    /// Where the item is in its lifecycle.
    pub status: ItemStatus,
}

impl ReviewItem {
    /// Create an item for a freshly handed-out image.
    #[must_use]
    pub fn new(image: ImageRef) -> Self {
        Self {
            id: image.id,
            source_uri: image.source_uri,
            extracted_text: None,
            edited_text: String::new(),
            status: ItemStatus::Loading,
        }
    }

    /// Whether the edited text has anything besides whitespace.
    #[must_use]
    pub fn has_text(&self) -> bool {
        !self.edited_text.trim().is_empty()
    }
}

/// Which kind of operation is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusyKind {
    LoadingImage,
    RunningExtraction,
    Saving,
}

impl std::fmt::Display for BusyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::LoadingImage => "loading an image",
            Self::RunningExtraction => "running extraction",
            Self::Saving => "saving",
        };
        write!(f, "{name}")
    }
}

/// One flag per operation category; at most one call of each kind runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyFlags {
    pub loading_image: bool,
    pub running_extraction: bool,
    pub saving: bool,
}

impl BusyFlags {
    /// Check a single category.
    #[must_use]
    pub const fn is(&self, kind: BusyKind) -> bool {
        match kind {
            BusyKind::LoadingImage => self.loading_image,
            BusyKind::RunningExtraction => self.running_extraction,
            BusyKind::Saving => self.saving,
        }
    }

    /// Whether anything is in flight.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.loading_image || self.running_extraction || self.saving
    }
}

/// Non-fatal conditions surfaced to the reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Notice {
    /// The image source could not hand out the next image.
    SourceUnavailable(String),
    /// The extraction engine failed outright.
    ExtractionFailed(String),
    /// Extraction worked but found no text. Advisory only.
    NoTextDetected,
    /// `save` was called with blank text.
    ValidationRejected,
    /// The label store did not record the label.
    PersistFailed(String),
}

impl Notice {
    /// Whether this is advisory rather than a failure.
    #[must_use]
    pub const fn is_advisory(&self) -> bool {
        matches!(self, Self::NoTextDetected)
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceUnavailable(detail) => {
                write!(f, "Failed to load next image ({detail}). Please try again.")
            },
            Self::ExtractionFailed(detail) => {
                write!(f, "Failed to extract text ({detail}). Please try again.")
            },
            Self::NoTextDetected => write!(f, "No text detected in this image."),
            Self::ValidationRejected => write!(f, "Please enter some text before saving."),
            Self::PersistFailed(detail) => {
                write!(f, "Failed to save label ({detail}). Please try again.")
            },
        }
    }
}

/// Running counts for the end-of-session summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tally {
    /// When the session started.
    pub started_at: DateTime<Local>,
    /// Labels recorded in this session.
    pub saved: usize,
    /// Images skipped in this session.
    pub skipped: usize,
}

impl Default for Tally {
    fn default() -> Self {
        Self {
            started_at: Local::now(),
            saved: 0,
            skipped: 0,
        }
    }
}

impl Tally {
    /// Seconds since the session started.
    #[must_use]
    pub fn elapsed_seconds(&self) -> i64 {
        (Local::now() - self.started_at).num_seconds()
    }
}

/// Everything the presentation layer may read about a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    /// The single active item, if any.
    pub current_item: Option<ReviewItem>,
    /// Progress through the corpus.
    pub progress: Progress,
    /// Last non-fatal condition, cleared when the next operation starts.
    pub error: Option<Notice>,
    /// In-flight operation categories.
    pub busy: BusyFlags,
    /// Set once the source reports no further images. Terminal.
    pub exhausted: bool,
    /// Saved and skipped counts.
    pub tally: Tally,
}

impl SessionState {
    /// The banner text, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// The current item if it can still be acted on.
    #[must_use]
    pub fn active_item(&self) -> Option<&ReviewItem> {
        self.current_item
            .as_ref()
            .filter(|item| !item.status.is_retired())
    }

    /// Whether `save` would currently be accepted.
    #[must_use]
    pub fn can_save(&self) -> bool {
        !self.exhausted
            && !self.busy.any()
            && self.active_item().is_some_and(ReviewItem::has_text)
    }

    /// Snapshot for the end-of-session report.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            saved: self.tally.saved,
            skipped: self.tally.skipped,
            elapsed_seconds: self.tally.elapsed_seconds(),
            progress: self.progress,
            finished: self.exhausted,
        }
    }
}

/// What a finished (or abandoned) session accomplished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub saved: usize,
    pub skipped: usize,
    pub elapsed_seconds: i64,
    /// Corpus progress when the session ended.
    pub progress: Progress,
    /// Whether the source ran out of images.
    pub finished: bool,
}
