//! Pure state-transition core of the review workflow.
//!
//! Operations and completions go in; the new state and a list of effects come
//! out. Nothing here performs I/O, so every rule can be exercised without
//! collaborators.
//!
//! Every effect carries the generation it was issued under. The generation
//! advances each time a new image is requested, and a completion whose
//! generation is behind the session's is discarded unapplied.

use tracing::{debug, warn};

use super::state::{BusyKind, ItemStatus, Notice, ReviewItem, SessionState};
use crate::core::{Extraction, NextImage, StoreReceipt};

/// Operations the presentation layer can issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Initialize the session and request the first image.
    Start,
    /// Request the next image.
    RequestNext,
    /// Run extraction on the current image.
    RunExtraction,
    /// Run extraction again on the current image.
    RetryExtraction,
    /// Replace the reviewer's text.
    EditText(String),
    /// Record the reviewer's text and move on.
    Save,
    /// Move on without recording anything.
    Skip,
}

/// Collaborator calls the executor must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the image source for the next image.
    FetchNext { generation: u64 },
    /// Ask the extraction engine for text.
    Extract { generation: u64, id: String },
    /// Ask the label store to record a label.
    Persist {
        generation: u64,
        id: String,
        text: String,
    },
}

impl Effect {
    /// The generation this effect was issued under.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        match self {
            Self::FetchNext { generation }
            | Self::Extract { generation, .. }
            | Self::Persist { generation, .. } => *generation,
        }
    }
}

/// Outcome of an [`Effect`], with collaborator errors already stringified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Loaded {
        generation: u64,
        result: Result<NextImage, String>,
    },
    Extracted {
        generation: u64,
        id: String,
        result: Result<Extraction, String>,
    },
    Persisted {
        generation: u64,
        id: String,
        result: Result<StoreReceipt, String>,
    },
}

impl Completion {
    /// The generation of the effect that produced this completion.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        match self {
            Self::Loaded { generation, .. }
            | Self::Extracted { generation, .. }
            | Self::Persisted { generation, .. } => *generation,
        }
    }
}

/// Why an operation was refused. A refused operation changes nothing,
/// except a blank `Save`, which also raises [`Notice::ValidationRejected`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// `Start` was already issued.
    AlreadyStarted,
    /// The session has not been started.
    NotStarted,
    /// The source has no more images.
    Exhausted,
    /// An operation of a conflicting kind is in flight.
    Busy(BusyKind),
    /// There is no item that can be acted on.
    NoCurrentItem,
    /// The edited text is blank.
    BlankText,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyStarted => write!(f, "session already started"),
            Self::NotStarted => write!(f, "session not started"),
            Self::Exhausted => write!(f, "no more images"),
            Self::Busy(kind) => write!(f, "busy {kind}"),
            Self::NoCurrentItem => write!(f, "no image to act on"),
            Self::BlankText => write!(f, "text is blank"),
        }
    }
}

impl std::error::Error for Rejection {}

/// The review session: state plus the bookkeeping needed to apply
/// operations and completions.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    generation: u64,
    started: bool,
    status_before_save: Option<ItemStatus>,
}

impl Session {
    /// Create an unstarted session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of the state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `Start` has been applied.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    /// Apply an operation.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] when the operation is not allowed in the
    /// current state. Nothing is dispatched in that case.
    pub fn apply(&mut self, op: Op) -> Result<Vec<Effect>, Rejection> {
        match op {
            Op::Start => self.start(),
            Op::RequestNext => self.request_next().map(|effect| vec![effect]),
            Op::RunExtraction => self.run_extraction().map(|effect| vec![effect]),
            Op::RetryExtraction => self.retry_extraction().map(|effect| vec![effect]),
            Op::EditText(text) => self.edit_text(text).map(|()| Vec::new()),
            Op::Save => self.save().map(|effect| vec![effect]),
            Op::Skip => self.skip().map(|effect| vec![effect]),
        }
    }

    /// Apply a completion. Completions from a superseded generation are
    /// dropped without touching the state.
    pub fn resolve(&mut self, completion: Completion) -> Vec<Effect> {
        if completion.generation() != self.generation {
            debug!(
                stale = completion.generation(),
                current = self.generation,
                "Discarding stale completion"
            );
            return Vec::new();
        }

        match completion {
            Completion::Loaded { result, .. } => self.on_loaded(result),
            Completion::Extracted { id, result, .. } => {
                self.on_extracted(&id, result);
                Vec::new()
            },
            Completion::Persisted { id, result, .. } => self.on_persisted(&id, result),
        }
    }

    fn start(&mut self) -> Result<Vec<Effect>, Rejection> {
        if self.started {
            return Err(Rejection::AlreadyStarted);
        }
        self.started = true;
        self.state = SessionState::default();
        self.request_next().map(|effect| vec![effect])
    }

    fn ensure_open(&self) -> Result<(), Rejection> {
        if !self.started {
            return Err(Rejection::NotStarted);
        }
        if self.state.exhausted {
            return Err(Rejection::Exhausted);
        }
        Ok(())
    }

    fn ensure_idle(&self, kind: BusyKind) -> Result<(), Rejection> {
        if self.state.busy.is(kind) {
            Err(Rejection::Busy(kind))
        } else {
            Ok(())
        }
    }

    fn request_next(&mut self) -> Result<Effect, Rejection> {
        self.ensure_open()?;
        self.ensure_idle(BusyKind::LoadingImage)?;
        self.ensure_idle(BusyKind::Saving)?;

        self.generation += 1;
        self.state.busy.loading_image = true;
        // Any extraction still running belongs to the item being left behind.
        self.state.busy.running_extraction = false;
        self.state.error = None;

        Ok(Effect::FetchNext {
            generation: self.generation,
        })
    }

    fn run_extraction(&mut self) -> Result<Effect, Rejection> {
        self.ensure_open()?;
        // The current item is about to be replaced.
        self.ensure_idle(BusyKind::LoadingImage)?;
        self.ensure_idle(BusyKind::RunningExtraction)?;
        let item = self
            .state
            .current_item
            .as_mut()
            .filter(|item| !item.status.is_retired() && item.status != ItemStatus::Saving)
            .ok_or(Rejection::NoCurrentItem)?;

        item.status = ItemStatus::ExtractionPending;
        let id = item.id.clone();
        self.state.busy.running_extraction = true;
        self.state.error = None;

        Ok(Effect::Extract {
            generation: self.generation,
            id,
        })
    }

    fn retry_extraction(&mut self) -> Result<Effect, Rejection> {
        self.ensure_open()?;
        self.ensure_idle(BusyKind::LoadingImage)?;
        self.ensure_idle(BusyKind::Saving)?;
        self.run_extraction()
    }

    fn edit_text(&mut self, text: String) -> Result<(), Rejection> {
        self.ensure_open()?;
        self.ensure_idle(BusyKind::LoadingImage)?;
        self.ensure_idle(BusyKind::RunningExtraction)?;
        self.ensure_idle(BusyKind::Saving)?;
        let item = self.active_item_mut()?;
        item.edited_text = text;
        Ok(())
    }

    fn save(&mut self) -> Result<Effect, Rejection> {
        self.ensure_open()?;
        self.ensure_idle(BusyKind::Saving)?;
        self.ensure_idle(BusyKind::LoadingImage)?;
        self.ensure_idle(BusyKind::RunningExtraction)?;

        let item = self.active_item_mut()?;
        if !item.has_text() {
            self.state.error = Some(Notice::ValidationRejected);
            return Err(Rejection::BlankText);
        }

        let previous = item.status;
        item.status = ItemStatus::Saving;
        let id = item.id.clone();
        let text = item.edited_text.trim().to_string();

        self.status_before_save = Some(previous);
        self.state.busy.saving = true;
        self.state.error = None;

        Ok(Effect::Persist {
            generation: self.generation,
            id,
            text,
        })
    }

    fn skip(&mut self) -> Result<Effect, Rejection> {
        self.ensure_open()?;
        self.ensure_idle(BusyKind::LoadingImage)?;
        self.ensure_idle(BusyKind::Saving)?;

        let item = self.active_item_mut()?;
        item.status = ItemStatus::Skipped;
        self.state.tally.skipped += 1;
        self.request_next()
    }

    fn active_item_mut(&mut self) -> Result<&mut ReviewItem, Rejection> {
        self.state
            .current_item
            .as_mut()
            .filter(|item| !item.status.is_retired())
            .ok_or(Rejection::NoCurrentItem)
    }

    fn on_loaded(&mut self, result: Result<NextImage, String>) -> Vec<Effect> {
        self.state.busy.loading_image = false;

        match result {
            Ok(NextImage::Ready { image, progress }) => {
                self.state.current_item = Some(ReviewItem::new(image));
                self.state.progress = progress;
                // Nothing dispatched for the previous item may hold the new one back.
                self.state.busy.running_extraction = false;
                match self.run_extraction() {
                    Ok(effect) => vec![effect],
                    Err(rejection) => {
                        warn!(%rejection, "Could not start extraction for loaded image");
                        self.state.error = Some(Notice::ExtractionFailed(format!(
                            "extraction not started: {rejection}"
                        )));
                        Vec::new()
                    },
                }
            },
            Ok(NextImage::Exhausted { progress }) => {
                self.state.exhausted = true;
                self.state.current_item = None;
                self.state.progress = progress;
                Vec::new()
            },
            Err(detail) => {
                self.state.error = Some(Notice::SourceUnavailable(detail));
                Vec::new()
            },
        }
    }

    fn on_extracted(&mut self, id: &str, result: Result<Extraction, String>) {
        self.state.busy.running_extraction = false;

        let Some(item) = self
            .state
            .current_item
            .as_mut()
            .filter(|item| item.id == id && item.status == ItemStatus::ExtractionPending)
        else {
            return;
        };

        match result {
            Ok(extraction) if extraction.success => {
                item.status = ItemStatus::Extracted;
                if extraction.text.trim().is_empty() {
                    item.extracted_text = Some(String::new());
                    self.state.error = Some(Notice::NoTextDetected);
                } else {
                    item.edited_text.clone_from(&extraction.text);
                    item.extracted_text = Some(extraction.text);
                }
            },
            Ok(_) => {
                item.status = ItemStatus::ExtractionFailed;
                item.extracted_text = None;
                self.state.error = Some(Notice::ExtractionFailed(
                    "engine reported failure".to_string(),
                ));
            },
            Err(detail) => {
                item.status = ItemStatus::ExtractionFailed;
                item.extracted_text = None;
                self.state.error = Some(Notice::ExtractionFailed(detail));
            },
        }
    }

    fn on_persisted(&mut self, id: &str, result: Result<StoreReceipt, String>) -> Vec<Effect> {
        self.state.busy.saving = false;
        let previous = self.status_before_save.take();

        let Some(item) = self
            .state
            .current_item
            .as_mut()
            .filter(|item| item.id == id && item.status == ItemStatus::Saving)
        else {
            return Vec::new();
        };

        let failure = match result {
            Ok(receipt) if receipt.success => None,
            Ok(_) => Some("label was not recorded".to_string()),
            Err(detail) => Some(detail),
        };

        match failure {
            None => {
                item.status = ItemStatus::Saved;
                self.state.tally.saved += 1;
                self.request_next().map_or_else(|_| Vec::new(), |effect| vec![effect])
            },
            Some(detail) => {
                item.status = previous.unwrap_or(ItemStatus::Extracted);
                self.state.error = Some(Notice::PersistFailed(detail));
                Vec::new()
            },
        }
    }
}
