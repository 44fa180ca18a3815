//! Review workflow controller.
//!
//! Owns the [`Session`] and performs its effects. Each effect runs as its own
//! tokio task; results come back over a channel and are applied on the task
//! that owns the controller, so the session has exactly one writer.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use super::state::SessionState;
use super::transition::{Completion, Effect, Op, Rejection, Session};
use crate::core::{ExtractionService, ImageSource, LabelStore};
use crate::error::LabelerError;

/// Drives a review session against its three collaborators.
pub struct WorkflowController {
    session: Session,
    source: Arc<dyn ImageSource>,
    extractor: Arc<dyn ExtractionService>,
    store: Arc<dyn LabelStore>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl WorkflowController {
    /// Create a controller. Nothing happens until [`Self::start`].
    #[must_use]
    pub fn new(
        source: Arc<dyn ImageSource>,
        extractor: Arc<dyn ExtractionService>,
        store: Arc<dyn LabelStore>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session: Session::new(),
            source,
            extractor,
            store,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Read-only view of the session.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        self.session.state()
    }

    /// Current generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.session.generation()
    }

    /// Number of collaborator calls whose results have not been applied yet.
    #[must_use]
    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start the session and request the first image.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::AlreadyStarted`] on a second call.
    pub fn start(&mut self) -> Result<(), Rejection> {
        self.dispatch(Op::Start)
    }

    /// Request the next image.
    ///
    /// # Errors
    ///
    /// Rejected while an image is loading or a label is saving, and once the
    /// source is exhausted.
    pub fn request_next(&mut self) -> Result<(), Rejection> {
        self.dispatch(Op::RequestNext)
    }

    /// Run extraction on the current image.
    ///
    /// # Errors
    ///
    /// Rejected without a current image or while extraction is running.
    pub fn run_extraction(&mut self) -> Result<(), Rejection> {
        self.dispatch(Op::RunExtraction)
    }

    /// Run extraction again on the current image.
    ///
    /// # Errors
    ///
    /// Rejected without a current image, while extraction is running, or
    /// while a save is in progress.
    pub fn retry_extraction(&mut self) -> Result<(), Rejection> {
        self.dispatch(Op::RetryExtraction)
    }

    /// Replace the reviewer's text.
    ///
    /// # Errors
    ///
    /// Rejected without a current image or while extraction or a save is
    /// running.
    pub fn edit_text(&mut self, text: impl Into<String>) -> Result<(), Rejection> {
        self.dispatch(Op::EditText(text.into()))
    }

    /// Record the reviewer's text, then move to the next image.
    ///
    /// # Errors
    ///
    /// Rejected when the text is blank (the banner is set too), without a
    /// current image, or while any other operation is in flight.
    pub fn save(&mut self) -> Result<(), Rejection> {
        self.dispatch(Op::Save)
    }

    /// Move to the next image without recording a label.
    ///
    /// # Errors
    ///
    /// Rejected without a current image, or while loading or saving.
    pub fn skip(&mut self) -> Result<(), Rejection> {
        self.dispatch(Op::Skip)
    }

    fn dispatch(&mut self, op: Op) -> Result<(), Rejection> {
        let name = op_name(&op);
        match self.session.apply(op) {
            Ok(effects) => {
                info!(
                    op = name,
                    generation = self.session.generation(),
                    "Operation accepted"
                );
                self.spawn_all(effects);
                Ok(())
            },
            Err(rejection) => {
                info!(op = name, reason = %rejection, "Operation rejected");
                Err(rejection)
            },
        }
    }

    fn spawn_all(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.spawn(effect);
        }
    }

    fn spawn(&mut self, effect: Effect) {
        self.in_flight += 1;
        let tx = self.tx.clone();
        let source = Arc::clone(&self.source);
        let extractor = Arc::clone(&self.extractor);
        let store = Arc::clone(&self.store);

        tokio::spawn(async move {
            let completion =
                perform(effect, source.as_ref(), extractor.as_ref(), store.as_ref()).await;
            // The receiver only goes away with the controller.
            let _ = tx.send(completion);
        });
    }

    /// Wait for the next collaborator result without applying it.
    ///
    /// Returns `None` immediately when nothing is in flight.
    pub async fn wait(&mut self) -> Option<Completion> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.rx.recv().await?;
        self.in_flight -= 1;
        Some(completion)
    }

    /// Apply a result obtained from [`Self::wait`].
    pub fn apply(&mut self, completion: Completion) {
        let generation = completion.generation();
        if generation != self.session.generation() {
            info!(
                stale = generation,
                current = self.session.generation(),
                "Discarding result for a superseded image"
            );
        }
        let effects = self.session.resolve(completion);
        self.spawn_all(effects);
    }

    /// Wait for and apply one result. Returns `false` when nothing was in flight.
    pub async fn step(&mut self) -> bool {
        match self.wait().await {
            Some(completion) => {
                self.apply(completion);
                true
            },
            None => false,
        }
    }

    /// Apply results until nothing is in flight.
    pub async fn settle(&mut self) {
        while self.step().await {}
    }
}

const fn op_name(op: &Op) -> &'static str {
    match op {
        Op::Start => "start",
        Op::RequestNext => "request_next",
        Op::RunExtraction => "run_extraction",
        Op::RetryExtraction => "retry_extraction",
        Op::EditText(_) => "edit_text",
        Op::Save => "save",
        Op::Skip => "skip",
    }
}

fn describe(context: &str, generation: u64, image: Option<&str>, err: &LabelerError) -> String {
    warn!(
        generation,
        image,
        transient = err.is_transient(),
        error = %err,
        "{context}"
    );
    err.to_string()
}

async fn perform(
    effect: Effect,
    source: &dyn ImageSource,
    extractor: &dyn ExtractionService,
    store: &dyn LabelStore,
) -> Completion {
    match effect {
        Effect::FetchNext { generation } => Completion::Loaded {
            generation,
            result: source
                .next()
                .await
                .map_err(|e| describe("Image source failed", generation, None, &e)),
        },
        Effect::Extract { generation, id } => {
            let result = extractor
                .extract(&id)
                .await
                .map_err(|e| describe("Extraction failed", generation, Some(&id), &e));
            Completion::Extracted {
                generation,
                id,
                result,
            }
        },
        Effect::Persist {
            generation,
            id,
            text,
        } => {
            let result = store
                .save(&id, &text)
                .await
                .map_err(|e| describe("Label store failed", generation, Some(&id), &e));
            Completion::Persisted {
                generation,
                id,
                result,
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::core::{
        Extraction, ImageRef, MockExtractionService, MockImageSource, MockLabelStore, NextImage,
        Progress, StoreReceipt,
    };
    use crate::features::review::state::{BusyKind, ItemStatus, Notice};

    /// Hands out the queued responses in order, then exhaustion.
    struct QueuedSource {
        responses: Mutex<VecDeque<Result<NextImage, LabelerError>>>,
        calls: Mutex<usize>,
    }

    impl QueuedSource {
        fn new(ids: &[&str]) -> Self {
            let total = ids.len();
            let responses = ids
                .iter()
                .enumerate()
                .map(|(i, id)| Ok(ready(id, i, total)))
                .collect();
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ImageSource for QueuedSource {
        async fn progress(&self) -> Result<Progress, LabelerError> {
            Ok(Progress::default())
        }

        async fn next(&self) -> Result<NextImage, LabelerError> {
            *self.calls.lock().unwrap() += 1;
            self.responses.lock().unwrap().pop_front().unwrap_or(Ok(
                NextImage::Exhausted {
                    progress: Progress::new(1, 1),
                },
            ))
        }
    }

    /// Extraction that holds back results for `gated` until released.
    struct GatedExtractor {
        gated: String,
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl ExtractionService for GatedExtractor {
        async fn extract(&self, id: &str) -> Result<Extraction, LabelerError> {
            if id == self.gated {
                self.gate.notified().await;
            }
            Ok(Extraction::found(format!("text for {id}")))
        }
    }

    /// Records calls in order so tests can check sequencing.
    struct RecordingStore {
        saved: Arc<Mutex<Vec<(String, String)>>>,
    }

    #[async_trait]
    impl LabelStore for RecordingStore {
        async fn save(&self, id: &str, text: &str) -> Result<StoreReceipt, LabelerError> {
            self.saved
                .lock()
                .unwrap()
                .push((id.to_string(), text.to_string()));
            Ok(StoreReceipt { success: true })
        }

        async fn labels(&self) -> Result<Vec<crate::core::Label>, LabelerError> {
            Ok(Vec::new())
        }
    }

    fn ready(id: &str, processed: usize, total: usize) -> NextImage {
        NextImage::Ready {
            image: ImageRef {
                id: id.to_string(),
                source_uri: format!("/images/{id}"),
            },
            progress: Progress::new(processed, total),
        }
    }

    fn current_id(controller: &WorkflowController) -> Option<String> {
        controller
            .state()
            .current_item
            .as_ref()
            .map(|item| item.id.clone())
    }

    #[tokio::test]
    async fn test_edit_save_and_advance() {
        let mut source = MockImageSource::new();
        let mut responses = VecDeque::from(vec![
            ready("img001", 0, 2),
            NextImage::Exhausted {
                progress: Progress::new(1, 1),
            },
        ]);
        source
            .expect_next()
            .times(2)
            .returning(move || Ok(responses.pop_front().unwrap()));

        let mut extractor = MockExtractionService::new();
        extractor
            .expect_extract()
            .withf(|id| id == "img001")
            .times(1)
            .returning(|_| Ok(Extraction::found("Hello Wrold")));

        let mut store = MockLabelStore::new();
        store
            .expect_save()
            .withf(|id, text| id == "img001" && text == "Hello World")
            .times(1)
            .returning(|_, _| Ok(StoreReceipt { success: true }));

        let mut controller =
            WorkflowController::new(Arc::new(source), Arc::new(extractor), Arc::new(store));
        controller.start().unwrap();
        controller.settle().await;

        let item = controller.state().current_item.clone().unwrap();
        assert_eq!(item.status, ItemStatus::Extracted);
        assert_eq!(item.edited_text, "Hello Wrold");

        controller.edit_text("Hello World").unwrap();
        controller.save().unwrap();
        controller.settle().await;

        assert!(controller.state().exhausted);
        assert_eq!(controller.state().tally.saved, 1);
        assert_eq!(controller.generation(), 2);
    }

    #[tokio::test]
    async fn test_blank_save_never_reaches_store() {
        let mut source = MockImageSource::new();
        source
            .expect_next()
            .times(1)
            .returning(|| Ok(ready("img003", 0, 1)));

        let mut extractor = MockExtractionService::new();
        extractor
            .expect_extract()
            .returning(|_| Ok(Extraction::found("draft")));

        let mut store = MockLabelStore::new();
        store.expect_save().never();

        let mut controller =
            WorkflowController::new(Arc::new(source), Arc::new(extractor), Arc::new(store));
        controller.start().unwrap();
        controller.settle().await;

        controller.edit_text("   ").unwrap();
        assert_eq!(controller.save(), Err(Rejection::BlankText));
        assert_eq!(controller.in_flight(), 0);
        assert_eq!(controller.state().error, Some(Notice::ValidationRejected));
    }

    #[tokio::test]
    async fn test_failed_extraction_then_retry_with_no_text() {
        let mut source = MockImageSource::new();
        let mut responses = VecDeque::from(vec![
            ready("img002", 1, 2),
            NextImage::Exhausted {
                progress: Progress::new(2, 2),
            },
        ]);
        source
            .expect_next()
            .times(2)
            .returning(move || Ok(responses.pop_front().unwrap()));

        let mut extractor = MockExtractionService::new();
        let mut attempts = 0;
        extractor.expect_extract().times(2).returning(move |_| {
            attempts += 1;
            if attempts == 1 {
                Ok(Extraction::failed())
            } else {
                Ok(Extraction::found(""))
            }
        });

        let saved = Arc::new(Mutex::new(Vec::new()));
        let store = RecordingStore {
            saved: Arc::clone(&saved),
        };

        let mut controller =
            WorkflowController::new(Arc::new(source), Arc::new(extractor), Arc::new(store));
        controller.start().unwrap();
        controller.settle().await;

        let item = controller.state().current_item.clone().unwrap();
        assert_eq!(item.status, ItemStatus::ExtractionFailed);
        assert!(matches!(
            controller.state().error,
            Some(Notice::ExtractionFailed(_))
        ));

        controller.retry_extraction().unwrap();
        controller.settle().await;
        let item = controller.state().current_item.clone().unwrap();
        assert_eq!(item.status, ItemStatus::Extracted);
        assert_eq!(controller.state().error, Some(Notice::NoTextDetected));

        controller.edit_text("Invoice #42").unwrap();
        controller.save().unwrap();
        // Apply only the store result: the chained request is issued after it.
        assert!(controller.step().await);
        assert_eq!(
            *saved.lock().unwrap(),
            vec![("img002".to_string(), "Invoice #42".to_string())]
        );
        assert!(controller.state().busy.loading_image);
        assert_eq!(controller.in_flight(), 1);
        controller.settle().await;
        assert!(controller.state().exhausted);
    }

    #[tokio::test]
    async fn test_store_is_called_before_next_request() {
        let source = Arc::new(QueuedSource::new(&["img001", "img002"]));
        let mut extractor = MockExtractionService::new();
        extractor
            .expect_extract()
            .returning(|id| Ok(Extraction::found(format!("ocr {id}"))));
        let saved = Arc::new(Mutex::new(Vec::new()));
        let store = RecordingStore {
            saved: Arc::clone(&saved),
        };

        let mut controller = WorkflowController::new(
            Arc::clone(&source) as Arc<dyn ImageSource>,
            Arc::new(extractor),
            Arc::new(store),
        );
        controller.start().unwrap();
        controller.settle().await;
        assert_eq!(source.calls(), 1);

        controller.save().unwrap();
        // Store call not yet applied: no second request has been issued.
        assert_eq!(source.calls(), 1);
        assert!(controller.step().await);
        assert_eq!(saved.lock().unwrap().len(), 1);
        controller.settle().await;

        assert_eq!(source.calls(), 2);
        assert_eq!(current_id(&controller).as_deref(), Some("img002"));
    }

    #[tokio::test]
    async fn test_stale_extraction_after_skip_is_discarded() {
        let source = Arc::new(QueuedSource::new(&["imgA", "imgB"]));
        let gate = Arc::new(Notify::new());
        let extractor = GatedExtractor {
            gated: "imgA".to_string(),
            gate: Arc::clone(&gate),
        };
        let mut store = MockLabelStore::new();
        store.expect_save().never();

        let mut controller =
            WorkflowController::new(source, Arc::new(extractor), Arc::new(store));
        controller.start().unwrap();

        // Image A arrives; its extraction blocks on the gate.
        assert!(controller.step().await);
        assert_eq!(current_id(&controller).as_deref(), Some("imgA"));
        assert!(controller.state().busy.running_extraction);

        controller.skip().unwrap();
        assert_eq!(controller.generation(), 2);

        // Image B arrives and its extraction completes.
        assert!(controller.step().await);
        assert_eq!(current_id(&controller).as_deref(), Some("imgB"));
        assert!(controller.step().await);
        let item = controller.state().current_item.clone().unwrap();
        assert_eq!(item.edited_text, "text for imgB");

        // A's extraction finally resolves and must not touch B.
        gate.notify_one();
        assert!(controller.step().await);
        let item = controller.state().current_item.clone().unwrap();
        assert_eq!(item.id, "imgB");
        assert_eq!(item.edited_text, "text for imgB");
        assert_eq!(item.extracted_text.as_deref(), Some("text for imgB"));
        assert_eq!(controller.state().tally.skipped, 1);
        assert!(!controller.step().await);
    }

    #[tokio::test]
    async fn test_exhausted_rejects_everything() {
        let mut source = MockImageSource::new();
        source.expect_next().times(1).returning(|| {
            Ok(NextImage::Exhausted {
                progress: Progress::new(4, 4),
            })
        });
        let mut extractor = MockExtractionService::new();
        extractor.expect_extract().never();
        let mut store = MockLabelStore::new();
        store.expect_save().never();

        let mut controller =
            WorkflowController::new(Arc::new(source), Arc::new(extractor), Arc::new(store));
        controller.start().unwrap();
        controller.settle().await;

        assert!(controller.state().exhausted);
        assert!(controller.state().current_item.is_none());
        assert_eq!(controller.save(), Err(Rejection::Exhausted));
        assert_eq!(controller.skip(), Err(Rejection::Exhausted));
        assert_eq!(controller.retry_extraction(), Err(Rejection::Exhausted));
        assert_eq!(controller.edit_text("x"), Err(Rejection::Exhausted));
        assert_eq!(controller.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_rapid_request_next_is_rejected() {
        let mut source = MockImageSource::new();
        source
            .expect_next()
            .times(1)
            .returning(|| Err(LabelerError::Source("offline".to_string())));
        let extractor = MockExtractionService::new();
        let store = MockLabelStore::new();

        let mut controller =
            WorkflowController::new(Arc::new(source), Arc::new(extractor), Arc::new(store));
        controller.start().unwrap();
        assert_eq!(
            controller.request_next(),
            Err(Rejection::Busy(BusyKind::LoadingImage))
        );
        assert_eq!(controller.generation(), 1);

        controller.settle().await;
        assert!(matches!(
            controller.state().error,
            Some(Notice::SourceUnavailable(_))
        ));
        assert!(!controller.state().busy.loading_image);
    }

    #[tokio::test]
    async fn test_store_failure_keeps_item() {
        let mut source = MockImageSource::new();
        source
            .expect_next()
            .times(1)
            .returning(|| Ok(ready("img007", 0, 1)));
        let mut extractor = MockExtractionService::new();
        extractor
            .expect_extract()
            .returning(|_| Ok(Extraction::found("label")));
        let mut store = MockLabelStore::new();
        store
            .expect_save()
            .times(1)
            .returning(|_, _| Err(LabelerError::Store("disk full".to_string())));

        let mut controller =
            WorkflowController::new(Arc::new(source), Arc::new(extractor), Arc::new(store));
        controller.start().unwrap();
        controller.settle().await;
        controller.save().unwrap();
        controller.settle().await;

        let state = controller.state();
        assert_eq!(
            state.current_item.as_ref().map(|item| item.status),
            Some(ItemStatus::Extracted)
        );
        assert!(matches!(
            state.error,
            Some(Notice::PersistFailed(ref d)) if d.contains("disk full")
        ));
        assert!(!state.busy.saving);
        assert_eq!(state.tally.saved, 0);
    }
}
