//! Terminal User Interface (TUI) for ocr-labeler.
//!
//! Renders the review session and turns key presses into controller
//! operations. Built with ratatui and crossterm.

mod app;
mod event;
mod ui;

pub use app::App;
pub use event::{map_key, Action};

use std::io;
use std::time::Duration;

use crossterm::{
    event::KeyEvent,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::LabelerError;
use crate::features::review::{Completion, WorkflowController};

const TICK: Duration = Duration::from_millis(120);

/// What woke the event loop.
enum Step {
    Key(KeyEvent),
    Completion(Completion),
    Tick,
    InputClosed,
}

/// Run the review screen until the reviewer quits.
///
/// The controller is started here if it has not been already.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up or drawn.
pub async fn run(controller: &mut WorkflowController) -> Result<(), LabelerError> {
    // Setup terminal
    enable_raw_mode()
        .map_err(|e| LabelerError::Terminal(format!("Failed to enable raw mode: {e}")))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| LabelerError::Terminal(format!("Failed to setup terminal: {e}")))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)
        .map_err(|e| LabelerError::Terminal(format!("Failed to create terminal: {e}")))?;

    let (tx, rx) = mpsc::unbounded_channel();
    let input = event::InputThread::spawn(tx);

    // A second start is rejected, which is fine.
    let _ = controller.start();
    let mut app = App::new(controller);
    let result = run_app(&mut terminal, &mut app, rx).await;
    drop(input);

    // Restore terminal
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    finish_saving(app.controller()).await;
    result
}

/// Run the main application loop.
async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App<'_>,
    mut keys: mpsc::UnboundedReceiver<KeyEvent>,
) -> Result<(), LabelerError> {
    let mut tick = tokio::time::interval(TICK);

    loop {
        terminal
            .draw(|frame| ui::render(frame, app))
            .map_err(|e| LabelerError::Terminal(format!("Failed to draw: {e}")))?;

        if app.should_quit {
            break;
        }

        let step = tokio::select! {
            key = keys.recv() => key.map_or(Step::InputClosed, Step::Key),
            Some(completion) = app.controller().wait() => Step::Completion(completion),
            _ = tick.tick() => Step::Tick,
        };

        match step {
            Step::Key(key) => {
                if let Some(action) = event::map_key(key) {
                    app.handle(action);
                }
            },
            Step::Completion(completion) => app.controller().apply(completion),
            Step::Tick => app.on_tick(),
            Step::InputClosed => {
                debug!("Input thread stopped");
                break;
            },
        }
    }

    Ok(())
}

/// Let an in-flight save land before exiting so the label is not lost.
async fn finish_saving(controller: &mut WorkflowController) {
    while controller.state().busy.saving {
        let Some(completion) = controller.wait().await else {
            break;
        };
        controller.apply(completion);
    }
    info!(
        saved = controller.state().tally.saved,
        skipped = controller.state().tally.skipped,
        "Review session ended"
    );
}
