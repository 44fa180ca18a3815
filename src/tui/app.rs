//! Application state for the TUI.

use crate::features::review::{Rejection, SessionState, WorkflowController};
use crate::tui::event::Action;

/// Application state.
///
/// Everything shown on screen comes from the controller's session state;
/// the app only adds a status line and a spinner frame.
pub struct App<'a> {
    /// The review session being driven.
    controller: &'a mut WorkflowController,
    /// Result of the last key press, if worth showing.
    pub status: Option<String>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Spinner frame, advanced on every tick.
    pub tick: usize,
}

impl<'a> App<'a> {
    /// Create a new app instance over a started controller.
    pub fn new(controller: &'a mut WorkflowController) -> Self {
        Self {
            controller,
            status: None,
            should_quit: false,
            tick: 0,
        }
    }

    /// Session state to render.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        self.controller.state()
    }

    /// The controller, for waiting on and applying results.
    pub fn controller(&mut self) -> &mut WorkflowController {
        self.controller
    }

    /// Advance the spinner.
    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Apply a key action.
    pub fn handle(&mut self, action: Action) {
        self.status = None;

        let result = match action {
            Action::Quit => {
                self.should_quit = true;
                return;
            },
            Action::Insert(c) => self.edit(|text| text.push(c)),
            Action::Backspace => self.edit(|text| {
                text.pop();
            }),
            Action::ClearText => self.edit(String::clear),
            Action::Save => self.controller.save(),
            Action::Skip => self.controller.skip(),
            Action::Retry => self.controller.retry_extraction(),
            Action::RequestNext => self.controller.request_next(),
        };

        match result {
            // Already shown in the error banner.
            Ok(()) | Err(Rejection::BlankText) => {},
            Err(rejection) => self.status = Some(format!("Not now: {rejection}")),
        }
    }

    fn edit(&mut self, change: impl FnOnce(&mut String)) -> Result<(), Rejection> {
        let mut text = self
            .state()
            .active_item()
            .map(|item| item.edited_text.clone())
            .unwrap_or_default();
        change(&mut text);
        self.controller.edit_text(text)
    }
}
