//! Event handling for the TUI.
//!
//! Terminal input is read on its own thread and forwarded over a channel so
//! the event loop can wait on keys and collaborator results together.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tracing::warn;

/// Action to take after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Quit the application.
    Quit,
    /// Type a character into the editor.
    Insert(char),
    /// Delete the last character.
    Backspace,
    /// Clear the editor.
    ClearText,
    /// Save the corrected text.
    Save,
    /// Skip the current image.
    Skip,
    /// Run extraction again.
    Retry,
    /// Ask the source for the next image.
    RequestNext,
}

/// Map a key press to an action.
///
/// Returns `None` for keys with no binding and for key releases.
#[must_use]
pub fn map_key(key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('s') => Some(Action::Save),
            KeyCode::Char('n') => Some(Action::Skip),
            KeyCode::Char('r') => Some(Action::Retry),
            KeyCode::Char('l') => Some(Action::RequestNext),
            KeyCode::Char('u') => Some(Action::ClearText),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Esc => Some(Action::Quit),
        KeyCode::Enter => Some(Action::Save),
        KeyCode::Tab => Some(Action::Skip),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Char(c) => Some(Action::Insert(c)),
        _ => None,
    }
}

/// Handle to the input thread. Dropping it stops the thread.
pub struct InputThread {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl InputThread {
    /// Start forwarding key presses to `tx`.
    #[must_use]
    pub fn spawn(tx: mpsc::UnboundedSender<KeyEvent>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = std::thread::spawn(move || {
            while !flag.load(Ordering::Relaxed) {
                // Poll with a timeout so the stop flag is checked regularly.
                match event::poll(Duration::from_millis(100)) {
                    Ok(false) => {},
                    Ok(true) => match event::read() {
                        Ok(Event::Key(key)) => {
                            if tx.send(key).is_err() {
                                break;
                            }
                        },
                        Ok(_) => {},
                        Err(e) => {
                            warn!(error = %e, "Event read failed");
                            break;
                        },
                    },
                    Err(e) => {
                        warn!(error = %e, "Event poll failed");
                        break;
                    },
                }
            }
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }
}

impl Drop for InputThread {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_plain_keys() {
        assert_eq!(map_key(key(KeyCode::Char('a'))), Some(Action::Insert('a')));
        assert_eq!(map_key(key(KeyCode::Char(' '))), Some(Action::Insert(' ')));
        assert_eq!(map_key(key(KeyCode::Enter)), Some(Action::Save));
        assert_eq!(map_key(key(KeyCode::Tab)), Some(Action::Skip));
        assert_eq!(map_key(key(KeyCode::Backspace)), Some(Action::Backspace));
        assert_eq!(map_key(key(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(map_key(key(KeyCode::F(1))), None);
    }

    #[test]
    fn test_shifted_chars_insert() {
        let shifted = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(map_key(shifted), Some(Action::Insert('A')));
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(map_key(ctrl('c')), Some(Action::Quit));
        assert_eq!(map_key(ctrl('s')), Some(Action::Save));
        assert_eq!(map_key(ctrl('n')), Some(Action::Skip));
        assert_eq!(map_key(ctrl('r')), Some(Action::Retry));
        assert_eq!(map_key(ctrl('l')), Some(Action::RequestNext));
        assert_eq!(map_key(ctrl('u')), Some(Action::ClearText));
        assert_eq!(map_key(ctrl('x')), None);
    }

    #[test]
    fn test_release_is_ignored() {
        let mut release = key(KeyCode::Char('a'));
        release.kind = KeyEventKind::Release;
        assert_eq!(map_key(release), None);
    }
}
