//! UI rendering for the TUI.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::features::review::{ItemStatus, ReviewItem, SessionState};
use crate::tui::app::App;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

const HELP: &str =
    "Enter:save | Tab:skip | ^R:retry OCR | ^L:next image | ^U:clear | Esc:quit";

/// Render the application UI.
pub fn render(frame: &mut Frame<'_>, app: &App<'_>) {
    let state = app.state();
    let banner_height = if state.error.is_some() { 3 } else { 0 };

    // Create layout: progress, banner, body, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(banner_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_progress(frame, state, chunks[0]);
    if banner_height > 0 {
        render_banner(frame, state, chunks[1]);
    }

    if state.exhausted {
        render_done(frame, state, chunks[2]);
    } else if let Some(item) = &state.current_item {
        render_item(frame, app, item, chunks[2]);
    } else {
        render_waiting(frame, app, chunks[2]);
    }

    render_status_bar(frame, app, chunks[3]);
}

fn render_progress(frame: &mut Frame<'_>, state: &SessionState, area: Rect) {
    let progress = state.progress;
    let label = format!(
        "{} / {} labeled ({:.0}%)",
        progress.processed,
        progress.total,
        progress.percent()
    );

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(" OCR Labeler ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .ratio((progress.percent() / 100.0).clamp(0.0, 1.0))
        .label(label);

    frame.render_widget(gauge, area);
}

fn render_banner(frame: &mut Frame<'_>, state: &SessionState, area: Rect) {
    let Some(notice) = &state.error else {
        return;
    };
    let color = if notice.is_advisory() {
        Color::Yellow
    } else {
        Color::Red
    };

    let banner = Paragraph::new(notice.to_string())
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );

    frame.render_widget(banner, area);
}

fn render_item(frame: &mut Frame<'_>, app: &App<'_>, item: &ReviewItem, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Image
            Constraint::Min(3),    // Extracted text
            Constraint::Min(3),    // Editor
        ])
        .split(area);

    let image = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(&item.id, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("[{}]", item.status),
                Style::default().fg(status_color(item.status)),
            ),
        ]),
        Line::from(Span::styled(
            &item.source_uri,
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(Block::default().title(" Image ").borders(Borders::ALL));
    frame.render_widget(image, chunks[0]);

    let original = match (&item.extracted_text, item.status) {
        (_, ItemStatus::Loading | ItemStatus::ExtractionPending) => {
            Span::styled(
                format!("{} Extracting text...", spinner(app.tick)),
                Style::default().fg(Color::Yellow),
            )
        },
        (Some(text), _) if !text.is_empty() => Span::raw(text.as_str()),
        (Some(_), _) => Span::styled("(no text detected)", Style::default().fg(Color::DarkGray)),
        (None, _) => Span::styled("(extraction failed)", Style::default().fg(Color::Red)),
    };
    let original = Paragraph::new(Line::from(original))
        .wrap(Wrap { trim: false })
        .block(Block::default().title(" Original OCR ").borders(Borders::ALL));
    frame.render_widget(original, chunks[1]);

    let editable = !item.status.is_retired()
        && !matches!(item.status, ItemStatus::Saving | ItemStatus::ExtractionPending);
    let border = if editable { Color::Cyan } else { Color::DarkGray };
    let mut text = item.edited_text.clone();
    if editable {
        text.push('_');
    }
    let editor = Paragraph::new(text).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(" Corrected text ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(editor, chunks[2]);
}

fn render_waiting(frame: &mut Frame<'_>, app: &App<'_>, area: Rect) {
    let message = if app.state().busy.loading_image {
        format!("{} Loading next image...", spinner(app.tick))
    } else {
        "No image loaded. Press Ctrl-L to try again.".to_string()
    };
    let waiting = Paragraph::new(message)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(waiting, area);
}

fn render_done(frame: &mut Frame<'_>, state: &SessionState, area: Rect) {
    let tally = &state.tally;
    let done = Paragraph::new(vec![
        Line::from(Span::styled(
            "All done! No more images to review.",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!(
            "Saved {} and skipped {} this session. Press Esc to exit.",
            tally.saved, tally.skipped
        )),
    ])
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(done, area);
}

fn render_status_bar(frame: &mut Frame<'_>, app: &App<'_>, area: Rect) {
    let busy = app.state().busy;
    let text = if let Some(status) = &app.status {
        status.clone()
    } else if busy.saving {
        format!("{} Saving...", spinner(app.tick))
    } else {
        HELP.to_string()
    };

    let status = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status, area);
}

const fn status_color(status: ItemStatus) -> Color {
    match status {
        ItemStatus::Loading | ItemStatus::ExtractionPending | ItemStatus::Saving => Color::Yellow,
        ItemStatus::Extracted => Color::White,
        ItemStatus::ExtractionFailed => Color::Red,
        ItemStatus::Saved => Color::Green,
        ItemStatus::Skipped => Color::DarkGray,
    }
}

fn spinner(tick: usize) -> &'static str {
    SPINNER[tick % SPINNER.len()]
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::core::{
        MockExtractionService, MockImageSource, MockLabelStore, NextImage, Progress,
    };
    use crate::features::review::WorkflowController;

    fn screen(app: &App<'_>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn exhausted_controller() -> WorkflowController {
        let mut source = MockImageSource::new();
        source.expect_next().returning(|| {
            Ok(NextImage::Exhausted {
                progress: Progress::new(3, 3),
            })
        });
        WorkflowController::new(
            Arc::new(source),
            Arc::new(MockExtractionService::new()),
            Arc::new(MockLabelStore::new()),
        )
    }

    #[tokio::test]
    async fn test_render_done_screen() {
        let mut controller = exhausted_controller();
        controller.start().unwrap();
        controller.settle().await;

        let app = App::new(&mut controller);
        let text = screen(&app);

        assert!(text.contains("All done"));
        assert!(text.contains("3 / 3 labeled"));
    }

    #[tokio::test]
    async fn test_render_loading_screen() {
        let mut controller = exhausted_controller();
        controller.start().unwrap();

        let app = App::new(&mut controller);
        let text = screen(&app);

        assert!(text.contains("Loading next image"));
        assert!(text.contains("Enter:save"));
    }

    #[test]
    fn test_spinner_cycles() {
        assert_eq!(spinner(0), "|");
        assert_eq!(spinner(4), "|");
        assert_eq!(spinner(3), "\\");
    }
}
