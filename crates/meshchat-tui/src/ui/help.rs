//! Status bar
//!
//! Key bindings, followed by the latest status note.

use meshchat_app::{App, LOG_TOGGLE_KEY, SETTINGS_KEY};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::Span,
    widgets::{Block, Borders, Paragraph},
};

/// Key binding summary.
pub fn key_help() -> String {
    format!(
        "↑↓ = Switch Channels   ← → = Channels/Nodes   ENTER = Send / Select DM   {SETTINGS_KEY} = Settings   {LOG_TOGGLE_KEY} = Display Packet Log   ESC = Quit"
    )
}

/// Render the status bar. The status note, if any, is the block title.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let mut block = Block::default().borders(Borders::ALL);
    if let Some(status) = app.status_message() {
        block = block.title(Span::styled(format!(" {status} "), Style::default().fg(Color::Red)));
    }

    frame.render_widget(Paragraph::new(key_help()).block(block), area);
}
