//! Input line
//!
//! Displays the input buffer with cursor.

use meshchat_app::App;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

const PROMPT: &str = "Input: ";
const INPUT_LINE_OFFSET_Y: u16 = 1; // inside top border
const BORDER_WIDTH: u16 = 1;

/// Render the input line.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL);

    let text = format!("{PROMPT}{}", app.input());
    let paragraph = Paragraph::new(text).style(Style::default().fg(Color::White)).block(block);
    frame.render_widget(paragraph, area);

    let cursor_y = area.y.saturating_add(INPUT_LINE_OFFSET_Y);
    frame.set_cursor_position((cursor_x(area, app.input()), cursor_y));
}

/// Cursor column after `input`, clamped to the last cell inside the border.
fn cursor_x(area: Rect, input: &str) -> u16 {
    let typed = PROMPT.chars().count() + input.chars().count();
    let typed = u16::try_from(typed).unwrap_or(u16::MAX);
    let max_x = area.x.saturating_add(area.width).saturating_sub(BORDER_WIDTH + 1);

    area.x.saturating_add(BORDER_WIDTH).saturating_add(typed).min(max_x)
}
