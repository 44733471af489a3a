//! Message area
//!
//! Displays the history of the selected conversation.

use meshchat_app::{App, view};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, List, ListItem},
};

const BORDER_SIZE: u16 = 2;

/// Render the message area.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let title = app
        .selected_conversation()
        .map_or_else(String::new, |id| format!(" {} ", app.conversation_label(id)));
    let block = Block::default().borders(Borders::ALL).title(title);

    let rows = area.height.saturating_sub(BORDER_SIZE) as usize;
    let width = area.width.saturating_sub(BORDER_SIZE) as usize;

    let items: Vec<ListItem> = view::message_lines(app, rows, width)
        .into_iter()
        .map(|line| {
            let color = if line.sent { Color::Cyan } else { Color::Yellow };
            ListItem::new(line.text).style(Style::default().fg(color))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
