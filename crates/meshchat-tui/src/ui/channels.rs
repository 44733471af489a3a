//! Conversation list
//!
//! Channels first, then direct peers, with unseen-activity markers.

use meshchat_app::{App, view};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const BORDER_SIZE: u16 = 2;
const UNSEEN_MARKER: &str = " *";

/// Render the conversation list.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let width = area.width.saturating_sub(BORDER_SIZE) as usize;

    let items: Vec<ListItem> = view::conversation_rows(app, width)
        .into_iter()
        .map(|row| {
            let style = if row.selected {
                Style::default().fg(Color::Black).bg(Color::White)
            } else {
                Style::default()
            };
            let marker = if row.unseen { UNSEEN_MARKER } else { "" };

            ListItem::new(Line::from(vec![Span::styled(row.label, style), Span::raw(marker)]))
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title(" Channels ");
    frame.render_widget(List::new(items).block(block), area);
}
