//! Node roster

use meshchat_app::{App, view};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, List, ListItem},
};

const BORDER_SIZE: u16 = 2;

/// Render the roster.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let rows = area.height.saturating_sub(BORDER_SIZE) as usize;

    let items: Vec<ListItem> = view::roster_rows(app, rows)
        .into_iter()
        .map(|row| {
            let style = if row.highlighted {
                Style::default().fg(Color::Black).bg(Color::White)
            } else {
                Style::default()
            };
            ListItem::new(row.label).style(style)
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title(" Nodes ");
    frame.render_widget(List::new(items).block(block), area);
}
