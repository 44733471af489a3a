//! Packet log panel
//!
//! Most recent packets first under an underlined column header.

use meshchat_app::{App, PacketLog};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
};

const BORDER_SIZE: u16 = 2;
const HEADER_ROWS: usize = 1;

/// Render the packet log over `area`.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let width = area.width.saturating_sub(BORDER_SIZE) as usize;
    let rows = (area.height.saturating_sub(BORDER_SIZE) as usize).saturating_sub(HEADER_ROWS);

    let header = Line::styled(
        PacketLog::header(width),
        Style::default().add_modifier(Modifier::UNDERLINED),
    );
    let lines: Vec<Line> = std::iter::once(header)
        .chain(app.packet_log().render_rows(rows, width, app.roster()).into_iter().map(Line::from))
        .collect();

    let block = Block::default().borders(Borders::ALL).title(" Packet Log ");
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
