//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.
//!
//! Layout, top to bottom: input line, then conversations / messages / nodes
//! side by side, then the status bar. The packet log covers the lower third
//! of the message column while shown.

mod channels;
mod help;
mod input;
mod messages;
mod nodes;
mod packet_log;

use meshchat_app::App;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    const INPUT_HEIGHT: u16 = 3;
    const MAIN_AREA_MIN_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 3;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Min(MAIN_AREA_MIN_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [input_area, main_area, status_area] = chunks.as_ref() else {
        return;
    };

    input::render(frame, app, *input_area);
    render_main_area(frame, app, *main_area);
    help::render(frame, app, *status_area);
}

/// Render the main area (conversations, messages, nodes).
fn render_main_area(frame: &mut Frame, app: &App, area: Rect) {
    const CHANNELS_SIXTEENTHS: u32 = 3;
    const NODES_SIXTEENTHS: u32 = 5;
    const MESSAGES_MIN_WIDTH: u16 = 10;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(CHANNELS_SIXTEENTHS, 16),
            Constraint::Min(MESSAGES_MIN_WIDTH),
            Constraint::Ratio(NODES_SIXTEENTHS, 16),
        ])
        .split(area);

    let [channels_area, messages_area, nodes_area] = chunks.as_ref() else {
        return;
    };

    channels::render(frame, app, *channels_area);
    messages::render(frame, app, *messages_area);
    nodes::render(frame, app, *nodes_area);

    if app.show_log() {
        let log_height = messages_area.height / 3;
        let log_area = Rect {
            y: messages_area.y + messages_area.height - log_height,
            height: log_height,
            ..*messages_area
        };
        packet_log::render(frame, app, log_area);
    }
}
