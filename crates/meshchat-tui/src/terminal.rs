//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. Outgoing text is handed to the
//! radio link task through its queue.

use std::{
    io::{self, Stdout, stdout},
    sync::PoisonError,
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::{Stream, StreamExt, future};
use meshchat_app::{
    App, AppEvent, Driver, KeyInput, Pane,
    mesh::{Destination, NodeSnapshot},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::trace;

use crate::{
    transport::{OutgoingText, SharedNodes},
    ui,
};

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The radio link no longer accepts outgoing text.
    #[error("outgoing queue closed")]
    QueueClosed,
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Owns the terminal (raw mode, alternate screen) for its lifetime and the
/// sending half of the radio link's outgoing queue.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    outgoing: Option<mpsc::UnboundedSender<OutgoingText>>,
    nodes: SharedNodes,
}

impl TerminalDriver {
    /// Take over the terminal.
    pub fn new(
        outgoing: mpsc::UnboundedSender<OutgoingText>,
        nodes: SharedNodes,
    ) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Self { terminal, outgoing: Some(outgoing), nodes })
    }
}

/// Convert a crossterm key event to `KeyInput`.
///
/// Ctrl+C quits like Escape; other control chords are ignored.
pub fn convert_key(event: KeyEvent) -> Option<KeyInput> {
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return (event.code == KeyCode::Char('c')).then_some(KeyInput::Esc);
    }
    match event.code {
        KeyCode::Char(c) => Some(KeyInput::Char(c)),
        KeyCode::Enter => Some(KeyInput::Enter),
        KeyCode::Backspace => Some(KeyInput::Backspace),
        KeyCode::Esc => Some(KeyInput::Esc),
        KeyCode::Left => Some(KeyInput::Left),
        KeyCode::Right => Some(KeyInput::Right),
        KeyCode::Up => Some(KeyInput::Up),
        KeyCode::Down => Some(KeyInput::Down),
        _ => None,
    }
}

/// Keyboard and resize events from the terminal.
pub fn key_events() -> impl Stream<Item = Result<AppEvent, TerminalError>> + Unpin {
    let events = EventStream::new().filter_map(|event| {
        future::ready(match event {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                convert_key(key).map(|key| Ok(AppEvent::Key(key)))
            },
            Ok(Event::Resize(cols, rows)) => Some(Ok(AppEvent::Resize(cols, rows))),
            Ok(_) => None,
            Err(error) => Some(Err(TerminalError::Io(error))),
        })
    });
    Box::pin(events)
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    fn render(&mut self, app: &App, panes: &[Pane]) -> Result<(), Self::Error> {
        // ratatui redraws the whole frame and flushes only changed cells.
        trace!(?panes, "render");
        self.terminal.draw(|frame| ui::render(frame, app))?;
        Ok(())
    }

    fn send_text(
        &mut self,
        body: &str,
        destination: Destination,
        channel_index: u32,
    ) -> Result<(), Self::Error> {
        let outgoing = self.outgoing.as_ref().ok_or(TerminalError::QueueClosed)?;
        outgoing
            .send(OutgoingText { body: body.to_string(), destination, channel_index })
            .map_err(|_| TerminalError::QueueClosed)
    }

    fn node_snapshot(&self) -> NodeSnapshot {
        self.nodes.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn stop(&mut self) {
        // Dropping the sender ends the link task.
        self.outgoing = None;
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
