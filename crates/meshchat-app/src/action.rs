//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use crate::mesh::Destination;

/// Screen region a renderer should repaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pane {
    /// Conversation list with selection and unseen markers.
    Conversations,
    /// History of the selected conversation.
    Messages,
    /// Node roster.
    Roster,
    /// Packet log panel.
    PacketLog,
    /// Input line.
    Input,
    /// Status bar.
    Status,
    /// Every pane, after a layout change.
    All,
}

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Repaint one pane.
    Render(Pane),

    /// Send a text message. Fire-and-forget.
    SendText {
        /// Message text.
        body: String,
        /// Broadcast or a single node.
        destination: Destination,
        /// Channel slot to send on.
        channel_index: u32,
    },

    /// Fetch a fresh node snapshot and feed it back as
    /// [`crate::AppEvent::RosterSnapshot`].
    RefreshRoster,

    /// Quit the application.
    Quit,
}
