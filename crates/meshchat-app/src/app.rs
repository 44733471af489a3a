//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the interactive
//! state of the chat session completely decoupled from terminal and radio
//! mechanics.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute. Every
//! mutation is answered with the render requests for exactly the panes it
//! changed.
//!
//! # Responsibilities
//!
//! - Owns conversations, roster, notifications and the packet log.
//! - Runs the selection state machine (channel mode / direct mode).
//! - Edits the input line and turns submissions into sends.
//! - Routes received text into the right conversation.

use tracing::{debug, warn};

use crate::{
    AppAction, AppError, AppEvent, KeyInput, NameLength, Pane,
    conversation::{ConversationId, Conversations},
    mesh::{DeviceConfig, Destination, MeshPacket, NodeNum, NodeSnapshot, PortKind},
    notify::Notifications,
    packet_log::PacketLog,
    roster::Roster,
    state::{MessageEntry, Mode, Selection, wrap_step},
};

/// Key that toggles the packet log panel.
pub const LOG_TOGGLE_KEY: char = '/';

/// Key reserved for device settings.
pub const SETTINGS_KEY: char = '`';

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable without a radio or terminal.
#[derive(Debug, Clone)]
pub struct App {
    /// Number of the local node.
    my_node: NodeNum,
    /// Conversation list and histories.
    conversations: Conversations,
    /// Known remote nodes.
    roster: Roster,
    /// Conversations with unseen activity.
    notifications: Notifications,
    /// Recently received packets.
    packet_log: PacketLog,
    /// Selection state machine.
    selection: Selection,
    /// Input line buffer.
    input: String,
    /// Whether the packet log panel is shown.
    show_log: bool,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl App {
    /// Create the session for `my_node` from the device's channel
    /// configuration and an initial node snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NoChannels`] if no channel slot is enabled.
    pub fn new(
        my_node: NodeNum,
        device: &DeviceConfig,
        nodes: NodeSnapshot,
    ) -> Result<Self, AppError> {
        let mut conversations = Conversations::new();
        conversations.initialize_channels(device);
        if conversations.is_empty() {
            return Err(AppError::NoChannels);
        }

        Ok(Self {
            my_node,
            conversations,
            roster: Roster::from_snapshot(nodes),
            notifications: Notifications::default(),
            packet_log: PacketLog::default(),
            selection: Selection::default(),
            input: String::new(),
            show_log: false,
            status_message: None,
        })
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Resize(..) => vec![AppAction::Render(Pane::All)],
            AppEvent::PacketReceived(packet) => self.receive(packet),
            AppEvent::RosterSnapshot(nodes) => {
                self.roster.refresh(nodes);
                if self.selection.node_index >= self.roster.len() {
                    self.selection.node_index = 0;
                }
                vec![AppAction::Render(Pane::Roster), AppAction::Render(Pane::Conversations)]
            },
            AppEvent::LinkClosed => {
                self.status_message = Some("Radio link closed".to_string());
                vec![AppAction::Render(Pane::Status)]
            },
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Esc => vec![AppAction::Quit],
            KeyInput::Up => self.navigate(false),
            KeyInput::Down => self.navigate(true),
            KeyInput::Right => self.set_mode(Mode::Direct),
            KeyInput::Left => self.set_mode(Mode::Channel),
            KeyInput::Enter => match self.selection.mode {
                Mode::Direct => self.confirm_peer(),
                Mode::Channel => self.submit(),
            },
            KeyInput::Backspace => {
                if self.input.pop().is_some() {
                    vec![AppAction::Render(Pane::Input)]
                } else {
                    vec![]
                }
            },
            KeyInput::Char(LOG_TOGGLE_KEY) => {
                self.show_log = !self.show_log;
                vec![AppAction::Render(Pane::Messages), AppAction::Render(Pane::PacketLog)]
            },
            KeyInput::Char(SETTINGS_KEY) => {
                self.status_message = Some("Settings are not available".to_string());
                vec![AppAction::Render(Pane::Status)]
            },
            KeyInput::Char(c) if !c.is_control() => {
                self.input.push(c);
                vec![AppAction::Render(Pane::Input)]
            },
            KeyInput::Char(_) => vec![],
        }
    }

    fn navigate(&mut self, forward: bool) -> Vec<AppAction> {
        match self.selection.mode {
            Mode::Channel => {
                let next = wrap_step(self.selection.index, self.conversations.len(), forward);
                self.select(next);
                vec![AppAction::Render(Pane::Conversations), AppAction::Render(Pane::Messages)]
            },
            Mode::Direct => {
                self.selection.node_index =
                    wrap_step(self.selection.node_index, self.roster.len(), forward);
                vec![AppAction::Render(Pane::Conversations), AppAction::Render(Pane::Roster)]
            },
        }
    }

    fn set_mode(&mut self, mode: Mode) -> Vec<AppAction> {
        if self.selection.mode == mode {
            return vec![];
        }
        self.selection.mode = mode;
        vec![AppAction::Render(Pane::Conversations), AppAction::Render(Pane::Roster)]
    }

    /// Open (or create) the direct conversation with the highlighted node.
    fn confirm_peer(&mut self) -> Vec<AppAction> {
        let Some(node) = self.roster.node_at(self.selection.node_index) else {
            return vec![];
        };

        let index = self.conversations.ensure_peer(node);
        self.select(index);
        self.selection.node_index = 0;
        self.selection.mode = Mode::Channel;

        vec![
            AppAction::Render(Pane::Roster),
            AppAction::Render(Pane::Conversations),
            AppAction::Render(Pane::Messages),
        ]
    }

    /// Send the input line on the selected conversation.
    fn submit(&mut self) -> Vec<AppAction> {
        if self.input.is_empty() {
            return vec![];
        }
        let Some(id) = self.conversations.get(self.selection.index).cloned() else {
            return vec![];
        };

        let (destination, channel_index) = match id {
            ConversationId::Channel(_) => {
                (Destination::Broadcast, u32::try_from(self.selection.index).unwrap_or_default())
            },
            ConversationId::DirectPeer(node) => (Destination::Node(node), 0),
        };
        let body = std::mem::take(&mut self.input);
        self.conversations.append_message(&id, MessageEntry::sent(body.clone()));

        vec![
            AppAction::SendText { body, destination, channel_index },
            AppAction::Render(Pane::Messages),
            AppAction::Render(Pane::Input),
        ]
    }

    fn receive(&mut self, packet: MeshPacket) -> Vec<AppAction> {
        self.packet_log.record(packet.clone());
        let mut actions = Vec::new();
        if self.show_log {
            actions.push(AppAction::Render(Pane::PacketLog));
        }

        let Some(decoded) = &packet.decoded else {
            debug!(from = packet.from, "packet without decoded payload");
            return actions;
        };

        match decoded.port {
            PortKind::NodeInfo => actions.push(AppAction::RefreshRoster),
            PortKind::TextMessage => {
                let body = match String::from_utf8(decoded.payload.clone()) {
                    Ok(body) => body,
                    Err(error) => {
                        debug!(from = packet.from, %error, "text payload is not valid UTF-8");
                        String::from_utf8_lossy(error.as_bytes()).into_owned()
                    },
                };
                self.receive_text(&packet, body, &mut actions);
            },
            PortKind::Other(_) => {},
        }
        actions
    }

    fn receive_text(&mut self, packet: &MeshPacket, body: String, actions: &mut Vec<AppAction>) {
        let routed = match self.conversations.resolve_incoming(packet, self.my_node) {
            Ok(routed) => routed,
            Err(reason) => {
                warn!(from = packet.from, ?reason, "discarding unroutable text message");
                return;
            },
        };
        let Some(id) = self.conversations.get(routed.index).cloned() else {
            return;
        };
        debug!(from = packet.from, index = routed.index, created = routed.created, "text routed");

        let label = self.roster.display_name(packet.from, NameLength::Long);
        self.conversations.append_message(&id, MessageEntry::received(label, body));

        let marked = self.notifications.mark_unseen(routed.index, self.selection.index);
        if routed.created || marked {
            actions.push(AppAction::Render(Pane::Conversations));
        }
        if routed.index == self.selection.index {
            actions.push(AppAction::Render(Pane::Messages));
        }
    }

    fn select(&mut self, index: usize) {
        self.selection.index = index;
        self.notifications.clear_seen(index);
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Display label of a conversation: the channel name, or the peer's long
    /// name.
    pub fn conversation_label(&self, id: &ConversationId) -> String {
        match id {
            ConversationId::Channel(name) => name.clone(),
            ConversationId::DirectPeer(node) => self.roster.display_name(*node, NameLength::Long),
        }
    }

    /// Currently selected conversation.
    pub fn selected_conversation(&self) -> Option<&ConversationId> {
        self.conversations.get(self.selection.index)
    }

    /// History of the selected conversation, oldest first.
    pub fn selected_messages(&self) -> &[MessageEntry] {
        self.selected_conversation().map_or(&[], |id| self.conversations.messages(id))
    }

    /// Number of the local node.
    pub fn my_node(&self) -> NodeNum {
        self.my_node
    }

    /// Conversation list and histories.
    pub fn conversations(&self) -> &Conversations {
        &self.conversations
    }

    /// Known remote nodes.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Conversations with unseen activity.
    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    /// Recently received packets.
    pub fn packet_log(&self) -> &PacketLog {
        &self.packet_log
    }

    /// Selection state.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Input line buffer.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Whether the packet log panel is shown.
    pub fn show_log(&self) -> bool {
        self.show_log
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}
