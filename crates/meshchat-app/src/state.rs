//! Observable session state types.
//!
//! This module defines the small value types the [`crate::App`] exposes to
//! renderers: the selection state machine and stored message entries.
//!
//! These structures serve as the "View Model" for the application. Renderers
//! only read them; every mutation goes through [`crate::App::handle`].

/// Navigation mode.
///
/// `Channel --(right)--> Direct --(left)--> Channel`, and
/// `Direct --(confirm)--> Channel` with a conversation switch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Up/Down browse the conversation list.
    #[default]
    Channel,
    /// Up/Down browse the roster to pick a direct-message peer.
    Direct,
}

/// Current selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    /// Index into the conversation list. Always in range.
    pub index: usize,
    /// Navigation mode.
    pub mode: Mode,
    /// Roster cursor, meaningful in [`Mode::Direct`].
    pub node_index: usize,
}

/// Who produced a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Sent from this client.
    Sent,
    /// Received; carries the sender label resolved at arrival.
    Node(String),
}

/// One stored message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEntry {
    /// Sender marker.
    pub origin: Origin,
    /// Message text.
    pub body: String,
}

impl MessageEntry {
    /// Entry for a message sent by this client.
    pub fn sent(body: impl Into<String>) -> Self {
        Self { origin: Origin::Sent, body: body.into() }
    }

    /// Entry for a message received from `label`.
    pub fn received(label: impl Into<String>, body: impl Into<String>) -> Self {
        Self { origin: Origin::Node(label.into()), body: body.into() }
    }

    /// Whether this client sent the message.
    pub fn is_sent(&self) -> bool {
        matches!(self.origin, Origin::Sent)
    }

    /// Prefix drawn before the body.
    pub fn prefix(&self) -> String {
        match &self.origin {
            Origin::Sent => ">> Sent: ".to_string(),
            Origin::Node(label) => format!(">> {label} "),
        }
    }
}

/// Step `current` one position forward or back in a list of `len`, wrapping at
/// both ends. Returns 0 for an empty list.
pub(crate) fn wrap_step(current: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        let next = current.saturating_add(1);
        if next >= len { 0 } else { next }
    } else if current == 0 || current > len {
        len - 1
    } else {
        current - 1
    }
}
