//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - User interactions (Keyboard, Resize).
//! - Radio notifications (received packets, roster snapshots, link loss).

use crate::{
    KeyInput,
    mesh::{MeshPacket, NodeSnapshot},
};

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Packet received from the mesh.
    PacketReceived(MeshPacket),

    /// Latest full node snapshot from the transport.
    RosterSnapshot(NodeSnapshot),

    /// The radio stopped delivering packets.
    LinkClosed,
}
