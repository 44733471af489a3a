//! Transport-facing mesh types.
//!
//! The radio layer translates its wire representation into these types before
//! anything reaches the [`crate::App`]. Keeping them free of protobuf details
//! lets the session model be driven from tests and simulations.

use std::collections::BTreeMap;

/// Numeric identifier of a mesh node.
pub type NodeNum = u32;

/// Reserved destination meaning "all nodes".
pub const BROADCAST_NUM: NodeNum = 0xFFFF_FFFF;

/// Known nodes keyed by number. Iteration order is ascending node number.
pub type NodeSnapshot = BTreeMap<NodeNum, NodeName>;

/// Display names advertised by a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeName {
    /// Full human-readable name.
    pub long_name: String,
    /// Short (up to four characters) name.
    pub short_name: String,
}

impl NodeName {
    /// Create a name pair.
    pub fn new(long_name: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self { long_name: long_name.into(), short_name: short_name.into() }
    }
}

/// Payload category of a decoded packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortKind {
    /// Plain UTF-8 text message.
    TextMessage,
    /// Node information (user record) broadcast.
    NodeInfo,
    /// Any other application port, carrying its symbolic name.
    Other(String),
}

impl PortKind {
    /// Symbolic port name as shown in the packet log.
    pub fn label(&self) -> &str {
        match self {
            Self::TextMessage => "TEXT_MESSAGE_APP",
            Self::NodeInfo => "NODEINFO_APP",
            Self::Other(name) => name,
        }
    }
}

/// Decoded packet payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Payload category.
    pub port: PortKind,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
}

/// A packet received from the mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshPacket {
    /// Sender node.
    pub from: NodeNum,
    /// Destination node, or [`BROADCAST_NUM`].
    pub to: NodeNum,
    /// Channel slot the packet was carried on. `None` is read as slot 0.
    pub channel: Option<u32>,
    /// Decoded payload. `None` if the packet could not be decrypted.
    pub decoded: Option<Decoded>,
}

impl MeshPacket {
    /// Build a text message packet.
    pub fn text(from: NodeNum, to: NodeNum, channel: Option<u32>, body: &str) -> Self {
        Self {
            from,
            to,
            channel,
            decoded: Some(Decoded {
                port: PortKind::TextMessage,
                payload: body.as_bytes().to_vec(),
            }),
        }
    }

    /// Channel slot, with an absent slot read as 0.
    pub fn channel_slot(&self) -> u32 {
        self.channel.unwrap_or(0)
    }

    /// Whether the packet is addressed to everyone.
    pub fn is_broadcast(&self) -> bool {
        self.to == BROADCAST_NUM
    }
}

/// Role of a configured channel slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRole {
    /// Slot not in use.
    Disabled,
    /// Primary channel (slot 0 on a normal device).
    Primary,
    /// Additional channel.
    Secondary,
}

/// One channel slot of the device configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Slot index on the device.
    pub index: u32,
    /// Slot role.
    pub role: ChannelRole,
    /// Explicit channel name. `None` or empty means "use the modem preset".
    pub name: Option<String>,
}

impl ChannelConfig {
    /// Create a channel slot description.
    pub fn new(index: u32, role: ChannelRole, name: Option<&str>) -> Self {
        Self { index, role, name: name.map(str::to_owned) }
    }
}

/// Device configuration needed to build the channel list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Channel slots in any order; consumers iterate them by index.
    pub channels: Vec<ChannelConfig>,
    /// Symbolic name of the LoRa modem preset, e.g. `LONG_FAST`.
    pub modem_preset: String,
}

/// Destination of an outgoing text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Every node on the channel.
    Broadcast,
    /// A single node.
    Node(NodeNum),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_channel_reads_as_slot_zero() {
        let packet = MeshPacket::text(1, BROADCAST_NUM, None, "hi");
        assert_eq!(packet.channel_slot(), 0);
        assert!(packet.is_broadcast());
    }

    #[test]
    fn other_ports_keep_their_symbolic_name() {
        assert_eq!(PortKind::Other("POSITION_APP".into()).label(), "POSITION_APP");
        assert_eq!(PortKind::NodeInfo.label(), "NODEINFO_APP");
    }
}
