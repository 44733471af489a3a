//! Conversation store.
//!
//! Owns the ordered conversation list (channels first, then direct peers in
//! discovery order) and the message history of every conversation.
//!
//! # Invariants
//!
//! - The list never contains the same [`ConversationId`] twice.
//! - Every listed conversation has a history, possibly empty.
//! - Channels form a prefix of the list; direct peers are only appended.

use std::collections::HashMap;

use crate::{
    mesh::{ChannelRole, DeviceConfig, MeshPacket, NodeNum},
    state::MessageEntry,
};

/// Identifier of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConversationId {
    /// Broadcast channel, identified by its display name.
    Channel(String),
    /// Direct conversation with one node.
    DirectPeer(NodeNum),
}

/// Why an incoming message could not be placed in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unroutable {
    /// Broadcast on a slot past the configured channels.
    UnknownChannel {
        /// Slot carried by the packet.
        slot: u32,
        /// Number of configured channels.
        channels: usize,
    },
}

/// Where an incoming message landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Routed {
    /// Index into the conversation list.
    pub index: usize,
    /// Whether a direct-peer conversation was created for it.
    pub created: bool,
}

/// Human-readable label for a modem preset symbol: `LONG_FAST` -> `LongFast`.
pub fn preset_label(symbol: &str) -> String {
    symbol
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect()
}

/// Ordered conversations with their histories.
#[derive(Debug, Clone, Default)]
pub struct Conversations {
    ids: Vec<ConversationId>,
    histories: HashMap<ConversationId, Vec<MessageEntry>>,
}

impl Conversations {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a channel for every enabled slot of `device`, in slot order.
    ///
    /// Unnamed slots use the modem preset label. Disabled slots and names
    /// already present are skipped; existing history is kept.
    pub fn initialize_channels(&mut self, device: &DeviceConfig) {
        let mut slots: Vec<_> = device.channels.iter().collect();
        slots.sort_by_key(|slot| slot.index);

        for slot in slots {
            if slot.role == ChannelRole::Disabled {
                continue;
            }
            let name = match slot.name.as_deref() {
                Some(name) if !name.is_empty() => name.to_owned(),
                _ => preset_label(&device.modem_preset),
            };
            self.push_if_absent(ConversationId::Channel(name));
        }
    }

    /// Index of the direct conversation with `node`, creating it if needed.
    pub fn ensure_peer(&mut self, node: NodeNum) -> usize {
        self.push_if_absent(ConversationId::DirectPeer(node)).0
    }

    /// Append `entry` to the history of `id`.
    ///
    /// A missing history is created, but `id` is not added to the list.
    pub fn append_message(&mut self, id: &ConversationId, entry: MessageEntry) {
        self.histories.entry(id.clone()).or_default().push(entry);
    }

    /// Conversation index for an incoming message.
    ///
    /// Messages addressed to `my_node` go to the sender's direct conversation
    /// (created on first contact). Everything else uses the packet's channel
    /// slot, absent meaning 0, as an index into the channel prefix.
    pub fn resolve_incoming(
        &mut self,
        packet: &MeshPacket,
        my_node: NodeNum,
    ) -> Result<Routed, Unroutable> {
        if packet.to == my_node && !packet.is_broadcast() {
            let (index, created) = self.push_if_absent(ConversationId::DirectPeer(packet.from));
            return Ok(Routed { index, created });
        }

        let slot = packet.channel_slot();
        let channels = self.channel_count();
        match usize::try_from(slot) {
            Ok(index) if index < channels => Ok(Routed { index, created: false }),
            _ => Err(Unroutable::UnknownChannel { slot, channels }),
        }
    }

    /// Number of leading channel entries.
    pub fn channel_count(&self) -> usize {
        self.ids.iter().take_while(|id| matches!(id, ConversationId::Channel(_))).count()
    }

    /// Conversation at `index`.
    pub fn get(&self, index: usize) -> Option<&ConversationId> {
        self.ids.get(index)
    }

    /// Position of `id` in the list.
    pub fn position(&self, id: &ConversationId) -> Option<usize> {
        self.ids.iter().position(|existing| existing == id)
    }

    /// History of `id`, oldest first.
    pub fn messages(&self, id: &ConversationId) -> &[MessageEntry] {
        self.histories.get(id).map_or(&[], Vec::as_slice)
    }

    /// All conversations in list order.
    pub fn ids(&self) -> &[ConversationId] {
        &self.ids
    }

    /// Number of conversations.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn push_if_absent(&mut self, id: ConversationId) -> (usize, bool) {
        if let Some(index) = self.position(&id) {
            return (index, false);
        }
        self.histories.entry(id.clone()).or_default();
        self.ids.push(id);
        (self.ids.len() - 1, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{BROADCAST_NUM, ChannelConfig};

    const ME: NodeNum = 0x0000_0001;

    fn device(names: &[&str]) -> DeviceConfig {
        DeviceConfig {
            channels: names
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let role = if i == 0 { ChannelRole::Primary } else { ChannelRole::Secondary };
                    ChannelConfig::new(i as u32, role, Some(name))
                })
                .collect(),
            modem_preset: "LONG_FAST".into(),
        }
    }

    #[test]
    fn preset_symbols_become_pascal_case() {
        assert_eq!(preset_label("LONG_FAST"), "LongFast");
        assert_eq!(preset_label("SHORT_TURBO"), "ShortTurbo");
        assert_eq!(preset_label("VERY_LONG_SLOW"), "VeryLongSlow");
    }

    #[test]
    fn unnamed_channel_uses_preset_label() {
        let mut store = Conversations::new();
        store.initialize_channels(&device(&["Primary", ""]));

        assert_eq!(store.ids(), &[
            ConversationId::Channel("Primary".into()),
            ConversationId::Channel("LongFast".into()),
        ]);
    }

    #[test]
    fn disabled_slots_are_skipped() {
        let mut config = device(&["Primary", "Hidden", "Club"]);
        config.channels[1].role = ChannelRole::Disabled;

        let mut store = Conversations::new();
        store.initialize_channels(&config);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1), Some(&ConversationId::Channel("Club".into())));
    }

    #[test]
    fn slots_are_taken_in_index_order() {
        let mut config = device(&["Primary", "Club"]);
        config.channels.reverse();

        let mut store = Conversations::new();
        store.initialize_channels(&config);

        assert_eq!(store.get(0), Some(&ConversationId::Channel("Primary".into())));
    }

    #[test]
    fn reinitializing_keeps_history_and_adds_no_duplicates() {
        let mut store = Conversations::new();
        store.initialize_channels(&device(&["Primary", ""]));
        store.append_message(&ConversationId::Channel("Primary".into()), MessageEntry::sent("hi"));
        store.initialize_channels(&device(&["Primary", "", ""]));

        assert_eq!(store.len(), 2);
        assert_eq!(store.messages(&ConversationId::Channel("Primary".into())).len(), 1);
    }

    #[test]
    fn ensure_peer_is_idempotent() {
        let mut store = Conversations::new();
        store.initialize_channels(&device(&["Primary"]));

        let first = store.ensure_peer(0x1234_5678);
        let second = store.ensure_peer(0x1234_5678);

        assert_eq!(first, 1);
        assert_eq!(first, second);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn direct_message_creates_peer_conversation() {
        let mut store = Conversations::new();
        store.initialize_channels(&device(&["Primary", "Club"]));

        let packet = MeshPacket::text(0x1234_5678, ME, Some(1), "psst");
        let routed = store.resolve_incoming(&packet, ME);

        assert_eq!(routed, Ok(Routed { index: 2, created: true }));
        assert_eq!(store.get(2), Some(&ConversationId::DirectPeer(0x1234_5678)));

        let again = store.resolve_incoming(&packet, ME);
        assert_eq!(again, Ok(Routed { index: 2, created: false }));
    }

    #[test]
    fn broadcast_uses_channel_slot() {
        let mut store = Conversations::new();
        store.initialize_channels(&device(&["Primary", "Club"]));

        let on_club = MeshPacket::text(7, BROADCAST_NUM, Some(1), "hello");
        let no_slot = MeshPacket::text(7, BROADCAST_NUM, None, "hello");

        assert_eq!(store.resolve_incoming(&on_club, ME).map(|r| r.index), Ok(1));
        assert_eq!(store.resolve_incoming(&no_slot, ME).map(|r| r.index), Ok(0));
    }

    #[test]
    fn broadcast_past_channel_prefix_is_unroutable() {
        let mut store = Conversations::new();
        store.initialize_channels(&device(&["Primary"]));
        let _ = store.ensure_peer(9);

        let packet = MeshPacket::text(7, BROADCAST_NUM, Some(1), "hello");

        assert_eq!(
            store.resolve_incoming(&packet, ME),
            Err(Unroutable::UnknownChannel { slot: 1, channels: 1 })
        );
    }

    #[test]
    fn append_creates_missing_history() {
        let mut store = Conversations::new();
        let id = ConversationId::DirectPeer(3);
        store.append_message(&id, MessageEntry::received("x", "y"));

        assert_eq!(store.messages(&id).len(), 1);
        assert!(store.is_empty());
    }
}
