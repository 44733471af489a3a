//! Property-based tests for App state machine.
//!
//! Tests verify that invariants hold under arbitrary event sequences.
//! This ensures behavioral correctness across all possible execution paths.

use std::collections::HashSet;

use meshchat_app::{
    App, AppEvent, ConversationId, Conversations, KeyInput, LOG_TOGGLE_KEY, PacketLog, Roster,
    mesh::{
        BROADCAST_NUM, ChannelConfig, ChannelRole, DeviceConfig, MeshPacket, NodeName, NodeNum,
        NodeSnapshot,
    },
};
use proptest::prelude::*;

const ME: NodeNum = 1;

fn device(count: u32) -> DeviceConfig {
    DeviceConfig {
        channels: (0..count)
            .map(|index| {
                let role = if index == 0 { ChannelRole::Primary } else { ChannelRole::Secondary };
                ChannelConfig::new(index, role, Some(&format!("ch{index}")))
            })
            .collect(),
        modem_preset: "LONG_FAST".into(),
    }
}

fn snapshot(nodes: &[NodeNum]) -> NodeSnapshot {
    nodes.iter().map(|&num| (num, NodeName::new(format!("node{num}"), "N"))).collect()
}

fn key_strategy() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        Just(KeyInput::Up),
        Just(KeyInput::Down),
        Just(KeyInput::Left),
        Just(KeyInput::Right),
        Just(KeyInput::Enter),
        Just(KeyInput::Backspace),
        Just(KeyInput::Char(LOG_TOGGLE_KEY)),
        proptest::char::range('a', 'z').prop_map(KeyInput::Char),
    ]
}

fn packet_strategy() -> impl Strategy<Value = MeshPacket> {
    (2u32..8, prop::bool::ANY, prop::option::of(0u32..5)).prop_map(|(from, direct, channel)| {
        let to = if direct { ME } else { BROADCAST_NUM };
        MeshPacket::text(from, to, channel, "msg")
    })
}

/// Generate random app events.
fn event_strategy() -> impl Strategy<Value = AppEvent> {
    prop_oneof![
        4 => key_strategy().prop_map(AppEvent::Key),
        3 => packet_strategy().prop_map(AppEvent::PacketReceived),
        1 => prop::collection::vec(2u32..8, 0..5)
            .prop_map(|nodes| AppEvent::RosterSnapshot(snapshot(&nodes))),
        1 => (1u16..200, 1u16..100).prop_map(|(c, r)| AppEvent::Resize(c, r)),
        1 => Just(AppEvent::LinkClosed),
    ]
}

/// Check the structural invariants of the session model.
fn check_invariants(app: &App) -> Result<(), String> {
    let ids = app.conversations().ids();

    let unique: HashSet<_> = ids.iter().collect();
    if unique.len() != ids.len() {
        return Err(format!("duplicate conversation in {ids:?}"));
    }

    let selection = app.selection();
    if selection.index >= ids.len() {
        return Err(format!("selection {} out of {} conversations", selection.index, ids.len()));
    }
    if app.notifications().contains(selection.index) {
        return Err(format!("selected conversation {} is flagged unseen", selection.index));
    }
    if let Some(stale) = app.notifications().iter().find(|&index| index >= ids.len()) {
        return Err(format!("notification for missing conversation {stale}"));
    }

    let channels = app.conversations().channel_count();
    if ids[channels..].iter().any(|id| matches!(id, ConversationId::Channel(_))) {
        return Err("channel listed after a direct peer".into());
    }

    if app.packet_log().len() > PacketLog::CAPACITY {
        return Err(format!("packet log holds {} entries", app.packet_log().len()));
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_app_invariants_hold(
        channels in 1u32..5,
        events in prop::collection::vec(event_strategy(), 0..80),
    ) {
        let mut app = App::new(ME, &device(channels), snapshot(&[2, 3, 4])).unwrap();

        for event in events {
            let _ = app.handle(event);
            prop_assert!(check_invariants(&app).is_ok(), "{:?}", check_invariants(&app));
        }
    }

    #[test]
    fn prop_conversation_navigation_is_cyclic(channels in 1u32..8) {
        let mut app = App::new(ME, &device(channels), NodeSnapshot::new()).unwrap();
        let last = app.conversations().len() - 1;

        let _ = app.handle(AppEvent::Key(KeyInput::Up));
        prop_assert_eq!(app.selection().index, last);

        let _ = app.handle(AppEvent::Key(KeyInput::Down));
        prop_assert_eq!(app.selection().index, 0);
    }

    #[test]
    fn prop_roster_navigation_is_cyclic(nodes in prop::collection::btree_set(2u32..1000, 1..10)) {
        let nodes: Vec<_> = nodes.into_iter().collect();
        let mut app = App::new(ME, &device(1), snapshot(&nodes)).unwrap();
        let _ = app.handle(AppEvent::Key(KeyInput::Right));

        let _ = app.handle(AppEvent::Key(KeyInput::Up));
        prop_assert_eq!(app.selection().node_index, nodes.len() - 1);

        let _ = app.handle(AppEvent::Key(KeyInput::Down));
        prop_assert_eq!(app.selection().node_index, 0);
        prop_assert_eq!(app.selection().index, 0);
    }

    #[test]
    fn prop_initialize_channels_never_duplicates(
        configs in prop::collection::vec(
            prop::collection::vec(prop::option::of("[a-c]{0,2}"), 1..5),
            1..4,
        ),
    ) {
        let mut store = Conversations::new();
        for names in configs {
            let device = DeviceConfig {
                channels: names
                    .iter()
                    .zip(0u32..)
                    .map(|(name, index)| {
                        ChannelConfig::new(index, ChannelRole::Secondary, name.as_deref())
                    })
                    .collect(),
                modem_preset: "MEDIUM_SLOW".into(),
            };
            store.initialize_channels(&device);
        }

        let unique: HashSet<_> = store.ids().iter().collect();
        prop_assert_eq!(unique.len(), store.len());
    }

    #[test]
    fn prop_ensure_peer_is_idempotent(node in any::<u32>()) {
        let mut store = Conversations::new();
        store.initialize_channels(&device(2));

        let first = store.ensure_peer(node);
        let second = store.ensure_peer(node);

        prop_assert_eq!(first, second);
        prop_assert_eq!(store.len(), 3);
    }

    #[test]
    fn prop_message_on_other_conversation_is_flagged(
        channels in 2u32..6,
        slot in 1u32..6,
    ) {
        prop_assume!(slot < channels);
        let mut app = App::new(ME, &device(channels), NodeSnapshot::new()).unwrap();

        let _ = app.handle(AppEvent::PacketReceived(MeshPacket::text(
            7,
            BROADCAST_NUM,
            Some(slot),
            "hi",
        )));

        prop_assert!(app.notifications().contains(slot as usize));
    }

    #[test]
    fn prop_packet_log_keeps_most_recent(count in 0usize..60) {
        let mut log = PacketLog::default();
        let senders: Vec<u32> = (0..count).map(|i| u32::try_from(i).unwrap()).collect();
        for &from in &senders {
            log.record(MeshPacket::text(from, BROADCAST_NUM, None, "x"));
        }

        let expected: Vec<u32> =
            senders.iter().rev().take(PacketLog::CAPACITY).copied().collect();
        let rows = log.render_rows(PacketLog::CAPACITY, 200, &Roster::default());

        prop_assert_eq!(log.len(), count.min(PacketLog::CAPACITY));
        prop_assert_eq!(log.recent().map(|p| p.from).collect::<Vec<_>>(), expected);
        prop_assert_eq!(rows.len(), log.len());
    }
}

#[test]
fn twenty_five_packets_render_twenty_in_reverse_order() {
    let mut app = App::new(ME, &device(1), NodeSnapshot::new()).unwrap();
    for from in 100..125u32 {
        let _ = app.handle(AppEvent::PacketReceived(MeshPacket::text(
            from,
            BROADCAST_NUM,
            None,
            "x",
        )));
    }

    let rows = app.packet_log().render_rows(50, 120, app.roster());

    assert_eq!(rows.len(), 20);
    assert!(rows[0].starts_with(&meshchat_app::node_label(124)));
    assert!(rows[19].starts_with(&meshchat_app::node_label(105)));
}
