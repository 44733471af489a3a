//! Bounded log of recently received packets.
//!
//! Diagnostic only: the log is never persisted and holds at most
//! [`PacketLog::CAPACITY`] packets, evicting the oldest first.

use std::collections::VecDeque;

use crate::{
    mesh::{BROADCAST_NUM, MeshPacket, NodeNum},
    roster::{NameLength, Roster},
};

const NODE_COLUMN: usize = 20;
const PORT_COLUMN: usize = 15;
const NO_KEY: &str = "NO KEY";
const HEX_PREVIEW_BYTES: usize = 16;

/// Ring buffer of the most recent packets.
#[derive(Debug, Clone, Default)]
pub struct PacketLog {
    packets: VecDeque<MeshPacket>,
}

impl PacketLog {
    /// Maximum number of retained packets.
    pub const CAPACITY: usize = 20;

    /// Record a packet, evicting the oldest beyond capacity.
    pub fn record(&mut self, packet: MeshPacket) {
        self.packets.push_back(packet);
        while self.packets.len() > Self::CAPACITY {
            self.packets.pop_front();
        }
    }

    /// Number of retained packets.
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Retained packets, most recent first.
    pub fn recent(&self) -> impl Iterator<Item = &MeshPacket> {
        self.packets.iter().rev()
    }

    /// Column header, truncated to `width` characters.
    pub fn header(width: usize) -> String {
        let header = format!(
            "{:<NODE_COLUMN$} {:<NODE_COLUMN$} {:<PORT_COLUMN$} Payload",
            "From", "To", "Port"
        );
        truncate(&header, width)
    }

    /// Up to `max_rows` formatted rows, most recent first, each truncated to
    /// `width` characters.
    pub fn render_rows(&self, max_rows: usize, width: usize, roster: &Roster) -> Vec<String> {
        self.recent()
            .take(max_rows)
            .map(|packet| truncate(&format_row(packet, roster), width))
            .collect()
    }
}

fn format_row(packet: &MeshPacket, roster: &Roster) -> String {
    let from = roster.display_name(packet.from, NameLength::Long);
    let to = destination_label(packet.to, roster);
    let (port, payload) = packet.decoded.as_ref().map_or_else(
        || (NO_KEY.to_string(), NO_KEY.to_string()),
        |decoded| (decoded.port.label().to_string(), payload_preview(&decoded.payload)),
    );

    format!("{from:<NODE_COLUMN$} {to:<NODE_COLUMN$} {port:<PORT_COLUMN$} {payload}")
}

fn destination_label(to: NodeNum, roster: &Roster) -> String {
    if to == BROADCAST_NUM {
        "BROADCAST".to_string()
    } else {
        roster.display_name(to, NameLength::Long)
    }
}

/// Printable text as-is, anything else as a hex preview.
fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) if !text.chars().any(char::is_control) => text.to_string(),
        _ => {
            let hex: String =
                payload.iter().take(HEX_PREVIEW_BYTES).map(|byte| format!("{byte:02x}")).collect();
            if payload.len() > HEX_PREVIEW_BYTES { format!("{hex}...") } else { hex }
        },
    }
}

fn truncate(line: &str, width: usize) -> String {
    line.chars().take(width).collect()
}
