//! Radio link.
//!
//! Connects to a Meshtastic device over serial or TCP, runs the configuration
//! handshake and hands the session model everything it needs: the local node
//! number, the channel configuration, a shared node database and the packet
//! channel. A spawned link task then owns the device connection.
//!
//! Protobuf types never leave this module.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use meshchat_app::{
    PACKET_CHANNEL_CAPACITY,
    mesh::{
        ChannelConfig, ChannelRole, Decoded, DeviceConfig, Destination, MeshPacket, NodeName,
        NodeNum, NodeSnapshot, PortKind,
    },
};
use meshtastic::{
    Message,
    api::StreamApi,
    packet::{PacketDestination, PacketRouter},
    protobufs::{self, FromRadio, PortNum, channel, config, from_radio, mesh_packet},
    types::{MeshChannel, NodeId},
    utils,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// TCP port of the device API.
pub const DEFAULT_TCP_PORT: u16 = 4403;

/// Time allowed for the device to report its configuration.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// Node database shared between the link task and the terminal driver.
pub type SharedNodes = Arc<Mutex<NodeSnapshot>>;

/// Where to find the radio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectTarget {
    /// Serial port; `None` picks the first available port.
    Serial(Option<String>),
    /// Host name or address, with optional `:port`.
    Tcp(String),
    /// Bluetooth device name or address.
    Ble(String),
}

impl fmt::Display for ConnectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial(Some(port)) => write!(f, "serial port {port}"),
            Self::Serial(None) => write!(f, "first serial port"),
            Self::Tcp(host) => write!(f, "tcp {}", tcp_address(host)),
            Self::Ble(name) => write!(f, "bluetooth {name}"),
        }
    }
}

/// Radio link errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No serial port was found for autodetection.
    #[error("no serial port available")]
    NoSerialPort,

    /// The device could not be reached.
    #[error("cannot connect to {target}: {reason}")]
    Connect {
        /// Attempted target.
        target: String,
        /// Underlying failure.
        reason: String,
    },

    /// The device did not finish reporting its configuration in time.
    #[error("radio handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),

    /// The device stream ended during the handshake.
    #[error("radio closed the link during the handshake")]
    HandshakeClosed,

    /// The handshake completed without the local node number.
    #[error("radio did not report its node number")]
    MissingNodeInfo,

    /// Connection method not available in this build.
    #[error("{0} connections are not supported")]
    Unsupported(&'static str),

    /// Error reported by the radio API.
    #[error("radio error: {0}")]
    Radio(String),
}

/// Text queued for transmission by the link task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingText {
    /// Message text.
    pub body: String,
    /// Broadcast or a single node.
    pub destination: Destination,
    /// Channel slot.
    pub channel_index: u32,
}

/// Queued text in the shape `send_text` takes.
///
/// Sends are fire-and-forget: no ack is requested, so the firmware neither
/// retries nor answers with routing acks.
struct TextRequest {
    body: String,
    destination: PacketDestination,
    want_ack: bool,
    channel: MeshChannel,
}

impl From<OutgoingText> for TextRequest {
    fn from(text: OutgoingText) -> Self {
        let destination = match text.destination {
            Destination::Broadcast => PacketDestination::Broadcast,
            Destination::Node(node) => PacketDestination::Node(node.into()),
        };
        Self {
            body: text.body,
            destination,
            want_ack: false,
            channel: text.channel_index.into(),
        }
    }
}

/// A connected, configured radio.
#[derive(Debug)]
pub struct RadioSession {
    /// Number of the local node.
    pub my_node: NodeNum,
    /// Channel slots and modem preset reported by the device.
    pub device: DeviceConfig,
    /// Node database kept current by the link task.
    pub nodes: SharedNodes,
    /// Packets received from the mesh.
    pub packets: mpsc::Receiver<MeshPacket>,
    /// Queue drained into the radio by the link task.
    pub outgoing: mpsc::UnboundedSender<OutgoingText>,
}

/// `host:port` for a TCP target, adding [`DEFAULT_TCP_PORT`] when absent.
pub fn tcp_address(host: &str) -> String {
    if host.starts_with('[') {
        return if host.contains("]:") {
            host.to_string()
        } else {
            format!("{host}:{DEFAULT_TCP_PORT}")
        };
    }
    match host.matches(':').count() {
        0 => format!("{host}:{DEFAULT_TCP_PORT}"),
        1 => host.to_string(),
        _ => format!("[{host}]:{DEFAULT_TCP_PORT}"),
    }
}

/// Try each target in order and return the first session that completes the
/// handshake.
pub async fn connect_any(targets: &[ConnectTarget]) -> Result<RadioSession, TransportError> {
    let mut last_error = TransportError::NoSerialPort;
    for target in targets {
        info!(%target, "connecting");
        match connect(target).await {
            Ok(session) => return Ok(session),
            Err(error) => {
                warn!(%target, %error, "connection attempt failed");
                last_error = error;
            },
        }
    }
    Err(last_error)
}

/// Connect to one target, run the handshake and spawn the link task.
pub async fn connect(target: &ConnectTarget) -> Result<RadioSession, TransportError> {
    let connect_error = |error: meshtastic::errors::Error| TransportError::Connect {
        target: target.to_string(),
        reason: error.to_string(),
    };

    let stream_api = StreamApi::new();
    let (mut from_radio, api) = match target {
        ConnectTarget::Serial(port) => {
            let port = match port {
                Some(port) => port.clone(),
                None => first_serial_port()?,
            };
            let stream = utils::stream::build_serial_stream(port, None, None, None)
                .map_err(connect_error)?;
            stream_api.connect(stream).await
        },
        ConnectTarget::Tcp(host) => {
            let stream =
                utils::stream::build_tcp_stream(tcp_address(host)).await.map_err(connect_error)?;
            stream_api.connect(stream).await
        },
        ConnectTarget::Ble(_) => return Err(TransportError::Unsupported("bluetooth")),
    };

    let mut api = api
        .configure(utils::generate_rand_id())
        .await
        .map_err(|error| TransportError::Radio(error.to_string()))?;

    let mut handshake = Handshake::default();
    tokio::time::timeout(HANDSHAKE_TIMEOUT, async {
        while let Some(message) = from_radio.recv().await {
            if handshake.absorb(message) {
                return Ok(());
            }
        }
        Err(TransportError::HandshakeClosed)
    })
    .await
    .map_err(|_| TransportError::HandshakeTimeout(HANDSHAKE_TIMEOUT))??;

    let (my_node, device, nodes) = handshake.finish()?;
    info!(
        my_node,
        channels = device.channels.len(),
        preset = %device.modem_preset,
        "radio configured"
    );

    let nodes: SharedNodes = Arc::new(Mutex::new(nodes));
    let (packet_tx, packets) = mpsc::channel(PACKET_CHANNEL_CAPACITY);
    let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<OutgoingText>();

    let link_nodes = Arc::clone(&nodes);
    tokio::spawn(async move {
        let mut router = LinkRouter { my_node };
        loop {
            tokio::select! {
                message = from_radio.recv() => {
                    let Some(message) = message else {
                        info!("radio stream ended");
                        break;
                    };
                    let Some(packet) = absorb_from_radio(message, &link_nodes) else {
                        continue;
                    };
                    if packet_tx.send(packet).await.is_err() {
                        info!("packet consumer gone");
                        break;
                    }
                }
                text = outgoing_rx.recv() => {
                    let Some(text) = text else {
                        info!("outgoing queue closed");
                        break;
                    };
                    let destination = text.destination;
                    let request = TextRequest::from(text);
                    if let Err(error) = api
                        .send_text(
                            &mut router,
                            request.body,
                            request.destination,
                            request.want_ack,
                            request.channel,
                        )
                        .await
                    {
                        warn!(%error, ?destination, "failed to send text");
                    }
                }
            }
        }

        if let Err(error) = api.disconnect().await {
            warn!(%error, "radio disconnect failed");
        }
    });

    Ok(RadioSession { my_node, device, nodes, packets, outgoing })
}

fn first_serial_port() -> Result<String, TransportError> {
    let ports = utils::stream::available_serial_ports()
        .map_err(|error| TransportError::Radio(error.to_string()))?;
    debug!(?ports, "available serial ports");
    ports.into_iter().next().ok_or(TransportError::NoSerialPort)
}

/// Device state collected until the configuration is complete.
#[derive(Debug, Default)]
struct Handshake {
    my_node: Option<NodeNum>,
    channels: Vec<ChannelConfig>,
    modem_preset: Option<String>,
    nodes: NodeSnapshot,
}

impl Handshake {
    /// Record one message. Returns `true` once the device signals the end of
    /// its configuration.
    fn absorb(&mut self, message: FromRadio) -> bool {
        let Some(variant) = message.payload_variant else {
            return false;
        };
        match variant {
            from_radio::PayloadVariant::MyInfo(info) => self.my_node = Some(info.my_node_num),
            from_radio::PayloadVariant::NodeInfo(info) => {
                if let Some(user) = info.user {
                    self.nodes.insert(info.num, NodeName::new(user.long_name, user.short_name));
                }
            },
            from_radio::PayloadVariant::Channel(slot) => {
                let role = match slot.role() {
                    channel::Role::Disabled => ChannelRole::Disabled,
                    channel::Role::Primary => ChannelRole::Primary,
                    channel::Role::Secondary => ChannelRole::Secondary,
                };
                let name = slot.settings.map(|settings| settings.name);
                let index = u32::try_from(slot.index).unwrap_or_default();
                self.channels.push(ChannelConfig { index, role, name });
            },
            from_radio::PayloadVariant::Config(device_config) => {
                if let Some(config::PayloadVariant::Lora(lora)) = device_config.payload_variant {
                    self.modem_preset = Some(lora.modem_preset().as_str_name().to_string());
                }
            },
            from_radio::PayloadVariant::ConfigCompleteId(id) => {
                debug!(id, "configuration complete");
                return true;
            },
            _ => {},
        }
        false
    }

    fn finish(self) -> Result<(NodeNum, DeviceConfig, NodeSnapshot), TransportError> {
        let my_node = self.my_node.ok_or(TransportError::MissingNodeInfo)?;
        let modem_preset = self.modem_preset.unwrap_or_else(|| "LONG_FAST".to_string());
        Ok((my_node, DeviceConfig { channels: self.channels, modem_preset }, self.nodes))
    }
}

/// Update the node database from `message` and extract its mesh packet.
fn absorb_from_radio(message: FromRadio, nodes: &SharedNodes) -> Option<MeshPacket> {
    match message.payload_variant? {
        from_radio::PayloadVariant::NodeInfo(info) => {
            if let Some(user) = info.user {
                remember_node(nodes, info.num, &user);
            }
            None
        },
        from_radio::PayloadVariant::Packet(packet) => {
            let packet = convert_packet(packet);
            if let Some(Decoded { port: PortKind::NodeInfo, payload }) = &packet.decoded {
                match protobufs::User::decode(payload.as_slice()) {
                    Ok(user) => remember_node(nodes, packet.from, &user),
                    Err(error) => warn!(from = packet.from, %error, "malformed node info"),
                }
            }
            Some(packet)
        },
        _ => None,
    }
}

fn remember_node(nodes: &SharedNodes, num: NodeNum, user: &protobufs::User) {
    let name = NodeName::new(user.long_name.clone(), user.short_name.clone());
    nodes.lock().unwrap_or_else(PoisonError::into_inner).insert(num, name);
}

/// Translate a wire packet. Channel 0 reads the same as no channel.
fn convert_packet(packet: protobufs::MeshPacket) -> MeshPacket {
    let decoded = match packet.payload_variant {
        Some(mesh_packet::PayloadVariant::Decoded(data)) => {
            let port = match data.portnum() {
                PortNum::TextMessageApp => PortKind::TextMessage,
                PortNum::NodeinfoApp => PortKind::NodeInfo,
                other => PortKind::Other(other.as_str_name().to_string()),
            };
            Some(Decoded { port, payload: data.payload })
        },
        Some(mesh_packet::PayloadVariant::Encrypted(_)) | None => None,
    };

    MeshPacket {
        from: packet.from,
        to: packet.to,
        channel: (packet.channel != 0).then_some(packet.channel),
        decoded,
    }
}

/// Router handed to the send API; outgoing packets need no bookkeeping.
struct LinkRouter {
    my_node: NodeNum,
}

/// Never produced; the router accepts every packet.
#[derive(Debug, Error)]
#[error("packet router error")]
struct RouterError;

impl PacketRouter<(), RouterError> for LinkRouter {
    fn handle_packet_from_radio(&mut self, _packet: FromRadio) -> Result<(), RouterError> {
        Ok(())
    }

    fn handle_mesh_packet(&mut self, _packet: protobufs::MeshPacket) -> Result<(), RouterError> {
        Ok(())
    }

    fn source_node_id(&self) -> NodeId {
        self.my_node.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(variant: from_radio::PayloadVariant) -> FromRadio {
        FromRadio { payload_variant: Some(variant), ..Default::default() }
    }

    fn text_packet(from: u32, to: u32, channel: u32, body: &str) -> protobufs::MeshPacket {
        protobufs::MeshPacket {
            from,
            to,
            channel,
            payload_variant: Some(mesh_packet::PayloadVariant::Decoded(protobufs::Data {
                portnum: PortNum::TextMessageApp as i32,
                payload: body.as_bytes().to_vec(),
                ..Default::default()
            })),
            ..Default::default()
        }
    }

    #[test]
    fn queued_text_is_sent_without_ack() {
        let request = TextRequest::from(OutgoingText {
            body: "hi".into(),
            destination: Destination::Node(0xb),
            channel_index: 0,
        });

        assert!(!request.want_ack);
        assert_eq!(request.body, "hi");
        assert!(matches!(request.destination, PacketDestination::Node(_)));

        let request = TextRequest::from(OutgoingText {
            body: "all".into(),
            destination: Destination::Broadcast,
            channel_index: 1,
        });
        assert!(!request.want_ack);
        assert!(matches!(request.destination, PacketDestination::Broadcast));
    }

    #[test]
    fn tcp_hosts_get_default_port() {
        assert_eq!(tcp_address("meshtastic.local"), "meshtastic.local:4403");
        assert_eq!(tcp_address("10.0.0.5:4000"), "10.0.0.5:4000");
        assert_eq!(tcp_address("fe80::1"), "[fe80::1]:4403");
        assert_eq!(tcp_address("[fe80::1]:9"), "[fe80::1]:9");
    }

    #[test]
    fn handshake_collects_device_state() {
        let mut handshake = Handshake::default();

        assert!(!handshake.absorb(message(from_radio::PayloadVariant::MyInfo(
            protobufs::MyNodeInfo { my_node_num: 0x42, ..Default::default() }
        ))));
        assert!(!handshake.absorb(message(from_radio::PayloadVariant::Channel(protobufs::Channel {
            index: 1,
            role: channel::Role::Secondary as i32,
            settings: Some(protobufs::ChannelSettings {
                name: "Club".into(),
                ..Default::default()
            }),
        }))));
        assert!(!handshake.absorb(message(from_radio::PayloadVariant::Config(protobufs::Config {
            payload_variant: Some(config::PayloadVariant::Lora(config::LoRaConfig {
                modem_preset: config::lo_ra_config::ModemPreset::MediumSlow as i32,
                ..Default::default()
            })),
        }))));
        assert!(!handshake.absorb(message(from_radio::PayloadVariant::NodeInfo(
            protobufs::NodeInfo {
                num: 7,
                user: Some(protobufs::User {
                    long_name: "Alice".into(),
                    short_name: "AL".into(),
                    ..Default::default()
                }),
                ..Default::default()
            }
        ))));
        assert!(handshake.absorb(message(from_radio::PayloadVariant::ConfigCompleteId(9))));

        let (my_node, device, nodes) = handshake.finish().unwrap();
        assert_eq!(my_node, 0x42);
        assert_eq!(device.modem_preset, "MEDIUM_SLOW");
        assert_eq!(device.channels, vec![ChannelConfig::new(
            1,
            ChannelRole::Secondary,
            Some("Club")
        )]);
        assert_eq!(nodes.get(&7), Some(&NodeName::new("Alice", "AL")));
    }

    #[test]
    fn handshake_without_node_number_fails() {
        let handshake = Handshake::default();
        assert!(matches!(handshake.finish(), Err(TransportError::MissingNodeInfo)));
    }

    #[test]
    fn channel_zero_reads_as_absent() {
        let packet = convert_packet(text_packet(1, 2, 0, "hi"));
        assert_eq!(packet, MeshPacket::text(1, 2, None, "hi"));

        let packet = convert_packet(text_packet(1, 2, 3, "hi"));
        assert_eq!(packet.channel, Some(3));
    }

    #[test]
    fn encrypted_packets_have_no_payload() {
        let packet = convert_packet(protobufs::MeshPacket {
            from: 1,
            payload_variant: Some(mesh_packet::PayloadVariant::Encrypted(vec![1, 2, 3])),
            ..Default::default()
        });
        assert_eq!(packet.decoded, None);
    }

    #[test]
    fn node_info_payload_updates_database_before_forwarding() {
        let nodes = SharedNodes::default();
        let user = protobufs::User {
            long_name: "Bob".into(),
            short_name: "BO".into(),
            ..Default::default()
        };
        let packet = protobufs::MeshPacket {
            from: 0xb,
            to: u32::MAX,
            payload_variant: Some(mesh_packet::PayloadVariant::Decoded(protobufs::Data {
                portnum: PortNum::NodeinfoApp as i32,
                payload: user.encode_to_vec(),
                ..Default::default()
            })),
            ..Default::default()
        };

        let forwarded =
            absorb_from_radio(message(from_radio::PayloadVariant::Packet(packet)), &nodes);

        let port = forwarded.and_then(|packet| packet.decoded).map(|decoded| decoded.port);
        assert_eq!(port, Some(PortKind::NodeInfo));
        assert_eq!(nodes.lock().unwrap().get(&0xb), Some(&NodeName::new("Bob", "BO")));
    }

    #[test]
    fn other_ports_keep_symbolic_name() {
        let mut packet = text_packet(1, 2, 0, "");
        if let Some(mesh_packet::PayloadVariant::Decoded(data)) = &mut packet.payload_variant {
            data.portnum = PortNum::PositionApp as i32;
        }
        let converted = convert_packet(packet);
        assert_eq!(converted.decoded.map(|d| d.port), Some(PortKind::Other("POSITION_APP".into())));
    }
}
