//! Command line arguments.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::transport::ConnectTarget;

/// Host tried over TCP when no connection flag is given and serial fails.
pub const FALLBACK_TCP_HOST: &str = "meshtastic.local";

/// Terminal chat client for Meshtastic mesh radios
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "meshchat-tui")]
#[command(about = "Terminal chat client for Meshtastic mesh radios")]
#[command(version)]
#[command(group(ArgGroup::new("connection").multiple(false)))]
#[command(
    after_help = "With no connection flag, a serial connection is tried first, then TCP to meshtastic.local."
)]
pub struct Args {
    /// Serial port to use. Without a value, the first available port.
    #[arg(short = 's', long = "port", visible_alias = "serial", group = "connection")]
    #[arg(value_name = "PORT", num_args = 0..=1)]
    pub port: Option<Option<String>>,

    /// Radio host to reach over TCP, optionally with `:port`.
    #[arg(short = 't', long = "host", visible_alias = "tcp", group = "connection")]
    #[arg(value_name = "HOST", num_args = 0..=1, default_missing_value = "localhost")]
    pub host: Option<String>,

    /// Bluetooth device name or address.
    #[arg(short = 'b', long = "ble", group = "connection")]
    #[arg(value_name = "NAME", num_args = 0..=1, default_missing_value = "any")]
    pub ble: Option<String>,

    /// File receiving the log output
    #[arg(long, default_value = "meshchat.log")]
    pub log_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Connection attempts in order.
    pub fn targets(&self) -> Vec<ConnectTarget> {
        if let Some(port) = &self.port {
            return vec![ConnectTarget::Serial(port.clone())];
        }
        if let Some(host) = &self.host {
            return vec![ConnectTarget::Tcp(host.clone())];
        }
        if let Some(name) = &self.ble {
            return vec![ConnectTarget::Ble(name.clone())];
        }
        vec![ConnectTarget::Serial(None), ConnectTarget::Tcp(FALLBACK_TCP_HOST.to_string())]
    }
}
