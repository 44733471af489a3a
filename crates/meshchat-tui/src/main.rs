//! Mesh chat TUI entry point.
//!
//! # Usage
//!
//! ```bash
//! # First serial port, falling back to meshtastic.local over TCP
//! meshchat-tui
//!
//! # Specific serial port
//! meshchat-tui --port /dev/ttyUSB0
//!
//! # Radio on the network
//! meshchat-tui --host 192.168.1.20
//! ```

use std::{fs::File, sync::Mutex};

use clap::Parser;
use meshchat_tui::{App, Runtime, TerminalDriver, cli::Args, terminal, transport};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // stdout belongs to the TUI, so logs go to a file.
    let log_file = File::create(&args.log_file)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(log_file)).with_ansi(false))
        .with(filter)
        .init();

    tracing::info!("meshchat starting");

    let session = transport::connect_any(&args.targets()).await?;
    let nodes = session.nodes.lock().map(|nodes| nodes.clone()).unwrap_or_default();
    let app = App::new(session.my_node, &session.device, nodes)?;

    let driver = TerminalDriver::new(session.outgoing, session.nodes)?;
    let app = Runtime::new(app, driver).run(terminal::key_events(), session.packets).await?;

    tracing::info!(conversations = app.conversations().len(), "meshchat stopped");
    Ok(())
}
