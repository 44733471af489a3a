//! Application layer for the mesh chat client
//!
//! Pure session model and generic runtime, enabling deterministic testing
//! with the same code that runs against a real radio.
//!
//! # Components
//!
//! - [`App`]: Session state machine (conversations, roster, input, routing)
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Single-lock coordination of keyboard and receive paths
//! - [`view`]: Render-ready rows for terminal frontends

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
pub mod conversation;
mod driver;
mod error;
mod event;
mod input;
pub mod mesh;
mod notify;
mod packet_log;
mod roster;
mod runtime;
mod state;
pub mod view;

pub use action::{AppAction, Pane};
pub use app::{App, LOG_TOGGLE_KEY, SETTINGS_KEY};
pub use conversation::{ConversationId, Conversations};
pub use driver::Driver;
pub use error::AppError;
pub use event::AppEvent;
pub use input::KeyInput;
pub use notify::Notifications;
pub use packet_log::PacketLog;
pub use roster::{NameLength, Roster, node_label};
pub use runtime::{PACKET_CHANNEL_CAPACITY, Runtime};
pub use state::{MessageEntry, Mode, Origin, Selection};
