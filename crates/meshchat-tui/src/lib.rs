//! Terminal UI for the mesh chat client
//!
//! A thin shell over [`meshchat_app::Driver`] that provides terminal and
//! radio I/O. All orchestration logic lives in the generic
//! [`meshchat_app::Runtime`].
//!
//! This crate only handles argument parsing, the radio link and terminal
//! rendering.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod terminal;
pub mod transport;
pub mod ui;

pub use meshchat_app::{App, AppAction, AppEvent, Driver, KeyInput, Runtime};
pub use terminal::{TerminalDriver, TerminalError};
pub use transport::{ConnectTarget, RadioSession, TransportError};
