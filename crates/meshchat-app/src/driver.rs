//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. The terminal frontend implements it on top of ratatui and
//! the radio link; tests implement it with recorders. The generic
//! [`crate::Runtime`] handles all orchestration.

use crate::{
    App, Pane,
    mesh::{Destination, NodeSnapshot},
};

/// Abstracts I/O operations for the application runtime.
///
/// Every method is called with the session lock held, so implementations
/// must not block on the radio or the keyboard.
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Repaint `panes` from `app`. `panes` is non-empty and free of
    /// duplicates.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing fails.
    fn render(&mut self, app: &App, panes: &[Pane]) -> Result<(), Self::Error>;

    /// Queue a text message for transmission. Delivery is not awaited.
    ///
    /// # Errors
    ///
    /// Returns an error if the outgoing queue is gone.
    fn send_text(
        &mut self,
        body: &str,
        destination: Destination,
        channel_index: u32,
    ) -> Result<(), Self::Error>;

    /// Full current node database of the transport.
    fn node_snapshot(&self) -> NodeSnapshot;

    /// Release terminal and link resources.
    fn stop(&mut self);
}
