//! Session model errors.

use thiserror::Error;

/// Errors raised while building the session model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// The device configuration yielded no enabled channel.
    #[error("device reports no usable channel")]
    NoChannels,
}
