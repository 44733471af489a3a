//! Terminal-agnostic keyboard input.

/// Keyboard input abstraction.
///
/// Decouples application logic from terminal libraries (crossterm, termion,
/// etc.) enabling deterministic testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key (send, or confirm a direct-message peer).
    Enter,
    /// Backspace key (delete last character).
    Backspace,
    /// Escape key (quit).
    Esc,
    /// Left arrow key (leave direct mode).
    Left,
    /// Right arrow key (enter direct mode).
    Right,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
}
