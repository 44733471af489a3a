//! Render-ready rows derived from an [`App`] snapshot.
//!
//! Terminal frontends paint these rows as they are; they never reach into
//! the session model directly. Sizes are the inner dimensions of the target
//! pane (borders excluded).

use crate::{App, Mode};

/// One entry of the conversation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRow {
    /// Label, truncated to fit.
    pub label: String,
    /// Whether this is the selection and the list has focus.
    pub selected: bool,
    /// Whether the conversation has unseen activity.
    pub unseen: bool,
}

/// One entry of the visible roster window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    /// Node long name or `!xxxxxxxx`.
    pub label: String,
    /// Whether the roster cursor is on this node in direct mode.
    pub highlighted: bool,
}

/// One wrapped line of message history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLine {
    /// Line text, at most `width` characters.
    pub text: String,
    /// Whether the line belongs to a message this client sent.
    pub sent: bool,
}

/// Conversation list rows. Labels longer than `width - 5` characters are cut
/// there and suffixed with `-`.
pub fn conversation_rows(app: &App, width: usize) -> Vec<ConversationRow> {
    let limit = width.saturating_sub(5);
    let selection = app.selection();

    app.conversations()
        .ids()
        .iter()
        .enumerate()
        .map(|(index, id)| {
            let label = app.conversation_label(id);
            let label = if label.chars().count() > limit {
                let mut cut: String = label.chars().take(limit).collect();
                cut.push('-');
                cut
            } else {
                label
            };
            ConversationRow {
                label,
                selected: index == selection.index && selection.mode == Mode::Channel,
                unseen: app.notifications().contains(index),
            }
        })
        .collect()
}

/// Roster rows for a pane `rows` lines tall.
///
/// The window scrolls so the cursor stays on the last visible line once it
/// moves past the first page.
pub fn roster_rows(app: &App, rows: usize) -> Vec<RosterRow> {
    let selection = app.selection();
    let start = selection.node_index.saturating_sub(rows.saturating_sub(1));
    let roster = app.roster();

    roster
        .node_ids()
        .into_iter()
        .enumerate()
        .skip(start)
        .take(rows)
        .map(|(index, node)| RosterRow {
            label: roster.display_name(node, crate::NameLength::Long),
            highlighted: index == selection.node_index && selection.mode == Mode::Direct,
        })
        .collect()
}

/// Wrapped history of the selected conversation for a `rows` x `width` pane.
///
/// Only the last `rows` messages are considered; when wrapping produces more
/// lines than fit, the newest lines win.
pub fn message_lines(app: &App, rows: usize, width: usize) -> Vec<MessageLine> {
    let messages = app.selected_messages();
    let start = messages.len().saturating_sub(rows);

    let lines: Vec<MessageLine> = messages[start..]
        .iter()
        .flat_map(|entry| {
            let sent = entry.is_sent();
            wrap(&format!("{}{}", entry.prefix(), entry.body), width)
                .into_iter()
                .map(move |text| MessageLine { text, sent })
        })
        .collect();

    let skip = lines.len().saturating_sub(rows);
    lines.into_iter().skip(skip).collect()
}

/// Greedy word wrap. Runs of whitespace collapse to one space and words
/// longer than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        if current_len > 0 && current_len + 1 + word.len() <= width {
            current.push(' ');
            current.extend(&word);
            current_len += 1 + word.len();
            continue;
        }
        if current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        while word.len() > width {
            lines.push(word.drain(..width).collect());
        }
        current.extend(&word);
        current_len = word.len();
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_breaks_on_words() {
        assert_eq!(wrap(">> Sent: hello there world", 12), vec![
            ">> Sent:",
            "hello there",
            "world"
        ]);
    }

    #[test]
    fn wrap_splits_long_words() {
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_of_blank_text_is_empty() {
        assert!(wrap("   ", 10).is_empty());
    }
}
