//! Unseen-activity markers for conversations other than the selected one.

use std::collections::BTreeSet;

/// Conversation indices with unseen activity.
///
/// The selected index is never a member: [`Notifications::mark_unseen`]
/// refuses it and selecting a conversation clears it.
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    unseen: BTreeSet<usize>,
}

impl Notifications {
    /// Flag `index` unless it is `selected`. Returns whether the set changed.
    pub fn mark_unseen(&mut self, index: usize, selected: usize) -> bool {
        index != selected && self.unseen.insert(index)
    }

    /// Clear the flag on `index`. Returns whether it was set.
    pub fn clear_seen(&mut self, index: usize) -> bool {
        self.unseen.remove(&index)
    }

    /// Whether `index` has unseen activity.
    pub fn contains(&self, index: usize) -> bool {
        self.unseen.contains(&index)
    }

    /// Flagged indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.unseen.iter().copied()
    }
}
