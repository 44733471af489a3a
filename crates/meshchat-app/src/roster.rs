//! Known remote nodes and their display names.

use crate::mesh::{NodeNum, NodeSnapshot};

/// Which of a node's names to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameLength {
    /// Full name.
    Long,
    /// Short name.
    Short,
}

/// Canonical textual identifier of a node: `!` followed by 8 hex digits.
pub fn node_label(num: NodeNum) -> String {
    format!("!{num:08x}")
}

/// Node roster.
///
/// Always replaced wholesale from the transport's latest snapshot; entries
/// are never merged one at a time.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    nodes: NodeSnapshot,
}

impl Roster {
    /// Roster populated from a snapshot.
    pub fn from_snapshot(nodes: NodeSnapshot) -> Self {
        Self { nodes }
    }

    /// Replace every entry with `nodes`.
    pub fn refresh(&mut self, nodes: NodeSnapshot) {
        self.nodes = nodes;
    }

    /// Display name for `num`, falling back to [`node_label`] for unknown
    /// nodes and empty names.
    pub fn display_name(&self, num: NodeNum, length: NameLength) -> String {
        self.nodes
            .get(&num)
            .map(|name| match length {
                NameLength::Long => name.long_name.as_str(),
                NameLength::Short => name.short_name.as_str(),
            })
            .filter(|name| !name.trim().is_empty())
            .map_or_else(|| node_label(num), str::to_owned)
    }

    /// Known node numbers in ascending order.
    pub fn node_ids(&self) -> Vec<NodeNum> {
        self.nodes.keys().copied().collect()
    }

    /// Node at roster position `index`.
    pub fn node_at(&self, index: usize) -> Option<NodeNum> {
        self.nodes.keys().nth(index).copied()
    }

    /// Number of known nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no nodes are known.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
