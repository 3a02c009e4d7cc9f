//! Composite structural edits
//!
//! An [`Edit`] is an ordered batch of remove/insert operations that a
//! [`TableHost`](super::TableHost) applies as one unit. Each operation's
//! path is read against the tree left behind by the operations before it,
//! and nothing outside the host observes the intermediate trees.

use std::fmt;

use super::node::NodeId;
use super::path::Path;

/// One structural operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// Detach the node at `at`; it stays in the arena and may be reinserted
    Remove { at: Path },
    /// Attach the detached `node` so that it ends up at `at`
    Insert { at: Path, node: NodeId },
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditOp::Remove { at } => write!(f, "remove {}", at),
            EditOp::Insert { at, node } => write!(f, "insert {} at {}", node, at),
        }
    }
}

/// An atomic batch of [`EditOp`]s
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Edit {
    ops: Vec<EditOp>,
}

impl Edit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove(&mut self, at: Path) -> &mut Self {
        self.ops.push(EditOp::Remove { at });
        self
    }

    pub fn insert(&mut self, at: Path, node: NodeId) -> &mut Self {
        self.ops.push(EditOp::Insert { at, node });
        self
    }

    /// Remove `node` from `from` and reinsert it at `to`
    ///
    /// `to` is read against the tree after the removal.
    pub fn relocate(&mut self, node: NodeId, from: Path, to: Path) -> &mut Self {
        self.remove(from).insert(to, node)
    }

    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl IntoIterator for Edit {
    type Item = EditOp;
    type IntoIter = std::vec::IntoIter<EditOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}
