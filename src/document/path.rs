//! Structural addressing of nodes
//!
//! A [`Path`] is the list of child indices leading from the document root
//! to a node. Paths are plain values: they are not updated when the tree
//! changes, so anything holding one across an edit must transform it with
//! [`Path::transform_remove`] / [`Path::transform_insert`].

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Position of a node in the document tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Path(Vec<usize>);

impl Path {
    /// The root path (empty)
    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn new(indices: Vec<usize>) -> Self {
        Path(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of this node among its siblings
    pub fn last_index(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            return None;
        }
        Some(Path(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn child(&self, index: usize) -> Path {
        let mut indices = self.0.clone();
        indices.push(index);
        Path(indices)
    }

    /// Path of the following sibling
    ///
    /// The root has no siblings, so `next` of the root is the root itself.
    pub fn next(&self) -> Path {
        let mut indices = self.0.clone();
        if let Some(last) = indices.last_mut() {
            *last += 1;
        }
        Path(indices)
    }

    /// True when `self` is a strict ancestor of `other`
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    /// True when `self` equals `other` or is one of its ancestors
    pub fn contains(&self, other: &Path) -> bool {
        other.0.starts_with(&self.0)
    }

    /// All ancestors of this path, outermost first, excluding the root
    /// and the path itself
    pub fn ancestors(&self) -> impl Iterator<Item = Path> + '_ {
        (1..self.0.len()).map(move |depth| Path(self.0[..depth].to_vec()))
    }

    /// Where this path points after the node at `removed` is detached
    ///
    /// Returns `None` when this path was the removed node or lay inside it.
    pub fn transform_remove(&self, removed: &Path) -> Option<Path> {
        if removed.is_root() || removed.contains(self) {
            return None;
        }
        let depth = removed.0.len() - 1;
        let mut indices = self.0.clone();
        if indices.len() > depth
            && indices[..depth] == removed.0[..depth]
            && indices[depth] > removed.0[depth]
        {
            indices[depth] -= 1;
        }
        Some(Path(indices))
    }

    /// Where this path points after a node is inserted at `inserted`
    pub fn transform_insert(&self, inserted: &Path) -> Path {
        let Some(depth) = inserted.0.len().checked_sub(1) else {
            return self.clone();
        };
        let mut indices = self.0.clone();
        if indices.len() > depth
            && indices[..depth] == inserted.0[..depth]
            && indices[depth] >= inserted.0[depth]
        {
            indices[depth] += 1;
        }
        Path(indices)
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Path(indices)
    }
}

impl From<&[usize]> for Path {
    fn from(indices: &[usize]) -> Self {
        Path(indices.to_vec())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", index)?;
        }
        write!(f, "]")
    }
}
