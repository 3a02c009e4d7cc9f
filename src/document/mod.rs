//! In-memory table document
//!
//! The move core only talks to documents through the [`TableHost`] trait.
//! [`Document`] is the implementation shipped with the crate: an arena of
//! nodes addressed by [`NodeId`], with children stored as id lists and no
//! parent back-references. Paths are derived by walking from the root.
//!
//! # Example
//!
//! ```rust
//! use tablemove::document::Document;
//!
//! let doc = Document::from_notation("A | B\nC | D").unwrap();
//! assert_eq!(doc.to_notation(), "[body]\nA | B\nC | D\n");
//! ```

mod edit;
mod host;
mod node;
mod notation;
mod path;

pub use edit::{Edit, EditOp};
pub use host::TableHost;
pub use node::{Cell, Node, NodeEntry, NodeId, NodeKind, NodeMatch, SectionKind};
pub use path::Path;

use fxhash::FxHashSet;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::utils::error::EditError;
#[cfg(feature = "data-loading")]
use crate::utils::error::{TableError, TableResult};

/// Arena-backed document tree holding one or more tables
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    /// Nodes that exist in the arena but hang off no parent
    #[cfg_attr(feature = "serde", serde(skip))]
    detached: FxHashSet<NodeId>,
    #[cfg_attr(feature = "serde", serde(skip))]
    revision: u64,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Root)],
            root: NodeId(0),
            detached: FxHashSet::default(),
            revision: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of edits applied so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn cell(&self, id: NodeId) -> Option<&Cell> {
        self.node(id).and_then(Node::cell)
    }

    pub fn is_detached(&self, id: NodeId) -> bool {
        self.detached.contains(&id)
    }

    /// Resolve a path to the node it addresses
    pub fn node_at(&self, path: &Path) -> Option<NodeId> {
        let mut current = self.root;
        for &index in path.indices() {
            current = *self.children(current).get(index)?;
        }
        Some(current)
    }

    /// Allocate a detached node
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind));
        self.detached.insert(id);
        id
    }

    /// Create a node and attach it as the last child of `parent`
    ///
    /// Construction helper: this does not count as an edit and does not
    /// run normalization.
    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.create(kind);
        if let Some(node) = self.nodes.get_mut(parent.index()) {
            node.children.push(id);
            self.detached.remove(&id);
        }
        id
    }

    pub fn add_table(&mut self) -> NodeId {
        self.append(self.root, NodeKind::Table)
    }

    pub fn add_section(&mut self, table: NodeId, section: SectionKind) -> NodeId {
        self.append(table, NodeKind::Section { section })
    }

    pub fn add_row(&mut self, parent: NodeId) -> NodeId {
        self.append(parent, NodeKind::Row)
    }

    pub fn add_cell(&mut self, row: NodeId, cell: Cell) -> NodeId {
        self.append(row, NodeKind::Cell(cell))
    }

    /// Top-level tables in document order
    pub fn tables(&self) -> Vec<NodeEntry> {
        self.nodes_at(None, NodeMatch::Table)
    }

    /// Depth-first, pre-order walk of the subtree at `path`
    fn collect_subtree(
        &self,
        id: NodeId,
        path: Path,
        kind: NodeMatch,
        out: &mut Vec<NodeEntry>,
    ) {
        let Some(node) = self.node(id) else {
            return;
        };
        if kind.matches(&node.kind) {
            out.push(NodeEntry::new(id, path.clone()));
        }
        for (i, &child) in node.children.iter().enumerate() {
            self.collect_subtree(child, path.child(i), kind, out);
        }
    }

    /// Nodes of `kind` at a location, in document order
    ///
    /// `Some(path)` yields the matching ancestors of `path` first, then the
    /// node at `path` and its descendants. `None` covers the whole document.
    pub fn nodes_at(&self, at: Option<&Path>, kind: NodeMatch) -> Vec<NodeEntry> {
        let mut out = Vec::new();
        let Some(path) = at else {
            self.collect_subtree(self.root, Path::root(), kind, &mut out);
            return out;
        };
        let Some(target) = self.node_at(path) else {
            return out;
        };
        for ancestor in path.ancestors() {
            if let Some(id) = self.node_at(&ancestor) {
                if self.node(id).is_some_and(|n| kind.matches(&n.kind)) {
                    out.push(NodeEntry::new(id, ancestor));
                }
            }
        }
        self.collect_subtree(target, path.clone(), kind, &mut out);
        out
    }

    /// Kind of the nearest section enclosing `path`
    pub fn section_at(&self, path: &Path) -> Option<SectionKind> {
        let mut current = self.root;
        let mut section = None;
        for &index in path.indices() {
            current = *self.children(current).get(index)?;
            match self.node(current).map(|n| &n.kind) {
                Some(NodeKind::Section { section: kind }) => section = Some(*kind),
                Some(NodeKind::Table) => section = None,
                _ => {}
            }
        }
        section
    }

    /// Apply an edit as one unit
    ///
    /// Either every operation lands or the document is restored and the
    /// first failure is returned. Normalization runs once, after the last
    /// operation.
    pub fn apply_edit(&mut self, edit: Edit) -> Result<(), EditError> {
        let nodes = self.nodes.clone();
        let detached = self.detached.clone();
        let count = edit.len();

        for op in edit {
            if let Err(err) = self.apply_op(&op) {
                debug!(%op, error = %err, "edit rejected, rolling back");
                self.nodes = nodes;
                self.detached = detached;
                return Err(err);
            }
        }

        self.normalize();
        self.revision += 1;
        debug!(ops = count, revision = self.revision, "edit applied");
        Ok(())
    }

    fn apply_op(&mut self, op: &EditOp) -> Result<(), EditError> {
        match op {
            EditOp::Remove { at } => {
                let parent_path = at.parent().ok_or(EditError::RootEdit)?;
                let parent = self
                    .node_at(&parent_path)
                    .ok_or_else(|| EditError::MissingNode(at.clone()))?;
                let index = at.last_index().ok_or(EditError::RootEdit)?;
                let children = &mut self.nodes[parent.index()].children;
                if index >= children.len() {
                    return Err(EditError::MissingNode(at.clone()));
                }
                let removed = children.remove(index);
                self.detached.insert(removed);
                Ok(())
            }
            EditOp::Insert { at, node } => {
                if node.index() >= self.nodes.len() {
                    return Err(EditError::UnknownNode(*node));
                }
                if !self.detached.contains(node) {
                    return Err(EditError::NodeAttached(*node));
                }
                let parent_path = at.parent().ok_or(EditError::RootEdit)?;
                let parent = self
                    .node_at(&parent_path)
                    .ok_or_else(|| EditError::MissingNode(parent_path.clone()))?;
                let index = at.last_index().ok_or(EditError::RootEdit)?;
                let children = &mut self.nodes[parent.index()].children;
                if index > children.len() {
                    return Err(EditError::InsertOutOfRange {
                        parent: parent_path,
                        index,
                        len: children.len(),
                    });
                }
                children.insert(index, *node);
                self.detached.remove(node);
                Ok(())
            }
        }
    }

    /// Drop sections left without rows
    fn normalize(&mut self) {
        let mut emptied = Vec::new();
        for table in self.tables() {
            for &section in self.children(table.id) {
                let is_empty_section = self.node(section).is_some_and(|n| {
                    matches!(n.kind, NodeKind::Section { .. }) && n.children.is_empty()
                });
                if is_empty_section {
                    emptied.push((table.id, section));
                }
            }
        }
        for (table, section) in emptied {
            self.nodes[table.index()].children.retain(|&c| c != section);
            self.detached.insert(section);
            debug!(%section, "removed empty section");
        }
    }

    /// Recompute the detached set and check that the arena forms a tree
    #[cfg(feature = "data-loading")]
    fn reindex(&mut self) -> TableResult<()> {
        let mut seen = FxHashSet::default();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                return Err(TableError::InvalidDocument(format!(
                    "node {} is reachable twice",
                    id
                )));
            }
            let node = self
                .node(id)
                .ok_or_else(|| TableError::InvalidDocument(format!("dangling child {}", id)))?;
            stack.extend(node.children.iter().copied());
        }
        self.detached = (0..self.nodes.len() as u32)
            .map(NodeId)
            .filter(|id| !seen.contains(id))
            .collect();
        Ok(())
    }

    /// Load a document from its JSON form
    #[cfg(feature = "data-loading")]
    pub fn from_json(input: &str) -> TableResult<Self> {
        let mut doc: Document = serde_json::from_str(input)?;
        if doc.node(doc.root).map(|n| &n.kind) != Some(&NodeKind::Root) {
            return Err(TableError::InvalidDocument(
                "root id does not point at a root node".to_string(),
            ));
        }
        doc.reindex()?;
        Ok(doc)
    }

    #[cfg(feature = "data-loading")]
    pub fn to_json(&self) -> TableResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Document {
    /// Structural equality: same tree shape and node kinds, ignoring ids
    fn eq(&self, other: &Self) -> bool {
        fn same(a: &Document, x: NodeId, b: &Document, y: NodeId) -> bool {
            match (a.node(x), b.node(y)) {
                (Some(n), Some(m)) => {
                    n.kind == m.kind
                        && n.children.len() == m.children.len()
                        && n
                            .children
                            .iter()
                            .zip(&m.children)
                            .all(|(&c, &d)| same(a, c, b, d))
                }
                _ => false,
            }
        }
        same(self, self.root, other, other.root)
    }
}
