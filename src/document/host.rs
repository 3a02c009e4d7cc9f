//! The document capabilities the move core depends on
//!
//! The core never owns a table. It queries the host for nodes, classifies
//! rows by section, and hands back a single [`Edit`] to apply. Editors
//! embedding the core implement this trait over their own tree;
//! [`Document`] implements it for the crate's arena.

use super::edit::Edit;
use super::node::{Cell, NodeEntry, NodeId, NodeMatch, SectionKind};
use super::path::Path;
use super::Document;
use crate::utils::error::EditError;

/// Trait for the host document tree
pub trait TableHost {
    /// Nodes of `kind` at a location, in document order
    ///
    /// With `Some(path)`, matching ancestors of `path` come first
    /// (outermost first), followed by the node at `path` and its
    /// descendants.
    fn nodes(&self, at: Option<&Path>, kind: NodeMatch) -> Vec<NodeEntry>;

    /// Cell data of a cell node
    fn cell(&self, id: NodeId) -> Option<&Cell>;

    /// Kind of the section enclosing the node at `path`
    fn section_of(&self, path: &Path) -> Option<SectionKind>;

    /// Apply all operations of `edit` as one unit, without running any
    /// normalization between them
    fn apply(&mut self, edit: Edit) -> Result<(), EditError>;

    /// The table at or around a location
    fn find_table(&self, at: Option<&Path>) -> Option<NodeEntry> {
        self.nodes(at, NodeMatch::Table).into_iter().next()
    }

    /// Rows of a table across all of its sections
    fn table_rows(&self, table: &Path) -> Vec<NodeEntry> {
        self.nodes(Some(table), NodeMatch::Row)
            .into_iter()
            .filter(|row| table.is_ancestor_of(&row.path))
            .collect()
    }

    /// Cells of a row, left to right
    fn row_cells(&self, row: &Path) -> Vec<NodeEntry> {
        self.nodes(Some(row), NodeMatch::Cell)
            .into_iter()
            .filter(|cell| row.is_ancestor_of(&cell.path))
            .collect()
    }
}

impl TableHost for Document {
    fn nodes(&self, at: Option<&Path>, kind: NodeMatch) -> Vec<NodeEntry> {
        self.nodes_at(at, kind)
    }

    fn cell(&self, id: NodeId) -> Option<&Cell> {
        Document::cell(self, id)
    }

    fn section_of(&self, path: &Path) -> Option<SectionKind> {
        self.section_at(path)
    }

    fn apply(&mut self, edit: Edit) -> Result<(), EditError> {
        self.apply_edit(edit)
    }
}
