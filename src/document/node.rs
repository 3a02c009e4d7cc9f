//! Arena node types for the table document tree

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::path::Path;

/// Stable index of a node inside a [`Document`](super::Document) arena
///
/// Ids survive removal and reinsertion: a detached node keeps its id and
/// its subtree until it is inserted again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Table section a row lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SectionKind {
    Head,
    Body,
    Foot,
}

impl SectionKind {
    /// Marker used by the table notation (`[head]`, `[body]`, `[foot]`)
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Head => "head",
            SectionKind::Body => "body",
            SectionKind::Foot => "foot",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "head" | "thead" => Some(SectionKind::Head),
            "body" | "tbody" => Some(SectionKind::Body),
            "foot" | "tfoot" => Some(SectionKind::Foot),
            _ => None,
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single table cell
///
/// Spans are stored as authored. Documents can come from untrusted edits,
/// so readers go through [`Cell::row_span`] / [`Cell::col_span`], which
/// clamp degenerate values to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cell {
    /// Opaque cell content
    #[cfg_attr(feature = "serde", serde(default))]
    pub content: String,
    /// Number of rows this cell spans, as authored
    #[cfg_attr(feature = "serde", serde(default = "default_span"))]
    pub raw_row_span: i32,
    /// Number of columns this cell spans, as authored
    #[cfg_attr(feature = "serde", serde(default = "default_span"))]
    pub raw_col_span: i32,
    /// Header cell (`th`) rather than data cell (`td`)
    #[cfg_attr(feature = "serde", serde(default))]
    pub header: bool,
}

#[cfg(feature = "serde")]
fn default_span() -> i32 {
    1
}

impl Cell {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            raw_row_span: 1,
            raw_col_span: 1,
            header: false,
        }
    }

    pub fn with_span(content: impl Into<String>, row_span: i32, col_span: i32) -> Self {
        Self {
            content: content.into(),
            raw_row_span: row_span,
            raw_col_span: col_span,
            header: false,
        }
    }

    pub fn as_header(mut self) -> Self {
        self.header = true;
        self
    }

    /// Effective row span (at least 1)
    pub fn row_span(&self) -> usize {
        self.raw_row_span.max(1) as usize
    }

    /// Effective column span (at least 1)
    pub fn col_span(&self) -> usize {
        self.raw_col_span.max(1) as usize
    }

    /// True when either authored span is zero or negative
    pub fn has_degenerate_span(&self) -> bool {
        self.raw_row_span < 1 || self.raw_col_span < 1
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// What a node is
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum NodeKind {
    Root,
    Table,
    Section { section: SectionKind },
    Row,
    Cell(Cell),
}

/// Kind filter for tree queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeMatch {
    Table,
    /// Any section
    Section,
    Row,
    Cell,
}

impl NodeMatch {
    pub fn matches(&self, kind: &NodeKind) -> bool {
        matches!(
            (self, kind),
            (NodeMatch::Table, NodeKind::Table)
                | (NodeMatch::Section, NodeKind::Section { .. })
                | (NodeMatch::Row, NodeKind::Row)
                | (NodeMatch::Cell, NodeKind::Cell(_))
        )
    }
}

/// An arena slot
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node {
    pub kind: NodeKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn cell(&self) -> Option<&Cell> {
        match &self.kind {
            NodeKind::Cell(cell) => Some(cell),
            _ => None,
        }
    }
}

/// A node together with the path it was found at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeEntry {
    pub id: NodeId,
    pub path: Path,
}

impl NodeEntry {
    pub fn new(id: NodeId, path: Path) -> Self {
        Self { id, path }
    }
}
