//! Error handling for table documents
//!
//! Move validation never fails with an error: its outcome is a
//! [`MoveValidation`](crate::core::MoveValidation) value. The types here
//! cover the ways documents themselves can be malformed or mis-edited.

use thiserror::Error;

use crate::document::{NodeId, Path};

/// A structural edit could not be applied
///
/// The document is left exactly as it was before the edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("no node at path {0}")]
    MissingNode(Path),
    #[error("the document root cannot be removed or replaced")]
    RootEdit,
    #[error("cannot insert at index {index} of {parent}: it has {len} children")]
    InsertOutOfRange {
        parent: Path,
        index: usize,
        len: usize,
    },
    #[error("node {0} is still attached to the tree")]
    NodeAttached(NodeId),
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
}

/// The filled matrix of a table could not be made rectangular
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    #[error("row {row} covers {found} of {expected} columns")]
    MissingCells {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Table notation could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct NotationError {
    /// 1-based line number
    pub line: usize,
    pub message: String,
}

impl NotationError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Crate-level error type
#[derive(Debug, Error)]
pub enum TableError {
    #[error("notation error at {0}")]
    Notation(#[from] NotationError),
    #[error("edit rejected: {0}")]
    Edit(#[from] EditError),
    #[error("malformed table: {0}")]
    Matrix(#[from] MatrixError),
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[cfg(feature = "data-loading")]
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for document operations
pub type TableResult<T> = Result<T, TableError>;
