//! # tablemove
//!
//! Span-aware row and column reordering for tables with merged cells.
//!
//! ## Features
//!
//! - **Filled Matrix**: expands rows of cells into a rectangular grid that
//!   knows, for every position, where it sits inside its merged cell
//! - **Merge Analysis**: tells internal merges (movable along) from
//!   external ones (pinning a row or column in place)
//! - **Validation**: every move is checked before anything changes, with a
//!   machine-readable reason when it is rejected
//! - **Atomic Execution**: a move is one remove-then-insert edit, applied
//!   as a unit
//! - **WASM Support**: compiles to WebAssembly for drag-and-drop editors
//!
//! ## Usage Examples
//!
//! ### Moving Rows
//!
//! ```rust
//! use tablemove::{move_row, Document, MoveOptions};
//!
//! let mut doc = Document::from_notation("[head]\nName | Qty\n[body]\nA | 1\nB | 2").unwrap();
//! assert!(move_row(&mut doc, 2, 1, &MoveOptions::default()));
//! assert_eq!(doc.to_notation(), "[head]\nName | Qty\n[body]\nB | 2\nA | 1\n");
//!
//! // Header rows stay put
//! assert!(!move_row(&mut doc, 0, 2, &MoveOptions::default()));
//! ```
//!
//! ### Asking Before Moving
//!
//! ```rust
//! use tablemove::{validate_column_move, BlockedBy, Document, MoveOptions};
//!
//! let doc = Document::from_notation("A {colspan=2} | B\nC | D | E").unwrap();
//! let result = validate_column_move(&doc, 1, 2, &MoveOptions::default());
//! assert!(!result.can_move);
//! assert_eq!(result.blocked_by, Some(BlockedBy::ExternalMerge));
//! ```

/// Span-aware move engine
pub mod core;

/// In-memory table documents
pub mod document;

/// Utility modules
pub mod utils;

/// WASM bindings (feature-gated)
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export the move engine
pub use core::{
    can_move_column, can_move_row, execute_column_move, execute_row_move, movable_column_indices,
    movable_row_indices, move_column, move_row, plan_column_move, plan_row_move,
    valid_column_drop_positions, valid_row_drop_positions, validate_column_move,
    validate_row_move, Axis, BlockedBy, FilledMatrix, MergeInfo, MoveOptions, MoveValidation,
    MoveValidator, MAX_COL_SPAN,
};

// Re-export the document model
pub use document::{Cell, Document, Edit, EditOp, NodeEntry, NodeId, Path, SectionKind, TableHost};

// Re-export utilities
pub use utils::diagnostics;
pub use utils::error::{EditError, MatrixError, NotationError, TableError, TableResult};

/// Move a row of a table written in notation
///
/// Returns the re-rendered notation, or `None` when the move is rejected.
pub fn move_row_in_notation(
    input: &str,
    from: usize,
    to: usize,
    options: &MoveOptions,
) -> TableResult<Option<String>> {
    let mut doc = Document::from_notation(input)?;
    Ok(move_row(&mut doc, from, to, options).then(|| doc.to_notation()))
}

/// Move a column of a table written in notation
///
/// Returns the re-rendered notation, or `None` when the move is rejected.
pub fn move_column_in_notation(
    input: &str,
    from: usize,
    to: usize,
    options: &MoveOptions,
) -> TableResult<Option<String>> {
    let mut doc = Document::from_notation(input)?;
    Ok(move_column(&mut doc, from, to, options).then(|| doc.to_notation()))
}

/// Render the filled matrix of a table written in notation
///
/// Shadow positions are prefixed with `^` (covered from above) or `<`
/// (covered from the left).
pub fn describe_grid(input: &str, options: &MoveOptions) -> TableResult<String> {
    let doc = Document::from_notation(input)?;
    let matrix = FilledMatrix::build(&doc, options.at.as_ref())?;
    Ok(matrix.describe(&doc))
}
