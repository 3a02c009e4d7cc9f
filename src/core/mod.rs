//! Span-aware table move engine
//!
//! Reordering a row or column of a table with merged cells is not an array
//! splice: one cell node can cover several grid positions, so every move is
//! checked and expressed against the derived occupancy grid.
//!
//! # Architecture
//!
//! ```text
//! table tree -> FilledMatrix -> MergeInfo -> MoveValidation -> Edit -> table tree
//! ```
//!
//! - `matrix`: expands rows of cells into the rectangular occupancy grid
//! - `merge`: classifies merges per row/column as internal or external
//! - `validation`: decides whether a move is legal
//! - `executor`: plans and applies the structural edit
//!
//! # Example
//!
//! ```rust
//! use tablemove::core::{move_row, MoveOptions};
//! use tablemove::document::Document;
//!
//! let mut doc = Document::from_notation("R0\nR1\nR2").unwrap();
//! assert!(move_row(&mut doc, 0, 2, &MoveOptions::default()));
//! assert_eq!(doc.to_notation(), "[body]\nR1\nR2\nR0\n");
//! ```

mod executor;
mod matrix;
mod merge;
mod validation;

#[cfg(test)]
mod tests;

// Re-export public API
pub use executor::{
    execute_column_move, execute_row_move, move_column, move_row, plan_column_move,
    plan_row_move,
};
pub use matrix::{FilledMatrix, GeometryIssue, MatrixCell, SpanContext, MAX_COL_SPAN};
pub use merge::{
    can_move_around_merged_cells, column_merge_info, is_column_movable, is_header_row,
    is_row_movable, merge_info, movable_columns, movable_rows, row_merge_info, Axis, MergeInfo,
};
pub use validation::{
    can_move_column, can_move_row, movable_column_indices, movable_row_indices,
    valid_column_drop_positions, valid_row_drop_positions, validate_column_move,
    validate_row_move, BlockedBy, MoveOptions, MoveValidation, MoveValidator,
};
