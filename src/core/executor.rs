//! Move execution
//!
//! Planning turns a move into one [`Edit`] that detaches the moved nodes
//! and reinserts them at their destination; the host applies it as a
//! single unit. Planning does not validate: [`move_row`] and
//! [`move_column`] validate first and only plan once the move is legal.
//!
//! Destinations follow "insert before whatever now sits at `to`": once the
//! source is taken out, the node is inserted before the row (or cell) that
//! held index `to`, or appended when `to` was the last index.

use tracing::{debug, trace, warn};

use super::matrix::FilledMatrix;
use super::validation::{MoveOptions, MoveValidator};
use crate::document::{Edit, Path, TableHost};

/// Plan moving grid row `from` to `to`
///
/// Returns `None` when either index is outside the table.
pub fn plan_row_move(matrix: &FilledMatrix, from: usize, to: usize) -> Option<Edit> {
    let rows = matrix.row_entries();
    if from >= rows.len() || to >= rows.len() {
        return None;
    }

    let source = &rows[from];
    let remaining: Vec<Path> = rows
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != from)
        .filter_map(|(_, row)| row.path.transform_remove(&source.path))
        .collect();

    let target = if to >= remaining.len() {
        remaining.last()?.next()
    } else {
        let adjusted = if from < to { to - 1 } else { to };
        remaining[adjusted].clone()
    };

    let mut edit = Edit::new();
    edit.relocate(source.id, source.path.clone(), target);
    Some(edit)
}

/// Plan moving grid column `from` to `to`
///
/// Columns are virtual, so the plan works row by row over the filled
/// matrix. Positions where the cell at `from` is a shadow (its origin lies
/// in an earlier row or column) are skipped: that cell is moved by the row
/// holding its origin, if at all. Insertion indices are counted in origin
/// cells, so rows holding shadows of row spans land in the right place.
pub fn plan_column_move(matrix: &FilledMatrix, from: usize, to: usize) -> Option<Edit> {
    let width = matrix.column_count();
    if from >= width || to >= width {
        return None;
    }
    let append = from < to && to == width - 1;

    let mut edit = Edit::new();
    for (row_idx, grid_row) in matrix.rows().iter().enumerate() {
        let source = &grid_row[from];
        if source.context.is_column_shadow() || source.context.is_row_shadow() {
            trace!(row = row_idx, column = from, "skipping shadow position");
            continue;
        }

        let row_path = source.entry.path.parent()?;
        let mut before = 0;
        let mut remaining = 0;
        for (col, pos) in grid_row.iter().enumerate() {
            if col == from || !pos.context.is_origin() {
                continue;
            }
            remaining += 1;
            if col < to {
                before += 1;
            }
        }
        let index = if append { remaining } else { before };

        trace!(row = row_idx, from = %source.entry.path, index, "moving cell");
        edit.relocate(source.entry.id, source.entry.path.clone(), row_path.child(index));
    }

    Some(edit)
}

fn apply<H: TableHost + ?Sized>(host: &mut H, edit: Edit) -> bool {
    let ops = edit.len();
    match host.apply(edit) {
        Ok(()) => {
            debug!(ops, "move applied");
            true
        }
        Err(err) => {
            warn!(error = %err, "move edit rejected by host");
            false
        }
    }
}

/// Move a row without validating it first
///
/// The caller must already hold a positive validation for this move.
pub fn execute_row_move<H: TableHost + ?Sized>(
    host: &mut H,
    from: usize,
    to: usize,
    options: &MoveOptions,
) -> bool {
    let edit = match FilledMatrix::build(&*host, options.at.as_ref()) {
        Ok(matrix) => plan_row_move(&matrix, from, to),
        Err(_) => None,
    };
    edit.is_some_and(|edit| apply(host, edit))
}

/// Move a column without validating it first
///
/// The caller must already hold a positive validation for this move.
pub fn execute_column_move<H: TableHost + ?Sized>(
    host: &mut H,
    from: usize,
    to: usize,
    options: &MoveOptions,
) -> bool {
    let edit = match FilledMatrix::build(&*host, options.at.as_ref()) {
        Ok(matrix) => plan_column_move(&matrix, from, to),
        Err(_) => None,
    };
    edit.is_some_and(|edit| apply(host, edit))
}

/// Validate and move a row
///
/// Returns `false` and leaves the table untouched when the move is not
/// legal or the host rejects the edit.
pub fn move_row<H: TableHost + ?Sized>(
    host: &mut H,
    from: usize,
    to: usize,
    options: &MoveOptions,
) -> bool {
    let edit = {
        let Ok(validator) = MoveValidator::new(&*host, options) else {
            return false;
        };
        if !validator.validate_row_move(from, to).can_move {
            return false;
        }
        plan_row_move(validator.matrix(), from, to)
    };
    edit.is_some_and(|edit| apply(host, edit))
}

/// Validate and move a column
///
/// Returns `false` and leaves the table untouched when the move is not
/// legal or the host rejects the edit.
pub fn move_column<H: TableHost + ?Sized>(
    host: &mut H,
    from: usize,
    to: usize,
    options: &MoveOptions,
) -> bool {
    let edit = {
        let Ok(validator) = MoveValidator::new(&*host, options) else {
            return false;
        };
        if !validator.validate_column_move(from, to).can_move {
            return false;
        }
        plan_column_move(validator.matrix(), from, to)
    };
    edit.is_some_and(|edit| apply(host, edit))
}
