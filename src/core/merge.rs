//! Merge analysis over the filled matrix
//!
//! A merged cell is *internal* to the row (column) being examined when its
//! origin lies in that row (column), and *external* when the row (column)
//! only holds a shadow of a cell that starts elsewhere. External merges pin
//! a row or column in place: moving it would cut the merged cell apart.

use indexmap::IndexSet;
use std::collections::BTreeSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::matrix::FilledMatrix;
use crate::document::{NodeEntry, SectionKind, TableHost};

/// Direction of a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Axis {
    Row,
    Column,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
        }
    }
}

/// Merge summary of one row or column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeInfo {
    pub has_internal_merges: bool,
    pub has_external_merges: bool,
    /// Merged cells touching the row/column, first occurrence order
    pub merged_cells: Vec<NodeEntry>,
    /// Other indices tied to this one by external merges, ascending
    pub blocked_indices: Vec<usize>,
}

/// Accumulates one [`MergeInfo`]
#[derive(Default)]
struct MergeScan {
    internal: bool,
    external: bool,
    merged: IndexSet<NodeEntry>,
    blocked: BTreeSet<usize>,
}

impl MergeScan {
    fn finish(self) -> MergeInfo {
        MergeInfo {
            has_internal_merges: self.internal,
            has_external_merges: self.external,
            merged_cells: self.merged.into_iter().collect(),
            blocked_indices: self.blocked.into_iter().collect(),
        }
    }
}

/// Merge info of grid row `row_index`
///
/// Out-of-range rows yield an empty [`MergeInfo`].
pub fn row_merge_info(matrix: &FilledMatrix, row_index: usize) -> MergeInfo {
    let Some(row) = matrix.row(row_index) else {
        return MergeInfo::default();
    };

    let mut scan = MergeScan::default();
    for pos in row {
        if pos.row_span > 1 {
            scan.merged.insert(pos.entry.clone());
            if pos.context.ttb == 1 {
                scan.internal = true;
            } else {
                scan.external = true;
                let first = row_index + 1 - pos.context.ttb;
                let end = row_index + pos.context.btt;
                scan.blocked.extend((first..end).filter(|&i| i != row_index));
            }
        }
        // Column spans never cross rows
        if pos.col_span > 1 {
            scan.merged.insert(pos.entry.clone());
            scan.internal = true;
        }
    }
    scan.finish()
}

/// Merge info of grid column `column_index`
///
/// Mirror image of [`row_merge_info`]. Out-of-range columns yield an empty
/// [`MergeInfo`].
pub fn column_merge_info(matrix: &FilledMatrix, column_index: usize) -> MergeInfo {
    let mut scan = MergeScan::default();
    for pos in matrix.column(column_index) {
        if pos.col_span > 1 {
            scan.merged.insert(pos.entry.clone());
            if pos.context.ltr == 1 {
                scan.internal = true;
            } else {
                scan.external = true;
                let first = column_index + 1 - pos.context.ltr;
                let end = column_index + pos.context.rtl;
                scan.blocked.extend((first..end).filter(|&i| i != column_index));
            }
        }
        if pos.row_span > 1 {
            scan.merged.insert(pos.entry.clone());
            scan.internal = true;
        }
    }
    scan.finish()
}

pub fn merge_info(matrix: &FilledMatrix, axis: Axis, index: usize) -> MergeInfo {
    match axis {
        Axis::Row => row_merge_info(matrix, index),
        Axis::Column => column_merge_info(matrix, index),
    }
}

/// True when the first cell of the row sits in a `head` section
pub fn is_header_row<H: TableHost + ?Sized>(
    host: &H,
    matrix: &FilledMatrix,
    row_index: usize,
) -> bool {
    let Some(first) = matrix.get(row_index, 0) else {
        return false;
    };
    host.section_of(&first.entry.path) == Some(SectionKind::Head)
}

pub fn is_row_movable<H: TableHost + ?Sized>(
    host: &H,
    matrix: &FilledMatrix,
    row_index: usize,
) -> bool {
    if is_header_row(host, matrix, row_index) {
        return false;
    }
    !row_merge_info(matrix, row_index).has_external_merges
}

/// Columns have no header exclusion: only rows live in sections
pub fn is_column_movable(matrix: &FilledMatrix, column_index: usize) -> bool {
    !column_merge_info(matrix, column_index).has_external_merges
}

/// Whether moving `from` to `to` keeps every merged cell on the path whole
///
/// Each index between the two (excluding `from`, including `to`) is
/// checked; a move is rejected when one of them is pinned by an external
/// merge that also covers `from` or `to`.
pub fn can_move_around_merged_cells(
    matrix: &FilledMatrix,
    from: usize,
    to: usize,
    axis: Axis,
) -> bool {
    let start = from.min(to);
    let end = from.max(to);

    (start..=end).filter(|&i| i != from).all(|i| {
        let info = merge_info(matrix, axis, i);
        !(info.has_external_merges
            && (info.blocked_indices.contains(&from) || info.blocked_indices.contains(&to)))
    })
}

/// Rows that can be dragged at all, ascending
pub fn movable_rows<H: TableHost + ?Sized>(host: &H, matrix: &FilledMatrix) -> Vec<usize> {
    (0..matrix.row_count())
        .filter(|&i| is_row_movable(host, matrix, i))
        .collect()
}

/// Columns that can be dragged at all, ascending
pub fn movable_columns(matrix: &FilledMatrix) -> Vec<usize> {
    (0..matrix.column_count())
        .filter(|&i| is_column_movable(matrix, i))
        .collect()
}
