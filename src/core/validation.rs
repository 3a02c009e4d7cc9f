//! Move validation
//!
//! Every check runs against a freshly built [`FilledMatrix`] and is
//! read-only. A validation walks a fixed list of checks and stops at the
//! first one that fails:
//!
//! ```text
//! same-position -> out-of-bounds -> header (rows only)
//!   -> source external merge -> destination external merge -> merge conflict
//! ```

use std::fmt;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::matrix::FilledMatrix;
use super::merge::{
    can_move_around_merged_cells, column_merge_info, is_header_row, movable_columns,
    movable_rows, row_merge_info, Axis,
};
use crate::document::{Path, TableHost};
use crate::utils::error::MatrixError;

/// Why a move was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum BlockedBy {
    Header,
    ExternalMerge,
    MergeConflict,
    SamePosition,
    OutOfBounds,
}

impl BlockedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockedBy::Header => "header",
            BlockedBy::ExternalMerge => "external-merge",
            BlockedBy::MergeConflict => "merge-conflict",
            BlockedBy::SamePosition => "same-position",
            BlockedBy::OutOfBounds => "out-of-bounds",
        }
    }
}

impl fmt::Display for BlockedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a validation
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MoveValidation {
    pub can_move: bool,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub reason: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub blocked_by: Option<BlockedBy>,
}

impl MoveValidation {
    pub fn allowed() -> Self {
        Self {
            can_move: true,
            reason: None,
            blocked_by: None,
        }
    }

    pub fn blocked(by: BlockedBy, reason: impl Into<String>) -> Self {
        Self {
            can_move: false,
            reason: Some(reason.into()),
            blocked_by: Some(by),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.can_move
    }
}

impl fmt::Display for MoveValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.blocked_by, &self.reason) {
            (None, _) => write!(f, "allowed"),
            (Some(by), Some(reason)) => write!(f, "blocked ({}): {}", by, reason),
            (Some(by), None) => write!(f, "blocked ({})", by),
        }
    }
}

/// Options shared by validation and execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveOptions {
    /// Location of the table; the first table in the document when `None`
    pub at: Option<Path>,
}

impl MoveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, path: impl Into<Path>) -> Self {
        self.at = Some(path.into());
        self
    }
}

/// Validator bound to one snapshot of a table
///
/// Building the validator builds the filled matrix once; every check made
/// through it reads that matrix. Drop it before mutating the table.
pub struct MoveValidator<'a, H: TableHost + ?Sized> {
    host: &'a H,
    matrix: FilledMatrix,
}

impl<'a, H: TableHost + ?Sized> MoveValidator<'a, H> {
    pub fn new(host: &'a H, options: &MoveOptions) -> Result<Self, MatrixError> {
        let matrix = FilledMatrix::build(host, options.at.as_ref())?;
        Ok(Self { host, matrix })
    }

    pub fn matrix(&self) -> &FilledMatrix {
        &self.matrix
    }

    fn axis_len(&self, axis: Axis) -> usize {
        match axis {
            Axis::Row => self.matrix.row_count(),
            Axis::Column => self.matrix.column_count(),
        }
    }

    fn out_of_bounds(&self, axis: Axis, index: usize) -> Option<MoveValidation> {
        let len = self.axis_len(axis);
        (index >= len).then(|| {
            MoveValidation::blocked(
                BlockedBy::OutOfBounds,
                format!("{} {} is out of bounds (table has {})", axis, index, len),
            )
        })
    }

    fn has_external_merges(&self, axis: Axis, index: usize) -> bool {
        match axis {
            Axis::Row => row_merge_info(&self.matrix, index).has_external_merges,
            Axis::Column => column_merge_info(&self.matrix, index).has_external_merges,
        }
    }

    fn is_header(&self, row: usize) -> bool {
        is_header_row(self.host, &self.matrix, row)
    }

    /// Full from -> to validation along `axis`
    pub fn validate(&self, axis: Axis, from: usize, to: usize) -> MoveValidation {
        let result = self.run_checks(axis, from, to);
        if !result.can_move {
            debug!(%axis, from, to, blocked_by = ?result.blocked_by, "move rejected");
        }
        result
    }

    fn run_checks(&self, axis: Axis, from: usize, to: usize) -> MoveValidation {
        if from == to {
            return MoveValidation::blocked(
                BlockedBy::SamePosition,
                "Source and destination positions are the same",
            );
        }

        if let Some(blocked) = self
            .out_of_bounds(axis, from)
            .or_else(|| self.out_of_bounds(axis, to))
        {
            return blocked;
        }

        if axis == Axis::Row {
            if self.is_header(from) {
                return MoveValidation::blocked(BlockedBy::Header, "Header rows cannot be moved");
            }
            if self.is_header(to) {
                return MoveValidation::blocked(
                    BlockedBy::Header,
                    "Cannot move row to header section",
                );
            }
        }

        if self.has_external_merges(axis, from) {
            return MoveValidation::blocked(
                BlockedBy::ExternalMerge,
                format!(
                    "Source {} has external merged cells that prevent movement",
                    axis
                ),
            );
        }

        // Any external merge at the destination rejects the move, even one
        // that does not involve the source
        if self.has_external_merges(axis, to) {
            return MoveValidation::blocked(
                BlockedBy::ExternalMerge,
                "Destination position has external merged cells that prevent movement",
            );
        }

        if !can_move_around_merged_cells(&self.matrix, from, to, axis) {
            return MoveValidation::blocked(
                BlockedBy::MergeConflict,
                "Move path conflicts with merged cells",
            );
        }

        MoveValidation::allowed()
    }

    pub fn validate_row_move(&self, from: usize, to: usize) -> MoveValidation {
        self.validate(Axis::Row, from, to)
    }

    pub fn validate_column_move(&self, from: usize, to: usize) -> MoveValidation {
        self.validate(Axis::Column, from, to)
    }

    /// Whether a row can be dragged at all, independent of any target
    pub fn check_row(&self, row: usize) -> MoveValidation {
        if let Some(blocked) = self.out_of_bounds(Axis::Row, row) {
            return blocked;
        }
        if self.is_header(row) {
            return MoveValidation::blocked(BlockedBy::Header, "Header rows cannot be moved");
        }
        if self.has_external_merges(Axis::Row, row) {
            return MoveValidation::blocked(
                BlockedBy::ExternalMerge,
                "Row has external merged cells that prevent movement",
            );
        }
        MoveValidation::allowed()
    }

    /// Whether a column can be dragged at all, independent of any target
    pub fn check_column(&self, column: usize) -> MoveValidation {
        if let Some(blocked) = self.out_of_bounds(Axis::Column, column) {
            return blocked;
        }
        if self.has_external_merges(Axis::Column, column) {
            return MoveValidation::blocked(
                BlockedBy::ExternalMerge,
                "Column has external merged cells that prevent movement",
            );
        }
        MoveValidation::allowed()
    }

    /// Every legal destination for `source` along `axis`, ascending
    pub fn drop_positions(&self, axis: Axis, source: usize) -> Vec<usize> {
        let movable = match axis {
            Axis::Row => self.check_row(source),
            Axis::Column => self.check_column(source),
        };
        if !movable.can_move {
            return Vec::new();
        }

        (0..self.axis_len(axis))
            .filter(|&i| i != source && self.validate(axis, source, i).can_move)
            .collect()
    }

    pub fn movable_rows(&self) -> Vec<usize> {
        movable_rows(self.host, &self.matrix)
    }

    pub fn movable_columns(&self) -> Vec<usize> {
        movable_columns(&self.matrix)
    }
}

fn malformed(err: &MatrixError) -> MoveValidation {
    MoveValidation::blocked(BlockedBy::OutOfBounds, format!("Table geometry is malformed: {}", err))
}

fn with_validator<H, F>(host: &H, options: &MoveOptions, check: F) -> MoveValidation
where
    H: TableHost + ?Sized,
    F: FnOnce(&MoveValidator<'_, H>) -> MoveValidation,
{
    match MoveValidator::new(host, options) {
        Ok(validator) => check(&validator),
        Err(err) => malformed(&err),
    }
}

/// Whether `row` can be moved anywhere
pub fn can_move_row<H: TableHost + ?Sized>(
    host: &H,
    row: usize,
    options: &MoveOptions,
) -> MoveValidation {
    with_validator(host, options, |v| v.check_row(row))
}

/// Whether `column` can be moved anywhere
pub fn can_move_column<H: TableHost + ?Sized>(
    host: &H,
    column: usize,
    options: &MoveOptions,
) -> MoveValidation {
    with_validator(host, options, |v| v.check_column(column))
}

pub fn validate_row_move<H: TableHost + ?Sized>(
    host: &H,
    from: usize,
    to: usize,
    options: &MoveOptions,
) -> MoveValidation {
    with_validator(host, options, |v| v.validate_row_move(from, to))
}

pub fn validate_column_move<H: TableHost + ?Sized>(
    host: &H,
    from: usize,
    to: usize,
    options: &MoveOptions,
) -> MoveValidation {
    with_validator(host, options, |v| v.validate_column_move(from, to))
}

/// Legal destinations for row `source`; empty when the table is malformed
pub fn valid_row_drop_positions<H: TableHost + ?Sized>(
    host: &H,
    source: usize,
    options: &MoveOptions,
) -> Vec<usize> {
    MoveValidator::new(host, options)
        .map(|v| v.drop_positions(Axis::Row, source))
        .unwrap_or_default()
}

/// Legal destinations for column `source`; empty when the table is malformed
pub fn valid_column_drop_positions<H: TableHost + ?Sized>(
    host: &H,
    source: usize,
    options: &MoveOptions,
) -> Vec<usize> {
    MoveValidator::new(host, options)
        .map(|v| v.drop_positions(Axis::Column, source))
        .unwrap_or_default()
}

/// Rows that can be dragged at all
pub fn movable_row_indices<H: TableHost + ?Sized>(host: &H, options: &MoveOptions) -> Vec<usize> {
    MoveValidator::new(host, options)
        .map(|v| v.movable_rows())
        .unwrap_or_default()
}

/// Columns that can be dragged at all
pub fn movable_column_indices<H: TableHost + ?Sized>(
    host: &H,
    options: &MoveOptions,
) -> Vec<usize> {
    MoveValidator::new(host, options)
        .map(|v| v.movable_columns())
        .unwrap_or_default()
}
