//! Span-aware occupancy grid ("filled matrix")
//!
//! A table is stored as rows of cell nodes, but a cell with a row or column
//! span covers a rectangle of grid positions. [`FilledMatrix`] expands the
//! tree into that grid: every position holds the cell that covers it plus
//! a [`SpanContext`] telling where inside the cell's rectangle it lies.
//!
//! ```text
//! tree                      grid
//! [A rs=2] [B]              A(1,2,1,1) B(1,1,1,1)
//! [C]                       A(2,1,1,1) C(1,1,1,1)
//! ```
//!
//! The grid is rebuilt on every query; any edit invalidates it.

use fxhash::FxHashMap;
use std::fmt::Write;
use tracing::warn;

use crate::document::{NodeEntry, Path, TableHost};
use crate::utils::error::MatrixError;

/// Widest column span the builder expands; larger spans are cut to it.
/// Same limit HTML puts on `colspan`.
pub const MAX_COL_SPAN: usize = 1000;

/// Where a grid position lies inside the cell covering it
///
/// `ttb` and `ltr` count from the cell's origin (1 at the origin row /
/// column). `btt` and `rtl` count the rows / columns still covered from
/// this position on, including it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanContext {
    pub ttb: usize,
    pub btt: usize,
    pub ltr: usize,
    pub rtl: usize,
}

impl SpanContext {
    /// True at the position where the cell node actually lives
    pub fn is_origin(&self) -> bool {
        self.ttb == 1 && self.ltr == 1
    }

    /// True when the cell started in an earlier row
    pub fn is_row_shadow(&self) -> bool {
        self.ttb > 1
    }

    /// True when the cell started in an earlier column
    pub fn is_column_shadow(&self) -> bool {
        self.ltr > 1
    }
}

/// One grid position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixCell {
    /// The covering cell node
    pub entry: NodeEntry,
    /// Effective row span (clamped)
    pub row_span: usize,
    /// Effective column span (clamped)
    pub col_span: usize,
    pub context: SpanContext,
}

/// Span data the builder clamped or resolved on its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryIssue {
    /// A span of zero or less, treated as 1
    DegenerateSpan {
        cell: NodeEntry,
        row_span: i32,
        col_span: i32,
    },
    /// A row span running past the last row, cut to the rows available
    OverhangingRowSpan {
        cell: NodeEntry,
        row: usize,
        row_span: usize,
        available: usize,
    },
    /// A column span wider than [`MAX_COL_SPAN`], cut to it
    OversizedColSpan { cell: NodeEntry, col_span: usize },
    /// A cell placed over a position already covered by a row span from
    /// above; the span from above is cut off at that column
    OverlappingSpan { cell: NodeEntry, row: usize, column: usize },
}

/// A row span still covering columns of upcoming rows
#[derive(Debug, Clone)]
struct Carry {
    entry: NodeEntry,
    row_span: usize,
    col_span: usize,
    /// `ttb` of the next row this carry lands in
    ttb: usize,
    /// Column offset inside the cell (1-based)
    ltr: usize,
}

impl Carry {
    fn place(&self) -> MatrixCell {
        MatrixCell {
            entry: self.entry.clone(),
            row_span: self.row_span,
            col_span: self.col_span,
            context: SpanContext {
                ttb: self.ttb,
                btt: self.row_span - self.ttb + 1,
                ltr: self.ltr,
                rtl: self.col_span - self.ltr + 1,
            },
        }
    }
}

/// Cut the row span covering `column` above `row` to `row_span` rows
fn shorten(grid: &mut [Vec<MatrixCell>], row: usize, column: usize, row_span: usize) {
    for grid_row in &mut grid[row - row_span..row] {
        if let Some(pos) = grid_row.get_mut(column) {
            pos.row_span = row_span;
            pos.context.btt = row_span + 1 - pos.context.ttb;
        }
    }
}

/// Rectangular occupancy grid of one table
#[derive(Debug, Clone, Default)]
pub struct FilledMatrix {
    table: Option<NodeEntry>,
    rows: Vec<NodeEntry>,
    grid: Vec<Vec<MatrixCell>>,
    issues: Vec<GeometryIssue>,
}

impl FilledMatrix {
    /// Build the grid of the table at `at` (first table when `None`)
    ///
    /// Returns an empty matrix when there is no table. Degenerate and
    /// overhanging spans are clamped and recorded in [`issues`]; rows that
    /// end up narrower than the widest row are an error, the grid is never
    /// padded.
    ///
    /// [`issues`]: FilledMatrix::issues
    pub fn build<H: TableHost + ?Sized>(host: &H, at: Option<&Path>) -> Result<Self, MatrixError> {
        let Some(table) = host.find_table(at) else {
            return Ok(Self::default());
        };

        let rows = host.table_rows(&table.path);
        let row_count = rows.len();
        let mut grid: Vec<Vec<MatrixCell>> = Vec::with_capacity(row_count);
        let mut issues = Vec::new();
        let mut carry: FxHashMap<usize, Carry> = FxHashMap::default();

        for (row_idx, row) in rows.iter().enumerate() {
            let mut cells = host.row_cells(&row.path).into_iter();
            let mut grid_row = Vec::new();
            let mut col = 0;

            loop {
                // Column covered by a row span from above
                if let Some(pending) = carry.remove(&col) {
                    let placed = pending.place();
                    if placed.context.btt > 1 {
                        carry.insert(
                            col,
                            Carry {
                                ttb: pending.ttb + 1,
                                ..pending
                            },
                        );
                    }
                    grid_row.push(placed);
                    col += 1;
                    continue;
                }

                let Some(entry) = cells.next() else {
                    break;
                };
                let Some(cell) = host.cell(entry.id) else {
                    continue;
                };

                if cell.has_degenerate_span() {
                    warn!(path = %entry.path, row_span = cell.raw_row_span, col_span = cell.raw_col_span, "clamping degenerate span");
                    issues.push(GeometryIssue::DegenerateSpan {
                        cell: entry.clone(),
                        row_span: cell.raw_row_span,
                        col_span: cell.raw_col_span,
                    });
                }

                let mut col_span = cell.col_span();
                if col_span > MAX_COL_SPAN {
                    warn!(path = %entry.path, col_span, "column span too wide");
                    issues.push(GeometryIssue::OversizedColSpan {
                        cell: entry.clone(),
                        col_span,
                    });
                    col_span = MAX_COL_SPAN;
                }
                let available = row_count - row_idx;
                let mut row_span = cell.row_span();
                if row_span > available {
                    warn!(path = %entry.path, row_span, available, "row span runs past the last row");
                    issues.push(GeometryIssue::OverhangingRowSpan {
                        cell: entry.clone(),
                        row: row_idx,
                        row_span,
                        available,
                    });
                    row_span = available;
                }

                for offset in 0..col_span {
                    if let Some(cut) = carry.remove(&col) {
                        warn!(path = %entry.path, row = row_idx, column = col, "cell overlaps a row span");
                        issues.push(GeometryIssue::OverlappingSpan {
                            cell: entry.clone(),
                            row: row_idx,
                            column: col,
                        });
                        shorten(&mut grid, row_idx, col, cut.ttb - 1);
                    }

                    let ltr = offset + 1;
                    grid_row.push(MatrixCell {
                        entry: entry.clone(),
                        row_span,
                        col_span,
                        context: SpanContext {
                            ttb: 1,
                            btt: row_span,
                            ltr,
                            rtl: col_span - offset,
                        },
                    });
                    if row_span > 1 {
                        carry.insert(
                            col,
                            Carry {
                                entry: entry.clone(),
                                row_span,
                                col_span,
                                ttb: 2,
                                ltr,
                            },
                        );
                    }
                    col += 1;
                }
            }

            grid.push(grid_row);
        }

        let expected = grid.iter().map(Vec::len).max().unwrap_or(0);
        if let Some((row, found)) = grid
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != expected)
        {
            return Err(MatrixError::MissingCells {
                row,
                expected,
                found,
            });
        }

        Ok(Self {
            table: Some(table),
            rows,
            grid,
            issues,
        })
    }

    /// The table this grid was built from
    pub fn table(&self) -> Option<&NodeEntry> {
        self.table.as_ref()
    }

    /// Row nodes in grid order
    pub fn row_entries(&self) -> &[NodeEntry] {
        &self.rows
    }

    pub fn rows(&self) -> &[Vec<MatrixCell>] {
        &self.grid
    }

    pub fn row(&self, index: usize) -> Option<&[MatrixCell]> {
        self.grid.get(index).map(Vec::as_slice)
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&MatrixCell> {
        self.grid.get(row)?.get(column)
    }

    /// Positions of one column, top to bottom
    pub fn column(&self, index: usize) -> impl Iterator<Item = &MatrixCell> + '_ {
        self.grid.iter().filter_map(move |row| row.get(index))
    }

    pub fn row_count(&self) -> usize {
        self.grid.len()
    }

    pub fn column_count(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn issues(&self) -> &[GeometryIssue] {
        &self.issues
    }

    /// Render the grid with cell contents
    ///
    /// Shadow positions show the covering cell's content prefixed with `^`
    /// (covered from above) or `<` (covered from the left).
    pub fn describe<H: TableHost + ?Sized>(&self, host: &H) -> String {
        let labels: Vec<Vec<String>> = self
            .grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|pos| {
                        let content = host
                            .cell(pos.entry.id)
                            .map(|c| c.content.as_str())
                            .unwrap_or("?");
                        if pos.context.is_row_shadow() {
                            format!("^{}", content)
                        } else if pos.context.is_column_shadow() {
                            format!("<{}", content)
                        } else {
                            content.to_string()
                        }
                    })
                    .collect()
            })
            .collect();

        let width = labels
            .iter()
            .flatten()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for row in &labels {
            let line: Vec<String> = row.iter().map(|l| format!("{:<width$}", l)).collect();
            let _ = writeln!(out, "{}", line.join(" | ").trim_end());
        }
        out
    }
}
