//! Table geometry diagnostics
//!
//! Moves are only as reliable as the spans they are checked against. This
//! module inspects a table and reports:
//!
//! - Rows that do not cover the full table width (the table cannot be
//!   reordered at all)
//! - Spans of zero or less, clamped to 1
//! - Row spans running past the last row, cut to the rows available
//! - Column spans wider than the builder expands
//! - Cells overlapping a row span from above
//! - Rows and columns pinned in place by merged cells
//!
//! ## Example
//!
//! ```rust
//! use tablemove::document::Document;
//! use tablemove::utils::diagnostics::check_table;
//!
//! let doc = Document::from_notation("A | B\nC").unwrap();
//! let result = check_table(&doc, None);
//! assert!(result.has_errors());
//! ```

use std::fmt;

use crate::core::{column_merge_info, row_merge_info, FilledMatrix, GeometryIssue, MAX_COL_SPAN};
use crate::document::{Document, Path, TableHost};
use crate::utils::error::MatrixError;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    /// Informational note
    Info,
    /// Warning - the table was read, but not as written
    Warning,
    /// Error - moves on this table will be rejected
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Info => write!(f, "info"),
            DiagnosticLevel::Warning => write!(f, "warning"),
            DiagnosticLevel::Error => write!(f, "error"),
        }
    }
}

/// A single diagnostic message
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    /// Node the diagnostic refers to
    pub path: Option<Path>,
    /// Notation line (1-indexed)
    pub line: Option<usize>,
    /// Suggested fix
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(level: DiagnosticLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            path: None,
            line: None,
            suggestion: None,
        }
    }

    pub fn with_path(mut self, path: Path) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: level: message
        //         --> node [0, 1, 2]
        //         = help: suggestion

        write!(f, "{}: {}", self.level, self.message)?;

        if let Some(line) = self.line {
            write!(f, "\n  --> line {}", line)?;
        }

        if let Some(ref path) = self.path {
            write!(f, "\n  --> node {}", path)?;
        }

        if let Some(ref suggestion) = self.suggestion {
            write!(f, "\n  = help: {}", suggestion)?;
        }

        Ok(())
    }
}

/// Check result with summary
#[derive(Debug, Default)]
pub struct CheckResult {
    pub diagnostics: Vec<Diagnostic>,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl CheckResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diag: Diagnostic) {
        match diag.level {
            DiagnosticLevel::Error => self.errors += 1,
            DiagnosticLevel::Warning => self.warnings += 1,
            DiagnosticLevel::Info => self.infos += 1,
        }
        self.diagnostics.push(diag);
    }

    /// Merge another result into this one
    pub fn extend(&mut self, other: CheckResult) {
        for diag in other.diagnostics {
            self.add(diag);
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if self.errors > 0 {
            parts.push(plural(self.errors, "error"));
        }
        if self.warnings > 0 {
            parts.push(plural(self.warnings, "warning"));
        }
        if self.infos > 0 {
            parts.push(plural(self.infos, "note"));
        }
        if parts.is_empty() {
            "no issues found".to_string()
        } else {
            parts.join(", ")
        }
    }
}

fn plural(count: usize, noun: &str) -> String {
    format!("{} {}{}", count, noun, if count == 1 { "" } else { "s" })
}

/// Check the table at `at` (first table when `None`)
pub fn check_table<H: TableHost + ?Sized>(host: &H, at: Option<&Path>) -> CheckResult {
    let mut result = CheckResult::new();

    let Some(table) = host.find_table(at) else {
        result.add(
            Diagnostic::new(DiagnosticLevel::Error, "no table found")
                .with_suggestion("Point the location at a table or one of its cells"),
        );
        return result;
    };

    let matrix = match FilledMatrix::build(host, Some(&table.path)) {
        Ok(matrix) => matrix,
        Err(MatrixError::MissingCells {
            row,
            expected,
            found,
        }) => {
            let mut diag = Diagnostic::new(
                DiagnosticLevel::Error,
                format!(
                    "row {} covers {} of {} columns; no row or column of this table can be moved",
                    row, found, expected
                ),
            )
            .with_suggestion("Add cells or widen a span so every row covers the same columns");
            if let Some(entry) = host.table_rows(&table.path).get(row) {
                diag = diag.with_path(entry.path.clone());
            }
            result.add(diag);
            return result;
        }
    };

    for issue in matrix.issues() {
        result.add(describe_issue(issue));
    }

    for row in 0..matrix.row_count() {
        let info = row_merge_info(&matrix, row);
        if info.has_external_merges {
            result.add(
                Diagnostic::new(
                    DiagnosticLevel::Info,
                    format!(
                        "row {} is pinned by a merged cell spanning rows {:?}",
                        row, info.blocked_indices
                    ),
                )
                .with_path(matrix.row_entries()[row].path.clone()),
            );
        }
    }

    for column in 0..matrix.column_count() {
        let info = column_merge_info(&matrix, column);
        if info.has_external_merges {
            result.add(Diagnostic::new(
                DiagnosticLevel::Info,
                format!(
                    "column {} is pinned by a merged cell spanning columns {:?}",
                    column, info.blocked_indices
                ),
            ));
        }
    }

    result
}

fn describe_issue(issue: &GeometryIssue) -> Diagnostic {
    match issue {
        GeometryIssue::DegenerateSpan {
            cell,
            row_span,
            col_span,
        } => Diagnostic::new(
            DiagnosticLevel::Warning,
            format!(
                "span rowspan={} colspan={} is treated as 1",
                row_span, col_span
            ),
        )
        .with_path(cell.path.clone())
        .with_suggestion("Spans must be at least 1"),
        GeometryIssue::OverhangingRowSpan {
            cell,
            row,
            row_span,
            available,
        } => Diagnostic::new(
            DiagnosticLevel::Warning,
            format!(
                "rowspan={} in row {} runs past the last row; only {} rows are covered",
                row_span, row, available
            ),
        )
        .with_path(cell.path.clone())
        .with_suggestion(format!("Use rowspan={}", available)),
        GeometryIssue::OversizedColSpan { cell, col_span } => Diagnostic::new(
            DiagnosticLevel::Warning,
            format!(
                "colspan={} is cut to {} columns",
                col_span, MAX_COL_SPAN
            ),
        )
        .with_path(cell.path.clone())
        .with_suggestion(format!("Use at most colspan={}", MAX_COL_SPAN)),
        GeometryIssue::OverlappingSpan { cell, row, column } => Diagnostic::new(
            DiagnosticLevel::Warning,
            format!(
                "cell overlaps a row span from above at row {}, column {}",
                row, column
            ),
        )
        .with_path(cell.path.clone())
        .with_suggestion("Remove a cell from this row or shorten the span above"),
    }
}

/// Parse notation and check every table in it
pub fn check_notation(input: &str) -> CheckResult {
    let doc = match Document::from_notation(input) {
        Ok(doc) => doc,
        Err(err) => {
            let mut result = CheckResult::new();
            result.add(Diagnostic::new(DiagnosticLevel::Error, err.message).with_line(err.line));
            return result;
        }
    };
    check_document(&doc)
}

/// Check every table of a document
pub fn check_document(doc: &Document) -> CheckResult {
    let tables = doc.tables();
    if tables.is_empty() {
        return check_table(doc, None);
    }

    let mut result = CheckResult::new();
    for table in &tables {
        result.extend(check_table(doc, Some(&table.path)));
    }
    result
}

/// Format check results for terminal output
pub fn format_diagnostics(result: &CheckResult, use_color: bool) -> String {
    let mut output = String::new();

    for diag in &result.diagnostics {
        if use_color {
            let color = match diag.level {
                DiagnosticLevel::Error => "\x1b[31m",   // Red
                DiagnosticLevel::Warning => "\x1b[33m", // Yellow
                DiagnosticLevel::Info => "\x1b[34m",    // Blue
            };
            output.push_str(color);
            output.push_str(&format!("{}", diag));
            output.push_str("\x1b[0m\n\n");
        } else {
            output.push_str(&format!("{}\n\n", diag));
        }
    }

    if use_color {
        if result.has_errors() {
            output.push_str("\x1b[31m");
        } else if result.warnings > 0 {
            output.push_str("\x1b[33m");
        } else {
            output.push_str("\x1b[32m");
        }
    }

    output.push_str(&format!("Summary: {}", result.summary()));

    if use_color {
        output.push_str("\x1b[0m");
    }

    output
}
