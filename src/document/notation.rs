//! Compact text notation for table documents
//!
//! ```text
//! # comments start with '#'
//! [head]
//! Name | Q1 | Q2
//! [body]
//! North {rowspan=2} | 10 | 12
//! 11 | 9
//! Total {colspan=3}
//! ---
//! second table | ...
//! ```
//!
//! Rows before any section marker land in an implicit body section.
//! Cells in `[head]` sections are header cells; elsewhere a `th` flag in
//! the attribute block marks one.
//!
//! Inside cell content `\\`, `\|`, `\{` and `\}` stand for the literal
//! character, `\n` and `\r` for line breaks. A leading `\#` or `\[` keeps
//! a row from reading as a comment or section marker. Surrounding
//! whitespace of a cell is not preserved.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::Write;

use super::node::{Cell, NodeId, NodeKind, SectionKind};
use super::Document;
use crate::utils::error::NotationError;

lazy_static! {
    // Section marker: [head], [body], [foot]
    static ref SECTION_PATTERN: Regex = Regex::new(r"^\[\s*(\w+)\s*\]$").unwrap();

    // Trailing attribute block: {rowspan=2 colspan=3}
    static ref ATTRS_PATTERN: Regex = Regex::new(r"\{([^{}]*)\}\s*$").unwrap();

    // One attribute inside the block
    static ref ATTR_PATTERN: Regex =
        Regex::new(r"^(rowspan|colspan|rs|cs)\s*=\s*(-?\d+)$").unwrap();
}

const TABLE_SEPARATOR: &str = "---";

/// Characters that always need a backslash inside cell content
const RESERVED: [char; 4] = ['\\', '|', '{', '}'];

/// Characters that need a backslash when they open a cell
const LEADERS: [char; 3] = ['#', '[', '-'];

/// Parse state: the table and section new rows are appended to
#[derive(Default)]
struct Cursor {
    table: Option<NodeId>,
    section: Option<(NodeId, SectionKind)>,
}

impl Cursor {
    fn table(&mut self, doc: &mut Document) -> NodeId {
        *self.table.get_or_insert_with(|| doc.add_table())
    }

    fn section(&mut self, doc: &mut Document) -> (NodeId, SectionKind) {
        if let Some(section) = self.section {
            return section;
        }
        let table = self.table(doc);
        let section = (doc.add_section(table, SectionKind::Body), SectionKind::Body);
        self.section = Some(section);
        section
    }
}

/// Split a row line on `|` that is not escaped
fn split_cells(line: &str) -> Vec<&str> {
    let mut cells = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '|' => {
                cells.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    cells.push(&line[start..]);
    cells
}

/// True when the character at byte `at` follows an odd run of backslashes
fn is_escaped(text: &str, at: usize) -> bool {
    text[..at].chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(next) if RESERVED.contains(&next) || LEADERS.contains(&next) => out.push(next),
            // Unknown escapes stay literal
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn escape(content: &str, out: &mut String) {
    for (i, c) in content.chars().enumerate() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '-' if i == 0 && content.starts_with(TABLE_SEPARATOR) => out.push_str("\\-"),
            c if RESERVED.contains(&c) || (i == 0 && c != '-' && LEADERS.contains(&c)) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
}

fn parse_cell(raw: &str, line: usize, in_head: bool) -> Result<Cell, NotationError> {
    let text = raw.trim();
    let mut cell = Cell::new(unescape(text));
    cell.header = in_head;

    let Some(caps) = ATTRS_PATTERN.captures(text) else {
        return Ok(cell);
    };
    let whole = caps.get(0).map(|m| m.start()).unwrap_or(text.len());
    if is_escaped(text, whole) {
        return Ok(cell);
    }
    cell.content = unescape(text[..whole].trim());

    let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    for attr in attrs
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|a| !a.is_empty())
    {
        if attr == "th" {
            cell.header = true;
            continue;
        }
        let Some(parts) = ATTR_PATTERN.captures(attr) else {
            return Err(NotationError::new(
                line,
                format!("unknown cell attribute '{}'", attr),
            ));
        };
        let value: i32 = parts[2]
            .parse()
            .map_err(|_| NotationError::new(line, format!("span out of range in '{}'", attr)))?;
        match &parts[1] {
            "rowspan" | "rs" => cell.raw_row_span = value,
            _ => cell.raw_col_span = value,
        }
    }
    Ok(cell)
}

fn render_cell(cell: &Cell, in_head: bool, out: &mut String) {
    let mut attrs = Vec::new();
    if cell.raw_row_span != 1 {
        attrs.push(format!("rowspan={}", cell.raw_row_span));
    }
    if cell.raw_col_span != 1 {
        attrs.push(format!("colspan={}", cell.raw_col_span));
    }
    if cell.header && !in_head {
        attrs.push("th".to_string());
    }

    escape(&cell.content, out);
    if !attrs.is_empty() {
        if !cell.content.is_empty() {
            out.push(' ');
        }
        let _ = write!(out, "{{{}}}", attrs.join(" "));
    }
}

impl Document {
    /// Parse a document from table notation
    pub fn from_notation(input: &str) -> Result<Self, NotationError> {
        let mut doc = Document::new();
        let mut cursor = Cursor::default();

        for (idx, raw_line) in input.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line == TABLE_SEPARATOR {
                cursor = Cursor::default();
                continue;
            }

            if let Some(caps) = SECTION_PATTERN.captures(line) {
                let name = &caps[1];
                let kind = SectionKind::parse(name).ok_or_else(|| {
                    NotationError::new(line_no, format!("unknown section '{}'", name))
                })?;
                let table = cursor.table(&mut doc);
                cursor.section = Some((doc.add_section(table, kind), kind));
                continue;
            }

            let (section, kind) = cursor.section(&mut doc);
            let in_head = kind == SectionKind::Head;
            let row = doc.add_row(section);
            for raw_cell in split_cells(line) {
                let cell = parse_cell(raw_cell, line_no, in_head)?;
                doc.add_cell(row, cell);
            }
        }

        Ok(doc)
    }

    /// Render the document back to table notation
    pub fn to_notation(&self) -> String {
        let mut out = String::new();

        for (i, table) in self.tables().iter().enumerate() {
            if i > 0 {
                out.push_str(TABLE_SEPARATOR);
                out.push('\n');
            }
            for &child in self.children(table.id) {
                match self.node(child).map(|n| &n.kind) {
                    Some(NodeKind::Section { section }) => {
                        let _ = writeln!(out, "[{}]", section);
                        let in_head = *section == SectionKind::Head;
                        for &row in self.children(child) {
                            self.render_row(row, in_head, &mut out);
                        }
                    }
                    Some(NodeKind::Row) => self.render_row(child, false, &mut out),
                    _ => {}
                }
            }
        }

        out
    }

    fn render_row(&self, row: NodeId, in_head: bool, out: &mut String) {
        for (i, &cell) in self.children(row).iter().enumerate() {
            if i > 0 {
                out.push_str(" | ");
            }
            if let Some(cell) = self.cell(cell) {
                render_cell(cell, in_head, out);
            }
        }
        out.push('\n');
    }
}
