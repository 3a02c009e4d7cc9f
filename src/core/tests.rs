//! Regression tests for the move engine

use super::*;
use crate::document::{Document, Path};
use crate::utils::error::MatrixError;
use pretty_assertions::assert_eq;

fn doc(notation: &str) -> Document {
    Document::from_notation(notation).unwrap()
}

fn grid(doc: &Document) -> FilledMatrix {
    FilledMatrix::build(doc, None).unwrap()
}

fn defaults() -> MoveOptions {
    MoveOptions::default()
}

/// Rendered rows of every table, section markers dropped
fn lines(doc: &Document) -> Vec<String> {
    doc.to_notation()
        .lines()
        .filter(|l| !l.starts_with('['))
        .map(String::from)
        .collect()
}

/// Target that brings an item at `landed` back to index `from`
///
/// Insert-before semantics: moving down lands at `to - 1`, except that the
/// last index appends. The second-to-last slot is unreachable from above.
fn return_target(from: usize, landed: usize, len: usize) -> Option<usize> {
    if landed > from || from == len - 1 {
        Some(from)
    } else if from + 2 < len {
        Some(from + 1)
    } else {
        None
    }
}

// ============================================================================
// Filled matrix
// ============================================================================

#[test]
fn test_plain_grid_contexts() {
    let d = doc("A | B\nC | D");
    let m = grid(&d);
    assert_eq!(m.row_count(), 2);
    assert_eq!(m.column_count(), 2);
    assert!(m.issues().is_empty());

    for row in m.rows() {
        for pos in row {
            assert_eq!(
                pos.context,
                SpanContext {
                    ttb: 1,
                    btt: 1,
                    ltr: 1,
                    rtl: 1
                }
            );
        }
    }
}

#[test]
fn test_block_span_contexts() {
    let d = doc("A {rowspan=2 colspan=2} | B\nC\nD | E | F");
    let m = grid(&d);
    println!("Block span grid:\n{}", m.describe(&d));

    assert_eq!(m.row_count(), 3);
    assert_eq!(m.column_count(), 3);

    let ctx = |r, c| m.get(r, c).unwrap().context;
    assert_eq!(ctx(0, 0), SpanContext { ttb: 1, btt: 2, ltr: 1, rtl: 2 });
    assert_eq!(ctx(0, 1), SpanContext { ttb: 1, btt: 2, ltr: 2, rtl: 1 });
    assert_eq!(ctx(1, 0), SpanContext { ttb: 2, btt: 1, ltr: 1, rtl: 2 });
    assert_eq!(ctx(1, 1), SpanContext { ttb: 2, btt: 1, ltr: 2, rtl: 1 });

    // All four positions belong to the same node
    let origin = &m.get(0, 0).unwrap().entry;
    assert_eq!(&m.get(1, 1).unwrap().entry, origin);
    assert!(m.get(0, 0).unwrap().context.is_origin());
    assert!(!m.get(1, 1).unwrap().context.is_origin());

    // C lands after the carried columns
    let c = &m.get(1, 2).unwrap().entry;
    assert_eq!(c.path, Path::new(vec![0, 0, 1, 0]));
}

#[test]
fn test_carry_lands_mid_row() {
    let d = doc("A | B {rowspan=3} | C\nD | E\nF | G");
    let m = grid(&d);
    assert_eq!(m.column_count(), 3);
    assert_eq!(m.describe(&d), "A  | B  | C\nD  | ^B | E\nF  | ^B | G\n");
    assert_eq!(m.get(2, 1).unwrap().context.btt, 1);
    assert_eq!(m.get(2, 1).unwrap().context.ttb, 3);
}

#[test]
fn test_describe_marks_shadows() {
    let d = doc("A {rowspan=2} | B\nC\nWide {colspan=2}");
    let m = grid(&d);
    assert_eq!(m.describe(&d), "A     | B\n^A    | C\nWide  | <Wide\n");
}

#[test]
fn test_degenerate_span_is_clamped() {
    let d = doc("A {rowspan=0} | B\nC | D");
    let m = grid(&d);
    assert_eq!(m.column_count(), 2);
    assert!(matches!(
        m.issues(),
        [GeometryIssue::DegenerateSpan { row_span: 0, col_span: 1, .. }]
    ));
}

#[test]
fn test_overhanging_row_span_is_clamped() {
    let d = doc("A {rowspan=3} | B\nC");
    let m = grid(&d);
    assert_eq!(m.row_count(), 2);
    assert_eq!(m.get(0, 0).unwrap().row_span, 2);
    assert_eq!(m.get(1, 0).unwrap().context.btt, 1);
    assert!(matches!(
        m.issues(),
        [GeometryIssue::OverhangingRowSpan { row: 0, row_span: 3, available: 2, .. }]
    ));
}

#[test]
fn test_overlapping_span_is_reported() {
    let d = doc("A | B {rowspan=2}\nC {colspan=2}");
    let m = grid(&d);
    assert_eq!(m.column_count(), 2);
    assert!(matches!(
        m.issues(),
        [GeometryIssue::OverlappingSpan { row: 1, column: 1, .. }]
    ));
    // The later cell wins the contested position
    assert!(m.get(1, 1).unwrap().context.is_column_shadow());
}

#[test]
fn test_overlap_shortens_span_above() {
    let d = doc("A | B {rowspan=3}\nC\nD {colspan=2}");
    let m = grid(&d);
    assert!(matches!(
        m.issues(),
        [GeometryIssue::OverlappingSpan { row: 2, column: 1, .. }]
    ));

    // B now ends at row 1
    assert_eq!(m.get(0, 1).unwrap().row_span, 2);
    assert_eq!(m.get(0, 1).unwrap().context.btt, 2);
    assert_eq!(m.get(1, 1).unwrap().context.btt, 1);
    assert_eq!(row_merge_info(&m, 1).blocked_indices, vec![0]);
    assert!(row_merge_info(&m, 2).blocked_indices.is_empty());
}

#[test]
fn test_oversized_col_span_is_clamped() {
    let d = doc("A {colspan=2147483647}\nB {colspan=2147483647}");
    let m = grid(&d);
    assert_eq!(m.column_count(), MAX_COL_SPAN);
    assert_eq!(m.get(1, MAX_COL_SPAN - 1).unwrap().context.rtl, 1);
    assert!(matches!(
        m.issues(),
        [
            GeometryIssue::OversizedColSpan { col_span: 2147483647, .. },
            GeometryIssue::OversizedColSpan { col_span: 2147483647, .. },
        ]
    ));
    assert!(validate_row_move(&d, 0, 1, &defaults()).can_move);
}

#[test]
fn test_oversized_col_span_next_to_narrow_row() {
    let mut d = doc("A {colspan=2147483647}\nB | C");
    assert_eq!(
        FilledMatrix::build(&d, None).unwrap_err(),
        MatrixError::MissingCells {
            row: 1,
            expected: MAX_COL_SPAN,
            found: 2
        }
    );
    assert_eq!(
        validate_row_move(&d, 1, 0, &defaults()).blocked_by,
        Some(BlockedBy::OutOfBounds)
    );
    assert!(!move_row(&mut d, 1, 0, &defaults()));
}

#[test]
fn test_ragged_rows_are_an_error() {
    let d = doc("A | B\nC");
    let err = FilledMatrix::build(&d, None).unwrap_err();
    assert_eq!(
        err,
        MatrixError::MissingCells {
            row: 1,
            expected: 2,
            found: 1
        }
    );
}

#[test]
fn test_no_table_gives_empty_matrix() {
    let d = Document::new();
    let m = grid(&d);
    assert!(m.is_empty());
    assert!(m.table().is_none());
    assert_eq!(m.column_count(), 0);
}

#[test]
fn test_rows_follow_section_order() {
    let d = doc("[head]\nH1 | H2\n[body]\nA | B\n[foot]\nF1 | F2");
    let m = grid(&d);
    let rows: Vec<&Path> = m.row_entries().iter().map(|e| &e.path).collect();
    assert_eq!(
        rows,
        vec![
            &Path::new(vec![0, 0, 0]),
            &Path::new(vec![0, 1, 0]),
            &Path::new(vec![0, 2, 0])
        ]
    );
}

#[test]
fn test_build_at_second_table() {
    let d = doc("A\n---\nX | Y\nZ | W");
    let m = FilledMatrix::build(&d, Some(&Path::new(vec![1]))).unwrap();
    assert_eq!(m.column_count(), 2);
    assert_eq!(m.table().unwrap().path, Path::new(vec![1]));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_plain_move_is_allowed() {
    let d = doc("R0\nR1\nR2");
    let result = validate_row_move(&d, 0, 2, &defaults());
    assert_eq!(result, MoveValidation::allowed());
    assert_eq!(result.to_string(), "allowed");
}

#[test]
fn test_same_position() {
    let d = doc("R0\nR1");
    let result = validate_row_move(&d, 1, 1, &defaults());
    assert_eq!(result.blocked_by, Some(BlockedBy::SamePosition));
    assert_eq!(
        result.reason.as_deref(),
        Some("Source and destination positions are the same")
    );

    let result = validate_column_move(&d, 0, 0, &defaults());
    assert_eq!(result.blocked_by, Some(BlockedBy::SamePosition));
}

#[test]
fn test_out_of_bounds() {
    let d = doc("A | B\nC | D");
    assert_eq!(
        validate_row_move(&d, 0, 5, &defaults()).blocked_by,
        Some(BlockedBy::OutOfBounds)
    );
    assert_eq!(
        validate_column_move(&d, 9, 0, &defaults()).blocked_by,
        Some(BlockedBy::OutOfBounds)
    );
    assert_eq!(
        can_move_row(&d, 2, &defaults()).blocked_by,
        Some(BlockedBy::OutOfBounds)
    );
}

#[test]
fn test_empty_document_is_out_of_bounds() {
    let d = Document::new();
    let result = validate_row_move(&d, 0, 1, &defaults());
    assert_eq!(result.blocked_by, Some(BlockedBy::OutOfBounds));
    assert!(valid_row_drop_positions(&d, 0, &defaults()).is_empty());
}

#[test]
fn test_header_rows() {
    let d = doc("[head]\nHeader 1 | Header 2\n[body]\nA1 | B1\nA2 | B2");

    let from_header = validate_row_move(&d, 0, 1, &defaults());
    assert_eq!(from_header.blocked_by, Some(BlockedBy::Header));
    assert_eq!(from_header.reason.as_deref(), Some("Header rows cannot be moved"));

    let to_header = validate_row_move(&d, 2, 0, &defaults());
    assert_eq!(to_header.blocked_by, Some(BlockedBy::Header));
    assert_eq!(
        to_header.reason.as_deref(),
        Some("Cannot move row to header section")
    );

    assert!(validate_row_move(&d, 2, 1, &defaults()).can_move);
    assert_eq!(movable_row_indices(&d, &defaults()), vec![1, 2]);

    // Columns ignore sections
    assert!(validate_column_move(&d, 0, 1, &defaults()).can_move);
}

#[test]
fn test_row_external_merges() {
    let d = doc("A {rowspan=2} | B\nC\nD | E");

    let source = validate_row_move(&d, 1, 2, &defaults());
    assert_eq!(source.blocked_by, Some(BlockedBy::ExternalMerge));
    assert_eq!(
        source.reason.as_deref(),
        Some("Source row has external merged cells that prevent movement")
    );

    let destination = validate_row_move(&d, 2, 1, &defaults());
    assert_eq!(destination.blocked_by, Some(BlockedBy::ExternalMerge));
    assert_eq!(
        destination.reason.as_deref(),
        Some("Destination position has external merged cells that prevent movement")
    );

    // Moving the origin row away would leave its shadow behind
    let conflict = validate_row_move(&d, 0, 2, &defaults());
    assert_eq!(conflict.blocked_by, Some(BlockedBy::MergeConflict));
    assert_eq!(
        conflict.to_string(),
        "blocked (merge-conflict): Move path conflicts with merged cells"
    );
}

#[test]
fn test_column_external_merges() {
    let d = doc("A {colspan=2} | B\nC | D | E");

    assert_eq!(
        validate_column_move(&d, 1, 2, &defaults()).blocked_by,
        Some(BlockedBy::ExternalMerge)
    );
    assert_eq!(
        validate_column_move(&d, 2, 1, &defaults()).blocked_by,
        Some(BlockedBy::ExternalMerge)
    );
    assert_eq!(
        validate_column_move(&d, 0, 2, &defaults()).blocked_by,
        Some(BlockedBy::MergeConflict)
    );
    assert_eq!(movable_column_indices(&d, &defaults()), vec![0, 2]);
}

#[test]
fn test_check_row_and_column() {
    let d = doc("[head]\nH | I\n[body]\nA {rowspan=2} | B\nC");

    assert_eq!(
        can_move_row(&d, 0, &defaults()).blocked_by,
        Some(BlockedBy::Header)
    );
    assert!(can_move_row(&d, 1, &defaults()).can_move);
    assert_eq!(
        can_move_row(&d, 2, &defaults()).reason.as_deref(),
        Some("Row has external merged cells that prevent movement")
    );
    assert!(can_move_column(&d, 0, &defaults()).can_move);
    assert!(can_move_column(&d, 1, &defaults()).can_move);
}

#[test]
fn test_drop_positions() {
    let d = doc("R0\nR1\nR2");
    assert_eq!(valid_row_drop_positions(&d, 0, &defaults()), vec![1, 2]);
    assert_eq!(valid_row_drop_positions(&d, 1, &defaults()), vec![0, 2]);

    let d = doc("X | Y\nA {rowspan=2} | B\nC\nD | E");
    assert_eq!(valid_row_drop_positions(&d, 0, &defaults()), vec![1, 3]);
    assert_eq!(valid_row_drop_positions(&d, 3, &defaults()), vec![0]);
    // Row 2 is pinned by the span from row 1
    assert!(valid_row_drop_positions(&d, 2, &defaults()).is_empty());

    let d = doc("A | B | C\nD | E | F");
    assert_eq!(valid_column_drop_positions(&d, 1, &defaults()), vec![0, 2]);
}

#[test]
fn test_drop_positions_match_validation() {
    let d = doc("[head]\nH | I | J\n[body]\nA {colspan=2} | B\nC {rowspan=2} | D | E\nF | G");
    let options = defaults();
    let validator = MoveValidator::new(&d, &options).unwrap();

    for source in 0..validator.matrix().row_count() {
        let positions = validator.drop_positions(Axis::Row, source);
        for to in 0..validator.matrix().row_count() {
            let allowed = validator.validate_row_move(source, to).can_move
                && validator.check_row(source).can_move;
            assert_eq!(positions.contains(&to), allowed, "row {} -> {}", source, to);
        }
    }
}

#[test]
fn test_malformed_table_is_blocked() {
    let d = doc("A | B\nC");
    let result = validate_row_move(&d, 0, 1, &defaults());
    assert_eq!(result.blocked_by, Some(BlockedBy::OutOfBounds));
    assert!(result
        .reason
        .unwrap()
        .starts_with("Table geometry is malformed"));
    assert!(movable_row_indices(&d, &defaults()).is_empty());
    assert!(valid_column_drop_positions(&d, 0, &defaults()).is_empty());
}

#[test]
fn test_validation_is_read_only() {
    let d = doc("A {rowspan=2} | B\nC\nD | E");
    let before = d.to_notation();
    let revision = d.revision();
    for from in 0..3 {
        for to in 0..3 {
            let _ = validate_row_move(&d, from, to, &defaults());
            let _ = validate_column_move(&d, from, to, &defaults());
        }
    }
    assert_eq!(d.to_notation(), before);
    assert_eq!(d.revision(), revision);
}

// ============================================================================
// Row moves
// ============================================================================

#[test]
fn test_move_row_down() {
    let mut d = doc("R0\nR1\nR2");
    assert!(move_row(&mut d, 0, 2, &defaults()));
    assert_eq!(lines(&d), vec!["R1", "R2", "R0"]);
}

#[test]
fn test_move_row_up() {
    let mut d = doc("R0\nR1\nR2");
    assert!(move_row(&mut d, 2, 0, &defaults()));
    assert_eq!(lines(&d), vec!["R2", "R0", "R1"]);
}

#[test]
fn test_move_row_with_internal_col_span() {
    let mut d = doc("A1-B1 {colspan=2}\nA2 | B2\nA3 | B3");
    assert!(move_row(&mut d, 0, 2, &defaults()));
    assert_eq!(lines(&d), vec!["A2 | B2", "A3 | B3", "A1-B1 {colspan=2}"]);
}

#[test]
fn test_header_row_is_not_moved() {
    let mut d = doc("[head]\nHeader 1 | Header 2\n[body]\nA1 | B1");
    let before = d.to_notation();
    let revision = d.revision();

    assert!(!move_row(&mut d, 0, 1, &defaults()));
    assert_eq!(d.to_notation(), before);
    assert_eq!(d.revision(), revision);
}

#[test]
fn test_shadow_row_is_not_moved() {
    let mut d = doc("A1-A2 {rowspan=2} | B1\nB2\nA3 | B3");
    let before = d.to_notation();
    assert!(!move_row(&mut d, 1, 2, &defaults()));
    assert!(!move_row(&mut d, 1, 1, &defaults()));
    assert_eq!(d.to_notation(), before);
}

#[test]
fn test_move_row_across_sections() {
    let mut d = doc("[head]\nH\n[body]\nA\nB\n[foot]\nF");
    assert!(move_row(&mut d, 3, 1, &defaults()));
    // The emptied foot section is dropped
    assert_eq!(d.to_notation(), "[head]\nH\n[body]\nF\nA\nB\n");

    let mut d = doc("[head]\nH\n[body]\nA\nB\n[foot]\nF");
    assert!(move_row(&mut d, 1, 3, &defaults()));
    assert_eq!(d.to_notation(), "[head]\nH\n[body]\nB\n[foot]\nF\nA\n");
}

#[test]
fn test_move_row_in_second_table() {
    let mut d = doc("R0\nR1\n---\nS0\nS1\nS2");
    let options = MoveOptions::new().at(vec![1]);
    assert!(move_row(&mut d, 0, 2, &options));
    assert_eq!(lines(&d), vec!["R0", "R1", "---", "S1", "S2", "S0"]);

    // A path inside the table selects it too
    let options = MoveOptions::new().at(vec![1, 0, 2, 0]);
    assert!(move_row(&mut d, 2, 0, &options));
    assert_eq!(lines(&d), vec!["R0", "R1", "---", "S0", "S1", "S2"]);
}

#[test]
fn test_row_move_round_trip() {
    let original = vec!["R0", "R1", "R2", "R3"];
    let n = original.len();

    for from in 0..n {
        for to in 0..n {
            if from == to {
                continue;
            }
            let mut d = doc(&original.join("\n"));
            assert!(move_row(&mut d, from, to, &defaults()));

            let moved = original[from];
            let landed = lines(&d).iter().position(|l| l == moved).unwrap();
            if landed == from {
                continue;
            }
            let Some(back) = return_target(from, landed, n) else {
                continue;
            };
            assert!(move_row(&mut d, landed, back, &defaults()));
            assert_eq!(lines(&d), original, "{} -> {} -> {}", from, to, back);
        }
    }
}

#[test]
fn test_execute_row_move_skips_validation() {
    let mut d = doc("[head]\nH\n[body]\nA");
    assert!(execute_row_move(&mut d, 0, 1, &defaults()));
    assert_eq!(d.to_notation(), "[body]\nA\nH\n");
}

#[test]
fn test_plan_out_of_range() {
    let d = doc("A | B\nC | D");
    let m = grid(&d);
    assert!(plan_row_move(&m, 0, 2).is_none());
    assert!(plan_column_move(&m, 2, 0).is_none());
    assert_eq!(plan_row_move(&m, 1, 0).unwrap().len(), 2);
}

// ============================================================================
// Column moves
// ============================================================================

#[test]
fn test_move_column_right() {
    let mut d = doc("A | B | C\nD | E | F");
    assert!(move_column(&mut d, 0, 2, &defaults()));
    assert_eq!(lines(&d), vec!["B | C | A", "E | F | D"]);
}

#[test]
fn test_move_column_left() {
    let mut d = doc("A | B | C\nD | E | F");
    assert!(move_column(&mut d, 2, 0, &defaults()));
    assert_eq!(lines(&d), vec!["C | A | B", "F | D | E"]);
}

#[test]
fn test_move_column_carries_row_span() {
    let mut d = doc("A1-A2 {rowspan=2} | B1 | C1\nB2 | C2");
    assert!(move_column(&mut d, 0, 2, &defaults()));
    assert_eq!(lines(&d), vec!["B1 | C1 | A1-A2 {rowspan=2}", "B2 | C2"]);

    let m = grid(&d);
    assert_eq!(m.describe(&d), "B1     | C1     | A1-A2\nB2     | C2     | ^A1-A2\n");
}

#[test]
fn test_move_column_counts_grid_positions() {
    // Row 1 starts with a shadow, so its tree indices lag the grid by one
    let mut d = doc("A {rowspan=2} | B | C\nD | E");
    assert!(move_column(&mut d, 2, 1, &defaults()));
    assert_eq!(lines(&d), vec!["A {rowspan=2} | C | B", "E | D"]);

    let m = grid(&d);
    assert_eq!(m.describe(&d), "A  | C  | B\n^A | E  | D\n");
}

#[test]
fn test_move_column_past_col_span() {
    let mut d = doc("A {colspan=2} | B | X\nC | D | E | F");
    assert!(move_column(&mut d, 3, 2, &defaults()));
    assert_eq!(lines(&d), vec!["A {colspan=2} | X | B", "C | D | F | E"]);
}

#[test]
fn test_wide_column_move_shifts_its_row() {
    // The wide cell takes its shadow along; other rows move one cell
    let mut d = doc("X | A {colspan=2}\nP | Q | R");
    assert!(move_column(&mut d, 1, 0, &defaults()));
    assert_eq!(lines(&d), vec!["A {colspan=2} | X", "Q | P | R"]);
}

#[test]
fn test_shadow_column_is_not_moved() {
    let mut d = doc("A1-B1 {colspan=2} | C1\nA2 | B2 | C2");
    let before = d.to_notation();
    assert!(!move_column(&mut d, 1, 2, &defaults()));
    assert_eq!(d.to_notation(), before);
}

#[test]
fn test_column_move_round_trip() {
    let original = vec!["A | B | C | D", "E | F | G | H"];
    let n = 4;
    let first_row = |d: &Document| -> Vec<String> {
        lines(d)[0].split(" | ").map(String::from).collect()
    };
    let headers = ["A", "B", "C", "D"];

    for from in 0..n {
        for to in 0..n {
            if from == to {
                continue;
            }
            let mut d = doc(&original.join("\n"));
            assert!(move_column(&mut d, from, to, &defaults()));

            let landed = first_row(&d)
                .iter()
                .position(|c| c == headers[from])
                .unwrap();
            if landed == from {
                continue;
            }
            let Some(back) = return_target(from, landed, n) else {
                continue;
            };
            assert!(move_column(&mut d, landed, back, &defaults()));
            assert_eq!(lines(&d), original, "{} -> {} -> {}", from, to, back);
        }
    }
}

#[test]
fn test_moves_keep_spans() {
    let mut d = doc("X | Y | Z\nA {rowspan=2} | B {colspan=2}\nC | D\nE | F | G");
    let spans = |d: &Document| -> Vec<(usize, usize)> {
        let m = grid(d);
        let mut spans: Vec<(usize, usize)> = m
            .rows()
            .iter()
            .flatten()
            .filter(|p| p.context.is_origin())
            .map(|p| (p.row_span, p.col_span))
            .collect();
        spans.sort();
        spans
    };
    let before = spans(&d);

    assert!(move_row(&mut d, 3, 0, &defaults()));
    assert!(move_column(&mut d, 1, 0, &defaults()));
    assert_eq!(
        lines(&d),
        vec!["F | E | G", "Y | X | Z", "B {colspan=2} | A {rowspan=2}", "C | D"]
    );
    assert_eq!(spans(&d), before);
    assert!(grid(&d).issues().is_empty());
}
