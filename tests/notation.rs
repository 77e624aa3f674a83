//! Notation → tree tests: what `--print-ast` shows for representative input.

use pretty_assertions::assert_eq;

use korlessa::dsl::{Compiler, Node, Repeat};

fn ast(src: &str) -> String {
    Compiler::parse("test", src).expect("parse failed").to_string()
}

// =============================================================================
// Sheets
// =============================================================================

#[test]
fn empty_source() {
    assert_eq!(ast(""), "(CRATE (EOF))");
}

#[test]
fn sheet_header_forms() {
    assert_eq!(ast("4{}"), "(CRATE (SHEET l: u:1 d:4 r:1) (EOF))");
    assert_eq!(ast("4{}x2"), "(CRATE (SHEET l: u:1 d:4 r:2) (EOF))");
    assert_eq!(ast("4{}loop"), "(CRATE (SHEET l: u:1 d:4 r:-1) (EOF))");
    assert_eq!(ast("4{}x0"), "(CRATE (SHEET l: u:1 d:4 r:0) (EOF))");
    assert_eq!(
        ast("sheet1:8{}"),
        "(CRATE (SHEET l:sheet1 u:1 d:8 r:1) (EOF))"
    );
    for ratio in ["2as3{}", "2is3{}", "2to3{}"] {
        assert_eq!(ast(ratio), "(CRATE (SHEET l: u:2 d:3 r:1) (EOF))");
    }
}

#[test]
fn sheet_body_items() {
    assert_eq!(
        ast("8{c# . - | +2 (d e) cc1:64 pgm5}"),
        "(CRATE (SHEET l: u:1 d:8 r:1 (NOTE ch:-1 n:c a:# o:-1 v:-1) (REST) (TIE) (DIVIDER) \
         (INTERVAL v:2) (LEGATO (NOTE ch:-1 n:d a: o:-1 v:-1) (NOTE ch:-1 n:e a: o:-1 v:-1)) \
         (CC p:1 v:64) (PGM v:5)) (EOF))"
    );
}

#[test]
fn full_note_syntax() {
    assert_eq!(
        ast("4{ch9:Bbb3!7}"),
        "(CRATE (SHEET l: u:1 d:4 r:1 (NOTE ch:9 n:B a:bb o:3 v:7)) (EOF))"
    );
}

#[test]
fn nested_sheets_and_references() {
    assert_eq!(
        ast("verse:4{a:8{c} {a}x2} {verse}loop"),
        "(CRATE (SHEET l:verse u:1 d:4 r:1 (SHEET l:a u:1 d:8 r:1 (NOTE ch:-1 n:c a: o:-1 v:-1)) \
         (REFERENCE l:a r:2)) (REFERENCE l:verse r:-1) (EOF))"
    );
}

#[test]
fn top_level_statements() {
    assert_eq!(
        ast("120bpm\nCC7:100 PGM3 {a.b}"),
        "(CRATE (BPM v:120) (CC p:7 v:100) (PGM v:3) (REFERENCE l:a.b r:1) (EOF))"
    );
}

#[test]
fn comments_are_discarded() {
    let src = "// intro\n4{c // first\n d}\n// done";
    assert_eq!(ast(src), ast("4{c d}"));
}

#[test]
fn tree_structure() {
    let tree = Compiler::parse("test", "x:4{c}x3").unwrap();
    let Node::Crate(nodes) = tree else {
        panic!("root must be a crate");
    };
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[1], Node::Eof);
    let Node::Sheet(sheet) = &nodes[0] else {
        panic!("expected a sheet");
    };
    assert_eq!(sheet.label.as_deref(), Some("x"));
    assert_eq!(sheet.repeat, Repeat::Times(3));
    assert_eq!(sheet.nodes.len(), 1);
}

#[test]
fn parsing_is_deterministic() {
    let src = "intro:2is3{c (d e) -}x2 {intro}loop";
    assert_eq!(
        Compiler::parse("a", src).unwrap(),
        Compiler::parse("b", src).unwrap()
    );
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn error_message_names_source_and_position() {
    let err = Compiler::parse("song.kor", "4{c}\n8{d ?}").unwrap_err();
    assert_eq!(err.source_name, "song.kor");
    assert_eq!(err.line, 2);
    assert_eq!(err.col, 5);
    assert_eq!(err.found, Some('?'));
    let message = err.to_string();
    assert!(message.starts_with("song.kor:2:5: error: expected"), "{message}");
}

#[test]
fn unterminated_sheet() {
    let err = Compiler::parse("test", "4{c d").unwrap_err();
    assert_eq!(err.offset, 5);
    assert_eq!(err.found, None);
    assert!(err.to_string().ends_with("at end of input"));
}

#[test]
fn whitespace_before_repeater_is_rejected() {
    assert!(Compiler::parse("test", "4{} x2").is_err());
}

#[test]
fn notes_are_not_top_level_statements() {
    assert!(Compiler::parse("test", "c d e").is_err());
}
