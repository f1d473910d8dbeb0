//! Footnote references/definitions, and the two §9 open questions this
//! crate locks in: tab-indented continuation lines behave like
//! space-indented ones, and a second reference to an already-used
//! footnote id is left as literal text rather than resolved again.

mod common;

use common::{parse_shape, with};

fn opts() -> mdcore::Options {
    with(|o| o.features.footnotes = true)
}

#[test]
fn used_footnote_definition_is_emitted_in_the_footnotes_block() {
    let shape = parse_shape(b"See[^a].\n\n[^a]: Explanation.\n", opts());
    assert!(shape.contains("FootnotesBlock"));
    assert!(shape.contains("FootnoteRef(NodeFootnoteRef { num: 1 })"));
    assert!(shape.contains("FootnoteDef(NodeFootnoteDef { num: 1 })"));
}

#[test]
fn unused_footnote_definitions_are_dropped() {
    let shape = parse_shape(b"No references here.\n\n[^a]: Unused.\n", opts());
    assert!(!shape.contains("FootnotesBlock"));
}

#[test]
fn second_reference_to_the_same_footnote_is_literal_text() {
    let shape = parse_shape(b"a[^x] b[^x]\n\n[^x]: Def.\n", opts());
    assert_eq!(shape.matches("FootnoteRef").count(), 1);
    assert!(shape.contains("NormalText(") && shape.contains("[^x]"));
}

#[test]
fn tab_indented_continuation_line_is_absorbed_into_the_definition() {
    let shape = parse_shape(
        b"See[^a].\n\n[^a]: First line.\n\tSecond line.\n",
        opts(),
    );
    assert!(shape.contains("FootnoteDef"));
}
