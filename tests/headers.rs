//! S2: ATX and setext headers both produce `Header` nodes with a
//! 0-based level (§3.4's "stored as level-1" invariant).

mod common;

use common::parse_shape;
use mdcore::Options;

#[test]
fn atx_header_level_is_zero_based() {
    let shape = parse_shape(b"# Title\n", Options::default());
    assert!(shape.contains("Header(NodeHeader { level: 0 })"));
}

#[test]
fn atx_header_six_hashes_is_level_five() {
    let shape = parse_shape(b"###### Deep\n", Options::default());
    assert!(shape.contains("Header(NodeHeader { level: 5 })"));
}

#[test]
fn setext_level_one_promotes_preceding_paragraph() {
    let shape = parse_shape(b"Title\n=====\n", Options::default());
    assert!(shape.contains("Header(NodeHeader { level: 0 })"));
    assert!(!shape.contains("Paragraph"));
}

#[test]
fn setext_level_two_promotes_preceding_paragraph() {
    let shape = parse_shape(b"Subtitle\n-----\n", Options::default());
    assert!(shape.contains("Header(NodeHeader { level: 1 })"));
}

#[test]
fn atx_header_text_is_inline_parsed() {
    let shape = parse_shape(b"# Hello *world*\n", Options::default());
    assert!(shape.contains("Emphasis"));
}
