//! S4: reference-style links resolve against definitions collected in
//! the first pass and elided from the block-parsed body.

mod common;

use common::parse_shape;
use mdcore::Options;

#[test]
fn reference_definition_resolves_and_is_elided_from_the_body() {
    let shape = parse_shape(
        b"See [my link][ref].\n\n[ref]: /target \"Title\"\n",
        Options::default(),
    );
    assert!(shape.contains("Link(NodeLink"));
    assert!(shape.contains("/target"));
    // The definition line itself produces no paragraph of its own.
    assert_eq!(shape.matches("Paragraph").count(), 1);
}

#[test]
fn reference_label_matching_is_case_insensitive() {
    let shape = parse_shape(
        b"[link][REF]\n\n[ref]: /x\n",
        Options::default(),
    );
    assert!(shape.contains("Link(NodeLink"));
}

#[test]
fn unresolved_reference_is_left_as_literal_brackets() {
    let shape = parse_shape(b"[nope][missing]\n", Options::default());
    assert!(!shape.contains("Link(NodeLink"));
    assert!(shape.contains("NormalText"));
}

#[test]
fn shortcut_reference_link_uses_its_own_text_as_the_label() {
    let shape = parse_shape(b"[ref]\n\n[ref]: /y\n", Options::default());
    assert!(shape.contains("Link(NodeLink"));
    assert!(shape.contains("/y"));
}
