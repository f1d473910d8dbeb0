//! S1 and the document-shape testable properties: every parse produces
//! ROOT > DOC_HEADER, ..., DOC_FOOTER regardless of input, and node
//! counts are self-consistent.

mod common;

use common::parse_shape;
use mdcore::Options;

#[test]
fn root_wraps_header_body_footer_even_for_empty_input() {
    let shape = parse_shape(b"", Options::default());
    let mut lines = shape.lines();
    assert_eq!(lines.next().unwrap().trim(), "Root");
    assert_eq!(lines.next().unwrap().trim(), "DocHeader");
}

#[test]
fn paragraphs_separated_by_blank_lines_are_distinct_siblings() {
    let shape = parse_shape(b"one\n\ntwo\n\nthree\n", Options::default());
    assert_eq!(shape.matches("Paragraph").count(), 3);
}

#[test]
fn document_footer_always_closes_the_tree() {
    let shape = parse_shape(b"just one paragraph\n", Options::default());
    assert!(shape.trim_end().ends_with("DocFooter"));
}

#[test]
fn single_paragraph_tree_shape_is_exact() {
    use pretty_assertions::assert_eq;

    let shape = parse_shape(b"just one paragraph\n", Options::default());
    let expected = concat!(
        "Root\n",
        "  DocHeader\n",
        "  Paragraph(NodeParagraph { lines: 1, beoln: false })\n",
        "    NormalText(\"just one paragraph\")\n",
        "  DocFooter\n",
    );
    assert_eq!(shape, expected);
}
