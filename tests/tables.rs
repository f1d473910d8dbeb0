//! S7: pipe tables, gated by the `tables` feature, assembled from a
//! header row, a delimiter row, and zero or more body rows.

mod common;

use common::{parse_shape, with};

#[test]
fn pipe_table_produces_header_and_body_rows() {
    let opts = with(|o| o.features.tables = true);
    let shape = parse_shape(
        b"| a | b |\n|---|---|\n| 1 | 2 |\n| 3 | 4 |\n",
        opts,
    );
    assert!(shape.contains("TableBlock(NodeTable { columns: 2 })"));
    assert!(shape.contains("TableHeader"));
    assert_eq!(shape.matches("TableRow").count(), 3);
}

#[test]
fn delimiter_row_alignment_is_carried_onto_every_cell_in_the_column() {
    let opts = with(|o| o.features.tables = true);
    let shape = parse_shape(b"| a |\n|--:|\n| 1 |\n", opts);
    assert!(shape.contains("RIGHT"));
}

#[test]
fn tables_are_ignored_without_the_feature_flag() {
    let shape = parse_shape(
        b"| a | b |\n|---|---|\n| 1 | 2 |\n",
        mdcore::Options::default(),
    );
    assert!(!shape.contains("TableBlock"));
}
