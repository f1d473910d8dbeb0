//! S6: ordered/unordered lists, tight vs. loose detection, and nested
//! list items recursing through the same block dispatch.

mod common;

use common::parse_shape;
use mdcore::Options;

#[test]
fn unordered_list_produces_one_item_per_bullet() {
    let shape = parse_shape(b"- one\n- two\n- three\n", Options::default());
    assert_eq!(shape.matches("ListItem").count(), 3);
}

#[test]
fn ordered_list_records_its_start_number() {
    let shape = parse_shape(b"3. one\n4. two\n", Options::default());
    assert!(shape.contains("start: Some"));
}

#[test]
fn tight_list_has_no_block_mode_flag() {
    let shape = parse_shape(b"- one\n- two\n", Options::default());
    let list_line = shape.lines().find(|l| l.contains("List(")).unwrap();
    assert!(!list_line.contains("BLOCK_MODE"));
}

#[test]
fn blank_line_between_items_makes_the_list_loose() {
    let shape = parse_shape(b"- one\n\n- two\n", Options::default());
    let list_line = shape.lines().find(|l| l.contains("List(")).unwrap();
    assert!(list_line.contains("BLOCK_MODE"));
}

#[test]
fn nested_list_recurses_as_a_child_of_its_item() {
    let shape = parse_shape(b"- outer\n  - inner\n", Options::default());
    assert_eq!(shape.matches("ListItem").count(), 2);
}
