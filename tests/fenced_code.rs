//! S5: fenced code blocks capture their info-string language and raw
//! body verbatim, uninterpreted by the inline parser.

mod common;

use common::{parse_shape, with};
use mdcore::Options;

#[test]
fn fenced_block_captures_language_and_body() {
    let opts = with(|o| o.features.fenced = true);
    let shape = parse_shape(b"```rust\nfn main() {}\n```\n", opts);
    assert!(shape.contains("BlockCode(NodeBlockCode"));
    assert!(shape.contains("rust"));
    assert!(shape.contains("fn main"));
}

#[test]
fn fenced_block_body_is_not_inline_parsed() {
    let opts = with(|o| o.features.fenced = true);
    let shape = parse_shape(b"```\n*not emphasis*\n```\n", opts);
    assert!(!shape.contains("Emphasis"));
}

#[test]
fn fenced_blocks_are_ignored_without_the_feature_flag() {
    let shape = parse_shape(b"```\ncode\n```\n", Options::default());
    assert!(!shape.contains("BlockCode"));
}
