//! S3: emphasis/codespan inline dispatch, including the skip-aware
//! closer scan that must not be fooled by codespans or link brackets.

mod common;

use common::parse_shape;
use mdcore::Options;

#[test]
fn single_star_is_emphasis() {
    let shape = parse_shape(b"a *b* c\n", Options::default());
    assert!(shape.contains("Emphasis"));
    assert!(!shape.contains("DoubleEmphasis"));
}

#[test]
fn double_star_is_double_emphasis() {
    let shape = parse_shape(b"a **b** c\n", Options::default());
    assert!(shape.contains("DoubleEmphasis"));
}

#[test]
fn unmatched_star_is_literal_text() {
    let shape = parse_shape(b"a *b\n", Options::default());
    assert!(!shape.contains("Emphasis"));
    assert!(shape.contains("NormalText"));
}

#[test]
fn codespan_hides_emphasis_markers_inside_it() {
    let shape = parse_shape(b"`*not emphasis*`\n", Options::default());
    assert!(shape.contains("Codespan"));
    assert!(!shape.contains("Emphasis"));
}

#[test]
fn emphasis_closer_skips_over_an_intervening_codespan() {
    let shape = parse_shape(b"*a `b*c` d*\n", Options::default());
    assert!(shape.contains("Emphasis"));
    assert!(shape.contains("Codespan"));
}

#[test]
fn strikethrough_is_gated_by_feature_flag() {
    let off = parse_shape(b"~~gone~~\n", Options::default());
    assert!(!off.contains("Strikethrough"));

    let on = parse_shape(
        b"~~gone~~\n",
        common::with(|o| o.features.strike = true),
    );
    assert!(on.contains("Strikethrough"));
}
