//! §7: `max_depth` is enforced, not advisory, and is reported as a
//! recoverable `ParseError` rather than a panic or process abort.

mod common;

use common::try_parse_shape;
use mdcore::{Options, ParseError};

#[test]
fn depth_is_guarded_by_default_without_opting_in() {
    // Comfortably past the enforced default of 128 (spec §3 invariant
    // 3) — this must come back as a recoverable error, not a stack
    // overflow, with no `max_depth` set by the caller at all.
    let nested = "> ".repeat(500) + "x\n";
    let err = try_parse_shape(nested.as_bytes(), Options::default()).unwrap_err();
    assert!(matches!(err, ParseError::DepthExceeded { max: 128 }));
}

#[test]
fn reasonable_nesting_still_parses_under_the_default_limit() {
    let nested = "> ".repeat(10) + "x\n";
    let result = try_parse_shape(nested.as_bytes(), Options::default());
    assert!(result.is_ok());
}

#[test]
fn unlimited_depth_requires_explicit_opt_in() {
    let mut opts = Options::default();
    opts.max_depth = 0;
    let nested = "> ".repeat(500) + "x\n";
    let result = try_parse_shape(nested.as_bytes(), opts);
    assert!(result.is_ok());
}

#[test]
fn exceeding_max_depth_is_reported_as_an_error_not_a_panic() {
    let mut opts = Options::default();
    opts.max_depth = 3;
    let nested = "> ".repeat(10) + "x\n";
    let err = try_parse_shape(nested.as_bytes(), opts).unwrap_err();
    assert!(matches!(err, ParseError::DepthExceeded { max: 3 }));
}

#[test]
fn depth_within_the_limit_still_parses() {
    let mut opts = Options::default();
    opts.max_depth = 5;
    let nested = "> > x\n".to_string();
    let result = try_parse_shape(nested.as_bytes(), opts);
    assert!(result.is_ok());
}
