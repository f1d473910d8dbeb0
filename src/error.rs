//! Error types for the parser's public API (spec "Error Handling Design").
//!
//! The dialect has exactly one user-facing failure mode — a document
//! whose nesting outruns the configured recursion limit — so this
//! stays a small hand-written enum rather than pulling in an error
//! crate for one variant.

use std::fmt;

/// Failure from [`crate::parser::doc_parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Block or inline nesting exceeded the configured `max_depth`.
    DepthExceeded { max: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::DepthExceeded { max } => {
                write!(f, "document nesting exceeded the configured limit of {max}")
            }
        }
    }
}

impl std::error::Error for ParseError {}
