//! Two-pass, depth-limited recursive-descent Markdown-with-extensions
//! parser producing a typed AST.
//!
//! The only entry points callers need are [`parser::doc_new`],
//! [`parser::doc_parse`], [`parser::doc_free`], and [`nodes::node_free`]
//! (spec §6). Everything else in this crate exists to support those
//! four functions; renderers, diffing, and other tree consumers live
//! outside this crate and only depend on [`nodes::NodeValue`]'s shape.

pub mod arena_tree;
pub mod autolink;
pub mod buffer;
pub mod ctype;
pub mod entity;
pub mod error;
pub mod metadata;
pub mod nodes;
pub mod parser;
pub mod preprocess;
pub mod reference;
pub mod scanners;
pub mod strings;

pub use error::ParseError;
pub use nodes::{node_free, AstNode, NodeValue};
pub use parser::{doc_free, doc_new, doc_parse, Doc, Features, Options, ParseResult, RendererKind};

#[cfg(test)]
mod tests {
    use super::*;
    use typed_arena::Arena;

    #[test]
    fn parses_a_simple_document_end_to_end() {
        let arena = Arena::new();
        let doc = doc_new(Options::default());
        let result = doc_parse(&doc, &arena, b"# Title\n\nSome *text*.\n").unwrap();
        assert!(matches!(result.root.data.borrow().value, NodeValue::Root));
        node_free(result.root);
        doc_free(doc);
    }
}
