//! Shared test helpers: render a parsed tree down to a compact,
//! indented string of `NodeValue` variants so assertions can grep/match
//! on shape without a renderer crate (none is in scope for this crate).

use mdcore::{doc_free, doc_new, node_free, AstNode, NodeValue, Options};

pub fn parse_shape(input: &[u8], options: Options) -> String {
    let arena = typed_arena::Arena::new();
    let doc = doc_new(options);
    let result = mdcore::doc_parse(&doc, &arena, input).expect("parse should succeed");
    let shape = describe(result.root, 0);
    node_free(result.root);
    doc_free(doc);
    shape
}

pub fn try_parse_shape(input: &[u8], options: Options) -> Result<String, mdcore::ParseError> {
    let arena = typed_arena::Arena::new();
    let doc = doc_new(options);
    let result = mdcore::doc_parse(&doc, &arena, input)?;
    let shape = describe(result.root, 0);
    node_free(result.root);
    doc_free(doc);
    Ok(shape)
}

fn describe<'a>(node: &'a AstNode<'a>, depth: usize) -> String {
    let mut out = format!(
        "{:indent$}{:?}\n",
        "",
        node.data.borrow().value,
        indent = depth * 2
    );
    for child in node.children() {
        out.push_str(&describe(child, depth + 1));
    }
    out
}

pub fn with(mut configure: impl FnMut(&mut Options)) -> Options {
    let mut options = Options::default();
    configure(&mut options);
    options
}
