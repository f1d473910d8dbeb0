//! The document driver (spec C8): `doc_new`/`doc_parse`/`doc_free`,
//! the only entry points callers outside this crate use (§6).
//!
//! `doc_parse` is the one place that sequences every other component:
//! pre-process, push the scaffolding nodes, run the metadata and
//! reference passes, hand the remaining staging buffer to the block
//! parser, and finally emit the footnotes block before closing out.

pub mod block;
pub mod inlines;
pub mod options;
mod table;

use std::cell::RefCell;

use typed_arena::Arena;

use crate::arena_tree::Node;
use crate::error::ParseError;
use crate::metadata;
use crate::nodes::{Ast, AstNode, Cursor, NodeFootnoteDef, NodeMeta, NodeValue};
pub use crate::nodes::node_free;
use crate::preprocess::preprocess;
use crate::reference::{self, FootnoteList, RefMap};

pub use options::{Features, Options, RendererKind};

/// A configured parser instance (§4.8 `doc_new`). Stateless beyond the
/// options it was built with — nothing here is mutated by a parse, so
/// one `Doc` may run any number of parses, just not concurrently with
/// itself (§5).
pub struct Doc {
    options: Options,
}

/// Allocate a document handle from `opts` (§4.8, §6).
pub fn doc_new(opts: Options) -> Doc {
    Doc { options: opts }
}

/// Release the doc handle. The tree `doc_parse` returned is owned by
/// the caller's arena and is released separately (§4.8).
pub fn doc_free(_doc: Doc) {}

/// The result of a successful parse: the ROOT node and the total
/// number of nodes allocated under it (testable property 4).
pub struct ParseResult<'a> {
    pub root: &'a AstNode<'a>,
    pub node_count: u32,
}

/// Run a full two-pass parse of `bytes` (§4.8 `doc_parse`).
///
/// `arena` is supplied by the caller so the returned tree's lifetime
/// is tied to something the caller controls; `node_free`/dropping the
/// arena releases it.
pub fn doc_parse<'a>(
    doc: &Doc,
    arena: &'a Arena<AstNode<'a>>,
    bytes: &[u8],
) -> Result<ParseResult<'a>, ParseError> {
    let opts = &doc.options;
    let depth_err = || ParseError::DepthExceeded {
        max: opts.max_depth,
    };

    let clean = preprocess(bytes);

    let root: &'a AstNode<'a> = arena.alloc(Node::new(RefCell::new(Ast {
        id: 0,
        value: NodeValue::Root,
        start_line: 1,
    })));
    let cursor = Cursor::new(arena, root, opts.max_depth);

    let header_node = cursor
        .push(NodeValue::DocHeader, 1)
        .map_err(|_| depth_err())?;

    let (meta, rest_offset) = metadata::extract(&clean, opts.features.metadata, &opts.meta_queues);
    emit_metadata(&cursor, &meta).map_err(|_| depth_err())?;

    cursor.pop(header_node);

    let body = &clean[rest_offset..];
    let (refs, footnotes, staging) = reference::collect(body, opts.features.footnotes);

    let block = block::BlockParser::new(&refs, &footnotes, &meta, opts.features);
    block
        .parse_document(&cursor, &staging)
        .map_err(|_| depth_err())?;

    if opts.features.footnotes {
        emit_footnotes_block(&cursor, &footnotes, &block).map_err(|_| depth_err())?;
    }

    let footer_node = cursor
        .push(NodeValue::DocFooter, 0)
        .map_err(|_| depth_err())?;
    cursor.pop(footer_node);

    Ok(ParseResult {
        root,
        node_count: cursor.node_count(),
    })
}

/// Push one `Meta` node per entry under the currently-open DOC_HEADER,
/// inline-parsing the value the same way any other text run is parsed
/// (spec §4.5's note that a META node's child text is not otherwise
/// unescaped by the metadata parser itself).
///
/// Reference/footnote tables aren't collected yet at this point in the
/// pipeline (§4.8 runs metadata before the reference pass), so a
/// `[link]` inside a metadata value resolves against an empty table —
/// an acceptable limitation for a value that's almost always a bare
/// title or author string.
fn emit_metadata<'a>(
    cursor: &Cursor<'a>,
    meta: &[metadata::MetaEntry],
) -> Result<(), crate::nodes::DepthExceeded> {
    let empty_refs = RefMap::default();
    let empty_footnotes = FootnoteList::default();
    let subject_features = crate::parser::options::Features::default();

    for entry in meta {
        let node = cursor.push(
            NodeValue::Meta(NodeMeta {
                key: entry.key.clone().into(),
            }),
            0,
        )?;
        let subject = inlines::Subject::new(
            cursor,
            &empty_refs,
            &empty_footnotes,
            &[],
            subject_features,
        );
        subject.parse(&entry.value)?;
        cursor.pop(node);
    }
    Ok(())
}

fn emit_footnotes_block<'a, 'r>(
    cursor: &Cursor<'a>,
    footnotes: &FootnoteList,
    block: &block::BlockParser<'r>,
) -> Result<(), crate::nodes::DepthExceeded> {
    let used = footnotes.used_in_order();
    if used.is_empty() {
        return Ok(());
    }

    let block_node = cursor.push(NodeValue::FootnotesBlock, 0)?;
    for entry in used {
        let def_node = cursor.push(
            NodeValue::FootnoteDef(NodeFootnoteDef {
                num: entry.ordinal.get(),
            }),
            0,
        )?;
        block.inline(cursor, &entry.contents)?;
        cursor.pop(def_node);
    }
    cursor.pop(block_node);
    Ok(())
}
