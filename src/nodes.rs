//! The AST node type and the push/pop cursor (spec C2), plus recursive
//! disposal (spec C9).
//!
//! Nodes live in a [`typed_arena::Arena`] and are referenced the way
//! `arena_tree::Node` intends: as `&'a AstNode<'a>`. Ownership in the
//! sense spec §3 describes (a node owns its children and its payload
//! buffers) falls out of that for free — the arena owns every byte, and
//! dropping the arena drops everything in one pass. `node_free` degrades
//! to a no-op kept for API-contract parity with §4.8/§6: the caller
//! drops the arena (or lets it go out of scope) to release the tree.

use std::cell::{Cell, RefCell};

use crate::arena_tree::Node;
use crate::buffer::TextBuf;

/// A tiny hand-rolled flag set, since nothing in the retrieved pack
/// carries a `bitflags` dependency and these sets are two or three
/// bits wide.
macro_rules! bitflags_lite {
    ($name:ident { $( $flag:ident = $val:expr ),+ $(,)? }) => {
        #[derive(Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name(u8);

        impl $name {
            $( pub const $flag: $name = $name($val); )+

            pub const fn empty() -> Self {
                $name(0)
            }

            pub fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            pub fn insert(&mut self, other: Self) {
                self.0 |= other.0;
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "("))?;
                let mut first = true;
                $(
                    if self.0 & $name::$flag.0 != 0 {
                        if !first {
                            write!(f, " | ")?;
                        }
                        write!(f, stringify!($flag))?;
                        first = false;
                    }
                )+
                if first {
                    write!(f, "empty")?;
                }
                write!(f, ")")
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                $name(self.0 | rhs.0)
            }
        }

        impl std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }
    };
}

bitflags_lite! {
    ListFlags {
        ORDERED = 1 << 0,
        DEFINITION = 1 << 1,
        BLOCK_MODE = 1 << 2,
    }
}

bitflags_lite! {
    TableAlign {
        LEFT = 1 << 0,
        RIGHT = 1 << 1,
        HEADER = 1 << 2,
    }
}

/// The tagged union of every node kind the parser can produce.
///
/// Variants are grouped block-then-inline, matching the order they're
/// introduced in spec §3/§4.6/§4.7.
#[derive(Debug, Clone)]
pub enum NodeValue {
    // --- document scaffolding ---
    Root,
    DocHeader,
    DocFooter,
    Meta(NodeMeta),

    // --- block constructs (§4.6) ---
    BlockQuote,
    List(NodeList),
    ListItem(NodeList),
    BlockCode(NodeBlockCode),
    BlockHtml(TextBuf),
    Header(NodeHeader),
    HRule,
    Paragraph(NodeParagraph),
    Definition,
    DefinitionTitle,
    DefinitionData,
    TableBlock(NodeTable),
    TableHeader,
    TableRow,
    TableBody,
    TableCell(NodeTableCell),
    FootnotesBlock,

    // --- inline constructs (§4.7) ---
    NormalText(TextBuf),
    Codespan(TextBuf),
    Entity(TextBuf),
    RawHtml(TextBuf),
    MathBlock(NodeMath),
    Emphasis,
    DoubleEmphasis,
    TripleEmphasis,
    Strikethrough,
    Highlight,
    Superscript,
    Link(NodeLink),
    Image(NodeImage),
    LinkAuto(NodeLinkAuto),
    LineBreak,
    FootnoteRef(NodeFootnoteRef),
    FootnoteDef(NodeFootnoteDef),
}

#[derive(Debug, Clone, Default)]
pub struct NodeMeta {
    pub key: TextBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutolinkKind {
    None,
    Normal,
    Email,
}

impl Default for AutolinkKind {
    fn default() -> Self {
        AutolinkKind::None
    }
}

#[derive(Debug, Clone, Default)]
pub struct NodeLink {
    pub link: TextBuf,
    pub title: TextBuf,
}

#[derive(Debug, Clone, Default)]
pub struct NodeImage {
    pub link: TextBuf,
    pub title: TextBuf,
    pub alt: TextBuf,
    pub dims: TextBuf,
    pub attr_width: TextBuf,
    pub attr_height: TextBuf,
}

#[derive(Debug, Clone, Default)]
pub struct NodeLinkAuto {
    pub link: TextBuf,
    pub text: TextBuf,
    pub kind: AutolinkKind,
}

#[derive(Debug, Clone, Default)]
pub struct NodeBlockCode {
    pub text: TextBuf,
    pub lang: TextBuf,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NodeHeader {
    /// Stored as level-1, so ATX `#` is level 0; invariant §3.4 bounds
    /// this to 0..=5.
    pub level: u8,
}

#[derive(Debug, Clone, Default)]
pub struct NodeList {
    pub flags: ListFlags,
    /// Ordinal for a `ListItem`; unused (0) on the owning `List`.
    pub ordinal: usize,
    /// For ordered lists, the literal start-number string (≤9 bytes per §3).
    pub start: Option<TextBuf>,
}

impl NodeList {
    pub fn is_ordered(&self) -> bool {
        self.flags.contains(ListFlags::ORDERED)
    }

    pub fn is_definition(&self) -> bool {
        self.flags.contains(ListFlags::DEFINITION)
    }

    pub fn is_block_mode(&self) -> bool {
        self.flags.contains(ListFlags::BLOCK_MODE)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NodeParagraph {
    pub lines: usize,
    /// Trailing-blank-line flag; true when a blank line was seen
    /// directly after this paragraph (drives loose-list detection).
    pub beoln: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NodeTable {
    pub columns: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NodeTableCell {
    pub col: usize,
    pub align: TableAlign,
}

#[derive(Debug, Clone, Default)]
pub struct NodeMath {
    pub text: TextBuf,
    pub display: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NodeFootnoteRef {
    pub num: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NodeFootnoteDef {
    pub num: u32,
}

impl NodeValue {
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeValue::Root
                | NodeValue::DocHeader
                | NodeValue::DocFooter
                | NodeValue::Meta(..)
                | NodeValue::BlockQuote
                | NodeValue::List(..)
                | NodeValue::ListItem(..)
                | NodeValue::BlockCode(..)
                | NodeValue::BlockHtml(..)
                | NodeValue::Header(..)
                | NodeValue::HRule
                | NodeValue::Paragraph(..)
                | NodeValue::Definition
                | NodeValue::DefinitionTitle
                | NodeValue::DefinitionData
                | NodeValue::TableBlock(..)
                | NodeValue::TableHeader
                | NodeValue::TableRow
                | NodeValue::TableBody
                | NodeValue::TableCell(..)
                | NodeValue::FootnotesBlock
                | NodeValue::MathBlock(..)
        )
    }

    pub fn text(&self) -> Option<&TextBuf> {
        match self {
            NodeValue::NormalText(t)
            | NodeValue::Codespan(t)
            | NodeValue::Entity(t)
            | NodeValue::RawHtml(t)
            | NodeValue::BlockHtml(t) => Some(t),
            _ => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut TextBuf> {
        match self {
            NodeValue::NormalText(t)
            | NodeValue::Codespan(t)
            | NodeValue::Entity(t)
            | NodeValue::RawHtml(t)
            | NodeValue::BlockHtml(t) => Some(t),
            _ => None,
        }
    }
}

/// Per-node metadata the parser needs beyond the tagged value itself:
/// the unique id (invariant §3.2) and the line it started at.
#[derive(Debug, Clone)]
pub struct Ast {
    pub id: u32,
    pub value: NodeValue,
    pub start_line: u32,
}

/// Nodes wrap their `Ast` in a `RefCell`: `arena_tree::Node` gives
/// interior mutability for its own sibling/parent/child links via
/// `Cell`, but the payload itself (`T`) is stored plain, so mutating a
/// node already appended to the tree — trimming a trailing `NORMAL_TEXT`
/// after an autolink rewind, for instance — needs its own cell.
pub type AstNode<'a> = Node<'a, RefCell<Ast>>;

fn make_ast(id: u32, value: NodeValue, start_line: u32) -> Ast {
    Ast {
        id,
        value,
        start_line,
    }
}

/// Depth exceeded the configured maximum (spec §7, `DepthExceeded`).
#[derive(Debug, Clone, Copy)]
pub struct DepthExceeded;

/// The push/pop cursor described in spec §4.2.
///
/// `push` allocates a node of the given value, appends it as the last
/// child of the current cursor, and moves the cursor to it, checking
/// the configured maximum depth on the way in. `pop` moves the cursor
/// back to the node's parent. Callers must balance every `push` with
/// exactly one `pop`; at the end of a parse the cursor must again be
/// the root and depth must be zero (spec §4.2, invariant §3.3).
pub struct Cursor<'a> {
    arena: &'a typed_arena::Arena<AstNode<'a>>,
    current: Cell<&'a AstNode<'a>>,
    depth: Cell<usize>,
    max_depth: usize,
    next_id: Cell<u32>,
    node_count: Cell<u32>,
}

impl<'a> Cursor<'a> {
    pub fn new(
        arena: &'a typed_arena::Arena<AstNode<'a>>,
        root: &'a AstNode<'a>,
        max_depth: usize,
    ) -> Self {
        Cursor {
            arena,
            current: Cell::new(root),
            depth: Cell::new(0),
            max_depth,
            next_id: Cell::new(1),
            node_count: Cell::new(1), // the root itself counts
        }
    }

    pub fn current(&self) -> &'a AstNode<'a> {
        self.current.get()
    }

    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    pub fn node_count(&self) -> u32 {
        self.node_count.get()
    }

    fn alloc_id(&self) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    /// Allocate a node without moving the cursor onto it (used for leaf
    /// inlines like `NORMAL_TEXT` that are appended but never entered).
    pub fn append_leaf(&self, value: NodeValue) -> &'a AstNode<'a> {
        let id = self.alloc_id();
        let start_line = self.current.get().data.borrow().start_line;
        let ast = make_ast(id, value, start_line);
        let node = self.arena.alloc(Node::new(RefCell::new(ast)));
        self.current.get().append(node);
        self.node_count.set(self.node_count.get() + 1);
        node
    }

    /// Push a new node as a child of the current cursor and descend
    /// into it. Returns `Err(DepthExceeded)` without mutating the tree
    /// if `max_depth` (0 = unlimited) would be exceeded.
    pub fn push(
        &self,
        value: NodeValue,
        start_line: u32,
    ) -> Result<&'a AstNode<'a>, DepthExceeded> {
        if self.max_depth != 0 && self.depth.get() >= self.max_depth {
            log::warn!(
                "rejecting node at depth {} >= max_depth {}",
                self.depth.get(),
                self.max_depth
            );
            return Err(DepthExceeded);
        }
        let id = self.alloc_id();
        let ast = make_ast(id, value, start_line);
        let node = self.arena.alloc(Node::new(RefCell::new(ast)));
        self.current.get().append(node);
        self.current.set(node);
        self.depth.set(self.depth.get() + 1);
        self.node_count.set(self.node_count.get() + 1);
        Ok(node)
    }

    /// Pop the cursor back to the parent of `expected`. Panics (a
    /// programmer error, not a parse error) if the cursor isn't
    /// currently at `expected` — push/pop must nest lexically.
    pub fn pop(&self, expected: &'a AstNode<'a>) {
        assert!(
            self.current.get().same_node(expected),
            "push/pop cursor mismatch"
        );
        let parent = expected
            .parent()
            .expect("pop() called with no parent (popped the root?)");
        self.current.set(parent);
        self.depth.set(self.depth.get() - 1);
    }
}

/// Recursive disposal (spec C9 / §4.2). With arena-backed nodes this is
/// a no-op: every buffer is owned by the arena, which the caller drops
/// as a unit. The function exists so the public API shape matches
/// spec §6's `node_free(root)` entry point.
pub fn node_free<'a>(_root: &'a AstNode<'a>) {}
