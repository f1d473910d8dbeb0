//! Configuration for the document driver (spec C8, "Document state").
//!
//! Renderer selection and renderer-specific knobs live outside this
//! crate (§1 Non-goals/out-of-scope list); `Options` only carries what
//! the parser itself consults.

use crate::metadata::MetaQueues;

/// Feature flags gating which extensions the block/inline parsers
/// recognise. Plain bools, not a bitset — mirrors the umbrella-struct
/// shape the ambient configuration style favours, and every flag here
/// is independently toggleable so a bitset buys nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Features {
    /// Pipe-table blocks (§4.6 priority 6).
    pub tables: bool,
    /// Fenced code blocks (§4.6 priority 5).
    pub fenced: bool,
    /// `[^id]` footnote references and `[^id]: ...` definitions.
    pub footnotes: bool,
    /// Bare URL/`www.`/email autolinks (§4.7, `:`/`@`/`w`).
    pub autolink: bool,
    /// `~~strike~~` (double-tilde emphasis).
    pub strike: bool,
    /// `==highlight==` (double-equals emphasis).
    pub hilite: bool,
    /// `^superscript^`.
    pub superscript: bool,
    /// `$inline$` / `$$display$$` math spans.
    pub math: bool,
    /// Suppresses `_intra_word_` emphasis.
    pub nointem: bool,
    /// Disables 4-space indented code blocks (§4.6 priority 8).
    pub nocodeind: bool,
    /// Leading key/value metadata block (C5).
    pub metadata: bool,
    /// Stricter CommonMark-mode rules: ATX requires a following space,
    /// ordered markers cap at 9 digits and accept `)` as well as `.`.
    pub commonmark: bool,
    /// `: ` definition lists (§4.6 priority 10).
    pub deflist: bool,
    /// Image-specific extended attributes (`=WxH` dimensions).
    pub img_ext: bool,
}

/// Configuration handed to [`crate::parser::doc_new`] (spec §4.8/§6).
#[derive(Debug, Clone)]
pub struct Options {
    pub features: Features,
    /// Maximum block/inline nesting depth; 0 means unlimited. Spec §7
    /// requires this be enforced, not merely advisory.
    pub max_depth: usize,
    /// Command-line-supplied metadata queues (§4.5): `defaults` fill
    /// gaps the document doesn't set, `overrides` always win.
    pub meta_queues: MetaQueues,
    /// Opaque bits reserved for collaborators outside this crate
    /// (renderer selection flags, etc.) — the parser never inspects
    /// them, only carries them through so a caller's driver code can.
    pub oflags: u32,
    /// Opaque renderer selector, meaningful only to the external
    /// renderer collaborator (§1 out-of-scope).
    pub renderer_kind: RendererKind,
}

/// The enforced default depth limit (spec §3 invariant 3). A caller
/// has to opt into `max_depth: 0` (unlimited) explicitly; the default
/// constructor never leaves a document unguarded against pathological
/// nesting (spec §1 purpose (d)).
pub const DEFAULT_MAX_DEPTH: usize = 128;

impl Default for Options {
    fn default() -> Self {
        Options {
            features: Features::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            meta_queues: MetaQueues::default(),
            oflags: 0,
            renderer_kind: RendererKind::default(),
        }
    }
}

/// Placeholder for the renderer the document will eventually be
/// handed to; this crate never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RendererKind {
    #[default]
    Unspecified,
    Other(u32),
}
