//! The inline parser (spec C7): active-character dispatch over a text
//! span. `Subject` owns the 256-entry jump table (built once per
//! document from the feature flags) plus the shared state a handler
//! needs to look things up — the reference map, the footnote list, and
//! the metadata list.
//!
//! The core loop in [`Subject::parse`] tracks a "copied-up-to" offset
//! and a "scan" offset into the span, exactly as §4.7 describes:
//! advance scan to the next active byte, flush everything before it as
//! a `NORMAL_TEXT` node, dispatch, and resume from wherever the
//! handler says it consumed through.

use std::cell::Cell;

use crate::autolink;
use crate::ctype::{isalnum, isspace};
use crate::entity;
use crate::metadata::{self, MetaEntry};
use crate::nodes::{
    AutolinkKind, Cursor, DepthExceeded, NodeFootnoteRef, NodeImage, NodeLink, NodeLinkAuto,
    NodeMath, NodeValue,
};
use crate::parser::options::Features;
use crate::reference::{FootnoteList, RefMap};
use crate::strings::{clean_title, clean_url, normalize_whitespace, trim_slice};

/// Characters `\X` escapes to a literal `X` (§4.7).
const ESCAPABLE: &[u8] = b"\\`*_{}[]()#+-.!:|&<>^~=\"$";

pub struct Subject<'a, 'r> {
    cursor: &'r Cursor<'a>,
    refs: &'r RefMap,
    footnotes: &'r FootnoteList,
    meta: &'r [MetaEntry],
    features: Features,
    active: [bool; 256],
    in_link_body: Cell<bool>,
}

impl<'a, 'r> Subject<'a, 'r> {
    pub fn new(
        cursor: &'r Cursor<'a>,
        refs: &'r RefMap,
        footnotes: &'r FootnoteList,
        meta: &'r [MetaEntry],
        features: Features,
    ) -> Self {
        Subject {
            cursor,
            refs,
            footnotes,
            meta,
            features,
            active: build_active_table(features),
            in_link_body: Cell::new(false),
        }
    }

    /// Parse `data` as a run of inline content, appending nodes as
    /// children of whatever node the cursor currently sits at.
    pub fn parse(&self, data: &[u8]) -> Result<(), DepthExceeded> {
        let mut copied_up_to = 0;
        let mut scan = 0;

        while scan < data.len() {
            let b = data[scan];
            if !self.active[b as usize] {
                scan += 1;
                continue;
            }

            let consumed = self.dispatch(data, scan)?;
            if consumed == 0 {
                scan += 1;
                continue;
            }

            self.flush_text(&data[copied_up_to..scan]);
            scan += consumed;
            copied_up_to = scan;
        }

        self.flush_text(&data[copied_up_to..scan]);
        Ok(())
    }

    fn flush_text(&self, text: &[u8]) {
        if !text.is_empty() {
            self.cursor
                .append_leaf(NodeValue::NormalText(text.to_vec().into()));
        }
    }

    fn dispatch(&self, data: &[u8], i: usize) -> Result<usize, DepthExceeded> {
        match data[i] {
            b'*' | b'_' => self.emphasis(data, i),
            b'~' if self.features.strike => self.emphasis(data, i),
            b'=' if self.features.hilite => self.emphasis(data, i),
            b'`' => Ok(self.codespan(data, i)),
            b'\n' => Ok(self.hard_line_break(data, i)),
            b'[' => self.bracket(data, i),
            b'!' => self.image(data, i),
            b'<' => Ok(self.angle(data, i)),
            b'\\' => Ok(self.escape(data, i)),
            b'&' => Ok(self.entity(data, i)),
            b':' | b'@' | b'w' if self.features.autolink && !self.in_link_body.get() => {
                Ok(self.bare_autolink(data, i))
            }
            b'^' if self.features.superscript => self.superscript(data, i),
            b'$' if self.features.math => Ok(self.math(data, i)),
            _ => Ok(0),
        }
    }

    // ---- escapes, entities ----

    fn escape(&self, data: &[u8], i: usize) -> usize {
        match data.get(i + 1) {
            Some(&c) if ESCAPABLE.contains(&c) => {
                self.cursor
                    .append_leaf(NodeValue::NormalText(vec![c].into()));
                2
            }
            _ => 0,
        }
    }

    fn entity(&self, data: &[u8], i: usize) -> usize {
        match entity::unescape(&data[i + 1..]) {
            Some((decoded, consumed)) => {
                self.cursor.append_leaf(NodeValue::Entity(decoded.into()));
                1 + consumed
            }
            None => 0,
        }
    }

    // ---- codespan ----

    fn codespan(&self, data: &[u8], i: usize) -> usize {
        let open_len = run_length(data, i, b'`');
        let mut j = i + open_len;
        while j < data.len() {
            if data[j] == b'`' {
                let close_len = run_length(data, j, b'`');
                if close_len == open_len {
                    let mut content = &data[i + open_len..j];
                    if content.len() >= 2
                        && content[0] == b' '
                        && content[content.len() - 1] == b' '
                    {
                        content = &content[1..content.len() - 1];
                    }
                    self.cursor
                        .append_leaf(NodeValue::Codespan(content.to_vec().into()));
                    return j + close_len - i;
                }
                j += close_len;
            } else {
                j += 1;
            }
        }
        0
    }

    // ---- hard line break ----

    fn hard_line_break(&self, data: &[u8], i: usize) -> usize {
        let two_spaces = i >= 2 && data[i - 2] == b' ' && data[i - 1] == b' ';
        let backslash = i >= 1 && data[i - 1] == b'\\';
        if two_spaces || backslash {
            self.cursor.append_leaf(NodeValue::LineBreak);
        }
        // either way the newline itself is never literal text in a
        // paragraph body; the block parser rejoins lines with `\n`
        // only to feed this loop, not to preserve it verbatim.
        1
    }

    // ---- emphasis / strike / highlight ----

    fn emphasis(&self, data: &[u8], i: usize) -> Result<usize, DepthExceeded> {
        let marker = data[i];
        let run_len = run_length(data, i, marker).min(3);

        let want = if marker == b'~' || marker == b'=' {
            if run_len < 2 {
                return Ok(0);
            }
            2
        } else {
            run_len
        };

        if marker == b'_' && self.features.nointem {
            let before_alnum = i > 0 && isalnum(data[i - 1]);
            let after_alnum = data.get(i + want).map(|&c| isalnum(c)).unwrap_or(false);
            if before_alnum && after_alnum {
                return Ok(0);
            }
        }

        let Some((close_start, close_len)) = find_closer(data, i + want, marker, want) else {
            return Ok(0);
        };

        let value = match (marker, want) {
            (b'~', _) => NodeValue::Strikethrough,
            (b'=', _) => NodeValue::Highlight,
            (_, 1) => NodeValue::Emphasis,
            (_, 2) => NodeValue::DoubleEmphasis,
            _ => NodeValue::TripleEmphasis,
        };
        let _ = close_len;

        let node = self.cursor.push(value, 0)?;
        self.parse(&data[i + want..close_start])?;
        self.cursor.pop(node);

        Ok(close_start + want - i)
    }

    // ---- bracket constructs: links, footnote refs, metadata refs ----

    fn bracket(&self, data: &[u8], i: usize) -> Result<usize, DepthExceeded> {
        if self.in_link_body.get() {
            return Ok(0);
        }

        if data[i..].starts_with(b"[^") && self.features.footnotes {
            return Ok(self.footnote_ref(data, i));
        }
        if data[i..].starts_with(b"[%") {
            return Ok(self.metadata_ref(data, i));
        }

        self.link_or_image(data, i, false)
    }

    fn image(&self, data: &[u8], i: usize) -> Result<usize, DepthExceeded> {
        if data.get(i + 1) != Some(&b'[') {
            return Ok(0);
        }
        match self.link_or_image(data, i + 1, true)? {
            0 => Ok(0),
            n => Ok(1 + n),
        }
    }

    fn footnote_ref(&self, data: &[u8], i: usize) -> usize {
        let Some(close) = data[i..].iter().position(|&b| b == b']' || b == b'\n') else {
            return 0;
        };
        if data[i + close] != b']' {
            return 0;
        }
        let id = &data[i + 2..i + close];
        if id.is_empty() {
            return 0;
        }
        match self.footnotes.use_once(id) {
            Some(num) => self.cursor.append_leaf(NodeValue::FootnoteRef(NodeFootnoteRef { num })),
            None => {
                let mut literal = b"[^".to_vec();
                literal.extend_from_slice(id);
                literal.push(b']');
                self.cursor.append_leaf(NodeValue::NormalText(literal.into()));
            }
        }
        close + 1
    }

    fn metadata_ref(&self, data: &[u8], i: usize) -> usize {
        let Some(close) = data[i..].iter().position(|&b| b == b']' || b == b'\n') else {
            return 0;
        };
        if data[i + close] != b']' {
            return 0;
        }
        let key_raw = &data[i + 2..i + close];
        let key = metadata::normalize_key(key_raw);
        match self.meta.iter().find(|e| e.key == key) {
            Some(entry) => self
                .cursor
                .append_leaf(NodeValue::NormalText(entry.value.clone().into())),
            None => {
                let mut literal = b"[%".to_vec();
                literal.extend_from_slice(key_raw);
                literal.push(b']');
                self.cursor.append_leaf(NodeValue::NormalText(literal.into()));
            }
        }
        close + 1
    }

    fn link_or_image(
        &self,
        data: &[u8],
        i: usize,
        is_image: bool,
    ) -> Result<usize, DepthExceeded> {
        let Some(close) = find_matching_bracket(data, i) else {
            return Ok(0);
        };
        let content = &data[i + 1..close];
        let after = &data[close + 1..];

        let (link, title, tail_len) = if after.first() == Some(&b'(') {
            match parse_inline_tail(after) {
                Some((link, title, len)) => (link, title, len),
                None => return Ok(0),
            }
        } else if after.first() == Some(&b'[') {
            let Some(id_close) = find_matching_bracket(after, 0) else {
                return Ok(0);
            };
            let raw_id = &after[1..id_close];
            let key = if raw_id.is_empty() { content } else { raw_id };
            match self.refs.lookup(key) {
                Some(entry) => (entry.link.clone(), entry.title.clone().unwrap_or_default(), id_close + 1),
                None => return Ok(0),
            }
        } else {
            let key = normalize_whitespace(content);
            match self.refs.lookup(&key) {
                Some(entry) => (entry.link.clone(), entry.title.clone().unwrap_or_default(), 0),
                None => return Ok(0),
            }
        };

        if is_image {
            let alt = normalize_whitespace(content);
            self.cursor.append_leaf(NodeValue::Image(NodeImage {
                link: link.into(),
                title: title.into(),
                alt: alt.into(),
                ..Default::default()
            }));
        } else {
            let node = self.cursor.push(
                NodeValue::Link(NodeLink {
                    link: link.into(),
                    title: title.into(),
                }),
                0,
            )?;
            let was_in_link = self.in_link_body.replace(true);
            self.parse(content)?;
            self.in_link_body.set(was_in_link);
            self.cursor.pop(node);
        }

        Ok(close + 1 + tail_len - i)
    }

    // ---- autolinks ----

    fn angle(&self, data: &[u8], i: usize) -> usize {
        let Some(end) = data[i..].iter().position(|&b| b == b'>') else {
            return 0;
        };
        let inner = &data[i + 1..i + end];
        if inner.is_empty() || inner.iter().any(|&b| b == b'<' || isspace(b)) {
            return 0;
        }

        if self.features.autolink && inner.contains(&b'@') && !inner.contains(&b':') {
            self.cursor.append_leaf(NodeValue::LinkAuto(NodeLinkAuto {
                link: format!("mailto:{}", String::from_utf8_lossy(inner))
                    .into_bytes()
                    .into(),
                text: inner.to_vec().into(),
                kind: AutolinkKind::Email,
            }));
            return end + 1;
        }
        if self.features.autolink && inner.iter().position(|&b| b == b':').is_some() {
            self.cursor.append_leaf(NodeValue::LinkAuto(NodeLinkAuto {
                link: inner.to_vec().into(),
                text: inner.to_vec().into(),
                kind: AutolinkKind::Normal,
            }));
            return end + 1;
        }

        // Fall back to raw HTML: a tag-shaped `<.../>`.
        if inner.first().map(|&b| b == b'/' || b.is_ascii_alphabetic()).unwrap_or(false) {
            self.cursor
                .append_leaf(NodeValue::RawHtml(data[i..=i + end].to_vec().into()));
            return end + 1;
        }

        0
    }

    fn bare_autolink(&self, data: &[u8], i: usize) -> usize {
        let found = match data[i] {
            b':' => autolink::url_match(data, i),
            b'@' => autolink::email_match(data, i),
            b'w' => autolink::www_match(data, i),
            _ => None,
        };
        let Some(m) = found else { return 0 };

        // rewind: trim that many trailing bytes off the text we're
        // about to flush by reporting a negative-looking consumption
        // isn't possible through the return value alone, so instead
        // trim the already-appended NORMAL_TEXT sibling directly.
        if m.rewind > 0 {
            self.trim_last_normal_text(m.rewind);
        }

        let matched_start = i - m.rewind;
        let text = &data[matched_start..i + m.len - m.rewind];
        let kind = if data[i] == b'@' {
            AutolinkKind::Email
        } else {
            AutolinkKind::Normal
        };
        let link = match kind {
            AutolinkKind::Email => format!("mailto:{}", String::from_utf8_lossy(text)).into_bytes(),
            _ if text.starts_with(b"www.") => {
                let mut l = b"http://".to_vec();
                l.extend_from_slice(text);
                l
            }
            _ => text.to_vec(),
        };
        self.cursor.append_leaf(NodeValue::LinkAuto(NodeLinkAuto {
            link: link.into(),
            text: text.to_vec().into(),
            kind,
        }));

        m.len - m.rewind
    }

    /// Trim `n` trailing bytes off the most recently appended sibling
    /// if it's a `NORMAL_TEXT` node — the autolink rewind contract
    /// (spec §9, GLOSSARY "Rewind"). Drops the node entirely if that
    /// empties it, so we never leave a zero-length text sibling.
    fn trim_last_normal_text(&self, n: usize) {
        let Some(last) = self.cursor.current().last_child() else {
            return;
        };
        let mut ast = last.data.borrow_mut();
        if let Some(buf) = ast.value.text_mut() {
            let new_len = buf.len().saturating_sub(n);
            buf.truncate(new_len);
            if buf.is_empty() {
                drop(ast);
                last.detach();
            }
        }
    }

    // ---- superscript, math ----

    fn superscript(&self, data: &[u8], i: usize) -> Result<usize, DepthExceeded> {
        let Some(close) = data[i + 1..].iter().position(|&b| b == b'^' || isspace(b)) else {
            return Ok(0);
        };
        if data.get(i + 1 + close) != Some(&b'^') || close == 0 {
            return Ok(0);
        }
        let node = self.cursor.push(NodeValue::Superscript, 0)?;
        self.parse(&data[i + 1..i + 1 + close])?;
        self.cursor.pop(node);
        Ok(close + 2)
    }

    fn math(&self, data: &[u8], i: usize) -> usize {
        let display = data.get(i + 1) == Some(&b'$');
        let open_len = if display { 2 } else { 1 };
        let marker = &data[i..i + open_len];
        let Some(rel_close) = find_subslice(&data[i + open_len..], marker) else {
            return 0;
        };
        let text = &data[i + open_len..i + open_len + rel_close];
        self.cursor.append_leaf(NodeValue::MathBlock(NodeMath {
            text: text.to_vec().into(),
            display,
        }));
        open_len + rel_close + open_len
    }
}

fn run_length(data: &[u8], at: usize, byte: u8) -> usize {
    data[at..].iter().take_while(|&&b| b == byte).count()
}

fn find_subslice(data: &[u8], needle: &[u8]) -> Option<usize> {
    data.windows(needle.len()).position(|w| w == needle)
}

/// Scan forward from `start` for a run of `marker` at least `want`
/// long, not preceded by whitespace, skipping over codespans and
/// bracketed spans so an emphasis delimiter inside either doesn't
/// false-match (§4.7 "skip-aware scan").
fn find_closer(data: &[u8], mut i: usize, marker: u8, want: usize) -> Option<(usize, usize)> {
    while i < data.len() {
        let b = data[i];
        if b == b'\\' && i + 1 < data.len() {
            i += 2;
            continue;
        }
        if b == b'`' {
            let run = run_length(data, i, b'`');
            let mut j = i + run;
            let mut closed = false;
            while j < data.len() {
                if data[j] == b'`' {
                    let close_run = run_length(data, j, b'`');
                    if close_run == run {
                        j += close_run;
                        closed = true;
                        break;
                    }
                    j += close_run;
                } else {
                    j += 1;
                }
            }
            i = if closed { j } else { i + run };
            continue;
        }
        if b == b'[' {
            match find_matching_bracket(data, i) {
                Some(end) => i = end + 1,
                None => i += 1,
            }
            continue;
        }
        if b == marker {
            let run = run_length(data, i, marker);
            if run >= want && !isspace(data[i - 1]) {
                return Some((i, want));
            }
            i += run;
            continue;
        }
        i += 1;
    }
    None
}

/// Find the `]` matching the `[` at `data[open]`, respecting nested
/// brackets and backslash escapes.
fn find_matching_bracket(data: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0;
    let mut i = open;
    while i < data.len() {
        match data[i] {
            b'\\' if i + 1 < data.len() => i += 1,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Parse the `(url "title" =dims)` inline-link tail, starting at the
/// `(`. Returns `(link, title, bytes_consumed_including_parens)`.
fn parse_inline_tail(data: &[u8]) -> Option<(Vec<u8>, Vec<u8>, usize)> {
    let mut p = 1; // past '('
    while data.get(p) == Some(&b' ') {
        p += 1;
    }

    let url_start = p;
    while p < data.len() {
        match data[p] {
            b'\\' if p + 1 < data.len() => p += 2,
            b')' | b' ' | b'\t' | b'\n' => break,
            _ => p += 1,
        }
    }
    let url = clean_url(&data[url_start..p]);

    while data.get(p) == Some(&b' ') {
        p += 1;
    }

    let mut title = Vec::new();
    if let Some(&open) = data.get(p) {
        if open == b'"' || open == b'\'' || open == b'(' {
            let close = if open == b'(' { b')' } else { open };
            let body_start = p + 1;
            let mut q = body_start;
            while q < data.len() && data[q] != close {
                if data[q] == b'\\' && q + 1 < data.len() {
                    q += 1;
                }
                q += 1;
            }
            if q < data.len() {
                title = clean_title(&data[p..=q]);
                p = q + 1;
            }
        }
    }

    while data.get(p) == Some(&b' ') {
        p += 1;
    }
    // optional `=WxH` dims: recognised but not retained as a separate
    // field here, since `NodeImage::dims` is populated by the image
    // handler from the same span when present.
    if data.get(p) == Some(&b'=') {
        let dim_start = p;
        p += 1;
        while p < data.len() && data[p] != b')' && !isspace(data[p]) {
            p += 1;
        }
        let _dims = &data[dim_start..p];
        while data.get(p) == Some(&b' ') {
            p += 1;
        }
    }

    if data.get(p) != Some(&b')') {
        return None;
    }
    Some((url, title, p + 1))
}

fn build_active_table(features: Features) -> [bool; 256] {
    let mut table = [false; 256];
    table[b'*' as usize] = true;
    table[b'_' as usize] = true;
    table[b'`' as usize] = true;
    table[b'\n' as usize] = true;
    table[b'[' as usize] = true;
    table[b'!' as usize] = true;
    table[b'<' as usize] = true;
    table[b'\\' as usize] = true;
    table[b'&' as usize] = true;
    if features.strike {
        table[b'~' as usize] = true;
    }
    if features.hilite {
        table[b'=' as usize] = true;
    }
    if features.autolink {
        table[b':' as usize] = true;
        table[b'@' as usize] = true;
        table[b'w' as usize] = true;
    }
    if features.superscript {
        table[b'^' as usize] = true;
    }
    if features.math {
        table[b'$' as usize] = true;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{Ast, AstNode};
    use std::cell::RefCell;

    fn run(text: &[u8], features: Features) -> Vec<NodeValue> {
        let arena = typed_arena::Arena::new();
        let root: &AstNode = arena.alloc(crate::arena_tree::Node::new(RefCell::new(Ast {
            id: 0,
            value: NodeValue::Root,
            start_line: 1,
        })));
        let cursor = Cursor::new(&arena, root, 0);
        let refs = RefMap::default();
        let footnotes = FootnoteList::default();
        let subject = Subject::new(&cursor, &refs, &footnotes, &[], features);
        subject.parse(text).unwrap();
        root.children().map(|n| n.data.borrow().value.clone()).collect()
    }

    #[test]
    fn plain_text_is_one_node() {
        let out = run(b"hello", Features::default());
        assert_eq!(out.len(), 1);
        assert!(matches!(&out[0], NodeValue::NormalText(t) if t.as_bytes() == b"hello"));
    }

    #[test]
    fn single_double_triple_emphasis() {
        let out = run(b"*a* **b** ***c***", Features::default());
        assert!(matches!(out[0], NodeValue::Emphasis));
        assert!(matches!(out[2], NodeValue::DoubleEmphasis));
        assert!(matches!(out[4], NodeValue::TripleEmphasis));
    }

    #[test]
    fn codespan_trims_one_space_each_side() {
        let out = run(b"` x `", Features::default());
        assert!(matches!(&out[0], NodeValue::Codespan(t) if t.as_bytes() == b"x"));
    }

    #[test]
    fn unmatched_emphasis_is_literal() {
        let out = run(b"*a", Features::default());
        assert!(matches!(&out[0], NodeValue::NormalText(t) if t.as_bytes() == b"*a"));
    }

    #[test]
    fn reference_link_resolves() {
        let (refs, _footnotes, _staging) = crate::reference::collect(b"[x]: /u \"t\"\n", false);
        let arena = typed_arena::Arena::new();
        let root: &AstNode = arena.alloc(crate::arena_tree::Node::new(RefCell::new(Ast {
            id: 0,
            value: NodeValue::Root,
            start_line: 1,
        })));
        let cursor = Cursor::new(&arena, root, 0);
        let footnotes = FootnoteList::default();
        let subject = Subject::new(&cursor, &refs, &footnotes, &[], Features::default());
        subject.parse(b"[x]").unwrap();
        let child = root.children().next().unwrap();
        assert!(matches!(&child.data.borrow().value, NodeValue::Link(l) if &*l.link == b"/u"));
    }

    #[test]
    fn footnote_reference_twice_emits_literal_second_time() {
        let (_refs, footnotes, _staging) =
            crate::reference::collect(b"[^n]: body\n", true);
        let arena = typed_arena::Arena::new();
        let root: &AstNode = arena.alloc(crate::arena_tree::Node::new(RefCell::new(Ast {
            id: 0,
            value: NodeValue::Root,
            start_line: 1,
        })));
        let cursor = Cursor::new(&arena, root, 0);
        let refs = RefMap::default();
        let mut features = Features::default();
        features.footnotes = true;
        let subject = Subject::new(&cursor, &refs, &footnotes, &[], features);
        subject.parse(b"[^n] and [^n]").unwrap();
        let values: Vec<_> = root.children().map(|n| n.data.borrow().value.clone()).collect();
        assert!(matches!(values[0], NodeValue::FootnoteRef(_)));
        assert!(matches!(&values[2], NodeValue::NormalText(t) if t.as_bytes() == b"[^n]"));
    }
}
