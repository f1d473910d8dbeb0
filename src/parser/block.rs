//! The block parser (spec C6): a line-at-a-time driver that tests
//! block-type predicates in priority order at each offset and recurses
//! into containers (blockquotes, list items) the way the cursor's
//! push/pop discipline expects.
//!
//! This module only ever walks a slice of already-collected lines
//! (reference/footnote definition lines have already been elided by
//! [`crate::reference::collect`] by the time anything here runs) and
//! never looks past the slice it's given — a blockquote or list item
//! recurses by handing a dedented sub-slice back into [`BlockParser::parse_lines`].

use crate::metadata::MetaEntry;
use crate::nodes::{
    Cursor, DepthExceeded, ListFlags, NodeBlockCode, NodeHeader, NodeList, NodeParagraph,
    NodeValue,
};
use crate::parser::inlines::Subject;
use crate::parser::options::Features;
use crate::parser::table;
use crate::reference::{FootnoteList, RefMap};
use crate::scanners;
use crate::strings::{is_blank, trim_slice};

/// Bundles the read-only state every block (and, transitively, every
/// inline run) needs: the reference/footnote tables and the metadata
/// list collected in earlier passes, plus the active feature set.
pub struct BlockParser<'r> {
    refs: &'r RefMap,
    footnotes: &'r FootnoteList,
    meta: &'r [MetaEntry],
    features: Features,
}

impl<'r> BlockParser<'r> {
    pub fn new(
        refs: &'r RefMap,
        footnotes: &'r FootnoteList,
        meta: &'r [MetaEntry],
        features: Features,
    ) -> Self {
        BlockParser {
            refs,
            footnotes,
            meta,
            features,
        }
    }

    pub fn parse_document<'a>(
        &self,
        cursor: &Cursor<'a>,
        text: &[u8],
    ) -> Result<(), DepthExceeded> {
        let lines = split_lines(text);
        let refs: Vec<&[u8]> = lines.iter().map(|l| l.as_slice()).collect();
        self.parse_lines(cursor, &refs)
    }

    pub(crate) fn inline<'a>(&self, cursor: &Cursor<'a>, text: &[u8]) -> Result<(), DepthExceeded> {
        let subject = Subject::new(cursor, self.refs, self.footnotes, self.meta, self.features);
        subject.parse(text)
    }

    fn parse_lines<'a>(&self, cursor: &Cursor<'a>, lines: &[&[u8]]) -> Result<(), DepthExceeded> {
        let mut i = 0;
        while i < lines.len() {
            i = self.parse_one(cursor, lines, i)?;
        }
        Ok(())
    }

    fn parse_one<'a>(
        &self,
        cursor: &Cursor<'a>,
        lines: &[&[u8]],
        i: usize,
    ) -> Result<usize, DepthExceeded> {
        let line = lines[i];

        if is_blank(line) {
            return Ok(i + 1);
        }

        if let Some((level, content_start)) = scanners::atx_heading(line, self.features.commonmark)
        {
            let node = cursor.push(NodeValue::Header(NodeHeader { level: level - 1 }), 0)?;
            self.inline(cursor, trim_slice(&line[content_start..]))?;
            cursor.pop(node);
            return Ok(i + 1);
        }

        if let Some(tag) = scanners::html_block_open(line) {
            let (text, consumed) = collect_html_block(lines, i, tag);
            cursor.append_leaf(NodeValue::BlockHtml(text.into()));
            return Ok(i + consumed);
        }

        if scanners::thematic_break(line) {
            cursor.append_leaf(NodeValue::HRule);
            return Ok(i + 1);
        }

        if self.features.fenced {
            if let Some((marker, len, info_start)) = scanners::fenced_code_open(line) {
                return Ok(self.parse_fenced(cursor, lines, i, marker, len, info_start));
            }
        }

        if self.features.tables && i + 1 < lines.len() {
            if let Some(aligns) = scanners::table_delimiter_row(lines[i + 1]) {
                let header_cells = scanners::table_row_cells(line);
                if !header_cells.is_empty() && header_cells.len() == aligns.len() {
                    return table::parse_table(self, cursor, lines, i, aligns);
                }
            }
        }

        if scanners::blockquote_marker(line).is_some() {
            return self.parse_blockquote(cursor, lines, i);
        }

        if !self.features.nocodeind {
            if scanners::indented_code(line).is_some() {
                return Ok(self.parse_indented_code(cursor, lines, i));
            }
        }

        if scanners::unordered_list_marker(line).is_some() {
            return self.parse_list(cursor, lines, i, false);
        }

        if self.features.deflist
            && scanners::definition_marker(line).is_some()
            && self.last_child_is_lone_paragraph(cursor)
        {
            return self.parse_definition(cursor, lines, i);
        }

        if scanners::ordered_list_marker(line, self.features.commonmark).is_some() {
            return self.parse_list(cursor, lines, i, true);
        }

        self.parse_paragraph(cursor, lines, i)
    }

    // ---- fenced / indented code ----

    fn parse_fenced<'a>(
        &self,
        cursor: &Cursor<'a>,
        lines: &[&[u8]],
        i: usize,
        marker: u8,
        len: usize,
        info_start: usize,
    ) -> usize {
        let info = trim_slice(&lines[i][info_start..]);
        let lang = info.split(|&b| b == b' ').next().unwrap_or(&[]);

        let mut j = i + 1;
        let mut content = Vec::new();
        while j < lines.len() {
            if scanners::fenced_code_close(lines[j], marker, len) {
                j += 1;
                break;
            }
            content.extend_from_slice(lines[j]);
            content.push(b'\n');
            j += 1;
        }

        cursor.append_leaf(NodeValue::BlockCode(NodeBlockCode {
            text: content.into(),
            lang: lang.to_vec().into(),
        }));
        j
    }

    fn parse_indented_code<'a>(&self, cursor: &Cursor<'a>, lines: &[&[u8]], i: usize) -> usize {
        let mut j = i;
        let mut content = Vec::new();
        while j < lines.len() {
            if let Some(strip) = scanners::indented_code(lines[j]) {
                content.extend_from_slice(&lines[j][strip..]);
                content.push(b'\n');
                j += 1;
                continue;
            }
            if is_blank(lines[j]) {
                let mut k = j;
                while k < lines.len() && is_blank(lines[k]) {
                    k += 1;
                }
                if k < lines.len() && scanners::indented_code(lines[k]).is_some() {
                    for _ in j..k {
                        content.push(b'\n');
                    }
                    j = k;
                    continue;
                }
            }
            break;
        }
        cursor.append_leaf(NodeValue::BlockCode(NodeBlockCode {
            text: content.into(),
            lang: Default::default(),
        }));
        j
    }

    // ---- blockquote ----

    fn parse_blockquote<'a>(
        &self,
        cursor: &Cursor<'a>,
        lines: &[&[u8]],
        i: usize,
    ) -> Result<usize, DepthExceeded> {
        let mut j = i;
        let mut body: Vec<Vec<u8>> = Vec::new();
        while j < lines.len() {
            let line = lines[j];
            if let Some(start) = scanners::blockquote_marker(line) {
                body.push(line[start..].to_vec());
                j += 1;
            } else if is_blank(line) {
                break;
            } else if !body.is_empty() {
                // lazy continuation: a lone non-blank line between
                // quoted lines belongs to the quote (§4.6).
                body.push(line.to_vec());
                j += 1;
            } else {
                break;
            }
        }

        let node = cursor.push(NodeValue::BlockQuote, 0)?;
        let refs: Vec<&[u8]> = body.iter().map(|l| l.as_slice()).collect();
        self.parse_lines(cursor, &refs)?;
        cursor.pop(node);
        Ok(j)
    }

    // ---- lists ----

    fn parse_list<'a>(
        &self,
        cursor: &Cursor<'a>,
        lines: &[&[u8]],
        i: usize,
        ordered: bool,
    ) -> Result<usize, DepthExceeded> {
        let own_indent = leading_spaces_count(lines[i]);
        let start_digits = if ordered {
            scanners::ordered_list_marker(lines[i], self.features.commonmark)
                .map(|(digits, _, _)| digits.to_vec().into())
        } else {
            None
        };

        let mut end = lines.len();
        let mut loose = false;
        let mut j = i + 1;
        while j < lines.len() {
            if is_blank(lines[j]) {
                let mut k = j + 1;
                while k < lines.len() && is_blank(lines[k]) {
                    k += 1;
                }
                if k >= lines.len() {
                    end = j;
                    break;
                }
                let next = lines[k];
                if is_list_marker(next, ordered, self.features.commonmark)
                    || leading_spaces_count(next) > own_indent
                {
                    loose = true;
                    j = k;
                    continue;
                }
                end = j;
                break;
            }
            j += 1;
        }

        let mut item_bounds = Vec::new();
        let mut cur = i;
        for k in (i + 1)..end {
            if is_list_marker(lines[k], ordered, self.features.commonmark)
                && leading_spaces_count(lines[k]) <= own_indent
            {
                item_bounds.push((cur, k));
                cur = k;
            }
        }
        item_bounds.push((cur, end));

        let mut list_flags = if ordered {
            ListFlags::ORDERED
        } else {
            ListFlags::empty()
        };
        if loose {
            list_flags |= ListFlags::BLOCK_MODE;
        }
        let list_node = cursor.push(
            NodeValue::List(NodeList {
                flags: list_flags,
                ordinal: 0,
                start: start_digits,
            }),
            0,
        )?;

        for (idx, (start, stop)) in item_bounds.into_iter().enumerate() {
            let item_lines = dedent_item_lines(lines, start, stop, ordered, self.features.commonmark);
            let has_internal_blank = item_lines
                .iter()
                .take(item_lines.len().saturating_sub(1))
                .any(|l| l.is_empty());
            let block_mode = loose || has_internal_blank;

            let mut item_flags = if ordered {
                ListFlags::ORDERED
            } else {
                ListFlags::empty()
            };
            if block_mode {
                item_flags |= ListFlags::BLOCK_MODE;
            }
            let item_node = cursor.push(
                NodeValue::ListItem(NodeList {
                    flags: item_flags,
                    ordinal: idx + 1,
                    start: None,
                }),
                0,
            )?;

            if block_mode {
                let refs: Vec<&[u8]> = item_lines.iter().map(|l| l.as_slice()).collect();
                self.parse_lines(cursor, &refs)?;
            } else {
                let joined = join_owned_lines(&item_lines);
                self.inline(cursor, trim_slice(&joined))?;
            }
            cursor.pop(item_node);
        }

        cursor.pop(list_node);
        Ok(end)
    }

    // ---- definition lists ----

    fn last_child_is_lone_paragraph<'a>(&self, cursor: &Cursor<'a>) -> bool {
        match cursor.current().last_child() {
            Some(last) => {
                matches!(&last.data.borrow().value, NodeValue::Paragraph(p) if p.lines == 1)
            }
            None => false,
        }
    }

    fn parse_definition<'a>(
        &self,
        cursor: &Cursor<'a>,
        lines: &[&[u8]],
        i: usize,
    ) -> Result<usize, DepthExceeded> {
        let title_node = cursor
            .current()
            .last_child()
            .expect("caller checked last_child_is_lone_paragraph");
        title_node.detach();
        title_node.data.borrow_mut().value = NodeValue::DefinitionTitle;

        let def_node = cursor.push(NodeValue::Definition, 0)?;
        def_node.append(title_node);

        let mut j = i;
        while j < lines.len() {
            let Some(content_start) = scanners::definition_marker(lines[j]) else {
                break;
            };
            let mut body = vec![lines[j][content_start..].to_vec()];
            let mut k = j + 1;
            while k < lines.len()
                && !is_blank(lines[k])
                && scanners::definition_marker(lines[k]).is_none()
            {
                let indent = leading_spaces_count(lines[k]);
                if indent == 0 {
                    break;
                }
                body.push(lines[k][indent.min(lines[k].len())..].to_vec());
                k += 1;
            }

            let data_node = cursor.push(NodeValue::DefinitionData, 0)?;
            self.inline(cursor, &join_owned_lines(&body))?;
            cursor.pop(data_node);
            j = k;
        }

        cursor.pop(def_node);
        Ok(j)
    }

    // ---- paragraphs, with setext promotion ----

    fn parse_paragraph<'a>(
        &self,
        cursor: &Cursor<'a>,
        lines: &[&[u8]],
        i: usize,
    ) -> Result<usize, DepthExceeded> {
        let mut j = i;
        let mut body_lines: Vec<&[u8]> = Vec::new();
        while j < lines.len() {
            let line = lines[j];
            if is_blank(line) {
                break;
            }
            if j > i && self.terminates_paragraph(line) {
                break;
            }
            body_lines.push(line);
            j += 1;
        }

        if let Some(level) = lines.get(j).and_then(|l| scanners::setext_heading(l)) {
            if let Some(last) = body_lines.pop() {
                if !body_lines.is_empty() {
                    let para_node =
                        cursor.push(NodeValue::Paragraph(NodeParagraph::default()), 0)?;
                    self.inline(cursor, &join_lines(&body_lines))?;
                    cursor.pop(para_node);
                }
                let header_node = cursor.push(NodeValue::Header(NodeHeader { level: level - 1 }), 0)?;
                self.inline(cursor, trim_slice(last))?;
                cursor.pop(header_node);
                return Ok(j + 1);
            }
        }

        let beoln = lines.get(j).map(|l| is_blank(l)).unwrap_or(false);
        let para_node = cursor.push(
            NodeValue::Paragraph(NodeParagraph {
                lines: body_lines.len(),
                beoln,
            }),
            0,
        )?;
        self.inline(cursor, &join_lines(&body_lines))?;
        cursor.pop(para_node);
        Ok(j)
    }

    fn terminates_paragraph(&self, line: &[u8]) -> bool {
        scanners::atx_heading(line, self.features.commonmark).is_some()
            || scanners::thematic_break(line)
            || scanners::blockquote_marker(line).is_some()
            || scanners::setext_heading(line).is_some()
            || (self.features.deflist && scanners::definition_marker(line).is_some())
    }
}

fn split_lines(text: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (idx, &b) in text.iter().enumerate() {
        if b == b'\n' {
            lines.push(&text[start..idx]);
            start = idx + 1;
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn leading_spaces_count(line: &[u8]) -> usize {
    line.iter().take_while(|&&b| b == b' ').count()
}

fn is_list_marker(line: &[u8], ordered: bool, commonmark: bool) -> bool {
    if ordered {
        scanners::ordered_list_marker(line, commonmark).is_some()
    } else {
        scanners::unordered_list_marker(line).is_some()
    }
}

fn marker_content_start(line: &[u8], ordered: bool, commonmark: bool) -> Option<usize> {
    if ordered {
        scanners::ordered_list_marker(line, commonmark).map(|(_, _, cs)| cs)
    } else {
        scanners::unordered_list_marker(line).map(|(_, cs)| cs)
    }
}

/// Strip each item's marker (first line) or shared indent (continuation
/// lines) so the recursive sub-parser sees a self-contained block.
fn dedent_item_lines(
    lines: &[&[u8]],
    start: usize,
    stop: usize,
    ordered: bool,
    commonmark: bool,
) -> Vec<Vec<u8>> {
    let first_content_start = marker_content_start(lines[start], ordered, commonmark)
        .unwrap_or(0);
    let mut out = Vec::with_capacity(stop - start);
    for (idx, &line) in lines[start..stop].iter().enumerate() {
        if idx == 0 {
            out.push(line[first_content_start.min(line.len())..].to_vec());
        } else if is_blank(line) {
            out.push(Vec::new());
        } else {
            let indent = leading_spaces_count(line).min(first_content_start);
            out.push(line[indent..].to_vec());
        }
    }
    out
}

fn join_lines(lines: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if idx > 0 {
            out.push(b'\n');
        }
        out.extend_from_slice(line);
    }
    out
}

fn join_owned_lines(lines: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if idx > 0 {
            out.push(b'\n');
        }
        out.extend_from_slice(line);
    }
    out
}

fn collect_html_block(lines: &[&[u8]], i: usize, tag: &'static str) -> (Vec<u8>, usize) {
    let close_tag = format!("</{tag}");
    let mut j = i;
    let mut buf = Vec::new();
    loop {
        buf.extend_from_slice(lines[j]);
        buf.push(b'\n');
        let closed = match tag {
            "!--" => contains(lines[j], b"-->"),
            "hr" => true,
            _ => contains(lines[j], close_tag.as_bytes()),
        };
        j += 1;
        if closed || j >= lines.len() {
            break;
        }
    }
    if j < lines.len() && is_blank(lines[j]) {
        j += 1;
    }
    (buf, j - i)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() || haystack.len() < needle.len() {
        return needle.is_empty();
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{Ast, AstNode};
    use std::cell::RefCell;

    fn parse(text: &[u8], features: Features) -> Vec<NodeValue> {
        let arena = typed_arena::Arena::new();
        let root: &AstNode = arena.alloc(crate::arena_tree::Node::new(RefCell::new(Ast {
            id: 0,
            value: NodeValue::Root,
            start_line: 1,
        })));
        let cursor = Cursor::new(&arena, root, 0);
        let refs = RefMap::default();
        let footnotes = FootnoteList::default();
        let block = BlockParser::new(&refs, &footnotes, &[], features);
        block.parse_document(&cursor, text).unwrap();
        root.children().map(|n| n.data.borrow().value.clone()).collect()
    }

    #[test]
    fn plain_paragraph() {
        let out = parse(b"hello\n", Features::default());
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], NodeValue::Paragraph(_)));
    }

    #[test]
    fn atx_header_then_paragraph() {
        let out = parse(b"# Title\n\npara\n", Features::default());
        assert_eq!(out.len(), 2);
        assert!(matches!(out[0], NodeValue::Header(NodeHeader { level: 0 })));
        assert!(matches!(out[1], NodeValue::Paragraph(_)));
    }

    #[test]
    fn setext_header_promotes_last_line() {
        let out = parse(b"Title\n===\n", Features::default());
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], NodeValue::Header(NodeHeader { level: 0 })));
    }

    #[test]
    fn fenced_code_block() {
        let mut features = Features::default();
        features.fenced = true;
        let out = parse(b"```c\nint x;\n```\n", features);
        assert_eq!(out.len(), 1);
        match &out[0] {
            NodeValue::BlockCode(c) => {
                assert_eq!(c.lang.as_bytes(), b"c");
                assert_eq!(c.text.as_bytes(), b"int x;\n");
            }
            _ => panic!("expected BlockCode"),
        }
    }

    #[test]
    fn tight_and_loose_unordered_lists() {
        let out = parse(b"- a\n- b\n", Features::default());
        assert_eq!(out.len(), 1);
        match &out[0] {
            NodeValue::List(l) => assert!(!l.is_block_mode()),
            _ => panic!("expected List"),
        }

        let out = parse(b"- a\n\n- b\n", Features::default());
        match &out[0] {
            NodeValue::List(l) => assert!(l.is_block_mode()),
            _ => panic!("expected List"),
        }
    }

    #[test]
    fn blockquote_collects_quoted_lines() {
        let out = parse(b"> a\n> b\n", Features::default());
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], NodeValue::BlockQuote));
    }
}
