//! The reference collector (spec C4): a first pass over the cleaned
//! buffer, run before block parsing, that pulls out link-reference
//! definitions and footnote definitions and elides their lines from
//! the buffer the block parser will actually see.

use std::cell::Cell;

use crate::ctype::isspace;
use crate::strings::{clean_title, clean_url, is_blank, normalize_reference_label, trim_slice};

/// A `[id]: <link> "title"` definition (spec §3 "Reference entry").
#[derive(Debug, Clone)]
pub struct RefEntry {
    pub name: Vec<u8>,
    pub link: Vec<u8>,
    pub title: Option<Vec<u8>>,
}

/// A `[^id]: content` definition (spec §3 "Footnote entry"). `is_used`
/// and `ordinal` are filled in by the inline parser on first reference
/// (§4.7); they live in `Cell`s because lookups happen through a
/// shared `&RefMap`/footnote list while the inline pass is otherwise
/// read-only over it.
#[derive(Debug)]
pub struct FootnoteEntry {
    pub name: Vec<u8>,
    pub contents: Vec<u8>,
    pub is_used: Cell<bool>,
    pub ordinal: Cell<u32>,
}

#[derive(Debug, Default)]
pub struct RefMap {
    entries: Vec<RefEntry>,
}

impl RefMap {
    /// Lookup is linear — §4.4 notes n is small in practice, so this
    /// isn't worth a hash map.
    pub fn lookup(&self, id: &[u8]) -> Option<&RefEntry> {
        let key = normalize_reference_label(id);
        self.entries
            .iter()
            .find(|e| normalize_reference_label(&e.name) == key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct FootnoteList {
    entries: Vec<FootnoteEntry>,
    next_ordinal: Cell<u32>,
}

impl FootnoteList {
    /// Look up by normalized id. On first use, marks the entry used
    /// and assigns it the next ordinal; on a later use, returns `None`
    /// so the caller falls back to literal `[^id]` text — the
    /// double-reference behaviour preserved per spec §9.
    pub fn use_once(&self, id: &[u8]) -> Option<u32> {
        let key = normalize_reference_label(id);
        let entry = self
            .entries
            .iter()
            .find(|e| normalize_reference_label(&e.name) == key)?;
        if entry.is_used.get() {
            log::debug!(
                "footnote [^{}] referenced more than once; emitting literal text for the repeat",
                String::from_utf8_lossy(id)
            );
            return None;
        }
        self.next_ordinal.set(self.next_ordinal.get() + 1);
        entry.ordinal.set(self.next_ordinal.get());
        entry.is_used.set(true);
        Some(entry.ordinal.get())
    }

    /// Used definitions, in ordinal order, for `FOOTNOTES_BLOCK`
    /// emission (§4.8).
    pub fn used_in_order(&self) -> Vec<&FootnoteEntry> {
        let mut used: Vec<&FootnoteEntry> = self
            .entries
            .iter()
            .filter(|e| e.is_used.get())
            .collect();
        used.sort_by_key(|e| e.ordinal.get());
        used
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Run the first pass: collect references and footnote definitions out
/// of `buffer`, returning them plus the staging buffer (with matched
/// lines elided) the block parser should run over.
pub fn collect(buffer: &[u8], footnotes_enabled: bool) -> (RefMap, FootnoteList, Vec<u8>) {
    let lines = split_lines(buffer);
    let mut refs = Vec::new();
    let mut footnotes = Vec::new();
    let mut staging = Vec::with_capacity(buffer.len());

    let mut i = 0;
    while i < lines.len() {
        if footnotes_enabled {
            if let Some((entry, consumed)) = try_footnote_definition(&lines, i) {
                footnotes.push(entry);
                i += consumed;
                continue;
            }
        }
        if let Some((entry, consumed)) = try_reference_definition(&lines, i) {
            refs.push(entry);
            i += consumed;
            continue;
        }
        staging.extend_from_slice(lines[i]);
        i += 1;
    }

    (
        RefMap { entries: refs },
        FootnoteList {
            entries: footnotes,
            next_ordinal: Cell::new(0),
        },
        staging,
    )
}

/// Split into lines, each slice including its trailing `\n` (the
/// pre-processor guarantees one at the very end).
fn split_lines(buffer: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    for i in 0..buffer.len() {
        if buffer[i] == b'\n' {
            lines.push(&buffer[start..=i]);
            start = i + 1;
        }
    }
    if start < buffer.len() {
        lines.push(&buffer[start..]);
    }
    lines
}

fn leading_spaces(line: &[u8]) -> usize {
    line.iter().take_while(|&&b| b == b' ').count()
}

/// `[id]: <link> "title"`, possibly spanning onto the following line
/// for the title (spec §4.4).
fn try_reference_definition(lines: &[&[u8]], at: usize) -> Option<(RefEntry, usize)> {
    let line = lines[at];
    let indent = leading_spaces(line);
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    if rest.first() != Some(&b'[') {
        return None;
    }

    let close = rest.iter().position(|&b| b == b']' || b == b'\n')?;
    if rest[close] != b']' {
        return None;
    }
    let id = &rest[1..close];
    if id.is_empty() {
        return None;
    }

    let mut p = close + 1;
    if p >= rest.len() || rest[p] != b':' {
        return None;
    }
    p += 1;

    // Optional spacing, optional single line break, before the link.
    while p < rest.len() && rest[p] == b' ' {
        p += 1;
    }
    let mut search_line = at;
    let mut search_rest: &[u8] = &rest[p..];
    if is_blank(search_rest) && at + 1 < lines.len() {
        search_line = at + 1;
        search_rest = lines[at + 1];
    }
    while !search_rest.is_empty() && search_rest[0] == b' ' {
        search_rest = &search_rest[1..];
    }

    let link_end = search_rest
        .iter()
        .position(|&b| isspace(b))
        .unwrap_or(search_rest.len());
    if link_end == 0 {
        return None;
    }
    let link_raw = &search_rest[..link_end];
    let link = clean_url(link_raw);

    // Hunt for a title: same line after the link, or the next line by
    // itself, as long as either way the rest of that line is blank.
    let after_link = &search_rest[link_end..];
    let after_link_trimmed = trim_slice(after_link);

    let (title, consumed_past) = if !after_link_trimmed.is_empty()
        && is_title_open(after_link_trimmed[0])
    {
        match scan_title(after_link_trimmed) {
            Some(t) => (Some(t), 0),
            None => (None, 0),
        }
    } else if is_blank(after_link) && search_line + 1 < lines.len() {
        let candidate = trim_slice(lines[search_line + 1]);
        if !candidate.is_empty() && is_title_open(candidate[0]) {
            match scan_title(candidate) {
                Some(t) => (Some(t), 1),
                None => (None, 0),
            }
        } else {
            (None, 0)
        }
    } else if !is_blank(after_link) {
        // Trailing garbage on the link line with no title: not a match.
        return None;
    } else {
        (None, 0)
    };

    let last_consumed_line = search_line + consumed_past;
    if last_consumed_line < lines.len() && !is_blank(lines[last_consumed_line]) && title.is_none()
    {
        // only acceptable if that's the link line itself, already checked above
    }

    let entry = RefEntry {
        name: id.to_vec(),
        link,
        title,
    };
    Some((entry, last_consumed_line - at + 1))
}

fn is_title_open(b: u8) -> bool {
    b == b'\'' || b == b'"' || b == b'('
}

fn scan_title(s: &[u8]) -> Option<Vec<u8>> {
    let open = s[0];
    let close = if open == b'(' { b')' } else { open };
    let body = &s[1..];
    let end = body.iter().position(|&b| b == close)?;
    let rest = trim_slice(&body[end + 1..]);
    if !rest.is_empty() {
        return None;
    }
    Some(clean_title(&s[..=end + 1]))
}

/// `[^id]: content`, with ≥4-space-indented continuation lines after
/// an optional blank line (spec §4.4, §9 — tab-indented continuations
/// are treated identically to space-indented ones).
fn try_footnote_definition(lines: &[&[u8]], at: usize) -> Option<(FootnoteEntry, usize)> {
    let line = lines[at];
    let indent = leading_spaces(line);
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    if rest.len() < 2 || rest[0] != b'[' || rest[1] != b'^' {
        return None;
    }
    let close = rest.iter().position(|&b| b == b']' || b == b'\n')?;
    if rest[close] != b']' {
        return None;
    }
    let id = &rest[2..close];
    if id.is_empty() {
        return None;
    }
    let mut p = close + 1;
    if p >= rest.len() || rest[p] != b':' {
        return None;
    }
    p += 1;
    while p < rest.len() && rest[p] == b' ' {
        p += 1;
    }

    let mut contents = rest[p..].to_vec();
    if contents.last() == Some(&b'\n') {
        // keep newline; content lines are newline-preserved (§4.4)
    }

    let mut i = at + 1;
    loop {
        if i >= lines.len() {
            break;
        }
        if is_blank(lines[i]) {
            // A blank line is only a continuation separator if a
            // further indented line follows it.
            if i + 1 < lines.len() && continuation_indent(lines[i + 1]).is_some() {
                contents.extend_from_slice(lines[i]);
                i += 1;
                continue;
            } else {
                break;
            }
        }
        match continuation_indent(lines[i]) {
            Some(skip) => {
                contents.extend_from_slice(&lines[i][skip..]);
                i += 1;
            }
            None => break,
        }
    }

    let entry = FootnoteEntry {
        name: id.to_vec(),
        contents,
        is_used: Cell::new(false),
        ordinal: Cell::new(0),
    };
    Some((entry, i - at))
}

/// A continuation line is indented by >=4 columns of space or tab
/// (tab treated the same as space here, per the §9 open question).
fn continuation_indent(line: &[u8]) -> Option<usize> {
    let mut cols = 0;
    let mut i = 0;
    while i < line.len() && cols < 4 {
        match line[i] {
            b' ' => {
                cols += 1;
                i += 1;
            }
            b'\t' => {
                log::trace!("treating tab as 4-column continuation indent (§9 ambiguity)");
                cols += 4;
                i += 1;
            }
            _ => break,
        }
    }
    if cols >= 4 {
        Some(i)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_simple_reference() {
        let (refs, _footnotes, staging) = collect(b"[x]: /u \"t\"\n\n[x]\n", false);
        assert!(!refs.is_empty());
        let e = refs.lookup(b"x").unwrap();
        assert_eq!(e.link, b"/u");
        assert_eq!(e.title.as_deref(), Some(&b"t"[..]));
        assert_eq!(staging, b"\n[x]\n");
    }

    #[test]
    fn collects_footnote_with_continuation() {
        let input = b"[^n]: first line\n    second line\n\nbody\n";
        let (_refs, footnotes, staging) = collect(input, true);
        assert!(!footnotes.is_empty());
        assert_eq!(staging, b"\nbody\n");
        assert_eq!(footnotes.use_once(b"n"), Some(1));
    }

    #[test]
    fn footnote_disabled_leaves_line_untouched() {
        let input = b"[^n]: not a footnote here\n";
        let (_refs, footnotes, staging) = collect(input, false);
        assert!(footnotes.is_empty());
        assert_eq!(staging, &input[..]);
    }
}
