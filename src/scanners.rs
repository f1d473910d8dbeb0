//! Byte-level line scanners used by the block parser (§4.6) and table
//! parser to recognise construct openers/closers without backtracking
//! regex machinery — each function looks at one line (a `&[u8]` slice
//! with no trailing `\n`) and returns how much of it a construct would
//! consume, or `None`.

use crate::ctype::isdigit;

fn leading_spaces(line: &[u8], max: usize) -> usize {
    line.iter().take(max + 1).take_while(|&&b| b == b' ').count()
}

/// `#` through `######`, in CommonMark mode requiring a following
/// space (or end of line); returns `(level, content_start)`.
pub fn atx_heading(line: &[u8], commonmark: bool) -> Option<(u8, usize)> {
    let indent = leading_spaces(line, 3);
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let level = rest.iter().take_while(|&&b| b == b'#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let mut content_start = indent + level;
    if commonmark {
        match line.get(content_start) {
            None => {}
            Some(b' ') => content_start += 1,
            _ => return None,
        }
    } else if line.get(content_start) == Some(&b' ') {
        content_start += 1;
    }
    Some((level as u8, content_start))
}

/// A setext underline: a line of only `=` (level 1) or only `-`
/// (level 2), at least one character, optionally space-padded.
pub fn setext_heading(line: &[u8]) -> Option<u8> {
    let indent = leading_spaces(line, 3);
    if indent > 3 {
        return None;
    }
    let trimmed = trim_trailing_spaces(&line[indent..]);
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.iter().all(|&b| b == b'=') {
        Some(1)
    } else if trimmed.iter().all(|&b| b == b'-') {
        Some(2)
    } else {
        None
    }
}

fn trim_trailing_spaces(s: &[u8]) -> &[u8] {
    let mut end = s.len();
    while end > 0 && s[end - 1] == b' ' {
        end -= 1;
    }
    &s[..end]
}

/// `>= 3` of `*`, `-`, or `_`, the same character, optionally
/// separated by spaces, alone on the line.
pub fn thematic_break(line: &[u8]) -> bool {
    let indent = leading_spaces(line, 3);
    if indent > 3 {
        return false;
    }
    let mut count = 0;
    let mut marker = None;
    for &b in &line[indent..] {
        match b {
            b'*' | b'-' | b'_' => {
                if *marker.get_or_insert(b) != b {
                    return false;
                }
                count += 1;
            }
            b' ' | b'\t' => {}
            _ => return false,
        }
    }
    count >= 3
}

/// Opening fence: `` ``` `` or `~~~`, 3 or more, optional info string.
/// Returns `(fence_char, fence_length, info_start)`.
pub fn fenced_code_open(line: &[u8]) -> Option<(u8, usize, usize)> {
    let indent = leading_spaces(line, 3);
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let marker = *rest.first()?;
    if marker != b'`' && marker != b'~' {
        return None;
    }
    let len = rest.iter().take_while(|&&b| b == marker).count();
    if len < 3 {
        return None;
    }
    // backtick fences may not have a backtick in the info string
    if marker == b'`' && rest[len..].contains(&b'`') {
        return None;
    }
    Some((marker, len, indent + len))
}

/// Closing fence for a fence opened with `(marker, min_len)`: the same
/// character repeated at least `min_len` times, nothing else but
/// whitespace on the line.
pub fn fenced_code_close(line: &[u8], marker: u8, min_len: usize) -> bool {
    let indent = leading_spaces(line, 3);
    if indent > 3 {
        return false;
    }
    let rest = &line[indent..];
    let len = rest.iter().take_while(|&&b| b == marker).count();
    if len < min_len {
        return false;
    }
    rest[len..].iter().all(|&b| b == b' ' || b == b'\t')
}

/// A line that is exactly 4-space indented (indented code block).
pub fn indented_code(line: &[u8]) -> Option<usize> {
    if line.len() >= 4 && line[..4].iter().all(|&b| b == b' ') {
        Some(4)
    } else {
        None
    }
}

/// A blockquote marker `>`, optionally space-prefixed up to 3,
/// returning the offset where the quoted content begins.
pub fn blockquote_marker(line: &[u8]) -> Option<usize> {
    let indent = leading_spaces(line, 3);
    if indent > 3 || line.get(indent) != Some(&b'>') {
        return None;
    }
    let mut start = indent + 1;
    if line.get(start) == Some(&b' ') {
        start += 1;
    }
    Some(start)
}

/// One of `*`, `+`, `-` followed by a space; up to 3 leading spaces.
/// Returns `(marker_byte, content_start)`.
pub fn unordered_list_marker(line: &[u8]) -> Option<(u8, usize)> {
    let indent = leading_spaces(line, 3);
    if indent > 3 {
        return None;
    }
    let marker = *line.get(indent)?;
    if marker != b'*' && marker != b'+' && marker != b'-' {
        return None;
    }
    match line.get(indent + 1) {
        Some(&b' ') => Some((marker, indent + 2)),
        None => Some((marker, indent + 1)),
        _ => None,
    }
}

/// `<=9` digits (CommonMark mode) followed by `.` or `)` and a space.
/// Returns `(start_number_bytes, delimiter, content_start)`.
pub fn ordered_list_marker<'a>(
    line: &'a [u8],
    commonmark: bool,
) -> Option<(&'a [u8], u8, usize)> {
    let indent = leading_spaces(line, 3);
    if indent > 3 {
        return None;
    }
    let digits_len = line[indent..].iter().take_while(|&&b| isdigit(b)).count();
    if digits_len == 0 || (commonmark && digits_len > 9) {
        return None;
    }
    let delim_pos = indent + digits_len;
    let delim = *line.get(delim_pos)?;
    let valid_delim = delim == b'.' || (commonmark && delim == b')');
    if !valid_delim {
        return None;
    }
    match line.get(delim_pos + 1) {
        Some(&b' ') => Some((&line[indent..delim_pos], delim, delim_pos + 2)),
        None => Some((&line[indent..delim_pos], delim, delim_pos + 1)),
        _ => None,
    }
}

/// `: ` prefix for a definition-list data line.
pub fn definition_marker(line: &[u8]) -> Option<usize> {
    let indent = leading_spaces(line, 3);
    if indent > 3 {
        return None;
    }
    if line.get(indent) == Some(&b':') && line.get(indent + 1) == Some(&b' ') {
        Some(indent + 2)
    } else {
        None
    }
}

const HTML_BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "section", "summary",
    "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul", "ins", "del",
];

/// An HTML block opener: `<tag...>`/`</tag...>` for a known block-level
/// tag, `<!--` comment, or a self-closing `<hr .../>`. Returns the tag
/// name matched, lowercased, for the caller to decide how the close is
/// searched (`ins`/`del` always use the strict close search per §4.6).
pub fn html_block_open(line: &[u8]) -> Option<&'static str> {
    let indent = leading_spaces(line, 3);
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    if rest.starts_with(b"<!--") {
        return Some("!--");
    }
    if rest.starts_with(b"<hr") {
        return Some("hr");
    }
    let mut p = 1;
    if rest.first() != Some(&b'<') {
        return None;
    }
    if rest.get(p) == Some(&b'/') {
        p += 1;
    }
    let start = p;
    while rest.get(p).map(|&b| b.is_ascii_alphanumeric()).unwrap_or(false) {
        p += 1;
    }
    if p == start {
        return None;
    }
    let name = std::str::from_utf8(&rest[start..p]).ok()?.to_ascii_lowercase();
    HTML_BLOCK_TAGS.iter().find(|&&t| t == name).copied()
}

/// A pipe-separated header/delimiter row for table parsing: splits on
/// unescaped `|`, trimming a single leading/trailing empty cell caused
/// by bracketing pipes.
pub fn table_row_cells(line: &[u8]) -> Vec<&[u8]> {
    let mut cells = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < line.len() {
        if line[i] == b'\\' && i + 1 < line.len() {
            i += 2;
            continue;
        }
        if line[i] == b'|' {
            cells.push(&line[start..i]);
            start = i + 1;
        }
        i += 1;
    }
    cells.push(&line[start..]);

    if cells
        .first()
        .map(|c| crate::strings::trim_slice(c).is_empty())
        .unwrap_or(false)
    {
        cells.remove(0);
    }
    if cells
        .last()
        .map(|c| crate::strings::trim_slice(c).is_empty())
        .unwrap_or(false)
    {
        cells.pop();
    }
    cells
}

/// A table delimiter row: cells of `-` runs with optional leading/
/// trailing `:`. Returns the alignment (`TableAlign` bits) per cell.
pub fn table_delimiter_row(line: &[u8]) -> Option<Vec<crate::nodes::TableAlign>> {
    let cells = table_row_cells(line);
    if cells.is_empty() {
        return None;
    }
    let mut aligns = Vec::with_capacity(cells.len());
    for cell in cells {
        let cell = crate::strings::trim_slice(cell);
        if cell.is_empty() {
            return None;
        }
        let left = cell.first() == Some(&b':');
        let right = cell.last() == Some(&b':');
        let dashes = &cell[left as usize..cell.len() - right as usize];
        if dashes.is_empty() || !dashes.iter().all(|&b| b == b'-') {
            return None;
        }
        let mut align = crate::nodes::TableAlign::empty();
        if left {
            align |= crate::nodes::TableAlign::LEFT;
        }
        if right {
            align |= crate::nodes::TableAlign::RIGHT;
        }
        aligns.push(align);
    }
    Some(aligns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atx_levels() {
        assert_eq!(atx_heading(b"# hi", true), Some((1, 2)));
        assert_eq!(atx_heading(b"### hi", true), Some((3, 4)));
        assert_eq!(atx_heading(b"#hi", true), None);
        assert_eq!(atx_heading(b"#######", true), None);
    }

    #[test]
    fn setext_levels() {
        assert_eq!(setext_heading(b"==="), Some(1));
        assert_eq!(setext_heading(b"---  "), Some(2));
        assert_eq!(setext_heading(b"-=-"), None);
    }

    #[test]
    fn thematic_break_variants() {
        assert!(thematic_break(b"***"));
        assert!(thematic_break(b"- - -"));
        assert!(!thematic_break(b"--"));
        assert!(!thematic_break(b"* - *"));
    }

    #[test]
    fn fence_open_and_close() {
        let (marker, len, info) = fenced_code_open(b"```rust").unwrap();
        assert_eq!(marker, b'`');
        assert_eq!(len, 3);
        assert_eq!(&b"```rust"[info..], b"rust");
        assert!(fenced_code_close(b"```", marker, len));
        assert!(!fenced_code_close(b"``", marker, len));
    }

    #[test]
    fn ordered_marker_commonmark_digit_cap() {
        assert!(ordered_list_marker(b"1. x", true).is_some());
        assert!(ordered_list_marker(b"1234567890. x", true).is_none());
    }

    #[test]
    fn table_cells_split_and_trim_brackets() {
        let cells = table_row_cells(b"| a | b |");
        assert_eq!(cells.len(), 2);
    }

    #[test]
    fn delimiter_row_alignment() {
        let aligns = table_delimiter_row(b"| :--- | ---: | :---: |").unwrap();
        assert_eq!(aligns.len(), 3);
        assert!(aligns[0].contains(crate::nodes::TableAlign::LEFT));
        assert!(aligns[1].contains(crate::nodes::TableAlign::RIGHT));
        assert!(aligns[2].contains(crate::nodes::TableAlign::LEFT));
        assert!(aligns[2].contains(crate::nodes::TableAlign::RIGHT));
    }
}
