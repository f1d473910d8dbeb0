//! The metadata parser (spec C5): an optional leading key/value block,
//! "Multi-Markdown" style, consumed before reference collection runs.

use crate::ctype::{isalnum, isspace};
use crate::strings::{rtrim, trim_slice};

/// One `key: value` entry. `key` has already been normalised per
/// spec §4.5; `value` has not been entity/escape-unescaped — that
/// happens, if at all, when the value is turned into a META node's
/// child text, same as any other text run.
#[derive(Debug, Clone)]
pub struct MetaEntry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// Two command-line-supplied queues (spec §4.5): `defaults` fill in
/// keys the document doesn't set; `overrides` always win.
#[derive(Debug, Clone, Default)]
pub struct MetaQueues {
    pub defaults: Vec<MetaEntry>,
    pub overrides: Vec<MetaEntry>,
}

/// Detect whether `buffer` opens with a metadata block at all: the
/// first byte must be alphanumeric and the first logical line must
/// contain a `:` before its newline.
fn has_metadata_block(buffer: &[u8]) -> bool {
    match buffer.first() {
        Some(&b) if isalnum(b) => (),
        _ => return false,
    }
    let first_line_end = buffer.iter().position(|&b| b == b'\n').unwrap_or(buffer.len());
    buffer[..first_line_end].contains(&b':')
}

/// Parse the leading metadata block, if present, returning the
/// entries found (title-first, per §4.5) and the byte offset where
/// the rest of the document begins.
fn parse_block(buffer: &[u8]) -> (Vec<MetaEntry>, usize) {
    let mut entries: Vec<MetaEntry> = Vec::new();
    let mut offset = 0;

    loop {
        if offset >= buffer.len() {
            break;
        }
        let line_end = buffer[offset..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|p| offset + p)
            .unwrap_or(buffer.len());
        let line = &buffer[offset..line_end];

        if trim_slice(line).is_empty() {
            offset = line_end + 1;
            break;
        }

        let Some(colon) = line.iter().position(|&b| b == b':') else {
            break;
        };
        // A "new key:" line has no leading whitespace before the key.
        if line[0] == b' ' || line[0] == b'\t' {
            break;
        }

        let key = normalize_key(&line[..colon]);
        let mut value = line[colon + 1..].to_vec();
        if !value.is_empty() && value[0] == b' ' {
            value.remove(0);
        }

        let mut next_offset = line_end + 1;
        let mut is_multiline = false;

        // Continuation lines: keep pulling lines in until we hit a
        // blank line or a line that itself opens a new `key:`.
        loop {
            if next_offset >= buffer.len() {
                break;
            }
            let next_end = buffer[next_offset..]
                .iter()
                .position(|&b| b == b'\n')
                .map(|p| next_offset + p)
                .unwrap_or(buffer.len());
            let next_line = &buffer[next_offset..next_end];

            if trim_slice(next_line).is_empty() {
                break;
            }
            if is_new_key_line(next_line) {
                break;
            }

            value.push(b'\n');
            value.extend_from_slice(next_line);
            is_multiline = true;
            next_offset = next_end + 1;
        }

        if !is_multiline {
            rtrim(&mut value);
        }

        entries.push(MetaEntry { key, value });
        offset = next_offset;
    }

    // Move "title" to the front.
    if let Some(pos) = entries.iter().position(|e| e.key == b"title") {
        let title = entries.remove(pos);
        entries.insert(0, title);
    }

    (entries, offset)
}

fn is_new_key_line(line: &[u8]) -> bool {
    if line.first().map(|&b| b == b' ' || b == b'\t').unwrap_or(true) {
        return false;
    }
    line.iter().position(|&b| b == b':').is_some()
}

/// Keep alphanumerics, `-`, and `_` (lowercased); drop whitespace;
/// replace anything else with `?`. `pub(crate)` so the inline parser's
/// `[%key]` metadata-reference handler can normalise lookups the same
/// way the block was parsed.
pub(crate) fn normalize_key(raw: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(raw.len());
    for &b in raw {
        if isspace(b) {
            continue;
        } else if isalnum(b) {
            key.push(b.to_ascii_lowercase());
        } else if b == b'-' || b == b'_' {
            key.push(b);
        } else {
            key.push(b'?');
        }
    }
    key
}

/// Parse an optional leading metadata block (when `enabled`), merge in
/// the default/override queues, and return the final META entries plus
/// the offset into `buffer` where the rest of the document starts.
pub fn extract(buffer: &[u8], enabled: bool, queues: &MetaQueues) -> (Vec<MetaEntry>, usize) {
    let (mut entries, rest_offset) = if enabled && has_metadata_block(buffer) {
        parse_block(buffer)
    } else {
        (Vec::new(), 0)
    };

    for default in &queues.defaults {
        if !entries.iter().any(|e| e.key == default.key) {
            entries.push(default.clone());
        }
    }
    for over in &queues.overrides {
        if let Some(existing) = entries.iter_mut().find(|e| e.key == over.key) {
            existing.value = over.value.clone();
        } else {
            entries.push(over.clone());
        }
    }

    if let Some(pos) = entries.iter().position(|e| e.key == b"title") {
        let title = entries.remove(pos);
        entries.insert(0, title);
    }

    (entries, rest_offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_block_when_disabled() {
        let (entries, rest) = extract(b"Title: x\n\nbody\n", false, &MetaQueues::default());
        assert!(entries.is_empty());
        assert_eq!(rest, 0);
    }

    #[test]
    fn single_line_entries_and_title_first() {
        let input = b"Author: Jane\nTitle: My Doc\n\nbody\n";
        let (entries, rest) = extract(input, true, &MetaQueues::default());
        assert_eq!(entries[0].key, b"title");
        assert_eq!(entries[0].value, b"My Doc");
        assert_eq!(entries[1].key, b"author");
        assert_eq!(&input[rest..], b"body\n");
    }

    #[test]
    fn continuation_lines_join_with_newline() {
        let input = b"Notes: first\nsecond\nthird\n\nbody\n";
        let (entries, _rest) = extract(input, true, &MetaQueues::default());
        assert_eq!(entries[0].value, b"first\nsecond\nthird");
    }

    #[test]
    fn overrides_win_and_defaults_fill_gaps() {
        let mut queues = MetaQueues::default();
        queues.defaults.push(MetaEntry {
            key: b"author".to_vec(),
            value: b"Default Author".to_vec(),
        });
        queues.overrides.push(MetaEntry {
            key: b"title".to_vec(),
            value: b"Forced Title".to_vec(),
        });
        let input = b"Title: Doc Title\n\nbody\n";
        let (entries, _rest) = extract(input, true, &queues);
        assert_eq!(entries[0].key, b"title");
        assert_eq!(entries[0].value, b"Forced Title");
        assert!(entries.iter().any(|e| e.key == b"author"));
    }

    #[test]
    fn requires_colon_on_first_line_to_detect_block() {
        let (entries, rest) = extract(b"not metadata\n\nbody\n", true, &MetaQueues::default());
        assert!(entries.is_empty());
        assert_eq!(rest, 0);
    }
}
