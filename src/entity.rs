//! HTML entity recognition, used by the inline parser's `&` handler
//! (§4.7) and by URL/title cleaning in [`crate::strings`].
//!
//! The lookup table is generated at build time from the `entities`
//! crate's data (see `build.rs`) into a sorted slice, searched here by
//! binary search; decimal and hex numeric character references (`&#65;`,
//! `&#x41;`) are computed directly.

use crate::ctype::isdigit;
use std::char;
use std::cmp::min;

include!(concat!(env!("OUT_DIR"), "/entitydata.rs"));

pub const ENTITY_MIN_LENGTH: usize = 2;
pub const ENTITY_MAX_LENGTH: usize = 31;

fn isxdigit(ch: u8) -> bool {
    ch.is_ascii_hexdigit()
}

/// Attempt to recognise an entity or numeric character reference at
/// the start of `text` (which does not include the leading `&`).
/// Returns the decoded UTF-8 bytes and the number of bytes consumed
/// from `text`, including the trailing `;`.
pub fn unescape(text: &[u8]) -> Option<(Vec<u8>, usize)> {
    if text.len() >= 3 && text[0] == b'#' {
        let mut codepoint: u32 = 0;
        let i;

        let num_digits = if text.len() > 1 && isdigit(text[1]) {
            let mut j = 1;
            while j < text.len() && isdigit(text[j]) {
                codepoint = codepoint.saturating_mul(10) + (text[j] - b'0') as u32;
                codepoint = min(codepoint, 0x11_0000);
                j += 1;
            }
            i = j;
            j - 1
        } else if text.len() > 1 && (text[1] == b'x' || text[1] == b'X') {
            let mut j = 2;
            while j < text.len() && isxdigit(text[j]) {
                let digit = (text[j] as char).to_digit(16).unwrap();
                codepoint = codepoint.saturating_mul(16) + digit;
                codepoint = min(codepoint, 0x11_0000);
                j += 1;
            }
            i = j;
            j.saturating_sub(2)
        } else {
            return None;
        };

        if num_digits >= 1 && num_digits <= 8 && i < text.len() && text[i] == b';' {
            if codepoint == 0 || (codepoint >= 0xD800 && codepoint < 0xE000) || codepoint >= 0x110000
            {
                codepoint = 0xFFFD;
            }
            return Some((
                char::from_u32(codepoint)
                    .unwrap_or('\u{FFFD}')
                    .to_string()
                    .into_bytes(),
                i + 1,
            ));
        }
        return None;
    }

    let size = min(text.len(), ENTITY_MAX_LENGTH);
    for i in ENTITY_MIN_LENGTH..size {
        if text[i] == b' ' {
            return None;
        }
        if text[i] == b';' {
            return lookup(&text[..i]).map(|e| (e.as_bytes().to_vec(), i + 1));
        }
    }

    None
}

fn lookup(name: &[u8]) -> Option<&'static str> {
    let name = std::str::from_utf8(name).ok()?;
    entitydata::TRANSLATED_ENTITIES
        .binary_search_by_key(&name, |&(n, _)| n)
        .ok()
        .map(|i| entitydata::TRANSLATED_ENTITIES[i].1)
}

/// Decode every `&entity;`/`&#NNN;` sequence in `src`, leaving
/// everything else untouched. Used by URL/title cleaning, where the
/// dialect always resolves entities regardless of renderer.
pub fn unescape_html(src: &[u8]) -> Vec<u8> {
    let size = src.len();
    let mut i = 0;
    let mut v = Vec::with_capacity(size);

    while i < size {
        let org = i;
        while i < size && src[i] != b'&' {
            i += 1;
        }

        if i > org {
            if org == 0 && i >= size {
                return src.to_vec();
            }
            v.extend_from_slice(&src[org..i]);
        }

        if i >= size {
            return v;
        }

        i += 1;
        match unescape(&src[i..]) {
            Some((chs, consumed)) => {
                v.extend_from_slice(&chs);
                i += consumed;
            }
            None => v.push(b'&'),
        }
    }

    v
}
