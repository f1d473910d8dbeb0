//! Trimming, cleaning, and normalisation helpers shared by the
//! reference collector, metadata parser, and inline link parser.

use crate::ctype::{ispunct, isspace};
use crate::entity;

/// Remove backslashes preceding ASCII punctuation, in place. Used when
/// building the final text of a link URL or title, after entity
/// unescaping has already run.
pub fn unescape(v: &mut Vec<u8>) {
    let mut r = 0;
    while r < v.len() {
        if v[r] == b'\\' && r + 1 < v.len() && ispunct(v[r + 1]) {
            v.remove(r);
        }
        r += 1;
    }
}

/// Collapse every run of whitespace to a single space; used to turn a
/// link's bracketed text into a shortcut reference key (§4.7).
pub fn normalize_whitespace(v: &[u8]) -> Vec<u8> {
    let mut last_was_space = false;
    let mut r = Vec::with_capacity(v.len());
    for &c in v {
        if isspace(c) {
            if !last_was_space {
                r.push(b' ');
                last_was_space = true;
            }
        } else {
            r.push(c);
            last_was_space = false;
        }
    }
    r
}

pub fn rtrim(v: &mut Vec<u8>) {
    while let Some(&last) = v.last() {
        if isspace(last) {
            v.pop();
        } else {
            break;
        }
    }
}

pub fn ltrim(v: &mut Vec<u8>) {
    let mut start = 0;
    while start < v.len() && isspace(v[start]) {
        start += 1;
    }
    v.drain(..start);
}

pub fn trim(v: &mut Vec<u8>) {
    ltrim(v);
    rtrim(v);
}

pub fn trim_slice(mut s: &[u8]) -> &[u8] {
    while !s.is_empty() && isspace(s[0]) {
        s = &s[1..];
    }
    while !s.is_empty() && isspace(s[s.len() - 1]) {
        s = &s[..s.len() - 1];
    }
    s
}

pub fn is_blank(s: &[u8]) -> bool {
    for &c in s {
        match c {
            b'\n' | b'\r' => return true,
            b' ' | b'\t' => (),
            _ => return false,
        }
    }
    true
}

/// A reference link's URL: angle brackets are stripped, HTML entities
/// and backslash escapes are resolved (§4.4, §4.7).
pub fn clean_url(url: &[u8]) -> Vec<u8> {
    let url = trim_slice(url);
    if url.is_empty() {
        return Vec::new();
    }

    let mut b = if url[0] == b'<' && url[url.len() - 1] == b'>' {
        entity::unescape_html(&url[1..url.len() - 1])
    } else {
        entity::unescape_html(url)
    };

    unescape(&mut b);
    b
}

/// A reference link's title: the surrounding `'…'`, `"…"` or `(…)` is
/// stripped before entity/escape resolution (§4.4).
pub fn clean_title(title: &[u8]) -> Vec<u8> {
    if title.is_empty() {
        return Vec::new();
    }

    let first = title[0];
    let last = title[title.len() - 1];

    let mut b = if (first == b'\'' && last == b'\'')
        || (first == b'(' && last == b')')
        || (first == b'"' && last == b'"')
    {
        entity::unescape_html(&title[1..title.len() - 1])
    } else {
        entity::unescape_html(title)
    };

    unescape(&mut b);
    b
}

/// Case-fold and collapse whitespace in a reference/footnote id, so
/// `[Foo Bar]` and `[foo   bar]` resolve to the same definition.
pub fn normalize_reference_label(s: &[u8]) -> Vec<u8> {
    let s = trim_slice(s);
    let collapsed = normalize_whitespace(s);
    // The dialect's whitespace class (spec Non-goals) is byte-only, so
    // case folding can stay byte-wise ASCII lowercase too; full Unicode
    // case folding is handled by `caseless` only where links legitimately
    // carry non-ASCII label text, matching the teacher's own use of the
    // crate for GFM label comparisons.
    if collapsed.is_ascii() {
        collapsed.to_ascii_lowercase()
    } else {
        caseless::default_case_fold_str(&String::from_utf8_lossy(&collapsed)).into_bytes()
    }
}
