//! Autolink detectors: the external-collaborator contract from spec §6.
//!
//! The core's inline parser (§4.7) treats `:`, `@`, and `w` as active
//! characters gated on the `AUTOLINK` feature and calls into one of
//! these three detectors at the candidate byte. Each returns the
//! length of the match and a `rewind` count: how many bytes of the
//! `NORMAL_TEXT` already emitted before the candidate byte actually
//! belong to the link (e.g. the scheme name in `see http://x.y`, or
//! nothing for `www.` matches, which never look behind the `w`).
//! The inline loop is responsible for trimming that many trailing
//! bytes off the pending text node — see `parser::inlines::Subject`.
//!
//! These are "pure helper functions" per spec §1/§6: they take a byte
//! slice and an offset and return an answer, with no access to the
//! parser's cursor or arena.

use unicode_categories::UnicodeCategories;

use crate::ctype::{isalnum, isalpha, isspace};

const WWW_DELIMS: &[u8] = b"*_~([";
const LINK_END_PUNCT: &[u8] = b"?!.,:*_~'\"";
const EMAIL_OK: &[u8] = b".+-_";
const SCHEMES: &[&str] = &["http", "https", "ftp"];

/// Result of a successful autolink match: `len` bytes starting at the
/// detector's candidate offset form the match; `rewind` bytes ending
/// just before that offset were actually part of it too (spec
/// GLOSSARY: "Rewind").
#[derive(Debug, Clone, Copy)]
pub struct AutolinkMatch {
    pub rewind: usize,
    pub len: usize,
}

/// Try to match a bare `scheme://…` URL with the colon at `data[i]`.
pub fn url_match(data: &[u8], i: usize) -> Option<AutolinkMatch> {
    let size = data.len();
    if size - i < 4 || data[i + 1] != b'/' || data[i + 2] != b'/' {
        return None;
    }

    let mut max_alpha_run = 0;
    while max_alpha_run < i && isalpha(data[i - max_alpha_run - 1]) {
        max_alpha_run += 1;
    }

    let rewind = SCHEMES
        .iter()
        .filter(|s| max_alpha_run >= s.len() && &data[i - s.len()..i] == s.as_bytes())
        .map(|s| s.len())
        .max()?;

    let mut link_end = match check_domain(&data[i + 3..]) {
        None => return None,
        Some(e) => e,
    };

    while i + link_end < size && !isspace(data[i + link_end]) {
        link_end += 1;
    }

    link_end = autolink_delim(&data[i..], link_end);

    Some(AutolinkMatch {
        rewind,
        len: rewind + link_end,
    })
}

/// Try to match a bare `www.…` host starting at `data[i]`.
pub fn www_match(data: &[u8], i: usize) -> Option<AutolinkMatch> {
    if i > 0 && !isspace(data[i - 1]) && !WWW_DELIMS.contains(&data[i - 1]) {
        return None;
    }

    if data.len() - i < 4 || &data[i..i + 4] != b"www." {
        return None;
    }

    let mut link_end = check_domain(data)?;

    while i + link_end < data.len() && !isspace(data[i + link_end]) {
        link_end += 1;
    }

    link_end = autolink_delim(&data[i..], link_end);

    Some(AutolinkMatch {
        rewind: 0,
        len: link_end,
    })
}

/// Try to match a bare `user@host` email address with the `@` at `data[i]`.
pub fn email_match(data: &[u8], i: usize) -> Option<AutolinkMatch> {
    let size = data.len();

    let mut rewind = 0;
    let mut slashes = 0;
    while rewind < i {
        let c = data[i - rewind - 1];
        if isalnum(c) || EMAIL_OK.contains(&c) {
            rewind += 1;
            continue;
        }
        if c == b'/' {
            slashes += 1;
        }
        break;
    }

    if rewind == 0 || slashes > 0 {
        return None;
    }

    let mut link_end = 0;
    let mut at_signs = 0;
    let mut dots = 0;

    while link_end < size - i {
        let c = data[i + link_end];
        if isalnum(c) {
            // fine
        } else if c == b'@' {
            at_signs += 1;
        } else if c == b'.' && link_end < size - i - 1 {
            dots += 1;
        } else if c != b'-' && c != b'_' {
            break;
        }
        link_end += 1;
    }

    if link_end < 2
        || at_signs != 1
        || dots == 0
        || (!isalpha(data[i + link_end - 1]) && data[i + link_end - 1] != b'.')
    {
        return None;
    }

    link_end = autolink_delim(&data[i..], link_end);

    Some(AutolinkMatch {
        rewind,
        len: rewind + link_end,
    })
}

fn check_domain(data: &[u8]) -> Option<usize> {
    let mut dots = 0;
    let mut underscores_last = 0;
    let mut underscores_prev = 0;

    let s = std::str::from_utf8(data).ok()?;
    for (i, c) in s.char_indices() {
        if c == '_' {
            underscores_prev += 1;
        } else if c == '.' {
            underscores_last = underscores_prev;
            underscores_prev = 0;
            dots += 1;
        } else if !is_valid_hostchar(c) && c != '-' {
            if underscores_last == 0 && underscores_prev == 0 && dots > 0 {
                return Some(i);
            }
            return None;
        }
    }

    if underscores_last == 0 && underscores_prev == 0 && dots > 0 {
        Some(data.len())
    } else {
        None
    }
}

fn is_valid_hostchar(ch: char) -> bool {
    !ch.is_whitespace() && !ch.is_punctuation()
}

/// Trim trailing punctuation that's more likely to be prose than part
/// of the link: trailing `.`, unbalanced closing `)`/`"`/`'`, and a
/// dangling HTML entity.
fn autolink_delim(data: &[u8], mut link_end: usize) -> usize {
    for (i, &b) in data[..link_end].iter().enumerate() {
        if b == b'<' {
            link_end = i;
            break;
        }
    }

    while link_end > 0 {
        let close = data[link_end - 1];
        let open = if close == b')' { Some(b'(') } else { None };

        if LINK_END_PUNCT.contains(&close) {
            link_end -= 1;
        } else if close == b';' {
            let mut new_end = link_end.saturating_sub(2);
            while new_end > 0 && isalpha(data[new_end]) {
                new_end -= 1;
            }
            if new_end < link_end - 2 && data[new_end] == b'&' {
                link_end = new_end;
            } else {
                link_end -= 1;
            }
        } else if let Some(open) = open {
            let opening = data[..link_end].iter().filter(|&&c| c == open).count();
            let closing = data[..link_end].iter().filter(|&&c| c == close).count();
            if closing <= opening {
                break;
            }
            link_end -= 1;
        } else {
            break;
        }
    }

    link_end
}
