//! The pre-processor (spec C3): BOM stripping, tab expansion, newline
//! normalisation, and a guaranteed trailing newline. Runs once, before
//! anything else touches the raw input buffer.

const TAB_STOP: usize = 4;

/// Produce the "clean" buffer block parsing operates on.
pub fn preprocess(input: &[u8]) -> Vec<u8> {
    let input = strip_bom(input);
    let mut out = Vec::with_capacity(input.len() + 1);
    let mut column = 0usize;
    let mut i = 0;

    while i < input.len() {
        let b = input[i];
        match b {
            b'\t' => {
                let spaces = TAB_STOP - (column % TAB_STOP);
                for _ in 0..spaces {
                    out.push(b' ');
                }
                column += spaces;
                i += 1;
            }
            b'\r' => {
                out.push(b'\n');
                column = 0;
                i += 1;
                if i < input.len() && input[i] == b'\n' {
                    i += 1;
                }
            }
            b'\n' => {
                out.push(b'\n');
                column = 0;
                i += 1;
            }
            _ => {
                out.push(b);
                // UTF-8 continuation bytes (top two bits `10`) don't
                // advance the column; only a sequence's lead byte does.
                if b & 0b1100_0000 != 0b1000_0000 {
                    column += 1;
                }
                i += 1;
            }
        }
    }

    if out.last() != Some(&b'\n') {
        out.push(b'\n');
    }

    out
}

fn strip_bom(input: &[u8]) -> &[u8] {
    if input.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &input[3..]
    } else {
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bom() {
        let mut input = vec![0xEF, 0xBB, 0xBF];
        input.extend_from_slice(b"hello\n");
        assert_eq!(preprocess(&input), b"hello\n");
    }

    #[test]
    fn expands_tabs_to_next_stop() {
        assert_eq!(preprocess(b"a\tb\n"), b"a   b\n");
        assert_eq!(preprocess(b"ab\tc\n"), b"ab  c\n");
        assert_eq!(preprocess(b"abcd\te\n"), b"abcd    e\n");
    }

    #[test]
    fn normalises_newlines() {
        assert_eq!(preprocess(b"a\r\nb\rc\n"), b"a\nb\nc\n");
    }

    #[test]
    fn ensures_trailing_newline() {
        assert_eq!(preprocess(b"hello"), b"hello\n");
    }

    #[test]
    fn idempotent_on_tab_free_input() {
        let once = preprocess(b"hello\nworld\n");
        let twice = preprocess(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn continuation_bytes_do_not_advance_column() {
        // "é" (C3 A9) is one column wide; a following tab should still
        // land on the next 4-column stop measured from column 1, not 2.
        let input = "\u{e9}\t.\n".as_bytes().to_vec();
        let out = preprocess(&input);
        assert_eq!(&out[out.len() - 5..], b"   .\n");
    }
}
