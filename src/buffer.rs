//! The growable byte buffer (spec C1).
//!
//! Every text-carrying node payload (`NORMAL_TEXT`, `CODESPAN`, link
//! URLs and titles, etc.) is backed by one of these. It's a thin
//! wrapper over `Vec<u8>` rather than a hand-rolled allocator: in safe
//! Rust the grow/compare/free contract of the source's `buf_t` is
//! exactly what `Vec<u8>` already gives us, so the wrapper exists to
//! name the concept, not to reimplement it.

#[derive(Clone, Default, PartialEq, Eq)]
pub struct TextBuf(Vec<u8>);

impl std::fmt::Debug for TextBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.0))
    }
}

impl TextBuf {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }
}

impl From<Vec<u8>> for TextBuf {
    fn from(v: Vec<u8>) -> Self {
        TextBuf(v)
    }
}

impl From<&[u8]> for TextBuf {
    fn from(v: &[u8]) -> Self {
        TextBuf(v.to_vec())
    }
}

impl std::ops::Deref for TextBuf {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}
