use super::ByteView;

/// In-memory archive bytes.
///
/// Suitable for archives small enough to read whole, and for tests; the
/// buffer is immutable for the life of the view, giving it the same
/// concurrent-read guarantees as [`MmapView`](super::MmapView).
pub struct MemView {
    bytes: Vec<u8>,
}

impl MemView {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl From<Vec<u8>> for MemView {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl ByteView for MemView {
    fn slice(&self, offset: u64, len: u64) -> Option<&[u8]> {
        super::slice_range(&self.bytes, offset, len)
    }

    fn len(&self) -> u64 {
        self.bytes.len() as u64
    }
}
