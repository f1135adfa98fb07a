mod memory;
mod mmap;

pub use memory::MemView;
pub use mmap::MmapView;

/// Trait for a read-only, randomly addressable view of an archive's bytes.
///
/// Every read the extractor performs is a pure function of the view and an
/// offset window, so one view can back any number of concurrent readers
/// without locks or a shared cursor.
pub trait ByteView: Send + Sync {
    /// Borrow `len` bytes starting at `offset`, or `None` if the window
    /// falls outside the view.
    fn slice(&self, offset: u64, len: u64) -> Option<&[u8]>;

    /// Total size of the view in bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub(crate) fn slice_range(bytes: &[u8], offset: u64, len: u64) -> Option<&[u8]> {
    let start = usize::try_from(offset).ok()?;
    let len = usize::try_from(len).ok()?;
    let end = start.checked_add(len)?;
    bytes.get(start..end)
}
