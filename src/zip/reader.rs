use std::path::Path;
use std::sync::Arc;

use crate::error::{Result, ZipError};
use crate::io::{ByteView, MmapView};

use super::extractor;
use super::parser::{ZipIndex, ZipParser};
use super::structures::ZipEntry;

/// Parse an archive's central directory without keeping a reader around.
///
/// Parse once, then construct as many readers as there are workers with
/// [`ZipReader::open_with_index`] — each gets its own mapping and none
/// repeats the directory walk. The index is serializable, so it can also
/// cross a process boundary.
pub fn build_index(path: impl AsRef<Path>) -> Result<ZipIndex> {
    let view = MmapView::open(path.as_ref())?;
    ZipParser::new(&view).parse()
}

/// Read-only archive reader: one byte view, one shared index.
///
/// `read` takes `&self` and touches no shared mutable state, so a single
/// reader can serve many threads at once; independent readers over the
/// same file are just as safe. [`close`](Self::close) releases the view
/// early; dropping the reader does the same.
pub struct ZipReader<V: ByteView = MmapView> {
    view: Option<V>,
    index: Arc<ZipIndex>,
}

impl ZipReader<MmapView> {
    /// Open an archive read-only, map it, and parse its directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_view(MmapView::open(path.as_ref())?)
    }

    /// Open an archive with a prebuilt index, skipping the directory walk.
    ///
    /// The index must describe the same, unmodified file; entries of a
    /// stale index resolve to garbage offsets and fail extraction.
    pub fn open_with_index(path: impl AsRef<Path>, index: Arc<ZipIndex>) -> Result<Self> {
        Ok(Self::from_view_with_index(
            MmapView::open(path.as_ref())?,
            index,
        ))
    }
}

impl<V: ByteView> ZipReader<V> {
    /// Build a reader over any byte view, parsing the directory.
    pub fn from_view(view: V) -> Result<Self> {
        let index = Arc::new(ZipParser::new(&view).parse()?);
        Ok(Self {
            view: Some(view),
            index,
        })
    }

    /// Build a reader over any byte view with a prebuilt index.
    pub fn from_view_with_index(view: V, index: Arc<ZipIndex>) -> Self {
        Self {
            view: Some(view),
            index,
        }
    }

    /// The shared index. Clone the `Arc` to hand it to further readers.
    pub fn index(&self) -> &Arc<ZipIndex> {
        &self.index
    }

    /// Entry names in directory scan order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.index.names()
    }

    /// Entries in directory scan order.
    pub fn entries(&self) -> impl Iterator<Item = &ZipEntry> {
        self.index.entries()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    pub fn entry(&self, name: &str) -> Option<&ZipEntry> {
        self.index.get(name)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Extract an entry's decompressed bytes by name.
    ///
    /// Safe to call concurrently from multiple threads on the same reader,
    /// and from multiple readers over the same archive.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .index
            .get(name)
            .ok_or_else(|| ZipError::NotFound(name.to_string()))?;
        extractor::extract(self.view()?, entry)
    }

    /// Extract an entry obtained from [`entries`](Self::entries) or a
    /// shared index, skipping the name lookup.
    pub fn read_entry(&self, entry: &ZipEntry) -> Result<Vec<u8>> {
        extractor::extract(self.view()?, entry)
    }

    /// Release the mapping. Idempotent; later reads fail with
    /// [`ZipError::Closed`]. The index stays available.
    pub fn close(&mut self) {
        self.view = None;
    }

    pub fn is_closed(&self) -> bool {
        self.view.is_none()
    }

    fn view(&self) -> Result<&V> {
        self.view.as_ref().ok_or(ZipError::Closed)
    }
}
