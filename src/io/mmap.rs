use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use super::ByteView;
use crate::error::{Result, ZipError};

/// Read-only memory mapping of a whole archive file.
///
/// The mapping is established once and never grows or shrinks; reads at
/// arbitrary offsets are served by the page cache with no file-position
/// state, which is what makes concurrent extraction safe.
pub struct MmapView {
    map: Mmap,
}

impl MmapView {
    /// Map the file at `path` read-only.
    ///
    /// Empty files are rejected up front: they cannot be mapped and could
    /// never hold an end-of-central-directory record anyway.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        if size == 0 {
            return Err(ZipError::format(format!(
                "{} is empty, not a zip archive",
                path.display()
            )));
        }

        // Safety: the mapping is private and read-only. Truncating the file
        // while mapped is undefined behavior on some platforms; live-shrinking
        // archives are outside this crate's resource model.
        let map = unsafe { Mmap::map(&file)? };
        Ok(Self { map })
    }
}

impl ByteView for MmapView {
    fn slice(&self, offset: u64, len: u64) -> Option<&[u8]> {
        super::slice_range(&self.map, offset, len)
    }

    fn len(&self) -> u64 {
        self.map.len() as u64
    }
}
