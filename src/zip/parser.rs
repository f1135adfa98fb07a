//! Low-level ZIP archive parser.
//!
//! This module handles the binary parsing of ZIP file structures,
//! reading from any source that implements the [`ByteView`] trait.
//!
//! ## Parsing Strategy
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) at the file's end
//! 2. If ZIP64, read the ZIP64 EOCD for large file support
//! 3. Read the Central Directory to get metadata for all files
//! 4. For extraction, read each file's Local File Header and data
//!
//! The whole walk touches only the archive's tail plus the central
//! directory, and it happens exactly once per archive: the resulting
//! [`ZipIndex`] is immutable and can be shared by any number of readers.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ZipError};
use crate::io::ByteView;

use super::encoding::decode_name;
use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for EOCD with a comment.
const MAX_COMMENT_SIZE: u64 = 65535;

/// ZIP64 extended information extra field id.
const ZIP64_EXTRA_ID: u16 = 0x0001;

/// Immutable mapping from entry name to [`ZipEntry`], in directory scan
/// order.
///
/// Built exactly once per archive (or deserialized from an index built
/// elsewhere) and never mutated afterwards, which is what makes it safe to
/// share across threads and readers without synchronization. Duplicate
/// names keep the first occurrence's position and the last occurrence's
/// metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZipIndex {
    entries: IndexMap<String, ZipEntry>,
}

impl ZipIndex {
    pub fn get(&self, name: &str) -> Option<&ZipEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entry names in directory scan order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in directory scan order.
    pub fn entries(&self) -> impl Iterator<Item = &ZipEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, entry: ZipEntry) {
        self.entries.insert(entry.name.clone(), entry);
    }
}

/// Low-level ZIP directory parser.
///
/// This struct handles reading and parsing ZIP structures from a byte
/// view. It's generic over the view type so the same code serves
/// memory-mapped archives and in-memory buffers.
///
/// ## Usage
///
/// Typically used through [`ZipReader`](super::ZipReader) rather than
/// directly.
///
/// ## Example
///
/// ```ignore
/// let parser = ZipParser::new(&view);
/// let index = parser.parse()?;
/// for entry in index.entries() {
///     // Extract file data via extractor::extract(&view, entry)...
/// }
/// ```
pub struct ZipParser<'a, V: ByteView + ?Sized> {
    /// The underlying byte view
    view: &'a V,
    /// Total size of the archive in bytes
    size: u64,
}

impl<'a, V: ByteView + ?Sized> ZipParser<'a, V> {
    /// Create a new parser for the given view.
    pub fn new(view: &'a V) -> Self {
        let size = view.len();
        Self { view, size }
    }

    /// Parse the central directory into a [`ZipIndex`].
    ///
    /// Any structural violation (missing or forged signatures, truncated
    /// fixed-size records, saturated 32-bit fields with no zip64 data) is
    /// fatal: no partial index is returned.
    pub fn parse(&self) -> Result<ZipIndex> {
        let (eocd, eocd_offset) = self.find_eocd()?;

        // Get Central Directory info, using ZIP64 if needed. The locator
        // has a mandated position immediately before the EOCD.
        let (cd_offset, cd_size, total_entries) = if self.has_zip64_locator(eocd_offset) {
            let eocd64 = self.read_zip64_eocd(eocd_offset)?;
            (eocd64.cd_offset, eocd64.cd_size, eocd64.total_entries)
        } else if eocd.is_zip64() {
            return Err(ZipError::format(
                "end-of-central-directory has saturated fields but no zip64 locator",
            ));
        } else {
            (
                eocd.cd_offset as u64,
                eocd.cd_size as u64,
                eocd.total_entries as u64,
            )
        };

        let cd_data = self
            .view
            .slice(cd_offset, cd_size)
            .ok_or_else(|| ZipError::format("central directory out of bounds"))?;

        // Parse each Central Directory File Header entry
        let mut index = ZipIndex::default();
        let mut cursor = Cursor::new(cd_data);

        for _ in 0..total_entries {
            let entry = parse_cdfh(&mut cursor)?;
            index.insert(entry);
        }

        Ok(index)
    }

    /// Find and parse the End of Central Directory record.
    ///
    /// The EOCD is located at the end of the ZIP file. This method
    /// handles both the simple case (no comment) and archives with
    /// comments by searching backwards for the signature.
    ///
    /// # Returns
    ///
    /// A tuple of (EOCD record, offset of EOCD in file).
    ///
    /// # Errors
    ///
    /// Returns an error if no valid EOCD can be found, indicating
    /// the file is not a valid ZIP archive.
    pub fn find_eocd(&self) -> Result<(EndOfCentralDirectory, u64)> {
        // Optimization: First try the simple case where there's no comment.
        // This avoids the backward scan in the common case.
        if self.size >= EndOfCentralDirectory::SIZE as u64 {
            let offset = self.size - EndOfCentralDirectory::SIZE as u64;
            let buf = self
                .view
                .slice(offset, EndOfCentralDirectory::SIZE as u64)
                .ok_or_else(|| ZipError::format("no end-of-central-directory"))?;

            // Check for signature and zero-length comment
            if &buf[0..4] == EndOfCentralDirectory::SIGNATURE && &buf[20..22] == b"\x00\x00" {
                let eocd = EndOfCentralDirectory::from_bytes(buf)?;
                return Ok((eocd, offset));
            }
        }

        // EOCD not at expected location - search for it.
        // The EOCD could be earlier if there's a ZIP comment.
        // We need to search backwards from the end of the file.
        let search_size = (MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE as u64).min(self.size);
        let search_start = self.size - search_size;

        let buf = self
            .view
            .slice(search_start, search_size)
            .ok_or_else(|| ZipError::format("no end-of-central-directory"))?;

        if buf.len() >= EndOfCentralDirectory::SIZE {
            // Search backwards for EOCD signature (PK\x05\x06)
            for i in (0..=buf.len() - EndOfCentralDirectory::SIZE).rev() {
                if &buf[i..i + 4] != EndOfCentralDirectory::SIGNATURE {
                    continue;
                }
                // Found a potential EOCD - verify the comment length is
                // correct. A signature embedded in the archive comment
                // leaves a mismatched comment-length field.
                let comment_len = u16::from_le_bytes([buf[i + 20], buf[i + 21]]) as usize;

                if comment_len == buf.len() - i - EndOfCentralDirectory::SIZE {
                    let eocd =
                        EndOfCentralDirectory::from_bytes(&buf[i..i + EndOfCentralDirectory::SIZE])?;
                    return Ok((eocd, search_start + i as u64));
                }
            }
        }

        Err(ZipError::format("no end-of-central-directory"))
    }

    fn has_zip64_locator(&self, eocd_offset: u64) -> bool {
        eocd_offset >= Zip64EOCDLocator::SIZE as u64
            && self
                .view
                .slice(eocd_offset - Zip64EOCDLocator::SIZE as u64, 4)
                .map(|sig| sig == Zip64EOCDLocator::SIGNATURE)
                .unwrap_or(false)
    }

    /// Read the ZIP64 End of Central Directory record.
    ///
    /// Called when the ZIP64 EOCD Locator is present immediately before
    /// the regular EOCD (its mandated position).
    ///
    /// # Errors
    ///
    /// Returns an error if the ZIP64 structures are truncated or carry a
    /// wrong signature.
    pub fn read_zip64_eocd(&self, eocd_offset: u64) -> Result<Zip64EOCD> {
        let locator_offset = eocd_offset - Zip64EOCDLocator::SIZE as u64;
        let locator_buf = self
            .view
            .slice(locator_offset, Zip64EOCDLocator::SIZE as u64)
            .ok_or_else(|| ZipError::format("zip64 locator out of bounds"))?;

        let locator = Zip64EOCDLocator::from_bytes(locator_buf)?;

        // Read the actual ZIP64 EOCD from the offset specified in the locator
        let eocd64_buf = self
            .view
            .slice(locator.eocd64_offset, Zip64EOCD::MIN_SIZE as u64)
            .ok_or_else(|| ZipError::format("zip64 end-of-central-directory out of bounds"))?;

        Zip64EOCD::from_bytes(eocd64_buf)
    }
}

/// Parse a Central Directory File Header from a cursor.
///
/// The CDFH contains metadata about a file in the archive, including
/// its name, sizes, and location of the actual file data. 32-bit fields
/// saturated to `0xFFFFFFFF` are widened from the zip64 extra field; a
/// saturated field with no extra data to widen it is a format error.
fn parse_cdfh(cursor: &mut Cursor<&[u8]>) -> Result<ZipEntry> {
    let data_len = cursor.get_ref().len() as u64;
    if data_len.saturating_sub(cursor.position()) < CDFH_MIN_SIZE as u64 {
        return Err(ZipError::format("truncated central directory header"));
    }

    // Read and verify the signature (PK\x01\x02)
    let mut sig = [0u8; 4];
    cursor.read_exact(&mut sig)?;
    if sig != CDFH_SIGNATURE {
        return Err(ZipError::format("bad central directory header signature"));
    }

    // Read fixed-size header fields
    let _version_made_by = cursor.read_u16::<LittleEndian>()?;
    let _version_needed = cursor.read_u16::<LittleEndian>()?;
    let _flags = cursor.read_u16::<LittleEndian>()?;
    let _compression_method = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_time = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_date = cursor.read_u16::<LittleEndian>()?;
    let crc32 = cursor.read_u32::<LittleEndian>()?;
    let compressed_size32 = cursor.read_u32::<LittleEndian>()?;
    let uncompressed_size32 = cursor.read_u32::<LittleEndian>()?;
    let file_name_length = cursor.read_u16::<LittleEndian>()?;
    let extra_field_length = cursor.read_u16::<LittleEndian>()?;
    let file_comment_length = cursor.read_u16::<LittleEndian>()?;
    let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
    let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
    let _external_attrs = cursor.read_u32::<LittleEndian>()?;
    let header_offset32 = cursor.read_u32::<LittleEndian>()?;

    let variable_len =
        file_name_length as u64 + extra_field_length as u64 + file_comment_length as u64;
    if data_len.saturating_sub(cursor.position()) < variable_len {
        return Err(ZipError::format("truncated central directory entry"));
    }

    // Read the variable-length file name
    let mut file_name_bytes = vec![0u8; file_name_length as usize];
    cursor.read_exact(&mut file_name_bytes)?;
    let name = decode_name(&file_name_bytes);

    let mut compressed_size = compressed_size32 as u64;
    let mut uncompressed_size = uncompressed_size32 as u64;
    let mut header_offset = header_offset32 as u64;

    let mut need_uncompressed = uncompressed_size32 == ZIP64_SENTINEL;
    let mut need_compressed = compressed_size32 == ZIP64_SENTINEL;
    let mut need_offset = header_offset32 == ZIP64_SENTINEL;

    // Parse extra field for ZIP64 extended information. Per the zip64
    // field-presence rules, the 0x0001 sub-record carries an 8-byte value
    // only for each header field that is saturated, in the fixed order
    // uncompressed size, compressed size, header offset.
    let extra_field_end = cursor.position() + extra_field_length as u64;

    while cursor.position() + 4 <= extra_field_end {
        let header_id = cursor.read_u16::<LittleEndian>()?;
        let field_size = cursor.read_u16::<LittleEndian>()?;
        let field_end = (cursor.position() + field_size as u64).min(extra_field_end);

        if header_id == ZIP64_EXTRA_ID {
            if need_uncompressed && cursor.position() + 8 <= field_end {
                uncompressed_size = cursor.read_u64::<LittleEndian>()?;
                need_uncompressed = false;
            }
            if need_compressed && cursor.position() + 8 <= field_end {
                compressed_size = cursor.read_u64::<LittleEndian>()?;
                need_compressed = false;
            }
            if need_offset && cursor.position() + 8 <= field_end {
                header_offset = cursor.read_u64::<LittleEndian>()?;
                need_offset = false;
            }
        }

        // Skip whatever remains of this sub-record (disk number start,
        // unknown ids, spare bytes).
        cursor.set_position(field_end);
    }

    // Ensure cursor is positioned after extra field, then skip over the
    // file comment (we don't use it).
    cursor.set_position(extra_field_end + file_comment_length as u64);

    // A sentinel that survived the extra-field walk has no true value
    // anywhere in the archive.
    if need_uncompressed || need_compressed || need_offset {
        return Err(ZipError::format(format!(
            "entry {name:?} has saturated fields but no zip64 extra field"
        )));
    }

    Ok(ZipEntry {
        name,
        header_offset,
        crc32,
        compressed_size,
        uncompressed_size,
    })
}
