use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

use flate2::read::DeflateDecoder;
use xz2::read::XzDecoder;
use xz2::stream::{Filters, LzmaOptions, Stream};

use crate::error::{Result, ZipError};
use crate::io::ByteView;

use super::structures::{CompressionMethod, LFH_SIGNATURE, LFH_SIZE, ZipEntry};

/// Extract one entry's decompressed bytes from the archive view.
///
/// Resolves the entry's local file header to locate the compressed data
/// window, then dispatches on the compression method. The whole operation
/// is a pure function of `(view, entry)` with no shared cursor, so it is
/// safe to call from any number of threads at once.
pub fn extract<V: ByteView + ?Sized>(view: &V, entry: &ZipEntry) -> Result<Vec<u8>> {
    let header = view.slice(entry.header_offset, LFH_SIZE as u64).ok_or_else(|| {
        ZipError::format(format!("local header for {:?} out of bounds", entry.name))
    })?;

    // Verify LFH signature (PK\x03\x04)
    if &header[0..4] != LFH_SIGNATURE {
        return Err(ZipError::format(format!(
            "bad local header signature for {:?}",
            entry.name
        )));
    }

    let mut cursor = Cursor::new(&header[4..]);
    let _version_needed = cursor.read_u16::<LittleEndian>()?;
    let _flags = cursor.read_u16::<LittleEndian>()?;
    let method = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_time = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_date = cursor.read_u16::<LittleEndian>()?;
    let _crc32 = cursor.read_u32::<LittleEndian>()?;
    // The local size fields are untrusted; some writers leave them zeroed
    // and the real values in the central directory only.
    let _compressed_size = cursor.read_u32::<LittleEndian>()?;
    let _uncompressed_size = cursor.read_u32::<LittleEndian>()?;
    let file_name_length = cursor.read_u16::<LittleEndian>()? as u64;
    let extra_field_length = cursor.read_u16::<LittleEndian>()? as u64;

    // Data starts after: LFH (30 bytes) + filename + extra field
    let data_offset = entry.header_offset + LFH_SIZE as u64 + file_name_length + extra_field_length;

    let compressed = view
        .slice(data_offset, entry.compressed_size)
        .ok_or_else(|| ZipError::format(format!("file data for {:?} out of bounds", entry.name)))?;

    match CompressionMethod::from_u16(method) {
        CompressionMethod::Stored => Ok(compressed.to_vec()),
        CompressionMethod::Deflate => inflate_raw(compressed, entry.uncompressed_size),
        CompressionMethod::Lzma => decode_lzma(compressed, entry.uncompressed_size),
        CompressionMethod::Unsupported(code) => Err(ZipError::UnsupportedCompression(code)),
    }
}

fn output_buffer(uncompressed_size: u64) -> Result<Vec<u8>> {
    let size = usize::try_from(uncompressed_size)
        .map_err(|_| ZipError::format("entry too large for address space"))?;
    Ok(vec![0u8; size])
}

/// Raw (headerless) DEFLATE, as zip stores it: no zlib wrapper, no checksum
/// trailer. The declared uncompressed size bounds the read.
fn inflate_raw(compressed: &[u8], uncompressed_size: u64) -> Result<Vec<u8>> {
    let mut out = output_buffer(uncompressed_size)?;
    DeflateDecoder::new(compressed).read_exact(&mut out)?;
    Ok(out)
}

/// Zip's LZMA payload embeds its own property header: two version bytes, a
/// u16 property length, then the LZMA1 property blob the raw decoder needs.
fn decode_lzma(compressed: &[u8], uncompressed_size: u64) -> Result<Vec<u8>> {
    if compressed.len() < 4 {
        return Err(ZipError::format("truncated lzma property header"));
    }
    let props_len = u16::from_le_bytes([compressed[2], compressed[3]]) as usize;
    let props = compressed
        .get(4..4 + props_len)
        .ok_or_else(|| ZipError::format("truncated lzma property header"))?;

    let stream = raw_lzma_decoder(props)?;
    let mut out = output_buffer(uncompressed_size)?;
    XzDecoder::new_stream(&compressed[4 + props_len..], stream).read_exact(&mut out)?;
    Ok(out)
}

/// Build a raw LZMA1 decoder from a 5-byte property blob: a packed
/// lc/lp/pb byte followed by a little-endian dictionary size.
fn raw_lzma_decoder(props: &[u8]) -> Result<Stream> {
    if props.len() < 5 {
        return Err(ZipError::format("lzma properties too short"));
    }
    let packed = props[0] as u32;
    if packed >= 9 * 5 * 5 {
        return Err(ZipError::format("invalid lzma properties byte"));
    }
    let lc = packed % 9;
    let lp = (packed / 9) % 5;
    let pb = packed / 45;
    let dict_size = u32::from_le_bytes([props[1], props[2], props[3], props[4]]);

    let mut options = LzmaOptions::new_preset(0).map_err(lzma_error)?;
    options
        .literal_context_bits(lc)
        .literal_position_bits(lp)
        .position_bits(pb)
        .dict_size(dict_size);

    let mut filters = Filters::new();
    filters.lzma1(&options);
    Stream::new_raw_decoder(&filters).map_err(lzma_error)
}

fn lzma_error(err: xz2::stream::Error) -> ZipError {
    ZipError::format(format!("lzma: {err}"))
}
