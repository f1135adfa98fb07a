//! Wire-format behavior over hand-assembled archives: zip64 widening,
//! untrusted local headers, hostile comments, odd name encodings.

use std::io::Write;

use flate2::Compression;
use flate2::write::DeflateEncoder;

use parzip::{MemView, ZipError, ZipReader};

/// One entry's worth of raw archive material, assembled byte by byte so
/// tests can lie in exactly one header field at a time.
struct RawEntry {
    name: Vec<u8>,
    method: u16,
    crc: u32,
    data: Vec<u8>,
    lfh_compressed: u32,
    cd_compressed: u32,
    cd_uncompressed: u32,
    extra: Vec<u8>,
    offset_override: Option<u32>,
}

impl RawEntry {
    fn stored(name: &[u8], data: &[u8]) -> Self {
        Self {
            name: name.to_vec(),
            method: 0,
            crc: crc32fast::hash(data),
            data: data.to_vec(),
            lfh_compressed: data.len() as u32,
            cd_compressed: data.len() as u32,
            cd_uncompressed: data.len() as u32,
            extra: Vec::new(),
            offset_override: None,
        }
    }

    fn deflated(name: &[u8], plain: &[u8]) -> Self {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(plain).unwrap();
        let data = encoder.finish().unwrap();
        Self {
            name: name.to_vec(),
            method: 8,
            crc: crc32fast::hash(plain),
            lfh_compressed: data.len() as u32,
            cd_compressed: data.len() as u32,
            cd_uncompressed: plain.len() as u32,
            data,
            extra: Vec::new(),
            offset_override: None,
        }
    }
}

fn local_header(entry: &RawEntry) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"PK\x03\x04");
    out.extend_from_slice(&20u16.to_le_bytes()); // version needed
    out.extend_from_slice(&0u16.to_le_bytes()); // flags
    out.extend_from_slice(&entry.method.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // mod time
    out.extend_from_slice(&0u16.to_le_bytes()); // mod date
    out.extend_from_slice(&entry.crc.to_le_bytes());
    out.extend_from_slice(&entry.lfh_compressed.to_le_bytes());
    out.extend_from_slice(&(entry.data.len() as u32).to_le_bytes());
    out.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // extra len
    out.extend_from_slice(&entry.name);
    out.extend_from_slice(&entry.data);
    out
}

fn central_header(entry: &RawEntry, offset: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"PK\x01\x02");
    out.extend_from_slice(&20u16.to_le_bytes()); // version made by
    out.extend_from_slice(&20u16.to_le_bytes()); // version needed
    out.extend_from_slice(&0u16.to_le_bytes()); // flags
    out.extend_from_slice(&entry.method.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // mod time
    out.extend_from_slice(&0u16.to_le_bytes()); // mod date
    out.extend_from_slice(&entry.crc.to_le_bytes());
    out.extend_from_slice(&entry.cd_compressed.to_le_bytes());
    out.extend_from_slice(&entry.cd_uncompressed.to_le_bytes());
    out.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
    out.extend_from_slice(&(entry.extra.len() as u16).to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // comment len
    out.extend_from_slice(&0u16.to_le_bytes()); // disk number start
    out.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
    out.extend_from_slice(&0u32.to_le_bytes()); // external attrs
    out.extend_from_slice(&entry.offset_override.unwrap_or(offset).to_le_bytes());
    out.extend_from_slice(&entry.name);
    out.extend_from_slice(&entry.extra);
    out
}

fn end_record(entries: u16, cd_size: u32, cd_offset: u32, comment: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"PK\x05\x06");
    out.extend_from_slice(&0u16.to_le_bytes()); // disk number
    out.extend_from_slice(&0u16.to_le_bytes()); // disk with cd
    out.extend_from_slice(&entries.to_le_bytes());
    out.extend_from_slice(&entries.to_le_bytes());
    out.extend_from_slice(&cd_size.to_le_bytes());
    out.extend_from_slice(&cd_offset.to_le_bytes());
    out.extend_from_slice(&(comment.len() as u16).to_le_bytes());
    out.extend_from_slice(comment);
    out
}

/// A zip64 extended-information extra field carrying the given 8-byte
/// values in order.
fn zip64_extra(values: &[u64]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0x0001u16.to_le_bytes());
    out.extend_from_slice(&((values.len() * 8) as u16).to_le_bytes());
    for value in values {
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

fn zip64_end_record(entries: u64, cd_size: u64, cd_offset: u64) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"PK\x06\x06");
    out.extend_from_slice(&44u64.to_le_bytes()); // size of remaining record
    out.extend_from_slice(&45u16.to_le_bytes()); // version made by
    out.extend_from_slice(&45u16.to_le_bytes()); // version needed
    out.extend_from_slice(&0u32.to_le_bytes()); // disk number
    out.extend_from_slice(&0u32.to_le_bytes()); // disk with cd
    out.extend_from_slice(&entries.to_le_bytes());
    out.extend_from_slice(&entries.to_le_bytes());
    out.extend_from_slice(&cd_size.to_le_bytes());
    out.extend_from_slice(&cd_offset.to_le_bytes());
    out
}

fn zip64_locator(record_offset: u64) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"PK\x06\x07");
    out.extend_from_slice(&0u32.to_le_bytes()); // disk with zip64 eocd
    out.extend_from_slice(&record_offset.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes()); // total disks
    out
}

fn assemble(entries: &[RawEntry], comment: &[u8]) -> Vec<u8> {
    let mut archive = Vec::new();
    let mut offsets = Vec::new();
    for entry in entries {
        offsets.push(archive.len() as u32);
        archive.extend_from_slice(&local_header(entry));
    }

    let cd_offset = archive.len() as u32;
    for (entry, offset) in entries.iter().zip(&offsets) {
        archive.extend_from_slice(&central_header(entry, *offset));
    }
    let cd_size = archive.len() as u32 - cd_offset;

    archive.extend_from_slice(&end_record(entries.len() as u16, cd_size, cd_offset, comment));
    archive
}

fn open(bytes: Vec<u8>) -> parzip::Result<ZipReader<MemView>> {
    ZipReader::from_view(MemView::new(bytes))
}

#[test]
fn central_directory_size_overrides_local_header() {
    let plain = b"hello world".repeat(100);
    let mut entry = RawEntry::deflated(b"b.txt", &plain);
    // Some writers zero the local size field; the directory value must win.
    entry.lfh_compressed = 0;

    let reader = open(assemble(&[entry], b"")).unwrap();
    assert_eq!(reader.read("b.txt").unwrap(), plain);
}

#[test]
fn unsupported_method_is_isolated_per_entry() {
    let mut weird = RawEntry::stored(b"weird.bin", b"\x01\x02\x03\x04");
    weird.method = 99;
    let plain = RawEntry::stored(b"plain.txt", b"ok");

    let reader = open(assemble(&[weird, plain], b"")).unwrap();

    assert!(matches!(
        reader.read("weird.bin"),
        Err(ZipError::UnsupportedCompression(99))
    ));
    // The failure is local to that entry.
    assert_eq!(reader.read("plain.txt").unwrap(), b"ok");
    assert!(matches!(
        reader.read("weird.bin"),
        Err(ZipError::UnsupportedCompression(99))
    ));
    assert_eq!(reader.read("plain.txt").unwrap(), b"ok");
}

#[test]
fn saturated_sizes_widen_from_zip64_extra() {
    let data = b"zip64 payload goes here";
    let mut entry = RawEntry::stored(b"big.bin", data);
    entry.cd_uncompressed = 0xFFFFFFFF;
    entry.cd_compressed = 0xFFFFFFFF;
    entry.extra = zip64_extra(&[data.len() as u64, data.len() as u64]);

    let reader = open(assemble(&[entry], b"")).unwrap();
    let parsed = reader.entry("big.bin").unwrap();
    assert_eq!(parsed.uncompressed_size, data.len() as u64);
    assert_eq!(parsed.compressed_size, data.len() as u64);
    assert_eq!(reader.read("big.bin").unwrap(), data);
}

#[test]
fn saturated_offset_widens_from_zip64_extra() {
    let data = b"first entry, offset zero";
    let mut entry = RawEntry::stored(b"first.bin", data);
    // Only the offset is saturated, so the extra holds a single value.
    entry.offset_override = Some(0xFFFFFFFF);
    entry.extra = zip64_extra(&[0]);

    let reader = open(assemble(&[entry], b"")).unwrap();
    assert_eq!(reader.entry("first.bin").unwrap().header_offset, 0);
    assert_eq!(reader.read("first.bin").unwrap(), data);
}

#[test]
fn saturated_field_without_extra_is_rejected() {
    let mut entry = RawEntry::stored(b"broken.bin", b"data");
    entry.cd_uncompressed = 0xFFFFFFFF;

    match open(assemble(&[entry], b"")) {
        Err(ZipError::Format(msg)) => assert!(msg.contains("zip64"), "{msg}"),
        other => panic!("expected format error, got {:?}", other.err()),
    }
}

#[test]
fn extra_field_never_overrides_plain_sizes() {
    let data = b"ordinary sizes";
    let mut entry = RawEntry::stored(b"plain.bin", data);
    // A zip64 extra field on a non-saturated entry must be ignored.
    entry.extra = zip64_extra(&[0xDEAD_BEEF, 0xDEAD_BEEF, 0xDEAD_BEEF]);

    let reader = open(assemble(&[entry], b"")).unwrap();
    let parsed = reader.entry("plain.bin").unwrap();
    assert_eq!(parsed.uncompressed_size, data.len() as u64);
    assert_eq!(parsed.compressed_size, data.len() as u64);
    assert_eq!(parsed.header_offset, 0);
    assert_eq!(reader.read("plain.bin").unwrap(), data);
}

#[test]
fn eocd_found_behind_comment_with_embedded_signature() {
    let entry = RawEntry::stored(b"a.txt", b"hi");
    let mut comment = b"PK\x05\x06".to_vec();
    comment.extend_from_slice(&[0u8; 26]);

    let reader = open(assemble(&[entry], &comment)).unwrap();
    assert_eq!(reader.read("a.txt").unwrap(), b"hi");
}

#[test]
fn empty_directory_parses() {
    let reader = open(assemble(&[], b"")).unwrap();
    assert_eq!(reader.len(), 0);
    assert!(reader.is_empty());
}

#[test]
fn garbage_is_rejected() {
    assert!(matches!(
        open(b"this is not a zip archive at all".to_vec()),
        Err(ZipError::Format(_))
    ));
    assert!(matches!(open(b"PK".to_vec()), Err(ZipError::Format(_))));
}

#[test]
fn entry_offset_beyond_archive_fails_extraction() {
    let mut entry = RawEntry::stored(b"gone.bin", b"payload");
    entry.offset_override = Some(0x00FF_FFFF);

    let reader = open(assemble(&[entry], b"")).unwrap();
    assert!(matches!(reader.read("gone.bin"), Err(ZipError::Format(_))));
}

#[test]
fn non_utf8_names_fall_back() {
    // 0xE9 decodes as Windows-1252 é; 0x90 is unassigned there and falls
    // through to CP437's É.
    let ansi = RawEntry::stored(b"caf\xE9.txt", b"ansi");
    let oem = RawEntry::stored(b"\x90clair.txt", b"oem");

    let reader = open(assemble(&[ansi, oem], b"")).unwrap();
    let names: Vec<&str> = reader.names().collect();
    assert_eq!(names, ["caf\u{e9}.txt", "\u{c9}clair.txt"]);
    assert_eq!(reader.read("café.txt").unwrap(), b"ansi");
    assert_eq!(reader.read("Éclair.txt").unwrap(), b"oem");
}

#[test]
fn zip64_end_record_supersedes_saturated_eocd() {
    let entry = RawEntry::stored(b"a.txt", b"hi");

    let mut archive = local_header(&entry);
    let cd_offset = archive.len() as u64;
    archive.extend_from_slice(&central_header(&entry, 0));
    let cd_size = archive.len() as u64 - cd_offset;

    let record_offset = archive.len() as u64;
    archive.extend_from_slice(&zip64_end_record(1, cd_size, cd_offset));
    archive.extend_from_slice(&zip64_locator(record_offset));
    archive.extend_from_slice(&end_record(0xFFFF, 0xFFFFFFFF, 0xFFFFFFFF, b""));

    let reader = open(archive).unwrap();
    assert_eq!(reader.len(), 1);
    assert_eq!(reader.read("a.txt").unwrap(), b"hi");
}

#[test]
fn saturated_eocd_without_locator_is_rejected() {
    let entry = RawEntry::stored(b"a.txt", b"hi");
    let mut archive = local_header(&entry);
    let cd_offset = archive.len() as u32;
    archive.extend_from_slice(&central_header(&entry, 0));
    let cd_size = archive.len() as u32 - cd_offset;
    archive.extend_from_slice(&end_record(0xFFFF, cd_size, cd_offset, b""));

    assert!(matches!(open(archive), Err(ZipError::Format(_))));
}

#[test]
fn locator_pointing_at_garbage_is_rejected() {
    let entry = RawEntry::stored(b"a.txt", b"hi");
    let mut archive = local_header(&entry);
    let cd_offset = archive.len() as u64;
    archive.extend_from_slice(&central_header(&entry, 0));
    let cd_size = archive.len() as u64 - cd_offset;

    // Locator aims at the first local header, not a zip64 record.
    archive.extend_from_slice(&zip64_locator(0));
    archive.extend_from_slice(&end_record(1, cd_size as u32, cd_offset as u32, b""));

    assert!(matches!(open(archive), Err(ZipError::Format(_))));
}

#[test]
fn duplicate_names_keep_first_position_last_value() {
    let first = RawEntry::stored(b"dup.txt", b"old contents");
    let other = RawEntry::stored(b"other.txt", b"other");
    let second = RawEntry::stored(b"dup.txt", b"new contents");

    let reader = open(assemble(&[first, other, second], b"")).unwrap();
    let names: Vec<&str> = reader.names().collect();
    assert_eq!(names, ["dup.txt", "other.txt"]);
    assert_eq!(reader.read("dup.txt").unwrap(), b"new contents");
}
