//! ZIP archive parsing and extraction.
//!
//! This module provides functionality for reading and extracting ZIP archives,
//! supporting both standard ZIP format and ZIP64 extensions for large archives.
//!
//! ## Architecture
//!
//! The module is organized into four main components:
//!
//! - [`structures`]: Data structures representing ZIP format elements (EOCD, file headers, etc.)
//! - [`parser`]: Low-level parsing of the central directory into a [`ZipIndex`]
//! - [`extractor`]: Random-access extraction of a single entry from a byte view
//! - [`reader`]: High-level reader facade for end users
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! This implementation reads the EOCD first (from the end of the file),
//! then the Central Directory, which allows listing files without touching
//! any entry data. After that single pass, every extraction is pure offset
//! arithmetic into the shared byte view — no file cursor, no locks — which
//! is what makes concurrent reads from one archive safe.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions for files > 4GB
//! - STORED (no compression) method
//! - DEFLATE compression method (raw, headerless)
//! - LZMA compression method (embedded property header)
//! - File names in UTF-8, Windows-1252, or CP437
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - No write support; archives are opened read-only
//! - CRC-32 values are reported, not verified

mod encoding;
mod extractor;
mod parser;
mod reader;
mod structures;

pub use extractor::extract;
pub use parser::{ZipIndex, ZipParser};
pub use reader::{ZipReader, build_index};
pub use structures::*;
