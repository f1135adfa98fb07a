//! # parzip
//!
//! A memory-mapped ZIP reader built for lock-free parallel extraction.
//!
//! This library parses an archive's central directory once into an immutable
//! index, then lets any number of threads extract entries from a single
//! shared, read-only memory mapping. There is no shared file cursor and no
//! lock anywhere on the read path: every extraction is a pure function of
//! the mapping and one index entry, so readers never contend.
//!
//! ## Features
//!
//! - Read-only, memory-mapped archive access (in-memory buffers work too)
//! - Support for ZIP64 format (archives larger than 4GB)
//! - Support for STORED, DEFLATE, and LZMA compression methods
//! - File names in UTF-8 with Windows-1252 and CP437 fallbacks
//! - Serializable index: parse once, share with worker threads or processes
//!
//! ## Example
//!
//! ```no_run
//! use parzip::ZipReader;
//!
//! fn main() -> parzip::Result<()> {
//!     let reader = ZipReader::open("archive.zip")?;
//!
//!     for name in reader.names() {
//!         println!("{name}");
//!     }
//!
//!     let bytes = reader.read("docs/readme.md")?;
//!     println!("{} bytes", bytes.len());
//!     Ok(())
//! }
//! ```
//!
//! To fan extraction out over threads, share one reader (reads take
//! `&self`), or parse the directory once and give each worker its own
//! mapping:
//!
//! ```no_run
//! use std::sync::Arc;
//! use parzip::{ZipReader, build_index};
//!
//! fn main() -> parzip::Result<()> {
//!     let index = Arc::new(build_index("archive.zip")?);
//!     let readers: Vec<_> = (0..4)
//!         .map(|_| ZipReader::open_with_index("archive.zip", index.clone()))
//!         .collect::<parzip::Result<_>>()?;
//!     // move each reader into its own worker thread...
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod zip;

pub use cli::Cli;
pub use error::{Result, ZipError};
pub use io::{ByteView, MemView, MmapView};
pub use zip::{CompressionMethod, ZipEntry, ZipIndex, ZipReader, build_index};
