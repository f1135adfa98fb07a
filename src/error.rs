use thiserror::Error;

/// The primary error type for all operations in the `parzip` crate.
///
/// Structural problems found while parsing the central directory are fatal
/// to opening the archive; no partial index is ever returned. Errors raised
/// during extraction are local to that entry and leave the index and all
/// other entries usable.
#[derive(Debug, Error)]
pub enum ZipError {
    /// The archive's directory or a header is malformed, truncated, or
    /// inconsistent. The archive is rejected outright.
    #[error("invalid zip archive: {0}")]
    Format(String),

    /// The entry is compressed with a method this crate does not decode.
    /// Other entries in the same archive remain readable.
    #[error("compression method {0} is not supported")]
    UnsupportedCompression(u16),

    /// No entry with the given name exists in the index.
    #[error("no entry named {0:?} in archive")]
    NotFound(String),

    /// The reader's mapping was released with [`close`] and can no longer
    /// serve reads.
    ///
    /// [`close`]: crate::ZipReader::close
    #[error("archive has been closed")]
    Closed,

    /// An I/O error while opening or mapping the archive, or reported by a
    /// decompressor for a corrupt data stream.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ZipError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        ZipError::Format(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ZipError>;
