//! Library-wide error and result types.

use std::io;

use thiserror::Error;

use crate::record::Tag;

/// Result alias used throughout ndskit.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the library can produce.
///
/// Every failure is a deterministic function of the image bytes; there is no
/// retry semantics anywhere. Callers either propagate or skip and continue.
#[derive(Debug, Error)]
pub enum Error {
    /// A record or block tag did not match the expected value.
    #[error("magic mismatch: expected {expected}, got {actual}")]
    MagicMismatch {
        /// The tag the schema declares.
        expected: Tag,
        /// The tag actually present in the data.
        actual: Tag,
    },
    /// A cursor read would run past its scoped range.
    #[error("read of {requested} bytes with only {remaining} remaining")]
    OutOfBounds {
        /// Bytes the read asked for.
        requested: usize,
        /// Bytes left in the cursor's range.
        remaining: usize,
    },
    /// An offset/length pair would address outside the region it is resolved
    /// against.
    #[error("pointer {offset:#x}+{length:#x} exceeds region of {len:#x} bytes")]
    InvalidPointer {
        /// Start of the pointed-to range.
        offset: u32,
        /// Length of the pointed-to range.
        length: u32,
        /// Size of the region the pointer was resolved against.
        len: usize,
    },
    /// A path was looked up that is not present in the catalog.
    #[error("no file mounted at '{0}'")]
    UnknownPath(String),
    /// An archive entry could not be decoded during unpacking.
    #[error("failed to unpack archive '{path}'")]
    ArchiveUnpack {
        /// Catalog path of the archive that failed to decode.
        path: String,
        /// The decode failure that caused the archive to be skipped.
        #[source]
        source: Box<Error>,
    },
    /// A structural constraint was violated (message describes which one).
    #[error("parse error: {0}")]
    Parse(&'static str),
    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
