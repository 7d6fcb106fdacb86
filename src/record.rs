//! Generic record and block deserialization machinery.
//!
//! Every container format in the image follows the same shape: a 16-byte
//! record header carrying a 4-byte tag, followed by tagged sub-blocks that
//! declare their own size. The traits here let a format describe its fields
//! once and get tag validation, size-bounded sub-cursors, and lazy data
//! references for free.
//!
//! ## Record header (16 bytes)
//! ```text
//! [0x00] Magic            (4 bytes)
//! [0x04] Byte order mark  (u16)
//! [0x06] Version          (u16)
//! [0x08] Total file size  (u32)
//! [0x0C] Header size      (u16, 0x10)
//! [0x0E] Block count      (u16)
//! ```
//!
//! ## Block header (8 bytes)
//! ```text
//! [0x00] Magic            (4 bytes)
//! [0x04] Declared size    (u32, includes this header)
//! ```

use std::fmt;

use crate::cursor::{ByteCursor, RomPointer};
use crate::{Error, Result};

/// A 4-byte type tag.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    /// Create a tag from its raw bytes.
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Read a tag from the cursor, advancing past it.
    pub fn parse(cursor: &mut ByteCursor) -> Result<Self> {
        let bytes = cursor.read_bytes(4)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&bytes);
        Ok(Self(raw))
    }

    /// The tag as a file extension: trailing NUL padding trimmed,
    /// lowercased.
    pub fn extension(&self) -> String {
        String::from_utf8_lossy(&self.0)
            .trim_end_matches('\0')
            .to_ascii_lowercase()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.escape_ascii())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self.0.escape_ascii())
    }
}

/// The standard 16-byte container header shared by all record formats.
#[derive(Debug, Clone)]
pub struct RecordHeader {
    /// Type tag, already validated against the record's expected tag.
    pub magic: Tag,
    /// Byte order mark (0xFFFE or 0xFEFF; the image is little-endian
    /// throughout, so this is informational).
    pub byte_order: u16,
    /// Format version.
    pub version: u16,
    /// Total size of the record, header included.
    pub file_size: u32,
    /// Size of this header (0x10).
    pub header_size: u16,
    /// Number of sub-blocks that follow.
    pub block_count: u16,
}

impl RecordHeader {
    /// Encoded size of the header in bytes.
    pub const SIZE: usize = 16;
}

/// The 8-byte header prefixed to every sub-block.
#[derive(Debug, Clone)]
pub struct BlockHeader {
    /// Type tag, already validated against the block's expected tag.
    pub magic: Tag,
    /// Declared size of the block, this header included.
    pub size: u32,
}

impl BlockHeader {
    /// Encoded size of the header in bytes.
    pub const SIZE: usize = 8;

    /// Size of the block's body, header excluded.
    pub fn body_len(&self) -> usize {
        self.size as usize - Self::SIZE
    }
}

/// A plain value with an explicit, ordered field list.
///
/// Implementations read their fields from the cursor in declared order;
/// reserved regions are skipped with [`ByteCursor::skip`], never
/// interpreted.
pub trait Deserialize: Sized {
    /// Decode one value, advancing the cursor past it.
    fn deserialize(cursor: &mut ByteCursor) -> Result<Self>;
}

/// A top-level record prefixed by the standard 16-byte header.
///
/// The tag is validated before any other field is read; a mismatch fails
/// with [`Error::MagicMismatch`] naming both tags.
pub trait Record: Sized {
    /// The tag this record type expects.
    const MAGIC: Tag;

    /// Decode the record body. The cursor is positioned just past the
    /// record header; its range still covers the whole record, so offsets
    /// relative to the record start resolve directly.
    fn deserialize(header: &RecordHeader, cursor: &mut ByteCursor) -> Result<Self>;
}

/// A tagged sub-block within a record.
///
/// The block body is decoded inside a sub-cursor bounded by the declared
/// size; reads past it fail with [`Error::OutOfBounds`].
pub trait Block: Sized {
    /// The tag this block type expects.
    const MAGIC: Tag;

    /// Decode the block body from a cursor scoped to exactly the body
    /// bytes.
    fn deserialize(header: &BlockHeader, cursor: &mut ByteCursor) -> Result<Self>;
}

impl ByteCursor {
    /// Decode a plain value at the current position.
    pub fn read_object<T: Deserialize>(&mut self) -> Result<T> {
        T::deserialize(self)
    }

    /// Decode a record at the current position.
    ///
    /// Reads and validates the tag, reads the rest of the record header,
    /// then hands the cursor to the record's own field list.
    pub fn read_record<T: Record>(&mut self) -> Result<T> {
        let magic = Tag::parse(self)?;
        if magic != T::MAGIC {
            return Err(Error::MagicMismatch {
                expected: T::MAGIC,
                actual: magic,
            });
        }
        let header = RecordHeader {
            magic,
            byte_order: self.read()?,
            version: self.read()?,
            file_size: self.read()?,
            header_size: self.read()?,
            block_count: self.read()?,
        };
        T::deserialize(&header, self)
    }

    /// Open the block at the current position, returning its header and a
    /// cursor scoped to exactly its body.
    ///
    /// The outer cursor is advanced past the whole block. Used directly by
    /// formats whose block payload depends on sibling blocks; most formats
    /// go through [`ByteCursor::read_block`] instead.
    pub fn open_block(&mut self, expected: Tag) -> Result<(BlockHeader, ByteCursor)> {
        let magic = Tag::parse(self)?;
        if magic != expected {
            return Err(Error::MagicMismatch {
                expected,
                actual: magic,
            });
        }
        let size = self.read::<u32>()?;
        if (size as usize) < BlockHeader::SIZE {
            return Err(Error::Parse("block size smaller than its header"));
        }
        let header = BlockHeader { magic, size };
        let body = self.scope(RomPointer::new(
            self.position() as u32,
            header.body_len() as u32,
        ))?;
        self.skip(header.body_len())?;
        Ok((header, body))
    }

    /// Decode a block at the current position and advance past it.
    pub fn read_block<T: Block>(&mut self) -> Result<T> {
        let (header, mut body) = self.open_block(T::MAGIC)?;
        T::deserialize(&header, &mut body)
    }
}
