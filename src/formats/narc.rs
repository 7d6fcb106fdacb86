//! NARC (Nitro ARChive) - general-purpose nested archive.
//!
//! The most common container inside an image; game data is usually a tree
//! of NARCs. Decoding produces a path -> lazy-range map; the provider's
//! unpack step rebases those ranges into image coordinates and splices them
//! into the catalog.
//!
//! ## Layout
//! ```text
//! [0x00] Record header, magic "NARC" (0x10 bytes)
//! [0x10] BTAF block - file allocation:
//!        [0x00] Magic "BTAF" + declared size (8 bytes)
//!        [0x08] File count (u16) + reserved (u16)
//!        [0x0C] Entries: start (u32), end (u32) - relative to the GMIF body
//! [...]  BTNF block - file names:
//!        [0x00] Magic "BTNF" + declared size (8 bytes)
//!        [0x08] Name table, same layout as the image's FNT
//! [...]  GMIF block - file images:
//!        [0x00] Magic "GMIF" + declared size (8 bytes)
//!        [0x08] Raw file data addressed by the BTAF entries
//! ```
//!
//! Entries without a name-table path get a synthesized `<id>.<ext>` name,
//! with the extension sniffed from the entry's leading tag.

use std::collections::BTreeMap;

use crate::cursor::{ByteCursor, DataPointer, RomPointer};
use crate::record::{Block, BlockHeader, Record, RecordHeader, Tag};
use crate::registry;
use crate::Result;

use super::fnt::NameTable;

/// Decoded NARC archive.
///
/// File ranges stay lazy; nothing is copied out of the image during
/// decoding.
#[derive(Debug)]
pub struct Narc {
    /// Relative path -> data range, in path order.
    pub files: BTreeMap<String, DataPointer>,
}

/// BTAF - file allocation block.
struct FileAllocation {
    entries: Vec<RomPointer>,
}

impl Block for FileAllocation {
    const MAGIC: Tag = Tag::new(*b"BTAF");

    fn deserialize(_header: &BlockHeader, cursor: &mut ByteCursor) -> Result<Self> {
        let count = cursor.read::<u16>()?;
        cursor.skip(2)?; // reserved
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let start = cursor.read::<u32>()?;
            let end = cursor.read::<u32>()?;
            entries.push(RomPointer::new(start, end.saturating_sub(start)));
        }
        Ok(Self { entries })
    }
}

/// BTNF - file name block, an embedded name table.
struct FileNames {
    table: NameTable,
}

impl Block for FileNames {
    const MAGIC: Tag = Tag::new(*b"BTNF");

    fn deserialize(_header: &BlockHeader, cursor: &mut ByteCursor) -> Result<Self> {
        Ok(Self {
            table: cursor.read_object()?,
        })
    }
}

impl Record for Narc {
    const MAGIC: Tag = Tag::new(*b"NARC");

    fn deserialize(_header: &RecordHeader, cursor: &mut ByteCursor) -> Result<Self> {
        let allocation: FileAllocation = cursor.read_block()?;
        let names: FileNames = cursor.read_block()?;
        // GMIF is opened by hand: its payload is addressed by the BTAF
        // entries rather than by its own field list.
        let (_, images) = cursor.open_block(Tag::new(*b"GMIF"))?;

        let mut files = BTreeMap::new();
        for (id, pointer) in allocation.entries.iter().enumerate() {
            if pointer.is_empty() {
                continue;
            }
            let path = match names.table.files_by_id.get(&(id as u16)) {
                Some(path) => path.clone(),
                None => format!("{id}.{}", registry::infer_extension(&images, pointer.offset)),
            };
            files.insert(path, images.data_pointer(pointer.offset, pointer.length));
        }
        Ok(Self { files })
    }
}
