//! FAT (File Allocation Table) - the image's master byte-range table.
//!
//! A flat array of `(start, end)` byte offsets, one entry per file id. The
//! table's location comes from the cartridge header; entry order defines the
//! file id space shared with the name table.
//!
//! ## Entry (8 bytes)
//! ```text
//! [0x00] Start offset (u32, absolute within the image)
//! [0x04] End offset   (u32, exclusive)
//! ```
//!
//! An entry with `start == end` is an unused slot; the mount step skips it.

use crate::cursor::{ByteCursor, RomPointer};
use crate::record::Deserialize;
use crate::Result;

/// Parsed allocation table.
///
/// Read-only after parsing; index = file id.
#[derive(Debug, Clone)]
pub struct AllocationTable {
    /// One pointer per file id, in table order.
    pub pointers: Vec<RomPointer>,
}

impl AllocationTable {
    /// Number of file ids the table addresses.
    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    /// Pointer for `id`, if the table addresses it.
    pub fn get(&self, id: u16) -> Option<RomPointer> {
        self.pointers.get(id as usize).copied()
    }
}

impl Deserialize for AllocationTable {
    /// Read entries until the scoped region is exhausted.
    fn deserialize(cursor: &mut ByteCursor) -> Result<Self> {
        let mut pointers = Vec::with_capacity(cursor.len() / 8);
        while cursor.remaining() >= 8 {
            let start = cursor.read::<u32>()?;
            let end = cursor.read::<u32>()?;
            pointers.push(RomPointer::new(start, end.saturating_sub(start)));
        }
        Ok(Self { pointers })
    }
}
