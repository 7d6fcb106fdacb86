//! FNT (File Name Table) - maps file ids to hierarchical paths.
//!
//! The same structure appears twice in practice: at the image's name-table
//! pointer, and embedded as the `BTNF` block of a NARC archive.
//!
//! ## Layout
//! ```text
//! [0x00] Main table - one 8-byte entry per directory:
//!        [0x00] Sub-table offset (u32, from FNT start)
//!        [0x04] First child file id (u16)
//!        [0x06] Parent directory id (u16; for the root, total dir count)
//! [...]  Sub-tables - runs of length-prefixed names:
//!        length 0x00        end of this directory
//!        length 0x01..0x7F  file, name follows; takes the next file id
//!        length 0x81..0xFF  subdirectory, name (length & 0x7F bytes)
//!                           followed by its directory id (u16, 0xF000-based)
//! ```
//!
//! File ids below the root's first child id address overlay segments, not
//! named files; the mount step synthesizes `overlays/<id>.bin` paths for
//! them.

use std::collections::HashMap;

use crate::cursor::ByteCursor;
use crate::record::Deserialize;
use crate::{Error, Result};

/// Parsed name table.
#[derive(Debug, Clone)]
pub struct NameTable {
    /// First file id with a name; ids below it are overlays.
    pub first_id: u16,
    /// Flat id -> `/`-joined path map.
    pub files_by_id: HashMap<u16, String>,
}

impl Deserialize for NameTable {
    fn deserialize(cursor: &mut ByteCursor) -> Result<Self> {
        let mut root = cursor.clone();
        root.set_position(0)?;
        let _sub_offset = root.read::<u32>()?;
        let first_id = root.read::<u16>()?;
        let _dir_count = root.read::<u16>()?;

        let mut files_by_id = HashMap::new();
        walk(cursor, 0, "", &mut files_by_id)?;

        Ok(Self {
            first_id,
            files_by_id,
        })
    }
}

/// Collect all file names under directory `dir_index` into `out`, prefixing
/// each with `prefix`.
fn walk(
    fnt: &ByteCursor,
    dir_index: u16,
    prefix: &str,
    out: &mut HashMap<u16, String>,
) -> Result<()> {
    let mut main = fnt.clone();
    main.set_position(dir_index as usize * 8)?;
    let sub_offset = main.read::<u32>()? as usize;
    let mut file_id = main.read::<u16>()?;

    let mut sub = fnt.clone();
    sub.set_position(sub_offset)?;
    loop {
        let length = sub.read::<u8>()?;
        match length {
            0 => break,
            0x01..=0x7F => {
                let name = sub.read_string(length as usize)?;
                out.insert(file_id, format!("{prefix}{name}"));
                file_id += 1;
            }
            0x80 => return Err(Error::Parse("reserved name-table entry")),
            _ => {
                let name = sub.read_string((length & 0x7F) as usize)?;
                let child = sub.read::<u16>()?;
                walk(fnt, child & 0xFFF, &format!("{prefix}{name}/"), out)?;
            }
        }
    }
    Ok(())
}
