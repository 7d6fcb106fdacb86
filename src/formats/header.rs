//! Cartridge header - the fixed structure at offset 0 of every image.
//!
//! Only the fields the mounting pipeline consumes are captured; the header
//! continues past 0x6C with checksums and secure-area settings that are not
//! parsed.
//!
//! ## Layout (parsed portion)
//! ```text
//! [0x000] Game title (12 bytes, NUL-padded ASCII)
//! [0x00C] Game code  (4 bytes)
//! [0x010] Maker code (2 bytes)
//! [0x012] Unit code  (1 byte)
//! [0x013] Encryption seed select (1 byte)
//! [0x014] Device capacity (1 byte; chip size = 128 KiB << value)
//! [0x015] Reserved (9 bytes)
//! [0x01E] ROM version (1 byte)
//! [0x01F] Autostart flags (1 byte)
//! [0x020] ARM9 rom offset / entry / ram address / size (4 × u32)
//! [0x030] ARM7 rom offset / entry / ram address / size (4 × u32)
//! [0x040] FNT offset / size (2 × u32)
//! [0x048] FAT offset / size (2 × u32)
//! [0x050] ARM9 overlay table offset / size (2 × u32)
//! [0x058] ARM7 overlay table offset / size (2 × u32)
//! [0x060] Card control port settings (2 × u32)
//! [0x068] Banner offset (u32)
//! ```

use crate::cursor::{ByteCursor, RomPointer};
use crate::record::Deserialize;
use crate::Result;

/// Parsed cartridge header.
#[derive(Debug, Clone)]
pub struct RomHeader {
    /// Game title, NUL padding trimmed.
    pub game_title: String,
    /// Four-character game code; plugin activation matches against this.
    pub game_code: String,
    /// Two-character maker code.
    pub maker_code: String,
    /// Unit code (0 = DS).
    pub unit_code: u8,
    /// Device capacity exponent.
    pub device_capacity: u8,
    /// ROM version byte.
    pub rom_version: u8,
    /// ARM9 program segment.
    pub arm9: RomPointer,
    /// ARM7 program segment.
    pub arm7: RomPointer,
    /// File name table location.
    pub fnt_pointer: RomPointer,
    /// File allocation table location.
    pub fat_pointer: RomPointer,
    /// ARM9 overlay table location.
    pub arm9_overlays: RomPointer,
    /// ARM7 overlay table location.
    pub arm7_overlays: RomPointer,
    /// Absolute offset of the banner block (0 when absent).
    pub banner_offset: u32,
}

impl Deserialize for RomHeader {
    fn deserialize(cursor: &mut ByteCursor) -> Result<Self> {
        let game_title = cursor.read_string(12)?.trim_end_matches('\0').to_string();
        let game_code = cursor.read_string(4)?;
        let maker_code = cursor.read_string(2)?;
        let unit_code = cursor.read::<u8>()?;
        let _seed_select = cursor.read::<u8>()?;
        let device_capacity = cursor.read::<u8>()?;
        cursor.skip(9)?; // reserved
        let rom_version = cursor.read::<u8>()?;
        let _autostart = cursor.read::<u8>()?;

        let arm9 = program_segment(cursor)?;
        let arm7 = program_segment(cursor)?;

        let fnt_pointer = pointer(cursor)?;
        let fat_pointer = pointer(cursor)?;
        let arm9_overlays = pointer(cursor)?;
        let arm7_overlays = pointer(cursor)?;

        cursor.skip(8)?; // card control port settings
        let banner_offset = cursor.read::<u32>()?;

        Ok(Self {
            game_title,
            game_code,
            maker_code,
            unit_code,
            device_capacity,
            rom_version,
            arm9,
            arm7,
            fnt_pointer,
            fat_pointer,
            arm9_overlays,
            arm7_overlays,
            banner_offset,
        })
    }
}

/// Read an offset/size pair.
fn pointer(cursor: &mut ByteCursor) -> Result<RomPointer> {
    Ok(RomPointer::new(cursor.read::<u32>()?, cursor.read::<u32>()?))
}

/// Read a rom offset / entry / ram address / size quadruple, keeping only
/// the image-relative range.
fn program_segment(cursor: &mut ByteCursor) -> Result<RomPointer> {
    let offset = cursor.read::<u32>()?;
    let _entry_address = cursor.read::<u32>()?;
    let _ram_address = cursor.read::<u32>()?;
    let size = cursor.read::<u32>()?;
    Ok(RomPointer::new(offset, size))
}
