//! Banner block - icon and localized titles shown by the console menu.
//!
//! Located at the header's banner offset.
//!
//! ## Layout (version 1, 0x840 bytes)
//! ```text
//! [0x000] Version (u16)
//! [0x002] CRC-16 over [0x020..0x840] (u16)
//! [0x004] Reserved (0x1C bytes)
//! [0x020] Icon bitmap  (0x200 bytes, 4bpp 32x32 tiled)
//! [0x220] Icon palette (0x20 bytes, 16 BGR555 colors)
//! [0x240] Titles - 6 languages x 0x100 bytes UTF-16LE, NUL-padded
//!         (Japanese, English, French, German, Italian, Spanish)
//! ```
//!
//! The icon regions stay lazy; pixel decoding is the caller's concern.

use crate::cursor::{ByteCursor, DataPointer};
use crate::record::Deserialize;
use crate::Result;

/// Parsed banner block.
#[derive(Debug, Clone)]
pub struct RomBanner {
    /// Banner format version.
    pub version: u16,
    /// CRC-16 of the icon and title data.
    pub crc: u16,
    /// Lazy reference to the 4bpp icon bitmap.
    pub icon_bitmap: DataPointer,
    /// Lazy reference to the 16-color icon palette.
    pub icon_palette: DataPointer,
    /// Localized titles in table order, NUL padding trimmed.
    pub titles: Vec<String>,
}

impl RomBanner {
    /// Size of a version-1 banner block in bytes.
    pub const SIZE: usize = 0x840;

    /// Number of localized title slots.
    pub const LANGUAGES: usize = 6;
}

impl Deserialize for RomBanner {
    fn deserialize(cursor: &mut ByteCursor) -> Result<Self> {
        let version = cursor.read::<u16>()?;
        let crc = cursor.read::<u16>()?;
        cursor.skip(0x1C)?; // reserved

        let icon_bitmap = cursor.data_pointer(0x20, 0x200);
        let icon_palette = cursor.data_pointer(0x220, 0x20);
        cursor.skip(0x200 + 0x20)?;

        let mut titles = Vec::with_capacity(Self::LANGUAGES);
        for _ in 0..Self::LANGUAGES {
            let raw = cursor.read_bytes(0x100)?;
            titles.push(utf16_title(&raw));
        }

        Ok(Self {
            version,
            crc,
            icon_bitmap,
            icon_palette,
            titles,
        })
    }
}

/// Decode a NUL-padded UTF-16LE title field.
fn utf16_title(raw: &[u8]) -> String {
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0)
        .collect();
    String::from_utf16_lossy(&units)
}
