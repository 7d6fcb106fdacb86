//! SDAT (Sound DATa) - the sound archive.
//!
//! Bundles every sound asset of a title: sequences, sequence archives,
//! instrument banks, wave archives, and streams, plus player/group tables
//! describing how they are scheduled. Assets are addressed indirectly: a
//! symbol table names them, an info table (indexed in parallel) points each
//! name at a file-allocation entry, and the allocation entry addresses the
//! bytes inside the FILE chunk.
//!
//! ## Layout
//! ```text
//! [0x00] Record header, magic "SDAT" (0x10 bytes)
//! [0x10] SYMB offset / size (2 x u32)   - symbol names, optional
//! [0x18] INFO offset / size (2 x u32)   - per-asset info records
//! [0x20] FAT  offset / size (2 x u32)   - byte ranges, relative to SDAT
//! [0x28] FILE offset / size (2 x u32)   - raw asset data
//! [0x30] Reserved (16 bytes)
//! ```
//!
//! SYMB and INFO share one shape: an 8-byte chunk header, then eight u32
//! record offsets (one per [`SoundCategory`], relative to the chunk start),
//! each record being a u32 count followed by per-entry u32 offsets. Symbol
//! records point at NUL-terminated names (sequence-archive entries carry an
//! extra sub-record offset); info records point at category-specific
//! structures that all lead with the referenced FAT file id.
//!
//! ## FAT chunk
//! ```text
//! [0x00] Magic "FAT " + declared size (8 bytes)
//! [0x08] Entry count (u32)
//! [0x0C] Entries: offset (u32, relative to SDAT start), size (u32),
//!        reserved (8 bytes)
//! ```

use crate::cursor::{ByteCursor, DataPointer, RomPointer};
use crate::record::{Record, RecordHeader, Tag};
use crate::{Error, Result};

/// The eight asset categories of an SDAT, in record-table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCategory {
    /// SSEQ - sequenced music.
    Sequence,
    /// SSAR - archives of short sequences (sound effects).
    SequenceArchive,
    /// SBNK - instrument banks.
    Bank,
    /// SWAR - wave archives.
    WaveArchive,
    /// Player allocation table (scheduling metadata, not a playable asset).
    GroupPlayer,
    /// Grouping table (scheduling metadata, not a playable asset).
    Group,
    /// Stream player allocation table (scheduling metadata).
    StreamPlayer,
    /// STRM - streamed audio.
    Stream,
}

impl SoundCategory {
    /// All categories in record-table order.
    pub const ALL: [SoundCategory; 8] = [
        SoundCategory::Sequence,
        SoundCategory::SequenceArchive,
        SoundCategory::Bank,
        SoundCategory::WaveArchive,
        SoundCategory::GroupPlayer,
        SoundCategory::Group,
        SoundCategory::StreamPlayer,
        SoundCategory::Stream,
    ];

    /// Lowercase category name, used as both path segment and extension for
    /// unpacked entries.
    pub fn name(self) -> &'static str {
        match self {
            SoundCategory::Sequence => "sseq",
            SoundCategory::SequenceArchive => "ssar",
            SoundCategory::Bank => "sbnk",
            SoundCategory::WaveArchive => "swar",
            SoundCategory::GroupPlayer => "player",
            SoundCategory::Group => "group",
            SoundCategory::StreamPlayer => "player2",
            SoundCategory::Stream => "strm",
        }
    }
}

/// Info record for one asset; the fields past the file id are
/// category-specific and left unread.
#[derive(Debug, Clone)]
pub struct SoundInfo {
    /// Category the record belongs to.
    pub category: SoundCategory,
    /// Index into the SDAT's own file allocation table.
    pub file_id: u16,
}

/// Decoded SDAT archive.
#[derive(Debug)]
pub struct Sdat {
    symbols: [Vec<String>; 8],
    infos: [Vec<Option<SoundInfo>>; 8],
    /// File allocation entries, lazy and relative to the SDAT start.
    pub files: Vec<DataPointer>,
    /// Entry count declared by the FILE chunk.
    pub file_count: u32,
}

impl Sdat {
    /// Symbol names for `category`, in index order.
    pub fn symbols(&self, category: SoundCategory) -> &[String] {
        &self.symbols[category as usize]
    }

    /// Info records for `category`, indexed in parallel with
    /// [`Sdat::symbols`].
    pub fn infos(&self, category: SoundCategory) -> &[Option<SoundInfo>] {
        &self.infos[category as usize]
    }
}

impl Record for Sdat {
    const MAGIC: Tag = Tag::new(*b"SDAT");

    fn deserialize(_header: &RecordHeader, cursor: &mut ByteCursor) -> Result<Self> {
        let symb = chunk_pointer(cursor)?;
        let info = chunk_pointer(cursor)?;
        let fat = chunk_pointer(cursor)?;
        let file = chunk_pointer(cursor)?;
        cursor.skip(16)?; // reserved

        // SYMB is optional; images stripped of debug names omit it.
        let symbols = if symb.is_empty() {
            Default::default()
        } else {
            parse_symbols(&cursor.scope(symb)?)?
        };
        let infos = parse_infos(&cursor.scope(info)?)?;
        let files = parse_fat(&cursor.scope(fat)?, cursor)?;
        let file_count = parse_file_header(&cursor.scope(file)?)?;

        Ok(Self {
            symbols,
            infos,
            files,
            file_count,
        })
    }
}

fn chunk_pointer(cursor: &mut ByteCursor) -> Result<RomPointer> {
    Ok(RomPointer::new(cursor.read::<u32>()?, cursor.read::<u32>()?))
}

/// Validate a chunk's leading tag and return a cursor positioned past its
/// 8-byte header, still scoped to the whole chunk so that chunk-relative
/// offsets resolve against it.
fn open_chunk(chunk: &ByteCursor, expected: Tag) -> Result<ByteCursor> {
    let mut r = chunk.clone();
    let magic = Tag::parse(&mut r)?;
    if magic != expected {
        return Err(Error::MagicMismatch {
            expected,
            actual: magic,
        });
    }
    let _size = r.read::<u32>()?;
    Ok(r)
}

fn parse_symbols(chunk: &ByteCursor) -> Result<[Vec<String>; 8]> {
    let mut r = open_chunk(chunk, Tag::new(*b"SYMB"))?;
    let mut offsets = [0u32; 8];
    for offset in &mut offsets {
        *offset = r.read()?;
    }

    let mut records: [Vec<String>; 8] = Default::default();
    for (slot, &record_offset) in offsets.iter().enumerate() {
        if record_offset == 0 {
            continue;
        }
        let mut record = chunk.clone();
        record.set_position(record_offset as usize)?;
        let count = record.read::<u32>()?;
        for index in 0..count {
            let name_offset = record.read::<u32>()?;
            if slot == SoundCategory::SequenceArchive as usize {
                // Sequence-archive entries pair the name with a sub-record
                // listing the sequences inside; only the name is kept.
                let _sub_record = record.read::<u32>()?;
            }
            let name = if name_offset == 0 {
                index.to_string()
            } else {
                chunk.cstring_at(name_offset)?
            };
            records[slot].push(name);
        }
    }
    Ok(records)
}

fn parse_infos(chunk: &ByteCursor) -> Result<[Vec<Option<SoundInfo>>; 8]> {
    let mut r = open_chunk(chunk, Tag::new(*b"INFO"))?;
    let mut offsets = [0u32; 8];
    for offset in &mut offsets {
        *offset = r.read()?;
    }

    let mut records: [Vec<Option<SoundInfo>>; 8] = Default::default();
    for (slot, &record_offset) in offsets.iter().enumerate() {
        if record_offset == 0 {
            continue;
        }
        let mut record = chunk.clone();
        record.set_position(record_offset as usize)?;
        let count = record.read::<u32>()?;
        for _ in 0..count {
            let entry_offset = record.read::<u32>()?;
            if entry_offset == 0 {
                records[slot].push(None);
                continue;
            }
            let mut entry = chunk.clone();
            entry.set_position(entry_offset as usize)?;
            records[slot].push(Some(SoundInfo {
                category: SoundCategory::ALL[slot],
                file_id: entry.read()?,
            }));
        }
    }
    Ok(records)
}

fn parse_fat(chunk: &ByteCursor, record: &ByteCursor) -> Result<Vec<DataPointer>> {
    let mut r = open_chunk(chunk, Tag::new(*b"FAT "))?;
    let count = r.read::<u32>()?;
    let mut files = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let offset = r.read::<u32>()?;
        let size = r.read::<u32>()?;
        r.skip(8)?; // reserved
        files.push(record.data_pointer(offset, size));
    }
    Ok(files)
}

fn parse_file_header(chunk: &ByteCursor) -> Result<u32> {
    let mut r = open_chunk(chunk, Tag::new(*b"FILE"))?;
    r.read()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serialize an SDAT whose stream category holds `streams` as
    /// `(symbol, data)` rows; the other categories stay empty.
    fn build_sdat(streams: &[(&str, &[u8])]) -> Vec<u8> {
        let stream_slot = SoundCategory::Stream as usize;

        // SYMB chunk: header, eight record offsets, the stream record, then
        // the names.
        let mut symb = Vec::new();
        let record_offset = 8 + 32;
        let names_offset = record_offset + 4 + 4 * streams.len();
        {
            let mut name_cursor = names_offset;
            let mut name_offsets = Vec::new();
            let mut names = Vec::new();
            for (symbol, _) in streams {
                name_offsets.push(name_cursor as u32);
                names.extend_from_slice(symbol.as_bytes());
                names.push(0);
                name_cursor += symbol.len() + 1;
            }
            symb.extend_from_slice(b"SYMB");
            symb.extend_from_slice(&((names_offset + names.len()) as u32).to_le_bytes());
            for slot in 0..8 {
                let offset = if slot == stream_slot { record_offset as u32 } else { 0 };
                symb.extend_from_slice(&offset.to_le_bytes());
            }
            symb.extend_from_slice(&(streams.len() as u32).to_le_bytes());
            for offset in name_offsets {
                symb.extend_from_slice(&offset.to_le_bytes());
            }
            symb.extend_from_slice(&names);
        }

        // INFO chunk: same shape; entries are file id + 10 bytes of fields
        // the parser leaves unread.
        let mut info = Vec::new();
        {
            let entries_offset = record_offset + 4 + 4 * streams.len();
            info.extend_from_slice(b"INFO");
            info.extend_from_slice(&((entries_offset + 12 * streams.len()) as u32).to_le_bytes());
            for slot in 0..8 {
                let offset = if slot == stream_slot { record_offset as u32 } else { 0 };
                info.extend_from_slice(&offset.to_le_bytes());
            }
            info.extend_from_slice(&(streams.len() as u32).to_le_bytes());
            for index in 0..streams.len() {
                info.extend_from_slice(&((entries_offset + 12 * index) as u32).to_le_bytes());
            }
            for index in 0..streams.len() {
                info.extend_from_slice(&(index as u16).to_le_bytes());
                info.extend_from_slice(&[0u8; 10]);
            }
        }

        // Chunk placement.
        let symb_offset = 0x40usize;
        let info_offset = symb_offset + symb.len();
        let fat_offset = info_offset + info.len();
        let fat_len = 8 + 4 + 16 * streams.len();
        let file_offset = fat_offset + fat_len;
        let data_offset = file_offset + 8 + 8;

        let mut fat = Vec::new();
        fat.extend_from_slice(b"FAT ");
        fat.extend_from_slice(&(fat_len as u32).to_le_bytes());
        fat.extend_from_slice(&(streams.len() as u32).to_le_bytes());
        let mut cursor = data_offset;
        for (_, data) in streams {
            fat.extend_from_slice(&(cursor as u32).to_le_bytes());
            fat.extend_from_slice(&(data.len() as u32).to_le_bytes());
            fat.extend_from_slice(&[0u8; 8]);
            cursor += data.len();
        }

        let mut file = Vec::new();
        file.extend_from_slice(b"FILE");
        let data_len: usize = streams.iter().map(|(_, data)| data.len()).sum();
        file.extend_from_slice(&((8 + 8 + data_len) as u32).to_le_bytes());
        file.extend_from_slice(&(streams.len() as u32).to_le_bytes());
        file.extend_from_slice(&[0u8; 4]);
        for (_, data) in streams {
            file.extend_from_slice(data);
        }

        let total = data_offset + data_len;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"SDAT");
        bytes.extend_from_slice(&0xFEFFu16.to_le_bytes());
        bytes.extend_from_slice(&0x0100u16.to_le_bytes());
        bytes.extend_from_slice(&(total as u32).to_le_bytes());
        bytes.extend_from_slice(&0x40u16.to_le_bytes());
        bytes.extend_from_slice(&4u16.to_le_bytes());
        for (offset, len) in [
            (symb_offset, symb.len()),
            (info_offset, info.len()),
            (fat_offset, fat.len()),
            (file_offset, file.len()),
        ] {
            bytes.extend_from_slice(&(offset as u32).to_le_bytes());
            bytes.extend_from_slice(&(len as u32).to_le_bytes());
        }
        bytes.extend_from_slice(&[0u8; 16]);
        bytes.extend_from_slice(&symb);
        bytes.extend_from_slice(&info);
        bytes.extend_from_slice(&fat);
        bytes.extend_from_slice(&file);
        bytes
    }

    #[test]
    fn symbol_and_info_tables_are_parallel() {
        let bytes = build_sdat(&[
            ("BGM_TITLE", b"aaaa".as_slice()),
            ("BGM_FIELD", b"bbbbbb".as_slice()),
        ]);
        let sdat: Sdat = ByteCursor::new(bytes).read_record().unwrap();

        let symbols = sdat.symbols(SoundCategory::Stream);
        assert_eq!(symbols, ["BGM_TITLE", "BGM_FIELD"]);

        let infos = sdat.infos(SoundCategory::Stream);
        assert_eq!(infos.len(), 2);
        let second = infos[1].as_ref().unwrap();
        assert_eq!(second.file_id, 1);
        assert_eq!(second.category, SoundCategory::Stream);

        assert!(sdat.symbols(SoundCategory::Sequence).is_empty());
        assert_eq!(sdat.file_count, 2);
    }

    #[test]
    fn fat_entries_resolve_to_the_file_chunk() {
        let bytes = build_sdat(&[("BGM", b"xyzw".as_slice())]);
        let sdat: Sdat = ByteCursor::new(bytes).read_record().unwrap();
        assert_eq!(sdat.files.len(), 1);
        assert_eq!(sdat.files[0].bytes().unwrap(), b"xyzw");
    }

    #[test]
    fn fat_offsets_rebase_from_the_archive_position() {
        let sdat_bytes = build_sdat(&[("BGM", b"data".as_slice())]);
        let mut image = vec![0u8; 0x50];
        image.extend_from_slice(&sdat_bytes);

        let root = ByteCursor::new(image);
        let mut scoped = root
            .scope(RomPointer::new(0x50, sdat_bytes.len() as u32))
            .unwrap();
        let sdat: Sdat = scoped.read_record().unwrap();

        let rebased = sdat.files[0].rebase();
        assert_eq!(rebased.length, 4);
        // The data sits at SDAT-relative offset (total - 4), shifted by the
        // archive's own position.
        assert_eq!(rebased.offset as usize, 0x50 + sdat_bytes.len() - 4);
    }

    #[test]
    fn missing_symbol_chunk_yields_empty_tables() {
        let mut bytes = build_sdat(&[("BGM", b"data".as_slice())]);
        // Zero out the SYMB pointer pair in the header.
        bytes[0x10..0x18].fill(0);
        let sdat: Sdat = ByteCursor::new(bytes).read_record().unwrap();
        assert!(sdat.symbols(SoundCategory::Stream).is_empty());
        assert_eq!(sdat.infos(SoundCategory::Stream).len(), 1);
    }
}
