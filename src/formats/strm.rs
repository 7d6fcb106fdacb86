//! STRM - streamed audio file.
//!
//! Found standalone or addressed by an SDAT's stream category. The HEAD
//! block describes the encoding and block structure; the DATA block holds
//! the sample data, which stays lazy.
//!
//! ## Layout
//! ```text
//! [0x00] Record header, magic "STRM" (0x10 bytes)
//! [0x10] HEAD block:
//!        [0x08] Wave type (u8) / looping (u8) / channels (u16)
//!        [0x0C] Sample rate (u16), time (u16)
//!        [0x10] Loop offset (u32, in samples)
//!        [0x14] Sample count (u32)
//!        [0x18] Data offset (u32, from record start)
//!        [0x1C] Block count (u32)
//!        [0x20] Block length / samples per block (2 x u32)
//!        [0x28] Last block length / samples per last block (2 x u32)
//!        [0x30] Reserved (32 bytes)
//! [...]  DATA block: sample data at the HEAD's data offset
//! ```

use crate::cursor::{ByteCursor, DataPointer};
use crate::record::{Block, BlockHeader, Record, RecordHeader, Tag};
use crate::{Error, Result};

/// Sample encoding of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveType {
    /// Signed 8-bit PCM.
    Pcm8,
    /// Signed 16-bit PCM.
    Pcm16,
    /// IMA-ADPCM, 4 bits per sample.
    Adpcm,
}

impl WaveType {
    fn from_raw(raw: u8) -> Result<Self> {
        match raw {
            0 => Ok(WaveType::Pcm8),
            1 => Ok(WaveType::Pcm16),
            2 => Ok(WaveType::Adpcm),
            _ => Err(Error::Parse("unknown wave type")),
        }
    }
}

/// HEAD block - stream parameters.
#[derive(Debug, Clone)]
pub struct StreamHead {
    /// Sample encoding.
    pub wave_type: WaveType,
    /// Whether playback loops.
    pub looping: bool,
    /// Channel count.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u16,
    /// Timer value used by the hardware channel.
    pub time: u16,
    /// Loop start, in samples.
    pub loop_offset: u32,
    /// Total samples per channel.
    pub samples: u32,
    /// Offset of the sample data from the record start.
    pub data_offset: u32,
    /// Number of data blocks per channel.
    pub blocks: u32,
    /// Byte length of one data block.
    pub block_length: u32,
    /// Samples held by one data block.
    pub samples_per_block: u32,
    /// Byte length of the final, possibly short, block.
    pub last_block_length: u32,
    /// Samples held by the final block.
    pub samples_per_last_block: u32,
}

impl Block for StreamHead {
    const MAGIC: Tag = Tag::new(*b"HEAD");

    fn deserialize(_header: &BlockHeader, cursor: &mut ByteCursor) -> Result<Self> {
        let head = Self {
            wave_type: WaveType::from_raw(cursor.read()?)?,
            looping: cursor.read::<u8>()? == 1,
            channels: cursor.read()?,
            sample_rate: cursor.read()?,
            time: cursor.read()?,
            loop_offset: cursor.read()?,
            samples: cursor.read()?,
            data_offset: cursor.read()?,
            blocks: cursor.read()?,
            block_length: cursor.read()?,
            samples_per_block: cursor.read()?,
            last_block_length: cursor.read()?,
            samples_per_last_block: cursor.read()?,
        };
        cursor.skip(32)?; // reserved
        Ok(head)
    }
}

/// Decoded stream file.
#[derive(Debug)]
pub struct Strm {
    /// Stream parameters.
    pub head: StreamHead,
    /// Lazy reference to the sample data.
    pub data: DataPointer,
}

impl Record for Strm {
    const MAGIC: Tag = Tag::new(*b"STRM");

    fn deserialize(_header: &RecordHeader, cursor: &mut ByteCursor) -> Result<Self> {
        let head: StreamHead = cursor.read_block()?;
        // The DATA block's own fields are just the raw samples; the range
        // is derived from the HEAD's data offset and the declared size.
        let (data_header, _) = cursor.open_block(Tag::new(*b"DATA"))?;
        let data = cursor.data_pointer(head.data_offset, data_header.body_len() as u32);
        Ok(Self { head, data })
    }
}
