//! Parsers for the binary structures inside a cartridge image.
//!
//! Each submodule targets one structure. All parsers follow the same
//! conventions:
//!
//! * **Cursor-driven** - every parser consumes a [`crate::ByteCursor`]
//!   scoped to its structure; nothing here touches the filesystem.
//! * **Metadata only** - parsing builds an in-memory description; file
//!   payloads stay behind lazy [`crate::DataPointer`]s and are never
//!   eagerly copied.
//! * **Little-endian throughout** - the console's native byte order.
//! * **Explicit field lists** - each type reads its fields in declared
//!   order via [`crate::record::Deserialize`], [`crate::record::Record`],
//!   or [`crate::record::Block`]; there is no reflection or derive layer.
//!
//! ## Structure overview
//!
//! | Module     | Structure | Description |
//! |------------|-----------|-------------|
//! | [`header`] | Header    | Cartridge header; identity and table pointers |
//! | [`banner`] | Banner    | Menu icon and localized titles |
//! | [`fat`]    | FAT       | File allocation table; file id -> byte range |
//! | [`fnt`]    | FNT       | File name table; file id -> hierarchical path |
//! | [`narc`]   | NARC      | General-purpose nested archive |
//! | [`sdat`]   | SDAT      | Sound archive with symbol/info/FAT chunks |
//! | [`strm`]   | STRM      | Streamed audio file |

pub mod banner;
pub mod fat;
pub mod fnt;
pub mod header;
pub mod narc;
pub mod sdat;
pub mod strm;
