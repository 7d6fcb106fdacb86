//! **ndskit** - a Rust library for decoding Nintendo DS cartridge images.
//!
//! An image is mounted into a path-indexed catalog of typed files; nested
//! archives can be flattened into that catalog in place. Every catalog
//! entry is a lazy byte range into the single shared image buffer - format
//! decoders get offset-correct, zero-copy views rather than extracted
//! copies.
//!
//! ```no_run
//! use ndskit::{NdsProvider, Result};
//!
//! fn main() -> Result<()> {
//!     let mut provider = NdsProvider::new("game.nds")?;
//!     provider.options.unpack_narc_files = true;
//!     provider.initialize()?;
//!
//!     for file in provider.get_all_files_of_type("strm") {
//!         println!("{} ({} bytes)", file.path, file.pointer.length);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module map
//! | Module       | Role |
//! |--------------|------|
//! | [`cursor`]   | Shared-buffer byte cursor, pointers, lazy data ranges |
//! | [`record`]   | Tag-validated record/block deserialization |
//! | [`formats`]  | Header, banner, FAT/FNT tables, NARC, SDAT, STRM |
//! | [`provider`] | The catalog: mounting, unpacking, typed loading |
//! | [`plugin`]   | Per-title plugin contract and registry |
//! | [`registry`] | Known file-type tags for extension inference |
//! | [`error`]    | Crate error and result types |

pub mod cursor;
pub mod error;
pub mod formats;
pub mod plugin;
pub mod provider;
pub mod record;
pub mod registry;

pub use cursor::{ByteCursor, DataPointer, RomPointer};
pub use error::{Error, Result};
pub use provider::{NdsProvider, RomFile, UnpackOptions};
