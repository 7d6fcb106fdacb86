//! Known file-type tags, used for extension inference during mounting.
//!
//! Many files in an image are stored without an extension; the mount step
//! peeks at their first four bytes and, when the tag is recognized here,
//! uses it as the extension. An unknown tag is not an error - the file just
//! falls back to the generic `.bin` extension.

use crate::cursor::ByteCursor;

/// Generic extension for files whose leading tag is not recognized.
pub const FALLBACK_EXTENSION: &str = "bin";

/// Tags observed at the start of files, lowercased.
///
/// The graphics family stores its tags byte-reversed on disk (`RLCN` for a
/// palette, `RGCN` for character graphics, ...), so the reversed spellings
/// are the ones that appear here.
static KNOWN_TAGS: &[&str] = &[
    // Archives
    "narc", "sdat",
    // Sound files
    "sseq", "ssar", "sbnk", "swar", "swav", "strm",
    // 2D graphics (byte-reversed on disk)
    "rlcn", "rgcn", "rcsn", "recn", "rnan", "rcmn", "rtfn",
    // 3D models and textures
    "bmd0", "btx0", "bca0", "btp0",
];

/// Whether `tag` is a known 4-character file-type tag.
pub fn is_known_tag(tag: &str) -> bool {
    KNOWN_TAGS.contains(&tag)
}

/// Infer an extension for the file starting at `at` within `cursor`.
///
/// Peeks the first four bytes, trims trailing NUL padding, lowercases, and
/// returns the tag when it is known; otherwise [`FALLBACK_EXTENSION`]. Files
/// shorter than four bytes fall back as well.
pub fn infer_extension(cursor: &ByteCursor, at: u32) -> String {
    let tag = cursor.peek_string(4, at).unwrap_or_default();
    let tag = tag.trim_end_matches('\0').to_ascii_lowercase();
    if is_known_tag(&tag) {
        tag
    } else {
        FALLBACK_EXTENSION.to_string()
    }
}
