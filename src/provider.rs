//! The file provider - mounts a cartridge image into a path-indexed
//! catalog.
//!
//! [`NdsProvider`] owns the image buffer and runs the pipeline: parse the
//! header and banner, load the allocation and name tables, mount the
//! catalog, optionally flatten NARC/SDAT archives into it, then activate
//! matching plugins. After [`NdsProvider::initialize`] returns the catalog
//! is read-only; decoding individual files is side-effect free and safe to
//! run from multiple threads.

use std::any::TypeId;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::cursor::{ByteCursor, RomPointer};
use crate::formats::banner::RomBanner;
use crate::formats::fat::AllocationTable;
use crate::formats::fnt::NameTable;
use crate::formats::header::RomHeader;
use crate::formats::narc::Narc;
use crate::formats::sdat::{Sdat, SoundCategory, SoundInfo};
use crate::plugin::{Plugin, PluginRegistry};
use crate::record::Record;
use crate::registry;
use crate::{Error, Result};

/// One entry of the catalog: a path and the byte range backing it.
#[derive(Debug, Clone)]
pub struct RomFile {
    /// Unique catalog path.
    pub path: String,
    /// Byte range within the image, always in root coordinates.
    pub pointer: RomPointer,
    /// The archive entry this file was unpacked from, if any. The archive
    /// itself has left the catalog by then, so the snapshot is the only
    /// remaining record of it; files never reference their children, so no
    /// cycle can form.
    pub owner: Option<Arc<RomFile>>,
    /// Sound metadata, present on entries produced by the SDAT unpacker.
    pub sound: Option<SoundEntry>,
}

impl RomFile {
    /// Create a plain catalog entry.
    pub fn new(path: String, pointer: RomPointer) -> Self {
        Self {
            path,
            pointer,
            owner: None,
            sound: None,
        }
    }

    /// The file's extension, taken from the last path segment.
    pub fn file_type(&self) -> &str {
        let name = self.path.rsplit('/').next().unwrap_or(&self.path);
        name.rsplit_once('.').map_or("", |(_, extension)| extension)
    }
}

/// Sound metadata attached to entries unpacked from an SDAT.
#[derive(Debug, Clone)]
pub struct SoundEntry {
    /// The info record paired with the entry's symbol.
    pub info: SoundInfo,
    /// Index into the category's symbol and info tables.
    pub index: u16,
}

/// Knobs controlling the unpack phase of [`NdsProvider::initialize`].
#[derive(Debug, Clone)]
pub struct UnpackOptions {
    /// Flatten NARC archives into the catalog.
    pub unpack_narc_files: bool,
    /// Flatten SDAT archives into the catalog.
    pub unpack_sdat_files: bool,
    /// SDAT categories left out of unpacking. The default set skips the
    /// grouping/player tables, which describe scheduling rather than
    /// playable assets.
    pub sdat_excluded: Vec<SoundCategory>,
}

impl Default for UnpackOptions {
    fn default() -> Self {
        Self {
            unpack_narc_files: false,
            unpack_sdat_files: false,
            sdat_excluded: vec![
                SoundCategory::GroupPlayer,
                SoundCategory::Group,
                SoundCategory::StreamPlayer,
            ],
        }
    }
}

/// Decodes a cartridge image into a navigable catalog of typed files.
pub struct NdsProvider {
    reader: ByteCursor,
    files: HashMap<String, RomFile>,
    plugins: HashMap<TypeId, Box<dyn Plugin>>,
    header: Option<RomHeader>,
    banner: Option<RomBanner>,
    /// Plugin descriptors considered during [`NdsProvider::initialize`].
    pub plugin_registry: PluginRegistry,
    /// Unpack-phase configuration.
    pub options: UnpackOptions,
}

impl NdsProvider {
    /// Read an image from disk.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_bytes(fs::read(path)?))
    }

    /// Wrap an image already held in memory.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            reader: ByteCursor::new(bytes),
            files: HashMap::new(),
            plugins: HashMap::new(),
            header: None,
            banner: None,
            plugin_registry: PluginRegistry::new(),
            options: UnpackOptions::default(),
        }
    }

    /// Run the full mounting pipeline: header, banner, tables, catalog,
    /// archive unpacking, plugins.
    pub fn initialize(&mut self) -> Result<()> {
        let header: RomHeader = self.reader.clone().read_object()?;

        let banner = if header.banner_offset != 0 {
            let region = RomPointer::new(header.banner_offset, RomBanner::SIZE as u32);
            Some(self.reader.scope(region)?.read_object()?)
        } else {
            None
        };

        let allocation: AllocationTable = self.reader.scope(header.fat_pointer)?.read_object()?;
        let names: NameTable = self.reader.scope(header.fnt_pointer)?.read_object()?;
        self.mount(&allocation, &names)?;

        self.header = Some(header);
        self.banner = banner;

        if self.options.unpack_narc_files {
            self.unpack_archives("narc", Self::unpack_narc);
        }
        if self.options.unpack_sdat_files {
            self.unpack_archives("sdat", Self::unpack_sdat);
        }

        self.load_plugins();
        Ok(())
    }

    /// Combine an allocation table and a name table into catalog entries.
    ///
    /// Called by [`NdsProvider::initialize`] with the tables at the
    /// header's pointers; exposed for callers that locate tables
    /// themselves. Every id with a nonzero length yields exactly one
    /// entry. Distinct ids mapping to the same path keep the last writer.
    pub fn mount(&mut self, allocation: &AllocationTable, names: &NameTable) -> Result<()> {
        for (id, pointer) in allocation.pointers.iter().enumerate() {
            let id = id as u16;
            if pointer.is_empty() {
                continue;
            }
            let path = if id < names.first_id {
                format!("overlays/{id}.bin")
            } else {
                let name = names
                    .files_by_id
                    .get(&id)
                    .ok_or(Error::Parse("file id missing from name table"))?;
                if name.contains('.') {
                    name.clone()
                } else {
                    format!(
                        "{name}.{}",
                        registry::infer_extension(&self.reader, pointer.offset)
                    )
                }
            };
            self.files.insert(path.clone(), RomFile::new(path, *pointer));
        }
        Ok(())
    }

    /// Unpack every catalog entry of type `tag` with `unpack`, logging and
    /// skipping archives that fail to decode; their catalog entries stay
    /// untouched.
    fn unpack_archives(&mut self, tag: &str, unpack: fn(&mut Self, &RomFile) -> Result<()>) {
        let archives: Vec<RomFile> = self
            .get_all_files_of_type(tag)
            .into_iter()
            .cloned()
            .collect();
        for archive in archives {
            if let Err(e) = unpack(self, &archive) {
                warn!(path = %archive.path, error = %e, "skipping archive");
            }
        }
    }

    /// Replace a NARC's catalog entry with its children, rebased into image
    /// coordinates.
    fn unpack_narc(&mut self, archive: &RomFile) -> Result<()> {
        let narc: Narc = self
            .load_object_from(archive)
            .map_err(|e| Error::ArchiveUnpack {
                path: archive.path.clone(),
                source: Box::new(e),
            })?;

        let owner = Arc::new(archive.clone());
        let base = trim_extension(&archive.path);
        for (relative, data) in &narc.files {
            let path = format!("{base}/{relative}");
            let mut file = RomFile::new(path.clone(), data.rebase());
            file.owner = Some(Arc::clone(&owner));
            self.files.insert(path, file);
        }
        self.files.remove(&archive.path);
        Ok(())
    }

    /// Replace an SDAT's catalog entry with one child per playable symbol.
    fn unpack_sdat(&mut self, archive: &RomFile) -> Result<()> {
        let sdat: Sdat = self
            .load_object_from(archive)
            .map_err(|e| Error::ArchiveUnpack {
                path: archive.path.clone(),
                source: Box::new(e),
            })?;

        let owner = Arc::new(archive.clone());
        let base = trim_extension(&archive.path);
        for category in SoundCategory::ALL {
            if self.options.sdat_excluded.contains(&category) {
                continue;
            }
            let infos = sdat.infos(category);
            for (index, symbol) in sdat.symbols(category).iter().enumerate() {
                let Some(Some(info)) = infos.get(index) else {
                    warn!(
                        path = %archive.path,
                        category = category.name(),
                        index,
                        "symbol without a matching info record"
                    );
                    continue;
                };
                let Some(data) = sdat.files.get(info.file_id as usize) else {
                    warn!(
                        path = %archive.path,
                        file_id = info.file_id,
                        "info record addresses a missing allocation entry"
                    );
                    continue;
                };
                let segment =
                    format!("{0}/{symbol}.{0}", category.name()).to_lowercase();
                let path = format!("{base}/{segment}");
                let mut file = RomFile::new(path.clone(), data.rebase());
                file.owner = Some(Arc::clone(&owner));
                file.sound = Some(SoundEntry {
                    info: info.clone(),
                    index: index as u16,
                });
                self.files.insert(path, file);
            }
        }
        self.files.remove(&archive.path);
        Ok(())
    }

    /// Activate every registered plugin whose game codes contain the
    /// image's game code. A plugin that fails its activation hook is logged
    /// and dropped without aborting the rest.
    fn load_plugins(&mut self) {
        let Some(game_code) = self.header.as_ref().map(|h| h.game_code.clone()) else {
            return;
        };
        let mut active: HashMap<TypeId, Box<dyn Plugin>> = HashMap::new();
        for descriptor in self.plugin_registry.descriptors() {
            if !descriptor.game_codes.contains(&game_code.as_str()) {
                continue;
            }
            let mut plugin = (descriptor.construct)();
            if let Err(e) = plugin.on_loaded(self) {
                error!(error = %e, "plugin failed to activate");
                continue;
            }
            active.insert(plugin.as_any().type_id(), plugin);
        }
        self.plugins = active;
    }

    /// The parsed cartridge header, once initialized.
    pub fn header(&self) -> Option<&RomHeader> {
        self.header.as_ref()
    }

    /// The parsed banner, once initialized (absent when the image has
    /// none).
    pub fn banner(&self) -> Option<&RomBanner> {
        self.banner.as_ref()
    }

    /// Iterate over all catalog entries.
    pub fn files(&self) -> impl Iterator<Item = &RomFile> {
        self.files.values()
    }

    /// Look up a catalog entry by path.
    pub fn file(&self, path: &str) -> Result<&RomFile> {
        self.files
            .get(path)
            .ok_or_else(|| Error::UnknownPath(path.to_string()))
    }

    /// The activated plugin of type `T`, if the image's game code selected
    /// one.
    pub fn get_plugin<T: Plugin>(&self) -> Option<&T> {
        self.plugins
            .get(&TypeId::of::<T>())
            .and_then(|plugin| plugin.as_any().downcast_ref())
    }

    /// Resolve a file's logical type: plugin associations first, extension
    /// otherwise.
    pub fn type_of<'a>(&'a self, file: &'a RomFile) -> &'a str {
        for plugin in self.plugins.values() {
            for association in plugin.file_type_associations() {
                if association.applies_to(&file.path) {
                    return association.type_tag;
                }
            }
        }
        file.file_type()
    }

    /// All catalog entries whose logical type matches `tag`
    /// (case-insensitive).
    pub fn get_all_files_of_type(&self, tag: &str) -> Vec<&RomFile> {
        self.files
            .values()
            .filter(|file| self.type_of(file).eq_ignore_ascii_case(tag))
            .collect()
    }

    /// All catalog entries whose logical type matches record type `T`.
    pub fn get_all_files_of<T: Record>(&self) -> Vec<&RomFile> {
        self.get_all_files_of_type(&T::MAGIC.extension())
    }

    /// Decode the file at `path` as record type `T`, propagating failures.
    pub fn load_object<T: Record>(&self, path: &str) -> Result<T> {
        self.load_object_from(self.file(path)?)
    }

    /// Decode `file` as record type `T`, propagating failures.
    pub fn load_object_from<T: Record>(&self, file: &RomFile) -> Result<T> {
        self.create_reader_from(file)?.read_record()
    }

    /// Decode the file at `path` as record type `T`; a failure is logged
    /// and turned into `None` so callers can keep processing other files.
    pub fn try_load_object<T: Record>(&self, path: &str) -> Option<T> {
        match self.file(path) {
            Ok(file) => self.try_load_object_from(file),
            Err(e) => {
                error!(path, error = %e, "failed to load object");
                None
            }
        }
    }

    /// Decode `file` as record type `T`; a failure is logged and turned
    /// into `None`.
    pub fn try_load_object_from<T: Record>(&self, file: &RomFile) -> Option<T> {
        match self.load_object_from(file) {
            Ok(value) => Some(value),
            Err(e) => {
                error!(path = %file.path, error = %e, "failed to load object");
                None
            }
        }
    }

    /// A cursor scoped to exactly the file's byte range.
    pub fn create_reader(&self, path: &str) -> Result<ByteCursor> {
        self.create_reader_from(self.file(path)?)
    }

    /// A cursor scoped to exactly `file`'s byte range.
    pub fn create_reader_from(&self, file: &RomFile) -> Result<ByteCursor> {
        self.reader.scope(file.pointer)
    }

    /// Catalog breakdown as `(logical type, count)`, most frequent first.
    pub fn file_stats(&self) -> Vec<(String, usize)> {
        let mut breakdown: HashMap<&str, usize> = HashMap::new();
        for file in self.files.values() {
            *breakdown.entry(self.type_of(file)).or_default() += 1;
        }
        let mut stats: Vec<(String, usize)> = breakdown
            .into_iter()
            .map(|(file_type, count)| (file_type.to_string(), count))
            .collect();
        stats.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        stats
    }

    /// Log the catalog breakdown.
    pub fn log_file_stats(&self) {
        info!(total = self.files.len(), "mounted files");
        for (file_type, count) in self.file_stats() {
            info!(%file_type, count, "file type");
        }
    }
}

/// Strip the extension from the last segment of `path`, leaving directory
/// segments untouched.
fn trim_extension(path: &str) -> &str {
    match path.rsplit_once('.') {
        Some((stem, extension)) if !extension.contains('/') => stem,
        _ => path,
    }
}
