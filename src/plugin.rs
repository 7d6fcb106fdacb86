//! Per-title plugin registry.
//!
//! Some titles need knowledge that cannot be sniffed from the bytes - which
//! NARC holds the map matrices, where the text banks live. Plugins carry
//! that knowledge. A [`PluginDescriptor`] pairs the game codes a plugin
//! understands with its constructor; the provider activates every
//! registered descriptor whose codes contain the image's game code and
//! keeps the instances for [`crate::NdsProvider::get_plugin`] lookups.
//!
//! Concrete plugins are data supplied by the embedding application; this
//! module only defines the contract and the registry.

use std::any::Any;

use crate::provider::NdsProvider;
use crate::Result;

/// Associates a logical file type with the catalog paths it applies to.
///
/// Associations classify entries beyond magic sniffing: a path matching one
/// of the rules resolves to `type_tag` regardless of its extension.
#[derive(Debug, Clone)]
pub struct FileTypeAssociation {
    /// Logical type the matching files resolve to.
    pub type_tag: &'static str,
    /// Path prefixes the association applies to.
    pub path_matches: &'static [&'static str],
}

impl FileTypeAssociation {
    /// Whether `path` falls under any of this association's rules.
    pub fn applies_to(&self, path: &str) -> bool {
        self.path_matches.iter().any(|rule| path.starts_with(rule))
    }
}

/// A per-title plugin instance.
///
/// Instantiated once per matching image and retained for the provider's
/// lifetime; never mutated after activation.
pub trait Plugin: Any {
    /// Activation hook, invoked once right after construction with the
    /// owning provider. A failure here is logged and the plugin discarded;
    /// other plugins still load.
    fn on_loaded(&mut self, provider: &NdsProvider) -> Result<()>;

    /// File-type rules this plugin contributes, in priority order.
    fn file_type_associations(&self) -> &[FileTypeAssociation] {
        &[]
    }

    /// The instance as [`Any`], for typed lookup.
    fn as_any(&self) -> &dyn Any;
}

/// A registered plugin: the game codes it understands and how to build it.
pub struct PluginDescriptor {
    /// Game codes (cartridge header values) the plugin applies to.
    pub game_codes: &'static [&'static str],
    /// Constructor invoked when a code matches.
    pub construct: fn() -> Box<dyn Plugin>,
}

/// The compiled set of known plugin descriptors.
///
/// The embedding application registers its descriptors before the provider
/// initializes; activation then filters by the image's game code.
#[derive(Default)]
pub struct PluginRegistry {
    descriptors: Vec<PluginDescriptor>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor.
    pub fn register(&mut self, descriptor: PluginDescriptor) {
        self.descriptors.push(descriptor);
    }

    /// All registered descriptors, in registration order.
    pub fn descriptors(&self) -> &[PluginDescriptor] {
        &self.descriptors
    }
}
