use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// File name suffix that marks a mod as disabled without deleting it.
///
/// `example-mod-1.2.0.jar` becomes `example-mod-1.2.0.jar.disabled` when the
/// user disables it from the launcher.
pub const DISABLED_SUFFIX: &str = ".disabled";

/// Classification of a mod record within an instance.
///
/// Only [`ModType::Mods`] records are considered by the mods view; the other
/// categories live in their own directories and have their own views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModType {
    #[default]
    Mods,
    ResourcePacks,
    ShaderPacks,
    TexturePacks,
    Worlds,
    Plugins,
}

/// Mod loader that produced an embedded descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModLoader {
    Fabric,
    Quilt,
    Forge,
    NeoForge,
    /// Pre-1.13 Forge `mcmod.info`
    LegacyForge,
}

/// Descriptor data embedded inside a mod archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalModMetadata {
    pub loader: ModLoader,
    pub id: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
}

impl InternalModMetadata {
    /// Create an empty descriptor for the given loader
    pub fn new(loader: ModLoader) -> Self {
        Self {
            loader,
            id: None,
            name: None,
            version: None,
            description: None,
            authors: Vec::new(),
        }
    }
}

/// One mod known to (or inferred for) an instance.
///
/// Records are owned by the instance's in-memory collection. A record is either
/// loaded from instance state or synthesized during reconciliation for a file
/// the instance has no record of; synthesized records are flagged `user_added`
/// and are not persisted until the instance model decides to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModRecord {
    /// File name on disk, without any directory component
    pub file: String,

    /// Display name; empty until known
    #[serde(default)]
    pub name: String,

    /// Version string; empty until known
    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub disabled: bool,

    #[serde(rename = "type", default)]
    pub mod_type: ModType,

    #[serde(default)]
    pub user_added: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub internal_metadata: Vec<InternalModMetadata>,
}

impl ModRecord {
    /// Create a record for a file the instance already knows about
    pub fn new(file: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            name: name.into(),
            version: version.into(),
            disabled: false,
            mod_type: ModType::Mods,
            user_added: false,
            internal_metadata: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    /// Whether the archive's embedded descriptors have already been read
    pub fn has_internal_metadata(&self) -> bool {
        !self.internal_metadata.is_empty()
    }
}

/// A mod file discovered on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModFileEntry {
    path: Utf8PathBuf,
}

impl ModFileEntry {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// File name component, or the empty string for a path without one
    pub fn file_name(&self) -> &str {
        self.path.file_name().unwrap_or_default()
    }

    /// Path relative to the instance root with `/` separators, used as the
    /// row key.
    ///
    /// Falls back to the full path when the file lives outside `root`.
    pub fn relative_to(&self, root: &Utf8Path) -> String {
        match self.path.strip_prefix(root) {
            Ok(relative) => relative
                .components()
                .map(|component| component.as_str())
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => self.path.as_str().to_string(),
        }
    }
}

/// Association of a discovered file with its record for one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledPair {
    pub entry: ModFileEntry,
    pub record: ModRecord,
}
