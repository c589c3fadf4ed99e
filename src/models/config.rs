use serde::{Deserialize, Serialize};

use super::mod_record::{DISABLED_SUFFIX, ModRecord};

/// Application settings from `modinv.yaml`, overridable with `MODINV_*` variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Number of enrichment workers, independent of the number of files
    #[serde(default = "default_enrichment_workers")]
    pub enrichment_workers: usize,

    /// Directories under the instance root that hold regular mods
    #[serde(default = "default_mod_directories")]
    pub mod_directories: Vec<String>,

    #[serde(default = "default_disabled_suffix")]
    pub disabled_suffix: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default)]
    pub debug_mode: bool,
}

fn default_enrichment_workers() -> usize {
    10
}

fn default_mod_directories() -> Vec<String> {
    vec!["mods".to_string()]
}

fn default_disabled_suffix() -> String {
    DISABLED_SUFFIX.to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enrichment_workers: default_enrichment_workers(),
            mod_directories: default_mod_directories(),
            disabled_suffix: default_disabled_suffix(),
            log_dir: default_log_dir(),
            debug_mode: false,
        }
    }
}

/// Persisted instance state from `instance.yaml`.
///
/// Only the mod collection matters to this crate; any other keys the launcher
/// writes are ignored on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceFile {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub mods: Vec<ModRecord>,
}
