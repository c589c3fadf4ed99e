use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use thiserror::Error;

use super::config::InstanceFile;
use super::mod_record::ModRecord;
use crate::services::scanner;

/// Name of the persisted instance state file inside an instance root
pub const INSTANCE_FILE_NAME: &str = "instance.yaml";

/// Errors raised while loading or saving instance state
#[derive(Error, Debug)]
pub enum InstanceError {
    #[error("Instance root {0} does not exist")]
    RootNotFound(Utf8PathBuf),

    #[error("Failed to access instance file {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse instance file {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
}

/// An installed game instance as seen by the mods view.
///
/// The scanner and reconciler only need three things from an instance: where it
/// lives, which files sit in a set of its directories, and the mod records it
/// already knows about. Persistence of enabled/disabled toggles stays with the
/// implementor.
#[cfg_attr(test, mockall::automock)]
pub trait Instance: Send + Sync {
    /// Root directory of the instance
    fn root(&self) -> Utf8PathBuf;

    /// Regular files directly inside each of `dirs`, in enumeration order
    fn mod_paths_from_filesystem(&self, dirs: &[Utf8PathBuf]) -> Vec<Utf8PathBuf> {
        scanner::scan_mod_paths(dirs)
    }

    /// Snapshot of the instance's mod collection, in stored order
    fn mods(&self) -> Vec<ModRecord>;
}

/// Instance backed by a directory and its `instance.yaml`.
#[derive(Debug, Clone)]
pub struct FsInstance {
    root: Utf8PathBuf,
    state: InstanceFile,
}

impl FsInstance {
    /// Load an instance from `root`.
    ///
    /// A missing `instance.yaml` yields an instance with no known mods, so
    /// every file found on disk will be synthesized.
    pub fn load<P: AsRef<Utf8Path>>(root: P) -> Result<Self, InstanceError> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(InstanceError::RootNotFound(root));
        }

        let path = root.join(INSTANCE_FILE_NAME);
        if !path.exists() {
            tracing::warn!("No {} in {}, starting with an empty mod list", INSTANCE_FILE_NAME, root);
            return Ok(Self {
                root,
                state: InstanceFile::default(),
            });
        }

        let contents = fs::read_to_string(&path).map_err(|source| InstanceError::Io {
            path: path.clone(),
            source,
        })?;
        let state: InstanceFile = serde_yaml_ng::from_str(&contents)
            .map_err(|source| InstanceError::Parse { path: path.clone(), source })?;

        tracing::info!("Loaded instance '{}' with {} mod records from {}", state.name, state.mods.len(), path);
        Ok(Self { root, state })
    }

    /// Create an in-memory instance, mainly for tests and tools
    pub fn with_mods<P: AsRef<Utf8Path>>(root: P, mods: Vec<ModRecord>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            state: InstanceFile {
                name: String::new(),
                mods,
            },
        }
    }

    /// Write the mod collection back to `instance.yaml`
    pub fn save(&self) -> Result<(), InstanceError> {
        let path = self.root.join(INSTANCE_FILE_NAME);
        let yaml = serde_yaml_ng::to_string(&self.state)
            .map_err(|source| InstanceError::Parse { path: path.clone(), source })?;

        fs::write(&path, yaml).map_err(|source| InstanceError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::info!("Saved instance to {}", path);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// Replace the stored mod collection
    pub fn set_mods(&mut self, mods: Vec<ModRecord>) {
        self.state.mods = mods;
    }
}

impl Instance for FsInstance {
    fn root(&self) -> Utf8PathBuf {
        self.root.clone()
    }

    fn mods(&self) -> Vec<ModRecord> {
        self.state.mods.clone()
    }
}
