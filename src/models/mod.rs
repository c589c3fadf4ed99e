//! Data models for modinv.
//!
//! - [`ModRecord`]: one mod known to an instance, or synthesized for an unknown file
//! - [`ModFileEntry`] / [`ReconciledPair`]: a discovered file and its record for one pass
//! - [`InternalModMetadata`]: descriptor data read from inside a mod archive
//! - [`Settings`]: application settings loaded by [`ConfigManager`](crate::config::ConfigManager)
//! - [`Instance`] / [`FsInstance`]: the instance abstraction the scanner and reconciler consume

pub mod config;
pub mod instance;
pub mod mod_record;

pub use config::{InstanceFile, Settings};
pub use instance::{FsInstance, Instance, InstanceError};
#[cfg(test)]
pub use instance::MockInstance;
pub use mod_record::{
    DISABLED_SUFFIX, InternalModMetadata, ModFileEntry, ModLoader, ModRecord, ModType,
    ReconciledPair,
};
