//! Services module - the mod inventory pipeline.
//!
//! These services have no dependency on the presentation layer; they take
//! explicit inputs and hand results back as values or channel messages.
//!
//! # Components
//!
//! - [`scan_mod_paths`]: lists regular files in an instance's mod directories.
//!   Unreadable directories are reported and skipped.
//! - [`ModReconciler`]: pairs every discovered file with exactly one
//!   [`ModRecord`](crate::models::ModRecord), synthesizing placeholders for
//!   unknown files from the `.disabled` naming convention.
//! - [`MetadataReader`]: reads loader descriptors embedded in mod archives and
//!   derives display names and versions, with file name fallbacks.
//! - [`EnrichmentPool`]: runs metadata reads on a bounded worker pool and
//!   publishes each [`RowUpdate`] on a single update channel.
//!
//! # Usage Example
//!
//! ```ignore
//! use modinv::services::{scan_mod_paths, ModReconciler};
//!
//! let paths = scan_mod_paths(&[instance_root.join("mods")]);
//! let pairs = ModReconciler::default().reconcile(&paths, &records);
//! ```

pub mod enrichment;
pub mod metadata;
pub mod reconciler;
pub mod scanner;

pub use enrichment::{EnrichmentError, EnrichmentPool, EnrichmentRun, EnrichmentSummary, RowUpdate};
pub use metadata::{MetadataError, MetadataReader};
pub use reconciler::ModReconciler;
pub use scanner::scan_mod_paths;
