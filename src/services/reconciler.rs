//! Reconciliation of files on disk against an instance's mod records.

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;

use crate::models::{DISABLED_SUFFIX, ModFileEntry, ModRecord, ModType, ReconciledPair};

/// Matches discovered files to known records, synthesizing placeholders for
/// files the instance has no record of.
#[derive(Debug, Clone)]
pub struct ModReconciler {
    disabled_suffix: String,
}

impl ModReconciler {
    pub fn new(disabled_suffix: impl Into<String>) -> Self {
        Self {
            disabled_suffix: disabled_suffix.into(),
        }
    }

    /// Pair every path with exactly one record.
    ///
    /// A record matches when it is a regular mod and its stored file name equals
    /// the path's file name. The first match in `records` order wins. Output
    /// order follows `paths`.
    pub fn reconcile(&self, paths: &[Utf8PathBuf], records: &[ModRecord]) -> Vec<ReconciledPair> {
        self.reconcile_counted(paths, records).0
    }

    /// Same as [`reconcile`](Self::reconcile), also returning how many
    /// records had to be synthesized.
    pub fn reconcile_counted(&self, paths: &[Utf8PathBuf], records: &[ModRecord]) -> (Vec<ReconciledPair>, usize) {
        let known = index_records(records);
        let mut synthesized = 0;

        let pairs = paths
            .iter()
            .map(|path| {
                let entry = ModFileEntry::new(path.clone());
                let record = match known.get(entry.file_name()) {
                    Some(record) => (*record).clone(),
                    None => {
                        tracing::warn!(
                            "Failed to find mod for file {}. Generating temporary mod for it.",
                            entry.file_name()
                        );
                        synthesized += 1;
                        self.synthesize_record(path, ModType::Mods)
                    }
                };

                ReconciledPair { entry, record }
            })
            .collect();

        (pairs, synthesized)
    }

    /// Build a placeholder record for an unknown file.
    ///
    /// Pure function of the path's name: the enabled state comes from the
    /// disabled suffix, name and version stay empty until enrichment.
    pub fn synthesize_record(&self, path: &Utf8Path, mod_type: ModType) -> ModRecord {
        let file = path.file_name().unwrap_or_default().to_string();
        let disabled = self.is_disabled_name(&file);

        ModRecord {
            file,
            name: String::new(),
            version: String::new(),
            disabled,
            mod_type,
            user_added: true,
            internal_metadata: Vec::new(),
        }
    }

    pub fn is_disabled_name(&self, file_name: &str) -> bool {
        !self.disabled_suffix.is_empty() && file_name.ends_with(&self.disabled_suffix)
    }
}

impl Default for ModReconciler {
    fn default() -> Self {
        Self::new(DISABLED_SUFFIX)
    }
}

/// Regular mod records by file name, keeping the first of any duplicates
fn index_records(records: &[ModRecord]) -> HashMap<&str, &ModRecord> {
    let mut known = HashMap::with_capacity(records.len());
    for record in records.iter().filter(|record| record.mod_type == ModType::Mods) {
        known.entry(record.file.as_str()).or_insert(record);
    }
    known
}
