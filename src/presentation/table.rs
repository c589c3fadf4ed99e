use camino::Utf8Path;
use indexmap::IndexMap;

use crate::models::ReconciledPair;
use crate::services::RowUpdate;

/// One row of the mods view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModRow {
    /// Path relative to the instance root; unique per row
    pub key: String,
    pub enabled: bool,
    pub name: String,
    pub version: String,
}

impl ModRow {
    /// Initial row for a reconciled pair, before enrichment
    pub fn from_pair(pair: &ReconciledPair, root: &Utf8Path) -> Self {
        Self {
            key: pair.entry.relative_to(root),
            enabled: pair.record.is_enabled(),
            name: pair.record.name.clone(),
            version: pair.record.version.clone(),
        }
    }
}

/// Rows of the mods view keyed by relative path.
///
/// Keeps insertion (filesystem) order for display and gives constant-time
/// lookup for incoming updates.
#[derive(Debug, Clone, Default)]
pub struct ModTable {
    rows: IndexMap<String, ModRow>,
}

impl ModTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all rows with those of a new pass.
    ///
    /// A repeated key keeps its first position and takes the later values.
    pub fn replace_rows(&mut self, rows: Vec<ModRow>) {
        self.rows = rows.into_iter().map(|row| (row.key.clone(), row)).collect();
    }

    /// Apply an enrichment result to its row.
    ///
    /// Returns false, leaving the table untouched, if the row is unknown
    /// (for example when a new pass replaced the rows meanwhile).
    pub fn apply_update(&mut self, update: &RowUpdate) -> bool {
        match self.rows.get_mut(&update.row_key) {
            Some(row) => {
                row.name = update.name.clone();
                row.version = update.version.clone();
                true
            }
            None => {
                tracing::debug!("Ignoring update for unknown row {}", update.row_key);
                false
            }
        }
    }

    pub fn row(&self, key: &str) -> Option<&ModRow> {
        self.rows.get(key)
    }

    /// Display position of a row
    pub fn position(&self, key: &str) -> Option<usize> {
        self.rows.get_index_of(key)
    }

    pub fn rows(&self) -> impl Iterator<Item = &ModRow> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
