// Inventory state module
//
// This module provides the InventoryManager which wraps InventoryState with
// thread-safe access using Arc<RwLock<T>> and emits change events.
//
// Reads may happen anywhere. Writes come from the presentation thread only,
// which applies enrichment results one at a time.

use indexmap::IndexMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

use crate::models::ModRecord;
use crate::services::RowUpdate;

/// Change events emitted when inventory state is modified
#[derive(Clone, Debug, PartialEq)]
pub enum InventoryChange {
    /// A reconciliation pass has started with this many rows
    PassStarted { total_rows: usize },

    /// One row received its enrichment result
    RowEnriched {
        row_key: String,
        name: String,
        version: String,
        failed: bool,
    },

    /// Every enrichment result of the pass has been applied
    PassFinished { enriched: usize, failed: usize },

    /// State has been reset
    StateReset,
}

/// In-memory mod collection plus progress of the current pass.
#[derive(Clone, Debug, Default)]
pub struct InventoryState {
    /// Regular mod records keyed by row key, in reconciliation order
    pub records: IndexMap<String, ModRecord>,

    pub pass_in_progress: bool,
    pub total_rows: usize,
    pub enriched_rows: usize,
    pub failed_rows: usize,
}

impl InventoryState {
    /// Rows that have received a result so far
    pub fn completed_rows(&self) -> usize {
        self.enriched_rows + self.failed_rows
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Thread-safe inventory manager with event emission
///
/// - Provides shared access to [`InventoryState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`InventoryChange`] events
/// - Supports subscribing to changes via tokio broadcast channels
pub struct InventoryManager {
    state: Arc<RwLock<InventoryState>>,
    change_tx: broadcast::Sender<InventoryChange>,
}

impl InventoryManager {
    /// Create a manager with empty state and a broadcast buffer of 256 events
    pub fn new() -> Self {
        let (change_tx, _) = broadcast::channel(256);
        Self {
            state: Arc::new(RwLock::new(InventoryState::default())),
            change_tx,
        }
    }

    /// Clone of the current state
    pub fn snapshot(&self) -> InventoryState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Execute a function with read access to the state
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&InventoryState) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Update the state and emit change events for what changed.
    pub fn update<F>(&self, update_fn: F) -> Vec<InventoryChange>
    where
        F: FnOnce(&mut InventoryState),
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = Self::detect_changes(&old_state, &state);
        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.change_tx.send(change.clone());
        }

        changes
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InventoryChange> {
        self.change_tx.subscribe()
    }

    fn detect_changes(old: &InventoryState, new: &InventoryState) -> Vec<InventoryChange> {
        let mut changes = Vec::new();

        if old.pass_in_progress != new.pass_in_progress {
            if new.pass_in_progress {
                changes.push(InventoryChange::PassStarted {
                    total_rows: new.total_rows,
                });
            } else {
                changes.push(InventoryChange::PassFinished {
                    enriched: new.enriched_rows,
                    failed: new.failed_rows,
                });
            }
        }

        changes
    }

    /// Load the reconciled records of a new pass, each under its row key
    pub fn start_pass(&self, records: Vec<(String, ModRecord)>, total_rows: usize) -> Vec<InventoryChange> {
        self.update(|state| {
            state.records = records.into_iter().collect();
            state.pass_in_progress = true;
            state.total_rows = total_rows;
            state.enriched_rows = 0;
            state.failed_rows = 0;
        })
    }

    /// Write an enrichment result into the collection
    pub fn record_enrichment(&self, update: &RowUpdate) -> Vec<InventoryChange> {
        let mut changes = self.update(|state| {
            if let Some(record) = state.records.get_mut(&update.row_key) {
                record.name = update.name.clone();
                record.version = update.version.clone();
                if !update.internal_metadata.is_empty() {
                    record.internal_metadata = update.internal_metadata.clone();
                }
            }

            if update.failed {
                state.failed_rows += 1;
            } else {
                state.enriched_rows += 1;
            }
        });

        let event = InventoryChange::RowEnriched {
            row_key: update.row_key.clone(),
            name: update.name.clone(),
            version: update.version.clone(),
            failed: update.failed,
        };
        let _ = self.change_tx.send(event.clone());
        changes.push(event);

        changes
    }

    pub fn finish_pass(&self) -> Vec<InventoryChange> {
        self.update(|state| {
            state.pass_in_progress = false;
        })
    }

    pub fn reset(&self) -> Vec<InventoryChange> {
        let mut changes = self.update(InventoryState::reset);

        let event = InventoryChange::StateReset;
        let _ = self.change_tx.send(event.clone());
        changes.push(event);

        changes
    }

    /// Records of the current pass, in reconciliation order
    pub fn records(&self) -> Vec<ModRecord> {
        self.read(|state| state.records.values().cloned().collect())
    }
}

impl Default for InventoryManager {
    fn default() -> Self {
        Self::new()
    }
}

// Cloning shares the same state and channel
impl Clone for InventoryManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            change_tx: self.change_tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InternalModMetadata, ModLoader};

    fn entry(file: &str) -> (String, ModRecord) {
        (format!("mods/{}", file), ModRecord::new(file, "", ""))
    }

    fn update(file: &str, failed: bool) -> RowUpdate {
        let mut metadata = InternalModMetadata::new(ModLoader::Fabric);
        metadata.name = Some("Enriched".to_string());
        RowUpdate {
            row_key: format!("mods/{}", file),
            file: file.to_string(),
            name: "Enriched".to_string(),
            version: "1.0".to_string(),
            internal_metadata: if failed { Vec::new() } else { vec![metadata] },
            failed,
        }
    }

    #[test]
    fn test_new_manager() {
        let manager = InventoryManager::new();
        let state = manager.snapshot();

        assert!(!state.pass_in_progress);
        assert!(state.records.is_empty());
    }

    #[test]
    fn test_pass_lifecycle_events() {
        let manager = InventoryManager::new();

        let started = manager.start_pass(vec![entry("a.jar")], 1);
        assert_eq!(started, vec![InventoryChange::PassStarted { total_rows: 1 }]);

        let enriched = manager.record_enrichment(&update("a.jar", false));
        assert!(matches!(enriched[0], InventoryChange::RowEnriched { failed: false, .. }));

        let finished = manager.finish_pass();
        assert_eq!(finished, vec![InventoryChange::PassFinished { enriched: 1, failed: 0 }]);
    }

    #[test]
    fn test_enrichment_writes_record() {
        let manager = InventoryManager::new();
        manager.start_pass(vec![entry("a.jar")], 1);

        manager.record_enrichment(&update("a.jar", false));

        let record = manager.read(|s| s.records["mods/a.jar"].clone());
        assert_eq!(record.name, "Enriched");
        assert!(record.has_internal_metadata());
    }

    #[test]
    fn test_failed_enrichment_counts() {
        let manager = InventoryManager::new();
        manager.start_pass(vec![entry("a.jar")], 1);

        manager.record_enrichment(&update("a.jar", true));

        let state = manager.snapshot();
        assert_eq!(state.failed_rows, 1);
        assert_eq!(state.completed_rows(), 1);
        assert!(!state.records["mods/a.jar"].has_internal_metadata());
    }

    #[test]
    fn test_same_file_name_in_two_directories() {
        let manager = InventoryManager::new();
        manager.start_pass(
            vec![
                ("mods/a.jar".to_string(), ModRecord::new("a.jar", "", "")),
                ("coremods/a.jar".to_string(), ModRecord::new("a.jar", "", "")),
            ],
            2,
        );

        let mut nested = update("a.jar", false);
        nested.row_key = "coremods/a.jar".to_string();
        nested.name = "Nested".to_string();
        manager.record_enrichment(&update("a.jar", false));
        manager.record_enrichment(&nested);

        let state = manager.snapshot();
        assert_eq!(state.records.len(), 2);
        assert_eq!(state.records["mods/a.jar"].name, "Enriched");
        assert_eq!(state.records["coremods/a.jar"].name, "Nested");
    }

    #[test]
    fn test_subscribe_to_changes() {
        let manager = InventoryManager::new();
        let mut rx = manager.subscribe();

        manager.start_pass(Vec::new(), 0);

        let event = rx.try_recv();
        assert!(matches!(event, Ok(InventoryChange::PassStarted { total_rows: 0 })));
    }

    #[test]
    fn test_reset() {
        let manager = InventoryManager::new();
        manager.start_pass(vec![entry("a.jar")], 1);

        let changes = manager.reset();

        assert!(changes.iter().any(|c| matches!(c, InventoryChange::StateReset)));
        assert!(manager.records().is_empty());
    }

    #[test]
    fn test_clone_shares_state() {
        let manager1 = InventoryManager::new();
        let manager2 = manager1.clone();

        manager1.start_pass(vec![entry("a.jar")], 1);

        assert_eq!(manager2.records().len(), 1);
    }
}
