use crate::models::ModRecord;
use crate::services::RowUpdate;
use crate::state::InventoryManager;

use super::table::{ModRow, ModTable};

/// Everything the presentation thread owns for the mods view.
///
/// Lives inside a [`PresentationBridge`](super::PresentationBridge); all
/// methods run on the presentation thread, which makes it the single writer
/// of both the table and the inventory collection.
#[derive(Clone)]
pub struct ModsView {
    table: ModTable,
    inventory: InventoryManager,
    updates_applied: usize,
}

impl ModsView {
    pub fn new(inventory: InventoryManager) -> Self {
        Self {
            table: ModTable::new(),
            inventory,
            updates_applied: 0,
        }
    }

    /// Show the initial rows of a pass and load its records, keyed like the rows
    pub fn begin_pass(&mut self, rows: Vec<ModRow>, records: Vec<(String, ModRecord)>) {
        let total = rows.len();
        self.table.replace_rows(rows);
        self.inventory.start_pass(records, total);
        self.updates_applied = 0;
    }

    /// Apply one enrichment result to the table and the collection
    pub fn apply_update(&mut self, update: RowUpdate) {
        if self.table.apply_update(&update) {
            self.inventory.record_enrichment(&update);
            self.updates_applied += 1;
        }
    }

    pub fn finish_pass(&mut self) {
        self.inventory.finish_pass();
        tracing::debug!("Pass finished with {} updates applied", self.updates_applied);
    }

    pub fn table(&self) -> &ModTable {
        &self.table
    }

    pub fn inventory(&self) -> &InventoryManager {
        &self.inventory
    }

    pub fn updates_applied(&self) -> usize {
        self.updates_applied
    }
}
