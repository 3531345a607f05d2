use thiserror::Error;

use crate::*;
pub use file::*;
pub use memory::*;

mod file;
mod memory;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed save data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Expected {expected} save slots, found {0}", expected = SLOT_COUNT)]
    SlotCount(usize),
}

/// Keyed storage for the save slots.
///
/// Indices outside `0..SLOT_COUNT` are ignored, and storage failures are logged
/// rather than returned: saving never interrupts play.
pub trait SlotStore: Send + Sync {
    fn read_all(&self) -> SlotTable;

    fn write(&self, index: usize, snapshot: &SessionSnapshot);

    fn clear(&self, index: usize);

    fn read(&self, index: usize) -> Option<SaveSlot> {
        self.read_all().get(index).cloned()
    }
}

/// Applies one slot change to a cached table, logging ignored indices.
fn update_table(table: &mut SlotTable, index: usize, slot: Option<SaveSlot>) -> bool {
    let stored = table.set(index, slot);
    if !stored {
        log::debug!("Ignoring save slot index {} outside 0..{}", index, SLOT_COUNT);
    }
    stored
}
