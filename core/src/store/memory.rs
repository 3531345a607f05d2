use parking_lot::Mutex;

use super::*;

/// Slots kept in process memory only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: Mutex<SlotTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: SlotTable) -> Self {
        Self {
            table: Mutex::new(table),
        }
    }
}

impl SlotStore for MemoryStore {
    fn read_all(&self) -> SlotTable {
        self.table.lock().clone()
    }

    fn write(&self, index: usize, snapshot: &SessionSnapshot) {
        let slot = SaveSlot::stamped_now(snapshot.clone());
        update_table(&mut self.table.lock(), index, Some(slot));
    }

    fn clear(&self, index: usize) {
        update_table(&mut self.table.lock(), index, None);
    }
}
