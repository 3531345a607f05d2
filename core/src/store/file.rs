use parking_lot::Mutex;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::*;

/// Slots kept in a single JSON file.
///
/// The table is cached in memory and the whole file is rewritten on every
/// change, through a temporary sibling that is renamed into place.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    table: Mutex<SlotTable>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing, unreadable or malformed file starts
    /// from empty slots.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let table = match fs::read_to_string(&path) {
            Ok(json) => {
                let table = SlotTable::decode_or_default(&json);
                log::info!(
                    "Loaded {} of {} save slots from {}",
                    table.occupied(),
                    SLOT_COUNT,
                    path.display()
                );
                table
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::info!("No save file at {}, starting fresh", path.display());
                SlotTable::default()
            }
            Err(err) => {
                log::warn!("Could not read {}: {}", path.display(), err);
                SlotTable::default()
            }
        };
        Self {
            path,
            table: Mutex::new(table),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update(&self, index: usize, slot: Option<SaveSlot>) {
        let mut table = self.table.lock();
        if !update_table(&mut table, index, slot) {
            return;
        }
        if let Err(err) = self.persist(&table) {
            log::error!("Could not write save slots to {}: {}", self.path.display(), err);
        }
    }

    fn persist(&self, table: &SlotTable) -> core::result::Result<(), StoreError> {
        let json = table.encode()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("slots.json"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SlotStore for JsonFileStore {
    fn read_all(&self) -> SlotTable {
        self.table.lock().clone()
    }

    fn write(&self, index: usize, snapshot: &SessionSnapshot) {
        self.update(index, Some(SaveSlot::stamped_now(snapshot.clone())));
    }

    fn clear(&self, index: usize) {
        self.update(index, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn snapshot() -> SessionSnapshot {
        Session::new(GameConfig::default(), SessionDefaults::default()).snapshot()
    }

    #[test]
    fn missing_file_is_a_cold_start() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("slots.json"));
        assert_eq!(store.read_all(), SlotTable::default());
    }

    #[test]
    fn corrupt_file_falls_back_to_empty_slots() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("slots.json");
        fs::write(&path, "[1, 2, 3").unwrap();

        let store = JsonFileStore::open(&path);

        assert_eq!(store.read_all().occupied(), 0);
    }

    #[test]
    fn writes_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("slots.json");

        let store = JsonFileStore::open(&path);
        store.write(4, &snapshot());
        store.write(7, &snapshot());
        store.clear(7);

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.path(), path);
        let table = reopened.read_all();
        assert_eq!(table.occupied(), 1);
        assert_eq!(table.get(4).unwrap().state, snapshot());
        assert!(!store.tmp_path().exists());
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("slots.json");
        let store = JsonFileStore::open(&path);

        store.write(SLOT_COUNT, &snapshot());
        store.clear(42);

        assert_eq!(store.read_all().occupied(), 0);
        assert!(!path.exists());
    }
}
