//! Preset storage - byte-level API for preset persistence.
//!
//! Ids are allocated from a counter that only grows, so an id is never
//! handed out twice even after the row holding it is deleted.

use anyhow::Result;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::sync::Arc;

const PRESETS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("presets");
const PRESET_META_TABLE: TableDefinition<&str, u64> = TableDefinition::new("preset_meta");
const NEXT_ID_KEY: &str = "next_id";

/// Low-level preset storage with byte-level API
#[derive(Debug, Clone)]
pub struct PresetStorage {
    db: Arc<Database>,
}

impl PresetStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(PRESETS_TABLE)?;
        write_txn.open_table(PRESET_META_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Store a new record under a freshly allocated id.
    ///
    /// `encode` receives the id so the stored bytes can embed it.
    pub fn insert_raw<F>(&self, encode: F) -> Result<u64>
    where
        F: FnOnce(u64) -> Result<Vec<u8>>,
    {
        let write_txn = self.db.begin_write()?;
        let id = {
            let mut meta = write_txn.open_table(PRESET_META_TABLE)?;
            let id = meta.get(NEXT_ID_KEY)?.map(|v| v.value()).unwrap_or(1);
            meta.insert(NEXT_ID_KEY, id + 1)?;

            let data = encode(id)?;
            let mut table = write_txn.open_table(PRESETS_TABLE)?;
            table.insert(id, data.as_slice())?;
            id
        };
        write_txn.commit()?;
        Ok(id)
    }

    /// Replace the record stored under `id`, returns false if it doesn't exist.
    pub fn update_raw(&self, id: u64, data: &[u8]) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(PRESETS_TABLE)?;
            let existed = table.get(id)?.is_some();
            if existed {
                table.insert(id, data)?;
            }
            existed
        };
        write_txn.commit()?;
        Ok(existed)
    }

    /// Get raw preset data by ID
    pub fn get_raw(&self, id: u64) -> Result<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRESETS_TABLE)?;

        if let Some(data) = table.get(id)? {
            Ok(Some(data.value().to_vec()))
        } else {
            Ok(None)
        }
    }

    /// List all raw preset data in id order
    pub fn list_raw(&self) -> Result<Vec<(u64, Vec<u8>)>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRESETS_TABLE)?;

        let mut presets = Vec::new();
        for item in table.iter()? {
            let (key, value) = item?;
            presets.push((key.value(), value.value().to_vec()));
        }

        Ok(presets)
    }

    /// Delete preset by ID, returns true if it existed
    pub fn delete(&self, id: u64) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(PRESETS_TABLE)?;
            table.remove(id)?.is_some()
        };
        write_txn.commit()?;
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn setup() -> (PresetStorage, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(Database::create(db_path).unwrap());
        let storage = PresetStorage::new(db).unwrap();
        (storage, temp_dir)
    }

    #[test]
    fn test_insert_allocates_increasing_ids() {
        let (storage, _temp_dir) = setup();

        let first = storage.insert_raw(|_| Ok(b"one".to_vec())).unwrap();
        let second = storage.insert_raw(|_| Ok(b"two".to_vec())).unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(storage.get_raw(2).unwrap().unwrap(), b"two");
    }

    #[test]
    fn test_encode_sees_allocated_id() {
        let (storage, _temp_dir) = setup();

        let id = storage
            .insert_raw(|id| Ok(format!("preset-{id}").into_bytes()))
            .unwrap();

        assert_eq!(storage.get_raw(id).unwrap().unwrap(), b"preset-1");
    }

    #[test]
    fn test_failed_encode_does_not_consume_id() {
        let (storage, _temp_dir) = setup();

        let result = storage.insert_raw(|_| Err(anyhow::anyhow!("bad record")));
        assert!(result.is_err());

        let id = storage.insert_raw(|_| Ok(b"ok".to_vec())).unwrap();
        assert_eq!(id, 1);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let (storage, _temp_dir) = setup();

        let first = storage.insert_raw(|_| Ok(b"one".to_vec())).unwrap();
        assert!(storage.delete(first).unwrap());

        let second = storage.insert_raw(|_| Ok(b"two".to_vec())).unwrap();
        assert_eq!(second, 2);
    }

    #[test]
    fn test_update_missing_returns_false() {
        let (storage, _temp_dir) = setup();

        assert!(!storage.update_raw(42, b"data").unwrap());
        assert!(storage.get_raw(42).unwrap().is_none());
    }

    #[test]
    fn test_update_existing() {
        let (storage, _temp_dir) = setup();

        let id = storage.insert_raw(|_| Ok(b"before".to_vec())).unwrap();
        assert!(storage.update_raw(id, b"after").unwrap());
        assert_eq!(storage.get_raw(id).unwrap().unwrap(), b"after");
    }

    #[test]
    fn test_list_and_delete() {
        let (storage, _temp_dir) = setup();

        storage.insert_raw(|_| Ok(b"a".to_vec())).unwrap();
        storage.insert_raw(|_| Ok(b"b".to_vec())).unwrap();

        let presets = storage.list_raw().unwrap();
        assert_eq!(presets.len(), 2);
        assert_eq!(presets[0].0, 1);
        assert_eq!(presets[1].0, 2);

        assert!(storage.delete(1).unwrap());
        assert!(!storage.delete(1).unwrap());
        assert_eq!(storage.list_raw().unwrap().len(), 1);
    }
}
