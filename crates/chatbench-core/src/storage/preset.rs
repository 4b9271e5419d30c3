//! Typed preset storage wrapper.
//!
//! Records are stored as JSON in the same shape the HTTP interface returns,
//! `systemMessage` included.

use anyhow::Result;
use chatbench_models::{NewPreset, Preset, PresetSummary};

#[derive(Debug, Clone)]
pub struct PresetStorage {
    inner: chatbench_storage::PresetStorage,
}

impl PresetStorage {
    pub fn new(inner: chatbench_storage::PresetStorage) -> Self {
        Self { inner }
    }

    /// Store a new preset under the next free id.
    pub fn create(&self, preset: NewPreset) -> Result<Preset> {
        let mut stored = None;
        let id = self.inner.insert_raw(|id| {
            let preset = preset.into_preset(id);
            let bytes = serde_json::to_vec(&preset)?;
            stored = Some(preset);
            Ok(bytes)
        })?;
        stored.ok_or_else(|| anyhow::anyhow!("Preset {} was not encoded", id))
    }

    pub fn get(&self, id: u64) -> Result<Option<Preset>> {
        match self.inner.get_raw(id)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All presets in id order.
    pub fn list(&self) -> Result<Vec<Preset>> {
        self.inner
            .list_raw()?
            .into_iter()
            .map(|(_, bytes)| Ok(serde_json::from_slice(&bytes)?))
            .collect()
    }

    pub fn list_summaries(&self) -> Result<Vec<PresetSummary>> {
        Ok(self.list()?.iter().map(PresetSummary::from).collect())
    }

    /// Overwrite every field of an existing preset. Returns `None` when the id
    /// is unknown.
    pub fn update(&self, id: u64, preset: NewPreset) -> Result<Option<Preset>> {
        let preset = preset.into_preset(id);
        let bytes = serde_json::to_vec(&preset)?;
        if self.inner.update_raw(id, &bytes)? {
            Ok(Some(preset))
        } else {
            Ok(None)
        }
    }

    pub fn delete(&self, id: u64) -> Result<bool> {
        self.inner.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatbench_models::{CompletionParams, GenerationParameters};
    use tempfile::tempdir;

    fn setup() -> (PresetStorage, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let storage = crate::storage::Storage::new(dir.path().join("test.db")).unwrap();
        (storage.presets, dir)
    }

    fn preset(name: &str) -> NewPreset {
        NewPreset::new(
            name,
            GenerationParameters::new(CompletionParams::default().with_temperature(0.7), "terse"),
        )
    }

    #[test]
    fn test_create_and_get() {
        let (storage, _dir) = setup();

        let created = storage.create(preset("poet")).unwrap();
        assert_eq!(created.id, 1);

        let loaded = storage.get(created.id).unwrap().unwrap();
        assert_eq!(loaded, created);
        assert_eq!(loaded.params.system_message, "terse");
        assert!(storage.get(99).unwrap().is_none());
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let (storage, _dir) = setup();

        let first = storage.create(preset("a")).unwrap();
        assert!(storage.delete(first.id).unwrap());
        let second = storage.create(preset("b")).unwrap();

        assert_eq!(second.id, first.id + 1);
        assert!(!storage.delete(first.id).unwrap());
    }

    #[test]
    fn test_update_replaces_all_fields() {
        let (storage, _dir) = setup();
        let created = storage.create(preset("a")).unwrap();

        let mut changed = preset("renamed");
        changed.params.completion.max_tokens = 64;
        let updated = storage.update(created.id, changed).unwrap().unwrap();

        assert_eq!(updated.id, created.id);
        let loaded = storage.get(created.id).unwrap().unwrap();
        assert_eq!(loaded.name, "renamed");
        assert_eq!(loaded.params.completion.max_tokens, 64);
        assert!(storage.update(42, preset("x")).unwrap().is_none());
    }

    #[test]
    fn test_list_summaries_in_id_order() {
        let (storage, _dir) = setup();
        storage.create(preset("one")).unwrap();
        storage.create(preset("two")).unwrap();

        let summaries = storage.list_summaries().unwrap();
        let names: Vec<_> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two"]);
        assert_eq!(summaries[1].id, 2);
    }
}
