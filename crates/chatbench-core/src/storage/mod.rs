//! Storage layer with typed wrappers around chatbench-storage.

pub mod preset;

use std::path::Path;

use anyhow::Result;

pub use preset::PresetStorage;

/// Typed access to every storage subsystem.
pub struct Storage {
    pub presets: PresetStorage,
}

impl Storage {
    /// Open (or create) the database at `path`.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let raw = chatbench_storage::Storage::new(path)?;
        Ok(Self {
            presets: PresetStorage::new(raw.presets),
        })
    }
}
