//! chatbench storage - low-level persistence layer
//!
//! Uses redb as the embedded database and exposes byte-level APIs so this
//! crate does not depend on the model types. Typed wrappers live in
//! chatbench-core.
//!
//! # Tables
//!
//! - `presets` - preset records keyed by numeric id
//! - `preset_meta` - the autoincrement counter for preset ids

pub mod preset;

use anyhow::Result;
use redb::Database;
use std::path::Path;
use std::sync::Arc;

pub use preset::PresetStorage;

/// Central storage manager that initializes all storage subsystems
pub struct Storage {
    pub presets: PresetStorage,
}

impl Storage {
    /// Create a new storage instance at the given path.
    ///
    /// This will create the database file if it doesn't exist and initialize
    /// all required tables.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let db = Arc::new(Database::create(path.as_ref())?);
        let presets = PresetStorage::new(db.clone())?;

        tracing::debug!(path = %path.as_ref().display(), "Opened preset database");

        Ok(Self { presets })
    }
}
