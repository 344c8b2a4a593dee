pub mod disk;
pub mod memory;
pub mod settings;

use crate::core::cache::{KeyValueCollection, Store};
use anyhow::{Context, Result, anyhow};
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions};
use memory::MemoryCollection;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, RwLock},
};
use tracing::debug;

/// A thread-safe key-value store that can hold multiple collections.
///
/// Persistent collections live in one fjall keyspace; when the store is opened
/// without a keyspace only in-memory collections are available.
pub struct KeyValueStore {
    collections: RwLock<HashMap<String, Arc<dyn KeyValueCollection>>>,
    keyspace: Option<Arc<Keyspace>>,
}

impl KeyValueStore {
    /// Opens (or creates) the keyspace under `path`.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create store directory: {}", path.display()))?;
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        debug!("Opened key-value store at {}", path.display());

        Ok(Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: Some(Arc::new(keyspace)),
        })
    }

    /// A store without disk backing; persistent collections are unavailable.
    pub fn in_memory() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: None,
        }
    }

    fn create_collection(&self, name: &str, persist: bool) -> Result<Arc<dyn KeyValueCollection>> {
        if !persist {
            return Ok(Arc::new(MemoryCollection::new()));
        }

        let keyspace = self
            .keyspace
            .as_ref()
            .ok_or_else(|| anyhow!("No persistent keyspace for collection: {name}"))?;
        let partition = keyspace
            .open_partition(name, PartitionCreateOptions::default())
            .with_context(|| format!("Failed to open partition: {name}"))?;
        Ok(Arc::new(DiskCollection::new(Arc::clone(keyspace), partition)))
    }
}

impl Store for KeyValueStore {
    fn get_collection(&self, name: &str, persist: bool) -> Result<Arc<dyn KeyValueCollection>> {
        if let Some(collection) = self
            .collections
            .read()
            .map_err(|_| anyhow!("Collection registry poisoned"))?
            .get(name)
        {
            return Ok(Arc::clone(collection));
        }

        let mut collections = self
            .collections
            .write()
            .map_err(|_| anyhow!("Collection registry poisoned"))?;
        if let Some(collection) = collections.get(name) {
            return Ok(Arc::clone(collection));
        }

        let collection = self.create_collection(name, persist)?;
        collections.insert(name.to_string(), Arc::clone(&collection));
        Ok(collection)
    }
}
